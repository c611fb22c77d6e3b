//! TLD raw data files.
//!
//! A TLD is a sequence of records, each a [`RECORD_HEADER_SIZE`]-byte header
//! followed by its payload. Only raster records ([`TYPE_RASTER`]) are
//! decoded; everything else is skipped.
mod coding;
mod pack;
mod reader;
mod size;
mod unpack;
mod writer;

pub use coding::{
    decode_pulse_header, decode_raster_header, decode_record_header, decode_rx_length,
    decode_tx_length, decode_waveform, decode_wf_data_length, encode_pulse_header,
    encode_raster_header, encode_record_header, encode_rx_length, encode_tx_length,
    encode_waveform, encode_wf_data_length,
};
pub use pack::pack_raster;
pub use reader::{read_raster, read_record};
pub use size::{size_pulse, size_pulse_waveforms, size_raster, size_raster_pulses};
pub use unpack::{unpack_pulses, unpack_raster, unpack_waveforms};
pub use writer::write_raster;

pub const RECORD_HEADER_SIZE: usize = 4;
pub const RASTER_HEADER_SIZE: usize = 14;
pub const PULSE_HEADER_SIZE: usize = 13;
pub const WF_DATA_LENGTH_SIZE: usize = 2;
pub const TX_LENGTH_SIZE: usize = 1;
pub const RX_LENGTH_SIZE: usize = 2;

pub const TYPE_RASTER: u8 = 5;

pub const MAX_PULSE_COUNT: u16 = 0x7fff;
pub const MAX_RANGE: u16 = 0x3fff;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Length of the whole record, header included. 24 bits.
    pub record_length: u32,
    pub record_type: u8,
}

#[cfg(test)]
use crate::{
    raster::{Pulse, Raster},
    util::{Block, MemoryRef, Random},
};

/// A raster with every field and waveform filled from `rnd`.
#[cfg(test)]
pub(crate) fn random_raster(rnd: &mut Random, memory: &MemoryRef, pulse_count: u16) -> Raster {
    let mut pulses = Vec::new();
    for _ in 0..pulse_count {
        let mut pulse = Pulse {
            time_offset: rnd.uniform(1 << 24),
            rx_count: rnd.uniform(5) as u8,
            bias_tx: rnd.next() as u8,
            bias_rx: [rnd.next() as u8, rnd.next() as u8, rnd.next() as u8, rnd.next() as u8],
            scan_angle_counts: rnd.next() as i16,
            range: rnd.uniform(1 << 14) as u16,
            thresh_tx: rnd.uniform(2) as u8,
            thresh_rx: rnd.uniform(2) as u8,
            tx_len: rnd.uniform(16) as u8,
            ..Default::default()
        };
        if pulse.tx_len > 0 {
            let bytes = rnd.bytes(pulse.tx_len as usize);
            pulse.tx = Some(Block::from_slice(memory, &bytes).unwrap());
        }
        for channel in 0..pulse.stored_rx_count() {
            let len = rnd.uniform(60) as u16;
            pulse.rx_len[channel] = len;
            if len > 0 {
                let bytes = rnd.bytes(len as usize);
                pulse.rx[channel] = Some(Block::from_slice(memory, &bytes).unwrap());
            }
        }
        pulses.push(pulse);
    }
    Raster {
        time_seconds: rnd.next(),
        time_fraction: rnd.next(),
        sequence_number: rnd.next(),
        pulse_count,
        digitizer: rnd.uniform(2) as u8,
        pulses,
    }
}
