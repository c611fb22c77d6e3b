use super::{
    encode_pulse_header, encode_raster_header, encode_rx_length, encode_tx_length,
    encode_waveform, encode_wf_data_length, size_pulse_waveforms, size_raster, PULSE_HEADER_SIZE,
    RASTER_HEADER_SIZE, RX_LENGTH_SIZE, TX_LENGTH_SIZE, WF_DATA_LENGTH_SIZE,
};
use crate::{
    raster::Raster,
    util::{Block, Error, MemoryRef, Result},
};

/// The first `len` bytes of an optional waveform buffer.
fn waveform_bytes<'a>(waveform: &'a Option<Block>, len: usize, what: &str) -> Result<&'a [u8]> {
    match waveform {
        Some(block) if block.len() >= len => Ok(&block[..len]),
        None if len == 0 => Ok(&[]),
        Some(block) => Err(Error::invalid_argument(&format!(
            "{} declares {} bytes but holds {}",
            what,
            len,
            block.len()
        ))),
        None => Err(Error::invalid_argument(&format!(
            "{} declares {} bytes but has no data",
            what, len
        ))),
    }
}

/// Encodes a raster, without its record header, into a buffer of exactly
/// [`size_raster`] bytes allocated from `memory`.
pub fn pack_raster(raster: &Raster, memory: &MemoryRef) -> Result<Block> {
    let size = size_raster(raster)? as usize;
    let mut buffer = Block::allocate(memory, size)?;
    let mut pos = 0;

    encode_raster_header(&mut buffer[pos..], raster)?;
    pos += RASTER_HEADER_SIZE;

    for pulse in &raster.pulses {
        encode_pulse_header(&mut buffer[pos..], pulse)?;
        pos += PULSE_HEADER_SIZE;

        encode_wf_data_length(&mut buffer[pos..], size_pulse_waveforms(pulse)?)?;
        pos += WF_DATA_LENGTH_SIZE;

        encode_tx_length(&mut buffer[pos..], pulse.tx_len)?;
        pos += TX_LENGTH_SIZE;
        let tx = waveform_bytes(&pulse.tx, pulse.tx_len as usize, "tx waveform")?;
        encode_waveform(&mut buffer[pos..], tx)?;
        pos += tx.len();

        for channel in 0..pulse.stored_rx_count() {
            let rx_len = pulse.rx_len[channel];
            encode_rx_length(&mut buffer[pos..], rx_len)?;
            pos += RX_LENGTH_SIZE;
            let rx = waveform_bytes(&pulse.rx[channel], rx_len as usize, "rx waveform")?;
            encode_waveform(&mut buffer[pos..], rx)?;
            pos += rx.len();
        }
    }
    debug_assert_eq!(size, pos);
    Ok(buffer)
}
