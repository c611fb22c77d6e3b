use super::{
    RecordHeader, MAX_PULSE_COUNT, MAX_RANGE, PULSE_HEADER_SIZE, RASTER_HEADER_SIZE,
    RECORD_HEADER_SIZE, RX_LENGTH_SIZE, TX_LENGTH_SIZE, WF_DATA_LENGTH_SIZE,
};
use crate::{
    raster::{Pulse, Raster},
    util::{
        decode_fixed16, decode_fixed16_signed, decode_fixed24, decode_fixed32, decode_fixed8,
        encode_fixed16, encode_fixed16_signed, encode_fixed24, encode_fixed32, encode_fixed8,
        Code, Error, Result, MAX_U24,
    },
};

const PULSE_COUNT_MASK: u16 = 0x7fff;
const DIGITIZER_SHIFT: u16 = 15;
const RANGE_MASK: u16 = 0x3fff;
const THRESH_TX_SHIFT: u16 = 14;
const THRESH_RX_SHIFT: u16 = 15;

fn check_len(buf_len: usize, need: usize, what: &str) -> Result<()> {
    if buf_len < need {
        return Err(Error::new(
            Code::BufferShort,
            format!("{} needs {} bytes, have {}", what, need, buf_len),
        ));
    }
    Ok(())
}

fn check_flag(value: u8, what: &str) -> Result<()> {
    if value > 1 {
        return Err(Error::out_of_range(&format!(
            "{} must be 0 or 1, got {}",
            what, value
        )));
    }
    Ok(())
}

pub fn decode_record_header(buf: &[u8]) -> Result<RecordHeader> {
    check_len(buf.len(), RECORD_HEADER_SIZE, "TLD record header")?;
    Ok(RecordHeader {
        record_length: decode_fixed24(buf),
        record_type: decode_fixed8(&buf[3..]),
    })
}

pub fn encode_record_header(buf: &mut [u8], header: &RecordHeader) -> Result<()> {
    check_len(buf.len(), RECORD_HEADER_SIZE, "TLD record header")?;
    if header.record_length > MAX_U24 {
        return Err(Error::out_of_range(&format!(
            "record length {} does not fit in 24 bits",
            header.record_length
        )));
    }
    encode_fixed24(buf, header.record_length);
    encode_fixed8(&mut buf[3..], header.record_type);
    Ok(())
}

/// Decodes the header fields of a raster. The result has no pulses.
pub fn decode_raster_header(buf: &[u8]) -> Result<Raster> {
    check_len(buf.len(), RASTER_HEADER_SIZE, "raster header")?;
    let packed = decode_fixed16(&buf[12..]);
    Ok(Raster {
        time_seconds: decode_fixed32(buf),
        time_fraction: decode_fixed32(&buf[4..]),
        sequence_number: decode_fixed32(&buf[8..]),
        pulse_count: packed & PULSE_COUNT_MASK,
        digitizer: (packed >> DIGITIZER_SHIFT) as u8,
        pulses: Vec::new(),
    })
}

pub fn encode_raster_header(buf: &mut [u8], raster: &Raster) -> Result<()> {
    check_len(buf.len(), RASTER_HEADER_SIZE, "raster header")?;
    if raster.pulse_count > MAX_PULSE_COUNT {
        return Err(Error::out_of_range(&format!(
            "pulse count {} exceeds {}",
            raster.pulse_count, MAX_PULSE_COUNT
        )));
    }
    check_flag(raster.digitizer, "digitizer")?;
    let packed = (raster.pulse_count & PULSE_COUNT_MASK)
        | (u16::from(raster.digitizer) << DIGITIZER_SHIFT);
    encode_fixed32(buf, raster.time_seconds);
    encode_fixed32(&mut buf[4..], raster.time_fraction);
    encode_fixed32(&mut buf[8..], raster.sequence_number);
    encode_fixed16(&mut buf[12..], packed);
    Ok(())
}

/// Decodes the header fields of a pulse. Waveform fields are left empty.
pub fn decode_pulse_header(buf: &[u8]) -> Result<Pulse> {
    check_len(buf.len(), PULSE_HEADER_SIZE, "pulse header")?;
    let packed = decode_fixed16(&buf[11..]);
    Ok(Pulse {
        time_offset: decode_fixed24(buf),
        rx_count: decode_fixed8(&buf[3..]),
        bias_tx: decode_fixed8(&buf[4..]),
        bias_rx: [buf[5], buf[6], buf[7], buf[8]],
        scan_angle_counts: decode_fixed16_signed(&buf[9..]),
        range: packed & RANGE_MASK,
        thresh_tx: ((packed >> THRESH_TX_SHIFT) & 1) as u8,
        thresh_rx: ((packed >> THRESH_RX_SHIFT) & 1) as u8,
        ..Default::default()
    })
}

pub fn encode_pulse_header(buf: &mut [u8], pulse: &Pulse) -> Result<()> {
    check_len(buf.len(), PULSE_HEADER_SIZE, "pulse header")?;
    if pulse.time_offset > MAX_U24 {
        return Err(Error::out_of_range(&format!(
            "time offset {} does not fit in 24 bits",
            pulse.time_offset
        )));
    }
    if pulse.range > MAX_RANGE {
        return Err(Error::out_of_range(&format!(
            "range {} exceeds {}",
            pulse.range, MAX_RANGE
        )));
    }
    check_flag(pulse.thresh_tx, "thresh_tx")?;
    check_flag(pulse.thresh_rx, "thresh_rx")?;
    let packed = (pulse.range & RANGE_MASK)
        | (u16::from(pulse.thresh_tx) << THRESH_TX_SHIFT)
        | (u16::from(pulse.thresh_rx) << THRESH_RX_SHIFT);
    encode_fixed24(buf, pulse.time_offset);
    encode_fixed8(&mut buf[3..], pulse.rx_count);
    encode_fixed8(&mut buf[4..], pulse.bias_tx);
    buf[5..9].copy_from_slice(&pulse.bias_rx);
    encode_fixed16_signed(&mut buf[9..], pulse.scan_angle_counts);
    encode_fixed16(&mut buf[11..], packed);
    Ok(())
}

pub fn decode_wf_data_length(buf: &[u8]) -> Result<u16> {
    check_len(buf.len(), WF_DATA_LENGTH_SIZE, "waveform data length")?;
    Ok(decode_fixed16(buf))
}

pub fn encode_wf_data_length(buf: &mut [u8], length: u16) -> Result<()> {
    check_len(buf.len(), WF_DATA_LENGTH_SIZE, "waveform data length")?;
    encode_fixed16(buf, length);
    Ok(())
}

pub fn decode_tx_length(buf: &[u8]) -> Result<u8> {
    check_len(buf.len(), TX_LENGTH_SIZE, "tx length")?;
    Ok(decode_fixed8(buf))
}

pub fn encode_tx_length(buf: &mut [u8], length: u8) -> Result<()> {
    check_len(buf.len(), TX_LENGTH_SIZE, "tx length")?;
    encode_fixed8(buf, length);
    Ok(())
}

pub fn decode_rx_length(buf: &[u8]) -> Result<u16> {
    check_len(buf.len(), RX_LENGTH_SIZE, "rx length")?;
    Ok(decode_fixed16(buf))
}

pub fn encode_rx_length(buf: &mut [u8], length: u16) -> Result<()> {
    check_len(buf.len(), RX_LENGTH_SIZE, "rx length")?;
    encode_fixed16(buf, length);
    Ok(())
}

/// Copies the first `dst.len()` bytes of `buf` into `dst`.
pub fn decode_waveform(buf: &[u8], dst: &mut [u8]) -> Result<()> {
    check_len(buf.len(), dst.len(), "waveform")?;
    dst.copy_from_slice(&buf[..dst.len()]);
    Ok(())
}

/// Copies the whole of `waveform` to the start of `buf`.
pub fn encode_waveform(buf: &mut [u8], waveform: &[u8]) -> Result<()> {
    check_len(buf.len(), waveform.len(), "waveform")?;
    buf[..waveform.len()].copy_from_slice(waveform);
    Ok(())
}
