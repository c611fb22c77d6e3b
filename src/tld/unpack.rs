use log::{debug, warn};

use super::{
    decode_pulse_header, decode_raster_header, decode_rx_length, decode_tx_length,
    decode_waveform, decode_wf_data_length, PULSE_HEADER_SIZE, RASTER_HEADER_SIZE,
    RX_LENGTH_SIZE, TX_LENGTH_SIZE, WF_DATA_LENGTH_SIZE,
};
use crate::{
    config::ReadConfig,
    raster::{Pulse, Raster, MAX_RX_COUNT},
    util::{Block, Code, Error, MemoryRef, Result},
};

/// Copies a waveform of up to `*len` bytes off the front of `buf`.
///
/// When `buf` holds fewer than `*len` bytes, `*len` is cut down to what is
/// there, that much is still copied, and `BufferShort` is returned after
/// advancing. An empty waveform allocates nothing.
fn take_waveform(
    buf: &mut &[u8],
    len: &mut usize,
    slot: &mut Option<Block>,
    memory: &MemoryRef,
) -> Result<()> {
    let mut short = false;
    if *len > buf.len() {
        *len = buf.len();
        short = true;
    }
    if *len > 0 {
        let mut block = Block::zeroed(memory, *len)?;
        decode_waveform(buf, &mut block)?;
        *slot = Some(block);
    }
    *buf = &buf[*len..];
    if short {
        return Err(Error::buffer_short("waveform truncated"));
    }
    Ok(())
}

/// Decodes the tx and rx waveforms of `pulse` from `buf`, which holds the
/// pulse's waveform block. `pulse.rx_count` must already be set.
///
/// On failure every waveform decoded before the failing one stays in
/// `pulse`, including a truncated one.
pub fn unpack_waveforms(buf: &[u8], pulse: &mut Pulse, memory: &MemoryRef) -> Result<()> {
    pulse.free_waveforms();
    let mut buf = buf;

    pulse.tx_len = decode_tx_length(buf)?;
    buf = &buf[TX_LENGTH_SIZE..];
    let mut tx_len = pulse.tx_len as usize;
    let result = take_waveform(&mut buf, &mut tx_len, &mut pulse.tx, memory);
    pulse.tx_len = tx_len as u8;
    result?;

    if pulse.rx_count as usize > MAX_RX_COUNT {
        warn!(
            "pulse declares {} return channels, only {} are stored",
            pulse.rx_count, MAX_RX_COUNT
        );
    }
    for channel in 0..pulse.stored_rx_count() {
        pulse.rx_len[channel] = decode_rx_length(buf)?;
        buf = &buf[RX_LENGTH_SIZE..];
        let mut rx_len = pulse.rx_len[channel] as usize;
        let result = take_waveform(&mut buf, &mut rx_len, &mut pulse.rx[channel], memory);
        pulse.rx_len[channel] = rx_len as u16;
        result?;
    }
    Ok(())
}

/// Whether a short read on this pulse is the known hardware fault: the
/// last waveform of the last pulse is written two bytes short. It is only
/// tolerated when every expected waveform got at least some data.
fn is_tolerated_truncation(pulse: &Pulse) -> bool {
    pulse.tx.is_some() && pulse.rx[..pulse.stored_rx_count()].iter().all(Option::is_some)
}

/// Decodes `raster.pulse_count` pulses from `buf` into `raster.pulses`.
///
/// Each pulse's waveform block is skipped as a whole using its declared
/// length, so slack inside a block never shifts the next pulse header.
/// On failure `raster.pulses` keeps every pulse decoded so far.
pub fn unpack_pulses(
    buf: &[u8],
    raster: &mut Raster,
    memory: &MemoryRef,
    include_waveforms: bool,
) -> Result<()> {
    raster.pulses = Vec::new();
    let pulse_count = raster.pulse_count as usize;
    if pulse_count == 0 {
        return Ok(());
    }
    raster.pulses.try_reserve_exact(pulse_count).map_err(|_| {
        Error::alloc_fail(&format!("unable to allocate {} pulses", pulse_count))
    })?;

    let mut buf = buf;
    for i in 0..pulse_count {
        let mut pulse = decode_pulse_header(buf)?;
        buf = &buf[PULSE_HEADER_SIZE..];
        let data_length =
            (decode_wf_data_length(buf)? as usize).min(buf.len() - WF_DATA_LENGTH_SIZE);
        buf = &buf[WF_DATA_LENGTH_SIZE..];

        if include_waveforms {
            let result = unpack_waveforms(&buf[..data_length], &mut pulse, memory);
            let last = i + 1 == pulse_count;
            match result {
                Ok(()) => {}
                Err(e)
                    if e.code() == Code::BufferShort && last && is_tolerated_truncation(&pulse) =>
                {
                    debug!("tolerating truncated waveform at end of raster");
                }
                Err(e) => {
                    raster.pulses.push(pulse);
                    return Err(e);
                }
            }
        }
        raster.pulses.push(pulse);
        buf = &buf[data_length..];
    }
    Ok(())
}

/// Decodes a raster, without its record header, from `buf`.
pub fn unpack_raster(buf: &[u8], memory: &MemoryRef, config: &ReadConfig) -> Result<Raster> {
    let mut raster = decode_raster_header(buf)?;
    if config.include_pulses {
        unpack_pulses(
            &buf[RASTER_HEADER_SIZE..],
            &mut raster,
            memory,
            config.include_waveforms,
        )?;
    }
    Ok(raster)
}
