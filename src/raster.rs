//! In-memory form of a TLD raster.
use crate::util::Block;

/// Hard cap on the number of return waveforms a pulse stores.
pub const MAX_RX_COUNT: usize = 4;

/// One laser shot.
///
/// `rx_count` is the count declared by the hardware and may exceed
/// [`MAX_RX_COUNT`]; only the first [`MAX_RX_COUNT`] channels are stored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pulse {
    /// 24-bit offset from the raster time, in 1.6 microsecond units
    pub time_offset: u32,
    pub rx_count: u8,
    pub bias_tx: u8,
    pub bias_rx: [u8; 4],
    pub scan_angle_counts: i16,
    /// 14 bits
    pub range: u16,
    pub thresh_tx: u8,
    pub thresh_rx: u8,
    pub tx_len: u8,
    pub tx: Option<Block>,
    pub rx_len: [u16; 4],
    pub rx: [Option<Block>; 4],
}

impl Pulse {
    /// Number of return channels that carry waveform storage
    pub fn stored_rx_count(&self) -> usize {
        (self.rx_count as usize).min(MAX_RX_COUNT)
    }

    /// Drops the waveform buffers, leaving the lengths as they were.
    pub fn free_waveforms(&mut self) {
        self.tx = None;
        for rx in self.rx.iter_mut() {
            *rx = None;
        }
    }
}

/// One scan line of pulses.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Raster {
    pub time_seconds: u32,
    pub time_fraction: u32,
    /// Cyclic counter written by the hardware; not an identifier
    pub sequence_number: u32,
    /// 15 bits
    pub pulse_count: u16,
    /// 0 or 1
    pub digitizer: u8,
    /// Empty when pulses were not requested
    pub pulses: Vec<Pulse>,
}

impl Raster {
    /// Releases the pulses and every waveform they own. Calling it again
    /// does nothing.
    pub fn free(&mut self) {
        self.pulses = Vec::new();
    }
}
