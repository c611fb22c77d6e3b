/// Controls how much of a raster is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Decode the pulse headers following the raster header.
    pub include_pulses: bool,
    /// Decode and allocate each pulse's waveforms. Ignored unless
    /// `include_pulses` is set.
    pub include_waveforms: bool,
}

impl ReadConfig {
    pub fn header_only() -> Self {
        Self {
            include_pulses: false,
            include_waveforms: false,
        }
    }

    pub fn pulses_only() -> Self {
        Self {
            include_pulses: true,
            include_waveforms: false,
        }
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            include_pulses: true,
            include_waveforms: true,
        }
    }
}

/// Controls which parts of an EDB are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdbReadConfig {
    pub include_records: bool,
    pub include_files: bool,
}

impl Default for EdbReadConfig {
    fn default() -> Self {
        Self {
            include_records: true,
            include_files: true,
        }
    }
}
