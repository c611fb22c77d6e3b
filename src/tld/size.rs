//! Encoded sizes, checked against the widths of the length fields that
//! will have to hold them.
use log::warn;

use super::{
    PULSE_HEADER_SIZE, RASTER_HEADER_SIZE, RX_LENGTH_SIZE, TX_LENGTH_SIZE, WF_DATA_LENGTH_SIZE,
};
use crate::{
    raster::{Pulse, Raster, MAX_RX_COUNT},
    util::{Error, Result, MAX_U24},
};

/// Size of the waveform block that follows a pulse's `wf_data_length`.
pub fn size_pulse_waveforms(pulse: &Pulse) -> Result<u16> {
    if pulse.rx_count as usize > MAX_RX_COUNT {
        warn!(
            "pulse declares {} return channels, only {} are sized",
            pulse.rx_count, MAX_RX_COUNT
        );
    }
    let overflow = || Error::out_of_range("pulse waveforms do not fit in 16 bits");
    let mut size = TX_LENGTH_SIZE as u16 + u16::from(pulse.tx_len);
    for &rx_len in &pulse.rx_len[..pulse.stored_rx_count()] {
        size = size
            .checked_add(RX_LENGTH_SIZE as u16)
            .and_then(|size| size.checked_add(rx_len))
            .ok_or_else(overflow)?;
    }
    Ok(size)
}

/// Header, waveform length field and waveforms. Always fits in 24 bits.
pub fn size_pulse(pulse: &Pulse) -> Result<u32> {
    let waveforms = size_pulse_waveforms(pulse)?;
    Ok((PULSE_HEADER_SIZE + WF_DATA_LENGTH_SIZE) as u32 + u32::from(waveforms))
}

pub fn size_raster_pulses(raster: &Raster) -> Result<u32> {
    if raster.pulses.len() != raster.pulse_count as usize {
        return Err(Error::invalid_argument(&format!(
            "raster declares {} pulses but holds {}",
            raster.pulse_count,
            raster.pulses.len()
        )));
    }
    let mut size = 0u32;
    for pulse in &raster.pulses {
        size += size_pulse(pulse)?;
        if size > MAX_U24 {
            return Err(Error::out_of_range("raster pulses do not fit in 24 bits"));
        }
    }
    Ok(size)
}

/// Size of a packed raster, without the record header.
pub fn size_raster(raster: &Raster) -> Result<u32> {
    let size = RASTER_HEADER_SIZE as u32 + size_raster_pulses(raster)?;
    if size > MAX_U24 {
        return Err(Error::out_of_range("raster does not fit in 24 bits"));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(tx_len: u8, rx_len: &[u16]) -> Pulse {
        let mut pulse = Pulse {
            tx_len,
            rx_count: rx_len.len() as u8,
            ..Default::default()
        };
        for (i, &len) in rx_len.iter().take(MAX_RX_COUNT).enumerate() {
            pulse.rx_len[i] = len;
        }
        pulse
    }

    #[test]
    fn test_size_pulse_waveforms() {
        assert_eq!(1, size_pulse_waveforms(&pulse(0, &[])).unwrap());
        assert_eq!(11, size_pulse_waveforms(&pulse(10, &[])).unwrap());
        assert_eq!(1 + 10 + 2 + 20 + 2 + 30, size_pulse_waveforms(&pulse(10, &[20, 30])).unwrap());
    }

    #[test]
    fn test_size_pulse_waveforms_caps_rx_count() {
        let mut p = pulse(1, &[1, 1, 1, 1]);
        let capped = size_pulse_waveforms(&p).unwrap();
        p.rx_count = 200;
        assert_eq!(capped, size_pulse_waveforms(&p).unwrap());
    }

    #[test]
    fn test_size_pulse_waveforms_overflow() {
        // 1 + 255 + 2 + 65000 = 65258 still fits
        assert_eq!(65258, size_pulse_waveforms(&pulse(255, &[65000])).unwrap());
        assert!(size_pulse_waveforms(&pulse(255, &[65000, 300]))
            .unwrap_err()
            .is_out_of_range());
        assert!(size_pulse_waveforms(&pulse(0, &[u16::MAX]))
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn test_size_pulse() {
        assert_eq!(13 + 2 + 1 + 4 + 2 + 8, size_pulse(&pulse(4, &[8])).unwrap());
    }

    #[test]
    fn test_size_raster() {
        let raster = Raster {
            pulse_count: 2,
            pulses: vec![pulse(4, &[8]), pulse(0, &[])],
            ..Default::default()
        };
        assert_eq!(30 + 16, size_raster_pulses(&raster).unwrap());
        assert_eq!(14 + 30 + 16, size_raster(&raster).unwrap());

        let empty = Raster::default();
        assert_eq!(0, size_raster_pulses(&empty).unwrap());
        assert_eq!(14, size_raster(&empty).unwrap());
    }

    #[test]
    fn test_size_raster_mismatch() {
        let raster = Raster {
            pulse_count: 3,
            pulses: vec![pulse(0, &[])],
            ..Default::default()
        };
        assert!(size_raster(&raster).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_size_raster_overflow() {
        // each pulse is 13 + 2 + 1 + 4 * (2 + 16000) = 64024 bytes
        let big = || pulse(0, &[16000, 16000, 16000, 16000]);
        let max_pulses = (MAX_U24 / 64024) as usize;
        let raster = Raster {
            pulse_count: max_pulses as u16,
            pulses: (0..max_pulses).map(|_| big()).collect(),
            ..Default::default()
        };
        assert_eq!(max_pulses as u32 * 64024, size_raster_pulses(&raster).unwrap());

        let raster = Raster {
            pulse_count: max_pulses as u16 + 1,
            pulses: (0..=max_pulses).map(|_| big()).collect(),
            ..Default::default()
        };
        assert!(size_raster_pulses(&raster).unwrap_err().is_out_of_range());
        assert!(size_raster(&raster).unwrap_err().is_out_of_range());
    }
}
