//! Conversions from raw hardware counts to physical units.
use chrono::{DateTime, Utc};

use crate::{
    edb::EdbRecord,
    raster::{Pulse, Raster},
};

/// Seconds per time-fraction count
pub const TIME_FRACTION_SECONDS: f64 = 1.6e-6;
/// Degrees per scan angle count
pub const SCAN_ANGLE_COUNTS_DEGREES: f64 = 0.045;

/// Seconds since the epoch
pub fn edb_time(record: &EdbRecord) -> f64 {
    record.time_seconds as f64 + record.time_fraction as f64 * TIME_FRACTION_SECONDS
}

/// Seconds since the epoch
pub fn raster_time(raster: &Raster) -> f64 {
    raster.time_seconds as f64 + raster.time_fraction as f64 * TIME_FRACTION_SECONDS
}

/// Time of the 1-based `pulse_number`, or `None` when the raster has no
/// such pulse loaded.
pub fn pulse_time(raster: &Raster, pulse_number: u16) -> Option<f64> {
    if pulse_number < 1 || pulse_number > raster.pulse_count {
        return None;
    }
    let pulse = raster.pulses.get(pulse_number as usize - 1)?;
    Some(
        raster.time_seconds as f64
            + (raster.time_fraction as f64 + pulse.time_offset as f64) * TIME_FRACTION_SECONDS,
    )
}

/// Degrees
pub fn pulse_scan_angle(pulse: &Pulse) -> f64 {
    pulse.scan_angle_counts as f64 * SCAN_ANGLE_COUNTS_DEGREES
}

/// Converts fractional epoch seconds, as returned by the functions above.
/// `None` if out of chrono's range.
pub fn to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    let (whole, nanos) = if nanos >= 1_000_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, nanos)
    };
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos)
}
