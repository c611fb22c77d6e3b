//! YAML listing of rasters, their pulses and waveforms.
use std::fmt;

use chrono::SecondsFormat;
use log::warn;

use eaarlio::{
    units::{pulse_scan_angle, pulse_time, raster_time, to_datetime},
    Code, EdbIndex, Error, Flight, Pulse, Raster, ReadConfig, Result,
};

const VALUES_PER_LINE: usize = 12;

/// Inline list of samples, wrapped every [`VALUES_PER_LINE`] values.
struct Waveform<'a>(Option<&'a [u8]>);

impl fmt::Display for Waveform<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let samples = match self.0 {
            None | Some([]) => return f.write_str("[]\n"),
            Some(samples) => samples,
        };
        f.write_str("[")?;
        for (i, sample) in samples.iter().enumerate() {
            if i % VALUES_PER_LINE == 0 {
                f.write_str("\n            ")?;
            }
            write!(f, " {:3}", sample)?;
            if i + 1 < samples.len() {
                f.write_str(",")?;
            }
        }
        f.write_str("\n          ]\n")
    }
}

pub struct RasterDump<'a> {
    pub raster_number: u32,
    pub raster: &'a Raster,
    pub time_offset: i32,
    pub include_pulses: bool,
    pub include_waveforms: bool,
}

impl RasterDump<'_> {
    fn fmt_pulse(
        &self,
        f: &mut fmt::Formatter<'_>,
        pulse_number: u16,
        pulse: &Pulse,
    ) -> fmt::Result {
        writeln!(f, "    - pulse_number: {}", pulse_number)?;
        if let Some(time) = pulse_time(self.raster, pulse_number) {
            writeln!(f, "      time: {:.6}", time)?;
        }
        writeln!(f, "      scan_angle: {:.3}", pulse_scan_angle(pulse))?;
        writeln!(f, "      time_offset: {}", pulse.time_offset)?;
        writeln!(f, "      scan_angle_counts: {}", pulse.scan_angle_counts)?;
        writeln!(f, "      range: {}", pulse.range)?;
        writeln!(f, "      rx_count: {}", pulse.rx_count)?;
        writeln!(f, "      thresh_tx: {}", pulse.thresh_tx)?;
        writeln!(f, "      thresh_rx: {}", pulse.thresh_rx)?;
        writeln!(f, "      bias_tx: {}", pulse.bias_tx)?;
        let [b0, b1, b2, b3] = pulse.bias_rx;
        writeln!(f, "      bias_rx: [{}, {}, {}, {}]", b0, b1, b2, b3)?;
        writeln!(f, "      tx_len: {}", pulse.tx_len)?;
        let [l0, l1, l2, l3] = pulse.rx_len;
        writeln!(f, "      rx_len: [{}, {}, {}, {}]", l0, l1, l2, l3)?;

        if !self.include_waveforms {
            return Ok(());
        }
        write!(f, "      tx: {}", Waveform(pulse.tx.as_deref()))?;
        let channels = pulse.stored_rx_count();
        if channels == 0 {
            return writeln!(f, "      rx: []");
        }
        writeln!(f, "      rx:")?;
        for rx in &pulse.rx[..channels] {
            write!(f, "        - {}", Waveform(rx.as_deref()))?;
        }
        Ok(())
    }
}

impl fmt::Display for RasterDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raster = self.raster;
        let time = raster_time(raster);
        writeln!(f, "- raster_number: {}", self.raster_number)?;
        writeln!(f, "  time: {:.6}", time)?;
        if let Some(utc) = to_datetime(time) {
            writeln!(
                f,
                "  time_utc: {}",
                utc.to_rfc3339_opts(SecondsFormat::Micros, true)
            )?;
        }
        writeln!(f, "  edb_time_offset: {}", self.time_offset)?;
        writeln!(f, "  time_seconds: {}", raster.time_seconds)?;
        writeln!(f, "  time_fraction: {}", raster.time_fraction)?;
        writeln!(f, "  sequence_number: {}", raster.sequence_number)?;
        writeln!(f, "  digitizer: {}", raster.digitizer)?;
        writeln!(f, "  pulse_count: {}", raster.pulse_count)?;

        if !self.include_pulses {
            return Ok(());
        }
        if raster.pulses.is_empty() {
            return writeln!(f, "  pulses: []");
        }
        writeln!(f, "  pulses:")?;
        for (i, pulse) in raster.pulses.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            self.fmt_pulse(f, i as u16 + 1, pulse)?;
        }
        Ok(())
    }
}

/// Drops, with a warning, raster numbers the EDB cannot resolve to a TLD
/// record.
pub fn select_rasters(edb: &EdbIndex, requested: &[u32]) -> Vec<u32> {
    let mut selected = Vec::with_capacity(requested.len());
    for &raster_number in requested {
        if raster_number < 1 || raster_number > edb.record_count {
            warn!(
                "raster {} is outside 1..={}, skipping",
                raster_number, edb.record_count
            );
            continue;
        }
        let file_index = match edb.records.get(raster_number as usize - 1) {
            Some(record) => record.file_index,
            None => {
                warn!("raster {} has no loaded EDB record, skipping", raster_number);
                continue;
            }
        };
        if edb.file(file_index).is_none() {
            warn!(
                "raster {} refers to file {} of {}, skipping",
                raster_number, file_index, edb.file_count
            );
            continue;
        }
        selected.push(raster_number);
    }
    selected
}

/// One YAML document holding every requested raster that can be read.
pub fn dump(flight: &mut Flight, requested: &[u32], config: &ReadConfig) -> Result<String> {
    let rasters = select_rasters(flight.edb(), requested);
    if rasters.is_empty() {
        return Err(Error::new(
            Code::FlightRasterInvalid,
            "none of the requested rasters are valid",
        ));
    }
    let mut out = String::from("---\n");
    for (i, &raster_number) in rasters.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let (raster, time_offset) = flight.read_raster(raster_number, config)?;
        let entry = RasterDump {
            raster_number,
            raster: &raster,
            time_offset,
            include_pulses: config.include_pulses,
            include_waveforms: config.include_pulses && config.include_waveforms,
        };
        out.push_str(&entry.to_string());
    }
    out.push_str("...\n");
    Ok(out)
}

/// Raster at 100 s holding one pulse 1 s later, with a 3 sample transmit
/// waveform and one 2 sample return.
#[cfg(test)]
pub fn sample_raster(memory: &eaarlio::MemoryRef) -> Raster {
    use eaarlio::util::Block;

    let mut pulse = Pulse {
        time_offset: 625_000,
        rx_count: 1,
        bias_tx: 2,
        bias_rx: [3, 4, 5, 6],
        scan_angle_counts: -200,
        range: 1234,
        thresh_tx: 1,
        thresh_rx: 0,
        tx_len: 3,
        tx: Some(Block::from_slice(memory, &[1, 2, 3]).unwrap()),
        ..Default::default()
    };
    pulse.rx_len[0] = 2;
    pulse.rx[0] = Some(Block::from_slice(memory, &[200, 7]).unwrap());
    Raster {
        time_seconds: 100,
        time_fraction: 0,
        sequence_number: 7,
        digitizer: 1,
        pulse_count: 1,
        pulses: vec![pulse],
    }
}
