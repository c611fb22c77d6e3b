use std::{
    fmt,
    ops::Range,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use log::debug;

use crate::dump::dump;
use eaarlio::{
    edb::{read_edb, write_edb},
    env::{close_after, FileStream, Mode},
    Code, EdbIndex, EdbReadConfig, Error, Flight, MemoryRef, ReadConfig, Result,
};

#[derive(Parser)]
#[command(name = "eaarlio")]
#[command(about = "Inspect EAARL flights and correct their EDB time offsets")]
#[command(author, version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reports where the EDB time differs from the TLD time
    Check {
        /// EDB file to scan
        #[arg(short, long, value_name = "FILE")]
        edb: PathBuf,

        /// Directory holding the TLD files, defaults to the EDB's directory
        #[arg(short, long, value_name = "DIR")]
        tld: Option<PathBuf>,
    },

    /// Sets each EDB time to its TLD time plus an offset
    Set {
        #[arg(short, long, value_name = "FILE")]
        edb: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        tld: Option<PathBuf>,

        /// Seconds to add to the TLD time
        #[arg(short, long, allow_hyphen_values = true)]
        offset: i32,

        /// Raster number to start at
        #[arg(long)]
        start: Option<u32>,

        /// Raster number to stop at
        #[arg(long)]
        stop: Option<u32>,
    },

    /// Adds an offset to the EDB times, without reading the TLD files
    Adjust {
        #[arg(short, long, value_name = "FILE")]
        edb: PathBuf,

        /// Seconds to add to the current EDB time
        #[arg(short, long, allow_hyphen_values = true)]
        offset: i32,

        #[arg(long)]
        start: Option<u32>,

        #[arg(long)]
        stop: Option<u32>,
    },

    /// Prints the counts and file names of an EDB
    Info {
        #[arg(short, long, value_name = "FILE")]
        edb: PathBuf,
    },

    /// Prints rasters as YAML
    Dump {
        #[arg(short, long, value_name = "FILE")]
        edb: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        tld: Option<PathBuf>,

        /// Raster numbers to print
        #[arg(required = true, value_name = "RASTER")]
        rasters: Vec<u32>,

        /// Leave out pulse data
        #[arg(short = 'P', long)]
        no_pulses: bool,

        /// Leave out waveform data
        #[arg(short = 'W', long)]
        no_waveforms: bool,
    },
}

/// Directory of `edb_file`, or the working directory for a bare name.
pub fn default_tld_dir(edb_file: &Path) -> PathBuf {
    match edb_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// 0-based record range for the 1-based `start` and `stop` raster numbers.
/// Either bound may be left out, or given as 0, to mean the matching end of
/// the EDB.
pub fn raster_range(
    record_count: u32,
    start: Option<u32>,
    stop: Option<u32>,
) -> Result<Range<usize>> {
    let first = match start {
        Some(start) if start > 0 => start - 1,
        _ => 0,
    };
    let last = match stop {
        Some(stop) if stop > 0 => stop,
        _ => record_count,
    };
    if last > record_count {
        return Err(Error::new(
            Code::FlightRasterInvalid,
            format!("stop raster {} is past the last raster {}", last, record_count),
        ));
    }
    if first > last {
        return Err(Error::invalid_argument(&format!(
            "start raster {} is after stop raster {}",
            first + 1,
            last
        )));
    }
    Ok(first as usize..last as usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSummary {
    None,
    Uniform,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetReport {
    pub scanned: u32,
    /// Raster number and new offset, for each raster whose offset differs
    /// from the one before it
    pub changes: Vec<(u32, i32)>,
    pub summary: OffsetSummary,
}

impl fmt::Display for OffsetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((first, _)) = self.changes.first() {
            if *first > 1 {
                writeln!(f, "Raster 1: offset 0")?;
            }
        }
        for (raster_number, offset) in &self.changes {
            writeln!(f, "Raster {}: offset {}", raster_number, offset)?;
        }
        write!(f, "{} rasters scanned. ", self.scanned)?;
        match self.summary {
            OffsetSummary::None => write!(f, "No time offset was detected."),
            OffsetSummary::Uniform => {
                write!(f, "All rasters detected to have the same time offset.")
            }
            OffsetSummary::Multiple => write!(f, "Detected multiple time offsets."),
        }
    }
}

/// Reads every raster header of the flight and tracks the time offset.
pub fn check(flight: &mut Flight) -> Result<OffsetReport> {
    let scanned = flight.edb().record_count;
    let config = ReadConfig::header_only();
    let mut changes = Vec::new();
    let mut last = 0;
    for raster_number in 1..=scanned {
        let (_, offset) = flight.read_raster(raster_number, &config)?;
        if offset != last {
            changes.push((raster_number, offset));
            last = offset;
        }
    }
    let summary = if changes.iter().any(|(raster_number, _)| *raster_number > 1) {
        OffsetSummary::Multiple
    } else if last == 0 {
        OffsetSummary::None
    } else {
        OffsetSummary::Uniform
    };
    Ok(OffsetReport {
        scanned,
        changes,
        summary,
    })
}

/// Sets the EDB time of each raster in `range` to its TLD time plus
/// `offset`.
pub fn set_offset(flight: &mut Flight, offset: i32, range: Range<usize>) -> Result<()> {
    let config = ReadConfig::header_only();
    for index in range {
        let (raster, _) = flight.read_raster(index as u32 + 1, &config)?;
        flight.edb_mut().records[index].time_seconds =
            raster.time_seconds.wrapping_add_signed(offset);
    }
    Ok(())
}

/// Adds `offset` to the EDB time of each record in `range`.
pub fn adjust_offset(edb: &mut EdbIndex, offset: i32, range: Range<usize>) {
    for record in &mut edb.records[range] {
        record.time_seconds = record.time_seconds.wrapping_add_signed(offset);
    }
}

pub fn load_edb(edb_file: &Path, memory: &MemoryRef) -> Result<EdbIndex> {
    let mut stream = FileStream::open(edb_file, Mode::Read)?;
    let edb = read_edb(&mut stream, memory, &EdbReadConfig::default());
    close_after(&mut stream, edb)
}

/// Replaces `edb_file` with the contents of `edb`.
pub fn save_edb(edb_file: &Path, edb: &EdbIndex) -> Result<()> {
    debug!("rewriting {}", edb_file.display());
    let mut stream = FileStream::open(edb_file, Mode::Write)?;
    let written = write_edb(&mut stream, edb);
    close_after(&mut stream, written)
}

pub fn format_info(edb: &EdbIndex) -> String {
    let mut out = format!("records: {}\nfiles: {}\n", edb.record_count, edb.file_count);
    for (i, name) in edb.files.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i + 1, name));
    }
    out
}

/// Runs one subcommand and returns what it has to print.
pub fn run(command: Commands, memory: MemoryRef) -> Result<String> {
    match command {
        Commands::Check { edb, tld } => {
            let tld = tld.unwrap_or_else(|| default_tld_dir(&edb));
            let mut flight = Flight::open_files(&edb, &tld, memory)?;
            let report = check(&mut flight)?;
            flight.close()?;
            Ok(format!("{}\n", report))
        }
        Commands::Set {
            edb: edb_file,
            tld,
            offset,
            start,
            stop,
        } => {
            let tld = tld.unwrap_or_else(|| default_tld_dir(&edb_file));
            let mut flight = Flight::open_files(&edb_file, &tld, memory)?;
            let range = raster_range(flight.edb().record_count, start, stop)?;
            let count = range.len();
            set_offset(&mut flight, offset, range)?;
            let edb = flight.into_edb()?;
            save_edb(&edb_file, &edb)?;
            Ok(format!("{} rasters updated.\n", count))
        }
        Commands::Adjust {
            edb: edb_file,
            offset,
            start,
            stop,
        } => {
            let mut edb = load_edb(&edb_file, &memory)?;
            let range = raster_range(edb.record_count, start, stop)?;
            let count = range.len();
            adjust_offset(&mut edb, offset, range);
            save_edb(&edb_file, &edb)?;
            Ok(format!("{} rasters adjusted.\n", count))
        }
        Commands::Info { edb } => Ok(format_info(&load_edb(&edb, &memory)?)),
        Commands::Dump {
            edb,
            tld,
            rasters,
            no_pulses,
            no_waveforms,
        } => {
            let tld = tld.unwrap_or_else(|| default_tld_dir(&edb));
            let config = ReadConfig {
                include_pulses: !no_pulses,
                include_waveforms: !no_pulses && !no_waveforms,
            };
            let mut flight = Flight::open_files(&edb, &tld, memory)?;
            let out = dump(&mut flight, &rasters, &config)?;
            flight.close()?;
            Ok(out)
        }
    }
}
