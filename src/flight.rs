//! Random access to the rasters of a flight: an EDB index plus the TLD files
//! it points into.
use std::path::Path;

use log::debug;

use crate::{
    config::{EdbReadConfig, ReadConfig},
    edb::{read_edb, EdbIndex},
    env::{close_after, FileStream, FileTldOpener, Mode, Stream, TldOpener, Whence},
    raster::Raster,
    tld::read_raster,
    util::{Code, Error, MemoryRef, Result},
};

/// An EDB bound to a [`TldOpener`].
///
/// At most one TLD stream is open at a time. It stays open across
/// [`Flight::read_raster`] calls until a raster from a different file is
/// requested.
///
/// A `Flight` is meant for one caller at a time and is not `Sync`.
pub struct Flight {
    edb: EdbIndex,
    opener: Option<Box<dyn TldOpener>>,
    memory: MemoryRef,
    stream: Option<Box<dyn Stream>>,
    /// `file_index` of `stream`, 0 when none is open
    file_index: i16,
}

impl Flight {
    /// Fails with `FlightInvalid` unless `edb` has its records and file
    /// names loaded.
    pub fn new(edb: EdbIndex, opener: Box<dyn TldOpener>, memory: MemoryRef) -> Result<Self> {
        if edb.records.len() != edb.record_count as usize {
            return Err(Error::new(
                Code::FlightInvalid,
                format!(
                    "EDB has {} of {} records loaded",
                    edb.records.len(),
                    edb.record_count
                ),
            ));
        }
        if edb.files.len() != edb.file_count as usize {
            return Err(Error::new(
                Code::FlightInvalid,
                format!(
                    "EDB has {} of {} file names loaded",
                    edb.files.len(),
                    edb.file_count
                ),
            ));
        }
        Ok(Self {
            edb,
            opener: Some(opener),
            memory,
            stream: None,
            file_index: 0,
        })
    }

    /// Loads `edb_file` and opens TLD files from `tld_dir`.
    pub fn open_files(
        edb_file: impl AsRef<Path>,
        tld_dir: impl AsRef<Path>,
        memory: MemoryRef,
    ) -> Result<Self> {
        let mut stream = FileStream::open(edb_file, Mode::Read)?;
        let edb = read_edb(&mut stream, &memory, &EdbReadConfig::default());
        let edb = close_after(&mut stream, edb)?;
        let opener = FileTldOpener::new(tld_dir)?;
        Self::new(edb, Box::new(opener), memory)
    }

    pub fn edb(&self) -> &EdbIndex {
        &self.edb
    }

    /// Record and file counts must stay in step with the loaded contents.
    pub fn edb_mut(&mut self) -> &mut EdbIndex {
        &mut self.edb
    }

    /// Closes the flight and hands back its index.
    pub fn into_edb(mut self) -> Result<EdbIndex> {
        let closed = self.shutdown();
        let edb = std::mem::take(&mut self.edb);
        closed.map(|_| edb)
    }

    /// Reads raster `raster_number`, counted from 1 in EDB order.
    ///
    /// Also returns the EDB record's time minus the raster's own time, in
    /// whole seconds. Anything other than 0 means the EDB times were
    /// corrected after acquisition.
    pub fn read_raster(
        &mut self,
        raster_number: u32,
        config: &ReadConfig,
    ) -> Result<(Raster, i32)> {
        if raster_number < 1 || raster_number > self.edb.record_count {
            return Err(Error::new(
                Code::FlightRasterInvalid,
                format!(
                    "raster {} is outside 1..={}",
                    raster_number, self.edb.record_count
                ),
            ));
        }
        let record = match self.edb.records.get(raster_number as usize - 1) {
            Some(record) => *record,
            None => {
                return Err(Error::new(
                    Code::FlightInvalid,
                    format!(
                        "EDB has {} records loaded but declares {}",
                        self.edb.records.len(),
                        self.edb.record_count
                    ),
                ))
            }
        };
        let file_name = match self.edb.file(record.file_index) {
            Some(name) => name,
            None => {
                return Err(Error::corruption(&format!(
                    "raster {} refers to file {} of {}",
                    raster_number, record.file_index, self.edb.file_count
                )))
            }
        };

        if self.file_index != record.file_index {
            if let Some(mut stream) = self.stream.take() {
                debug!("closing TLD file {}", self.file_index);
                self.file_index = 0;
                stream.close()?;
            }
        }
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                let opener = match self.opener.as_mut() {
                    Some(opener) => opener,
                    None => {
                        return Err(Error::new(Code::TldOpenerInvalid, "TLD opener is closed"))
                    }
                };
                debug!("opening TLD file {} ({})", record.file_index, file_name);
                opener.open_tld(file_name)?
            }
        };
        self.file_index = record.file_index;

        let raster = stream
            .seek(record.record_offset as i64, Whence::Set)
            .and_then(|_| read_raster(stream.as_mut(), &self.memory, config));
        self.stream = Some(stream);
        let raster = raster?;
        let time_offset = record.time_seconds.wrapping_sub(raster.time_seconds) as i32;
        Ok((raster, time_offset))
    }

    /// Closes the open TLD stream and the opener, and frees the index.
    /// Every step runs even if an earlier one fails; the first error is
    /// returned.
    pub fn close(mut self) -> Result<()> {
        let closed = self.shutdown();
        self.edb.free();
        closed
    }

    fn shutdown(&mut self) -> Result<()> {
        let mut result = Ok(());
        if let Some(mut stream) = self.stream.take() {
            self.file_index = 0;
            result = stream.close();
        }
        if let Some(mut opener) = self.opener.take() {
            let closed = opener.close();
            if result.is_ok() {
                result = closed;
            }
        }
        result
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
