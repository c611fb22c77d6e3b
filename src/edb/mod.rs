//! EDB index files.
//!
//! An EDB starts with a [`HEADER_SIZE`]-byte header, followed by
//! `record_count` fixed-size records, followed (at `files_offset`) by
//! `file_count` length-prefixed TLD file names.
mod coding;
mod reader;
mod writer;

pub use coding::{
    decode_filename, decode_filename_length, decode_header, decode_record, encode_filename,
    encode_filename_length, encode_header, encode_record,
};
pub use reader::{read_edb, read_filenames, read_header, read_records};
pub use writer::{write_edb, write_filenames, write_header, write_records};

pub const HEADER_SIZE: usize = 12;
pub const RECORD_SIZE: usize = 20;
pub const FILENAME_LENGTH_SIZE: usize = 2;
/// Longest name the length prefix can describe
pub const FILENAME_MAX_LENGTH: usize = u16::MAX as usize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdbHeader {
    pub files_offset: u32,
    pub record_count: u32,
    pub file_count: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdbRecord {
    pub time_seconds: u32,
    pub time_fraction: u32,
    /// Absolute offset of the raster's TLD record
    pub record_offset: u32,
    pub record_length: u32,
    /// 1-based index into [`EdbIndex::files`]
    pub file_index: i16,
    pub pulse_count: u8,
    pub digitizer: u8,
}

/// A loaded EDB.
///
/// `records` and `files` may be empty when they were not requested, even
/// though the counts say otherwise.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EdbIndex {
    pub record_count: u32,
    pub file_count: u32,
    pub records: Vec<EdbRecord>,
    pub files: Vec<String>,
}

impl EdbIndex {
    pub fn new(records: Vec<EdbRecord>, files: Vec<String>) -> Self {
        Self {
            record_count: records.len() as u32,
            file_count: files.len() as u32,
            records,
            files,
        }
    }

    /// Name of the TLD file behind a 1-based `file_index`
    pub fn file(&self, file_index: i16) -> Option<&str> {
        if file_index < 1 {
            return None;
        }
        self.files.get(file_index as usize - 1).map(String::as_str)
    }

    /// Releases records and file names. Calling it again does nothing.
    pub fn free(&mut self) {
        self.records = Vec::new();
        self.files = Vec::new();
    }
}
