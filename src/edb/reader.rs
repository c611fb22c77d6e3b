use super::{
    decode_filename, decode_filename_length, decode_header, decode_record, EdbHeader, EdbIndex,
    EdbRecord, FILENAME_LENGTH_SIZE, HEADER_SIZE, RECORD_SIZE,
};
use crate::{
    config::EdbReadConfig,
    env::{Stream, Whence},
    util::{Block, Error, MemoryRef, Result},
};

const INITIAL_SCRATCH_SIZE: usize = 32;

/// Reads the header at the start of `stream`.
pub fn read_header(stream: &mut dyn Stream) -> Result<EdbHeader> {
    let mut buf = [0u8; HEADER_SIZE];
    stream.seek(0, Whence::Set)?;
    stream.read(&mut buf)?;
    decode_header(&buf)
}

/// Reads `header.record_count` records, starting right after the header.
pub fn read_records(stream: &mut dyn Stream, header: &EdbHeader) -> Result<Vec<EdbRecord>> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(header.record_count as usize)
        .map_err(|_| {
            Error::alloc_fail(&format!(
                "unable to allocate {} EDB records",
                header.record_count
            ))
        })?;
    let mut buf = [0u8; RECORD_SIZE];
    stream.seek(HEADER_SIZE as i64, Whence::Set)?;
    for _ in 0..header.record_count {
        stream.read(&mut buf)?;
        records.push(decode_record(&buf)?);
    }
    Ok(records)
}

/// Reads `header.file_count` length-prefixed names at `header.files_offset`.
pub fn read_filenames(
    stream: &mut dyn Stream,
    header: &EdbHeader,
    memory: &MemoryRef,
) -> Result<Vec<String>> {
    let mut files = Vec::new();
    files
        .try_reserve_exact(header.file_count as usize)
        .map_err(|_| {
            Error::alloc_fail(&format!(
                "unable to allocate {} EDB file names",
                header.file_count
            ))
        })?;
    let mut scratch = Block::allocate(memory, INITIAL_SCRATCH_SIZE)?;
    let mut len_buf = [0u8; FILENAME_LENGTH_SIZE];
    stream.seek(header.files_offset as i64, Whence::Set)?;
    for _ in 0..header.file_count {
        stream.read(&mut len_buf)?;
        let length = decode_filename_length(&len_buf)? as usize;
        if length > scratch.len() {
            let mut size = scratch.len();
            while size < length {
                size *= 2;
            }
            scratch.resize(size)?;
        }
        stream.read(&mut scratch[..length])?;
        files.push(decode_filename(&scratch, length)?);
    }
    Ok(files)
}

/// Loads an EDB. Records and file names are only read when `config` asks
/// for them; the counts are always filled in.
pub fn read_edb(
    stream: &mut dyn Stream,
    memory: &MemoryRef,
    config: &EdbReadConfig,
) -> Result<EdbIndex> {
    let header = read_header(stream)?;
    let mut edb = EdbIndex {
        record_count: header.record_count,
        file_count: header.file_count,
        ..Default::default()
    };
    if config.include_records && header.record_count > 0 {
        edb.records = read_records(stream, &header)?;
    }
    if config.include_files && header.file_count > 0 {
        edb.files = read_filenames(stream, &header, memory)?;
    }
    Ok(edb)
}
