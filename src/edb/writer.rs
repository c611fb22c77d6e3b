use super::{
    encode_filename, encode_filename_length, encode_header, encode_record, EdbHeader, EdbIndex,
    EdbRecord, FILENAME_LENGTH_SIZE, FILENAME_MAX_LENGTH, HEADER_SIZE, RECORD_SIZE,
};
use crate::{
    env::{Stream, Whence},
    util::{Code, Error, Result},
};

pub fn write_header(stream: &mut dyn Stream, header: &EdbHeader) -> Result<()> {
    let mut buf = [0u8; HEADER_SIZE];
    encode_header(&mut buf, header)?;
    stream.seek(0, Whence::Set)?;
    stream.write(&buf)
}

pub fn write_records(stream: &mut dyn Stream, records: &[EdbRecord]) -> Result<()> {
    let mut buf = [0u8; RECORD_SIZE];
    stream.seek(HEADER_SIZE as i64, Whence::Set)?;
    for record in records {
        encode_record(&mut buf, record)?;
        stream.write(&buf)?;
    }
    Ok(())
}

/// Writes each name behind its length prefix, starting at `files_offset`.
pub fn write_filenames(stream: &mut dyn Stream, files_offset: u32, files: &[String]) -> Result<()> {
    let mut len_buf = [0u8; FILENAME_LENGTH_SIZE];
    stream.seek(files_offset as i64, Whence::Set)?;
    for name in files {
        if name.len() > FILENAME_MAX_LENGTH {
            return Err(Error::new(
                Code::EdbFilenameTooLong,
                format!("filename is {} bytes long", name.len()),
            ));
        }
        encode_filename_length(&mut len_buf, name.len() as u16)?;
        stream.write(&len_buf)?;
        let mut name_buf = vec![0u8; name.len()];
        encode_filename(&mut name_buf, name)?;
        stream.write(&name_buf)?;
    }
    Ok(())
}

/// Header, records and names, in that order. `files_offset` is derived from
/// the record count.
pub fn write_edb(stream: &mut dyn Stream, edb: &EdbIndex) -> Result<()> {
    if edb.records.len() != edb.record_count as usize {
        return Err(Error::invalid_argument(&format!(
            "EDB declares {} records but holds {}",
            edb.record_count,
            edb.records.len()
        )));
    }
    if edb.files.len() != edb.file_count as usize {
        return Err(Error::invalid_argument(&format!(
            "EDB declares {} files but holds {}",
            edb.file_count,
            edb.files.len()
        )));
    }
    let files_offset = (RECORD_SIZE as u32)
        .checked_mul(edb.record_count)
        .and_then(|size| size.checked_add(HEADER_SIZE as u32))
        .ok_or_else(|| {
            Error::out_of_range(&format!(
                "{} records do not fit in an EDB",
                edb.record_count
            ))
        })?;
    let header = EdbHeader {
        files_offset,
        record_count: edb.record_count,
        file_count: edb.file_count,
    };
    write_header(stream, &header)?;
    if !edb.records.is_empty() {
        write_records(stream, &edb.records)?;
    }
    if !edb.files.is_empty() {
        write_filenames(stream, header.files_offset, &edb.files)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{edb::decode_header, env::BufferStream};

    #[test]
    fn test_write_edb_layout() {
        let record = EdbRecord {
            time_seconds: 7,
            file_index: 1,
            ..Default::default()
        };
        let edb = EdbIndex::new(vec![record; 2], vec!["ab".to_owned()]);
        let mut stream = BufferStream::empty();
        write_edb(&mut stream, &edb).unwrap();
        let bytes = stream.contents().unwrap();

        assert_eq!(HEADER_SIZE + 2 * RECORD_SIZE + 2 + 2, bytes.len());
        let header = decode_header(bytes).unwrap();
        assert_eq!(52, header.files_offset);
        assert_eq!(2, header.record_count);
        assert_eq!(1, header.file_count);
        assert_eq!(&[7, 0, 0, 0], &bytes[12..16]);
        assert_eq!(&[2, 0, b'a', b'b'], &bytes[52..]);
    }

    #[test]
    fn test_write_edb_without_records() {
        let edb = EdbIndex::new(vec![], vec!["x".to_owned()]);
        let mut stream = BufferStream::empty();
        write_edb(&mut stream, &edb).unwrap();
        let header = decode_header(stream.contents().unwrap()).unwrap();
        assert_eq!(HEADER_SIZE as u32, header.files_offset);
    }

    #[test]
    fn test_write_edb_count_mismatch() {
        let mut edb = EdbIndex::new(vec![EdbRecord::default()], vec![]);
        edb.record_count = 2;
        let mut stream = BufferStream::empty();
        assert!(write_edb(&mut stream, &edb)
            .unwrap_err()
            .is_invalid_argument());

        let mut edb = EdbIndex::new(vec![], vec!["x".to_owned()]);
        edb.file_count = 0;
        assert!(write_edb(&mut stream, &edb)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_write_filenames_too_long() {
        let mut stream = BufferStream::empty();
        let files = vec!["ok".to_owned(), "x".repeat(FILENAME_MAX_LENGTH + 1)];
        let err = write_filenames(&mut stream, HEADER_SIZE as u32, &files).unwrap_err();
        assert_eq!(Code::EdbFilenameTooLong, err.code());
    }

    #[test]
    fn test_write_to_closed_stream() {
        let mut stream = BufferStream::empty();
        stream.close().unwrap();
        let err = write_edb(&mut stream, &EdbIndex::default()).unwrap_err();
        assert_eq!(Code::StreamInvalid, err.code());
    }
}
