use super::{
    EdbHeader, EdbRecord, FILENAME_LENGTH_SIZE, FILENAME_MAX_LENGTH, HEADER_SIZE, RECORD_SIZE,
};
use crate::util::{
    decode_fixed16, decode_fixed16_signed, decode_fixed32, decode_fixed8, encode_fixed16,
    encode_fixed16_signed, encode_fixed32, encode_fixed8, Code, Error, Result,
};

fn check_len(buf_len: usize, need: usize, what: &str) -> Result<()> {
    if buf_len < need {
        return Err(Error::new(
            Code::BufferShort,
            format!("{} needs {} bytes, have {}", what, need, buf_len),
        ));
    }
    Ok(())
}

pub fn decode_header(buf: &[u8]) -> Result<EdbHeader> {
    check_len(buf.len(), HEADER_SIZE, "EDB header")?;
    Ok(EdbHeader {
        files_offset: decode_fixed32(&buf[0..]),
        record_count: decode_fixed32(&buf[4..]),
        file_count: decode_fixed32(&buf[8..]),
    })
}

pub fn encode_header(buf: &mut [u8], header: &EdbHeader) -> Result<()> {
    check_len(buf.len(), HEADER_SIZE, "EDB header")?;
    encode_fixed32(&mut buf[0..], header.files_offset);
    encode_fixed32(&mut buf[4..], header.record_count);
    encode_fixed32(&mut buf[8..], header.file_count);
    Ok(())
}

pub fn decode_record(buf: &[u8]) -> Result<EdbRecord> {
    check_len(buf.len(), RECORD_SIZE, "EDB record")?;
    Ok(EdbRecord {
        time_seconds: decode_fixed32(&buf[0..]),
        time_fraction: decode_fixed32(&buf[4..]),
        record_offset: decode_fixed32(&buf[8..]),
        record_length: decode_fixed32(&buf[12..]),
        file_index: decode_fixed16_signed(&buf[16..]),
        pulse_count: decode_fixed8(&buf[18..]),
        digitizer: decode_fixed8(&buf[19..]),
    })
}

pub fn encode_record(buf: &mut [u8], record: &EdbRecord) -> Result<()> {
    check_len(buf.len(), RECORD_SIZE, "EDB record")?;
    encode_fixed32(&mut buf[0..], record.time_seconds);
    encode_fixed32(&mut buf[4..], record.time_fraction);
    encode_fixed32(&mut buf[8..], record.record_offset);
    encode_fixed32(&mut buf[12..], record.record_length);
    encode_fixed16_signed(&mut buf[16..], record.file_index);
    encode_fixed8(&mut buf[18..], record.pulse_count);
    encode_fixed8(&mut buf[19..], record.digitizer);
    Ok(())
}

pub fn decode_filename_length(buf: &[u8]) -> Result<u16> {
    check_len(buf.len(), FILENAME_LENGTH_SIZE, "filename length")?;
    Ok(decode_fixed16(buf))
}

pub fn encode_filename_length(buf: &mut [u8], length: u16) -> Result<()> {
    check_len(buf.len(), FILENAME_LENGTH_SIZE, "filename length")?;
    encode_fixed16(buf, length);
    Ok(())
}

/// Decodes the `length` name bytes at the start of `buf`. A name that is
/// not valid UTF-8 is treated as corruption.
pub fn decode_filename(buf: &[u8], length: usize) -> Result<String> {
    check_len(buf.len(), length, "filename")?;
    match std::str::from_utf8(&buf[..length]) {
        Ok(name) => Ok(name.to_owned()),
        Err(e) => Err(Error::corruption(&format!("filename is not UTF-8: {}", e))),
    }
}

/// Writes the name bytes only, without the length prefix.
pub fn encode_filename(buf: &mut [u8], name: &str) -> Result<()> {
    if name.len() > FILENAME_MAX_LENGTH {
        return Err(Error::new(
            Code::EdbFilenameTooLong,
            format!("filename is {} bytes long", name.len()),
        ));
    }
    check_len(buf.len(), name.len(), "filename")?;
    buf[..name.len()].copy_from_slice(name.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header_scenario() {
        let buf = [
            0x70, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
        ];
        let header = decode_header(&buf).unwrap();
        assert_eq!(
            EdbHeader {
                files_offset: 112,
                record_count: 5,
                file_count: 3
            },
            header
        );
    }

    #[test]
    fn test_header_bounds() {
        let header = EdbHeader {
            files_offset: 1,
            record_count: 2,
            file_count: 3,
        };
        let mut buf = [0u8; HEADER_SIZE + 3];
        assert!(encode_header(&mut buf[..HEADER_SIZE - 1], &header)
            .unwrap_err()
            .is_buffer_short());
        assert!(decode_header(&buf[..HEADER_SIZE - 1])
            .unwrap_err()
            .is_buffer_short());
        encode_header(&mut buf, &header).unwrap();
        // trailing bytes are ignored
        assert_eq!(header, decode_header(&buf).unwrap());
    }

    #[test]
    fn test_record_layout() {
        let record = EdbRecord {
            time_seconds: 0x04030201,
            time_fraction: 0x08070605,
            record_offset: 0x0c0b0a09,
            record_length: 0x100f0e0d,
            file_index: -2,
            pulse_count: 119,
            digitizer: 1,
        };
        let mut buf = [0u8; RECORD_SIZE];
        encode_record(&mut buf, &record).unwrap();
        assert_eq!(
            [
                1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 0xfe, 0xff, 119, 1
            ],
            buf
        );
        assert_eq!(record, decode_record(&buf).unwrap());
        assert!(decode_record(&buf[..RECORD_SIZE - 1])
            .unwrap_err()
            .is_buffer_short());
        assert!(encode_record(&mut buf[..RECORD_SIZE - 1], &record)
            .unwrap_err()
            .is_buffer_short());
    }

    #[test]
    fn test_filename_length() {
        let mut buf = [0u8; 2];
        encode_filename_length(&mut buf, 0x1234).unwrap();
        assert_eq!([0x34, 0x12], buf);
        assert_eq!(0x1234, decode_filename_length(&buf).unwrap());
        assert!(decode_filename_length(&buf[..1])
            .unwrap_err()
            .is_buffer_short());
    }

    #[test]
    fn test_decode_empty_filename() {
        let buf = [0x00, 0x00];
        let length = decode_filename_length(&buf).unwrap();
        assert_eq!(0, length);
        assert_eq!("", decode_filename(&buf[2..], length as usize).unwrap());
    }

    #[test]
    fn test_filename_round_trip() {
        let mut buf = [0u8; 16];
        encode_filename(&mut buf, "110101-1200.tld").unwrap();
        assert_eq!("110101-1200.tld", decode_filename(&buf, 15).unwrap());
        assert!(decode_filename(&buf[..4], 15).unwrap_err().is_buffer_short());
        assert!(encode_filename(&mut buf[..4], "110101-1200.tld")
            .unwrap_err()
            .is_buffer_short());
    }

    #[test]
    fn test_filename_errors() {
        let long = "x".repeat(FILENAME_MAX_LENGTH + 1);
        let mut buf = vec![0u8; long.len()];
        assert_eq!(
            Code::EdbFilenameTooLong,
            encode_filename(&mut buf, &long).unwrap_err().code()
        );
        assert!(encode_filename(&mut buf, &long[1..]).is_ok());

        assert!(decode_filename(&[0xff, 0xfe], 2).unwrap_err().is_corruption());
    }
}
