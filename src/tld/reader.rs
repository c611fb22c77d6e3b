use log::debug;

use super::{
    decode_record_header, unpack_raster, RecordHeader, RASTER_HEADER_SIZE, RECORD_HEADER_SIZE,
    TYPE_RASTER,
};
use crate::{
    config::ReadConfig,
    env::{Stream, Whence},
    raster::Raster,
    util::{Block, Code, Error, MemoryRef, Result},
};

/// Reads the record at the current position of `stream`.
///
/// Records of any type other than [`TYPE_RASTER`] are skipped and come
/// back without a raster. On return the stream is positioned at the next
/// record, unless an error interrupted the read.
pub fn read_record(
    stream: &mut dyn Stream,
    memory: &MemoryRef,
    config: &ReadConfig,
) -> Result<(RecordHeader, Option<Raster>)> {
    let mut header_buf = [0u8; RECORD_HEADER_SIZE];
    stream.read(&mut header_buf)?;
    let header = decode_record_header(&header_buf)?;

    let payload_len = match (header.record_length as usize).checked_sub(RECORD_HEADER_SIZE) {
        Some(len) => len,
        None => {
            return Err(Error::corruption(&format!(
                "record length {} is shorter than its header",
                header.record_length
            )))
        }
    };

    if header.record_type != TYPE_RASTER {
        debug!(
            "skipping TLD record of type {} ({} bytes)",
            header.record_type, header.record_length
        );
        if payload_len > 0 {
            stream.seek(payload_len as i64, Whence::Cur)?;
        }
        return Ok((header, None));
    }

    let read_len = if config.include_pulses {
        payload_len
    } else {
        payload_len.min(RASTER_HEADER_SIZE)
    };
    let mut buf = Block::allocate(memory, read_len)?;
    stream.read(&mut buf)?;
    if read_len < payload_len {
        stream.seek((payload_len - read_len) as i64, Whence::Cur)?;
    }
    let raster = unpack_raster(&buf, memory, config)?;
    Ok((header, Some(raster)))
}

/// Reads the raster record at the current position of `stream`.
pub fn read_raster(
    stream: &mut dyn Stream,
    memory: &MemoryRef,
    config: &ReadConfig,
) -> Result<Raster> {
    match read_record(stream, memory, config)? {
        (_, Some(raster)) => Ok(raster),
        (header, None) => Err(Error::new(
            Code::TldTypeUnknown,
            format!("expected a raster record, found type {}", header.record_type),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        env::BufferStream,
        tld::{encode_record_header, random_raster, write_raster},
        util::{default_memory, Random, TrackingMemory},
    };

    fn other_record(record_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; RECORD_HEADER_SIZE];
        let header = RecordHeader {
            record_length: (RECORD_HEADER_SIZE + payload.len()) as u32,
            record_type,
        };
        encode_record_header(&mut buf, &header).unwrap();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_read_records_in_sequence() {
        let memory = default_memory();
        let mut rnd = Random::new(42);
        let first = random_raster(&mut rnd, &memory, 5);
        let second = random_raster(&mut rnd, &memory, 2);

        let mut stream = BufferStream::empty();
        write_raster(&mut stream, &first, &memory).unwrap();
        stream.write(&other_record(1, &[9; 10])).unwrap();
        write_raster(&mut stream, &second, &memory).unwrap();
        stream.write(&other_record(2, &[])).unwrap();
        stream.seek(0, Whence::Set).unwrap();

        let config = ReadConfig::default();
        let (header, raster) = read_record(&mut stream, &memory, &config).unwrap();
        assert_eq!(TYPE_RASTER, header.record_type);
        assert_eq!(Some(first), raster);

        let (header, raster) = read_record(&mut stream, &memory, &config).unwrap();
        assert_eq!(1, header.record_type);
        assert_eq!(14, header.record_length);
        assert!(raster.is_none());

        assert_eq!(second, read_raster(&mut stream, &memory, &config).unwrap());

        let err = read_raster(&mut stream, &memory, &config).unwrap_err();
        assert_eq!(Code::TldTypeUnknown, err.code());

        let err = read_record(&mut stream, &memory, &config).unwrap_err();
        assert_eq!(Code::StreamReadShort, err.code());
    }

    #[test]
    fn test_read_raster_header_only() {
        let memory = default_memory();
        let mut rnd = Random::new(42);
        let first = random_raster(&mut rnd, &memory, 8);
        let second = random_raster(&mut rnd, &memory, 3);

        let mut stream = BufferStream::empty();
        write_raster(&mut stream, &first, &memory).unwrap();
        write_raster(&mut stream, &second, &memory).unwrap();
        stream.seek(0, Whence::Set).unwrap();

        let tracker = Rc::new(TrackingMemory::new());
        let tracked: MemoryRef = tracker.clone();
        let config = ReadConfig::header_only();
        let raster = read_raster(&mut stream, &tracked, &config).unwrap();
        assert_eq!(first.time_seconds, raster.time_seconds);
        assert_eq!(8, raster.pulse_count);
        assert!(raster.pulses.is_empty());
        assert_eq!(RASTER_HEADER_SIZE, tracker.peak_usage());

        // the rest of the first record was skipped
        let raster = read_raster(&mut stream, &tracked, &config).unwrap();
        assert_eq!(second.sequence_number, raster.sequence_number);
    }

    #[test]
    fn test_read_record_too_short() {
        let memory = default_memory();
        let mut stream = BufferStream::from_bytes(vec![3, 0, 0, TYPE_RASTER]);
        let err = read_record(&mut stream, &memory, &ReadConfig::default()).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_read_raster_truncated_payload() {
        let memory = default_memory();
        let mut rnd = Random::new(7);
        let raster = random_raster(&mut rnd, &memory, 4);
        let mut stream = BufferStream::empty();
        write_raster(&mut stream, &raster, &memory).unwrap();
        let mut bytes = stream.into_inner().unwrap().into_inner();
        bytes.truncate(bytes.len() - 1);

        let mut stream = BufferStream::from_bytes(bytes);
        let err = read_raster(&mut stream, &memory, &ReadConfig::default()).unwrap_err();
        assert_eq!(Code::StreamReadShort, err.code());
    }

    #[test]
    fn test_read_raster_payload_shorter_than_header() {
        let memory = default_memory();
        let mut stream = BufferStream::from_bytes(other_record(TYPE_RASTER, &[0; 6]));
        let err = read_raster(&mut stream, &memory, &ReadConfig::header_only()).unwrap_err();
        assert!(err.is_buffer_short());
    }
}
