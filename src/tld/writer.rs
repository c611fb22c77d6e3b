use super::{encode_record_header, pack_raster, RecordHeader, RECORD_HEADER_SIZE, TYPE_RASTER};
use crate::{
    env::Stream,
    raster::Raster,
    util::{MemoryRef, Result},
};

/// Appends `raster` as a raster record at the current position of `stream`.
pub fn write_raster(stream: &mut dyn Stream, raster: &Raster, memory: &MemoryRef) -> Result<()> {
    let packed = pack_raster(raster, memory)?;
    let header = RecordHeader {
        record_length: (packed.len() + RECORD_HEADER_SIZE) as u32,
        record_type: TYPE_RASTER,
    };
    let mut buf = [0u8; RECORD_HEADER_SIZE];
    encode_record_header(&mut buf, &header)?;
    stream.write(&buf)?;
    stream.write(&packed)
}
