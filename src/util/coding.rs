//! Fixed-width little-endian integer coding.
//!
//! None of these functions check bounds beyond the slice indexing itself;
//! callers verify the buffer length before coding a whole structure.
//! Encoding truncates silently to the declared width.

/// Largest value representable in 24 bits.
pub const MAX_U24: u32 = 0x00ff_ffff;

pub fn encode_fixed8(dst: &mut [u8], value: u8) {
    dst[0] = value;
}

pub fn encode_fixed16(dst: &mut [u8], value: u16) {
    dst[..2].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed16_signed(dst: &mut [u8], value: i16) {
    dst[..2].copy_from_slice(&value.to_le_bytes());
}

/// Only the low three bytes of `value` are written
pub fn encode_fixed24(dst: &mut [u8], value: u32) {
    dst[..3].copy_from_slice(&value.to_le_bytes()[..3]);
}

pub fn encode_fixed32(dst: &mut [u8], value: u32) {
    dst[..4].copy_from_slice(&value.to_le_bytes());
}

pub fn decode_fixed8(input: &[u8]) -> u8 {
    input[0]
}

pub fn decode_fixed16(input: &[u8]) -> u16 {
    u16::from_le_bytes([input[0], input[1]])
}

pub fn decode_fixed16_signed(input: &[u8]) -> i16 {
    i16::from_le_bytes([input[0], input[1]])
}

/// The top byte of the result is always zero
pub fn decode_fixed24(input: &[u8]) -> u32 {
    u32::from_le_bytes([input[0], input[1], input[2], 0])
}

pub fn decode_fixed32(input: &[u8]) -> u32 {
    u32::from_le_bytes([input[0], input[1], input[2], input[3]])
}
