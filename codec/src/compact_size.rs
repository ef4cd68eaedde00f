//! CompactSize: a tag-prefixed variable length encoding of unsigned 64-bit integers.
//!
//! | value range                   | encoding                     |
//! |-------------------------------|------------------------------|
//! | `0..=252`                     | the value as a single byte   |
//! | `253..=0xffff`                | `0xfd` + 2 bytes LE          |
//! | `0x10000..=0xffff_ffff`       | `0xfe` + 4 bytes LE          |
//! | `0x1_0000_0000..=u64::MAX`    | `0xff` + 8 bytes LE          |

use crate::error::{CodecError, CodecResult};
use smallvec::SmallVec;
use std::fmt::Display;

/// Tag announcing a 2-byte little-endian payload
pub const U16_TAG: u8 = 0xfd;
/// Tag announcing a 4-byte little-endian payload
pub const U32_TAG: u8 = 0xfe;
/// Tag announcing an 8-byte little-endian payload
pub const U64_TAG: u8 = 0xff;

/// The widest possible encoding: one tag byte followed by a u64
pub const MAX_COMPACT_SIZE_LEN: usize = 1 + size_of::<u64>();

/// An encoded CompactSize. Always fits inline, so encoding never allocates.
pub type CompactSizeBytes = SmallVec<[u8; MAX_COMPACT_SIZE_LEN]>;

/// Returns the length of the minimal encoding of `value`
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Returns the total length (tag included) announced by the first byte of an encoding
#[inline]
pub const fn prefixed_len(tag: u8) -> usize {
    match tag {
        U16_TAG => 3,
        U32_TAG => 5,
        U64_TAG => 9,
        _ => 1,
    }
}

/// Encodes `value` using the minimal width
pub fn encode(value: u64) -> CompactSizeBytes {
    let mut bytes = CompactSizeBytes::new();
    match encoded_len(value) {
        1 => bytes.push(value as u8),
        3 => {
            bytes.push(U16_TAG);
            bytes.extend_from_slice(&(value as u16).to_le_bytes());
        }
        5 => {
            bytes.push(U32_TAG);
            bytes.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            bytes.push(U64_TAG);
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

/// Encodes an integer of arbitrary width and signedness.
///
/// Fails with [`CodecError::InvalidValue`] when `value` lies outside `0..=u64::MAX`.
pub fn try_encode<T>(value: T) -> CodecResult<CompactSizeBytes>
where
    T: TryInto<u64> + Display + Copy,
{
    let value: u64 = value.try_into().map_err(|_| CodecError::InvalidValue(value.to_string()))?;
    Ok(encode(value))
}

/// Decodes a CompactSize from the start of `bytes`, returning the value and the number of bytes consumed.
///
/// Bytes following the encoding are ignored. Non-minimal encodings (e.g. `fd 05 00`) are accepted;
/// see [`decode_canonical`] for the strict variant.
pub fn decode(bytes: &[u8]) -> CodecResult<(u64, usize)> {
    let Some(&tag) = bytes.first() else {
        return Err(CodecError::TooShort { expected: 1, actual: 0 });
    };

    let len = prefixed_len(tag);
    if len == 1 {
        return Ok((tag as u64, 1));
    }
    if bytes.len() < len {
        return Err(CodecError::TooShort { expected: len, actual: bytes.len() });
    }

    let mut payload = [0u8; size_of::<u64>()];
    payload[..len - 1].copy_from_slice(&bytes[1..len]);
    Ok((u64::from_le_bytes(payload), len))
}

/// Like [`decode`] but rejects encodings wider than necessary with [`CodecError::NonCanonical`]
pub fn decode_canonical(bytes: &[u8]) -> CodecResult<(u64, usize)> {
    let (value, consumed) = decode(bytes)?;
    if encoded_len(value) != consumed {
        return Err(CodecError::NonCanonical { value, len: consumed });
    }
    Ok((value, consumed))
}
