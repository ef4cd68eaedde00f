//! Length-prefixed framing on top of [`compact_size`](crate::compact_size).

use crate::{
    compact_size::{self, encode},
    error::{CodecError, CodecResult},
};

/// Extension methods for appending CompactSize framed data to a byte buffer.
/// Calls can be chained, e.g. `buf.write_len(items.len()).write_var_str(name)`.
pub trait CompactSizeWriterExt {
    fn write_compact_size(&mut self, value: u64) -> &mut Self;

    /// Writes a collection length or byte count
    fn write_len(&mut self, len: usize) -> &mut Self {
        self.write_compact_size(len as u64)
    }

    /// Writes the byte count followed by the bytes themselves
    fn write_var_bytes(&mut self, data: &[u8]) -> &mut Self;

    fn write_var_str(&mut self, s: &str) -> &mut Self {
        self.write_var_bytes(s.as_bytes())
    }
}

impl CompactSizeWriterExt for Vec<u8> {
    fn write_compact_size(&mut self, value: u64) -> &mut Self {
        self.extend_from_slice(&encode(value));
        self
    }

    fn write_var_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.write_len(data.len()).extend_from_slice(data);
        self
    }
}

/// Reads a length-prefixed byte string from the start of `bytes`.
/// Returns the payload and the total number of bytes consumed, prefix included.
pub fn read_var_bytes(bytes: &[u8]) -> CodecResult<(&[u8], usize)> {
    let mut reader = CompactSizeReader::new(bytes);
    let payload = reader.read_var_bytes()?;
    Ok((payload, reader.position()))
}

/// A forward-only cursor over a byte slice
#[derive(Debug, Clone)]
pub struct CompactSizeReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> CompactSizeReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    pub fn is_empty(&self) -> bool {
        self.position == self.bytes.len()
    }

    pub fn read_compact_size(&mut self) -> CodecResult<u64> {
        let (value, consumed) = compact_size::decode(self.remaining()).map_err(|err| self.offset_error(err))?;
        self.position += consumed;
        Ok(value)
    }

    /// Same as [`Self::read_compact_size`] but rejects non-minimal encodings
    pub fn read_canonical_compact_size(&mut self) -> CodecResult<u64> {
        let (value, consumed) = compact_size::decode_canonical(self.remaining()).map_err(|err| self.offset_error(err))?;
        self.position += consumed;
        Ok(value)
    }

    /// Reads a CompactSize and converts it to a `usize` length
    pub fn read_len(&mut self) -> CodecResult<usize> {
        let len = self.read_compact_size()?;
        usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len))
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self.position.checked_add(len).ok_or(CodecError::LengthOverflow(len as u64))?;
        if end > self.bytes.len() {
            return Err(CodecError::TooShort { expected: end, actual: self.bytes.len() });
        }
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_var_bytes(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    pub fn read_var_str(&mut self) -> CodecResult<&'a str> {
        std::str::from_utf8(self.read_var_bytes()?).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> CodecResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> CodecResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> CodecResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64_le(&mut self) -> CodecResult<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    // Decode errors are relative to the remaining slice; report them against the whole input
    fn offset_error(&self, err: CodecError) -> CodecError {
        match err {
            CodecError::TooShort { expected, actual } => {
                CodecError::TooShort { expected: self.position + expected, actual: self.position + actual }
            }
            err => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faster_hex::hex_string;

    #[test]
    fn test_writer_chaining() {
        let mut buf = Vec::new();
        buf.write_len(2).write_var_str("ab").write_var_bytes(&[0u8; 253]);

        assert_eq!(hex_string(&buf[..6]), "02026162fdfd");
        assert_eq!(&buf[4..7], &[0xfd, 0xfd, 0x00]);
        assert_eq!(buf.len(), 1 + 3 + 3 + 253);
    }

    #[test]
    fn test_reader() {
        let mut buf = Vec::new();
        buf.write_compact_size(70_000).write_var_str("utxo").extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&u64::MAX.to_le_bytes());

        let mut reader = CompactSizeReader::new(&buf);
        assert_eq!(reader.read_compact_size().unwrap(), 70_000);
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.read_var_str().unwrap(), "utxo");
        assert_eq!(reader.read_u32_le().unwrap(), 7);
        assert_eq!(reader.read_u64_le().unwrap(), u64::MAX);
        assert!(reader.is_empty());
        assert_eq!(reader.read_u8(), Err(CodecError::TooShort { expected: buf.len() + 1, actual: buf.len() }));
    }

    #[test]
    fn test_read_var_bytes() {
        let (payload, consumed) = read_var_bytes(&[0x03, 1, 2, 3, 4]).unwrap();
        assert_eq!(payload, &[1, 2, 3]);
        assert_eq!(consumed, 4);

        // Declared length exceeds the input
        assert_eq!(read_var_bytes(&[0x05, 1, 2]), Err(CodecError::TooShort { expected: 6, actual: 3 }));
        // Truncated prefix
        assert_eq!(read_var_bytes(&[0xfd, 0x01]), Err(CodecError::TooShort { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_offset_errors() {
        let buf = [0x01, 0xaa, 0xfe, 0x00];
        let mut reader = CompactSizeReader::new(&buf);
        assert_eq!(reader.read_var_bytes().unwrap(), &[0xaa]);
        assert_eq!(reader.read_compact_size(), Err(CodecError::TooShort { expected: 7, actual: 4 }));
        // A failed read does not advance the cursor
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = CompactSizeReader::new(&[0x02, 0xc3, 0x28]);
        assert_eq!(reader.read_var_str(), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_canonical_reader() {
        let mut reader = CompactSizeReader::new(&[0xfd, 0x05, 0x00]);
        assert_eq!(reader.clone().read_compact_size().unwrap(), 5);
        assert_eq!(reader.read_canonical_compact_size(), Err(CodecError::NonCanonical { value: 5, len: 3 }));
    }
}
