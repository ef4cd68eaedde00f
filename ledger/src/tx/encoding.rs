//! Binary layout of [`TransactionData`]. All integers are little-endian and every list or string
//! is prefixed by its CompactSize length:
//!
//! ```text
//! version:u32 | n_inputs | (txid:str index:u32 script:str sequence:u32)*
//!             | n_outputs | (value:u64 script:str)*
//!             | lock_time:u32
//!             | n_metadata | (key:str tag:u8 value)*
//! ```

use super::{
    TransactionData, TransactionInput, TransactionOutput,
    error::{TxError, TxResult},
    metadata::{Metadata, MetadataValue},
};
use crate::amount::Amount;
use satledger_codec::{CodecError, CompactSizeReader, CompactSizeWriterExt};

impl TransactionData {
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());

        buf.write_len(self.inputs.len());
        for input in self.inputs.iter() {
            buf.write_var_str(&input.previous_transaction_id).extend_from_slice(&input.previous_index.to_le_bytes());
            buf.write_var_str(&input.signature_script).extend_from_slice(&input.sequence.to_le_bytes());
        }

        buf.write_len(self.outputs.len());
        for output in self.outputs.iter() {
            buf.extend_from_slice(&output.value.as_u64().to_le_bytes());
            buf.write_var_str(&output.script_public_key);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());

        buf.write_len(self.metadata.len());
        for (key, value) in self.metadata.iter() {
            buf.write_var_str(key).push(value.tag());
            match value {
                MetadataValue::Bool(b) => buf.push(*b as u8),
                MetadataValue::Integer(i) => buf.extend_from_slice(&i.to_le_bytes()),
                MetadataValue::Text(s) => {
                    buf.write_var_str(s);
                }
                MetadataValue::Bytes(b) => {
                    buf.write_var_bytes(b);
                }
            }
        }
        buf
    }

    /// Decodes a transaction occupying all of `bytes`. Non-minimal CompactSize prefixes are accepted.
    pub fn deserialize(bytes: &[u8]) -> TxResult<Self> {
        TxReader::new(bytes, false).read_transaction()
    }

    /// Like [`Self::deserialize`] but every CompactSize prefix must be minimal
    pub fn deserialize_canonical(bytes: &[u8]) -> TxResult<Self> {
        TxReader::new(bytes, true).read_transaction()
    }
}

struct TxReader<'a> {
    inner: CompactSizeReader<'a>,
    canonical: bool,
}

impl<'a> TxReader<'a> {
    fn new(bytes: &'a [u8], canonical: bool) -> Self {
        Self { inner: CompactSizeReader::new(bytes), canonical }
    }

    fn read_transaction(mut self) -> TxResult<TransactionData> {
        let version = self.inner.read_u32_le()?;

        let input_count = self.read_count("input")?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput {
                previous_transaction_id: self.read_string()?,
                previous_index: self.inner.read_u32_le()?,
                signature_script: self.read_string()?,
                sequence: self.inner.read_u32_le()?,
            });
        }

        let output_count = self.read_count("output")?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = Amount::from_sat(self.inner.read_u64_le()?);
            outputs.push(TransactionOutput { value, script_public_key: self.read_string()? });
        }

        let lock_time = self.inner.read_u32_le()?;

        let metadata_count = self.read_count("metadata")?;
        let mut metadata = Metadata::new();
        for _ in 0..metadata_count {
            let key = self.read_string()?;
            // Entries are written in map order, so keys must strictly increase
            if metadata.last_key_value().is_some_and(|(last, _)| *last >= key) {
                return Err(TxError::DuplicateOrUnsortedMetadataKey(key));
            }
            let value = self.read_metadata_value()?;
            metadata.insert(key, value);
        }

        let trailing = self.inner.remaining().len();
        if trailing > 0 {
            return Err(TxError::TrailingBytes(trailing));
        }
        Ok(TransactionData { version, inputs, outputs, lock_time, metadata })
    }

    fn read_compact_size(&mut self) -> TxResult<u64> {
        let value = if self.canonical { self.inner.read_canonical_compact_size()? } else { self.inner.read_compact_size()? };
        Ok(value)
    }

    /// Reads a list length. Every element takes at least one byte, which bounds the allocation.
    fn read_count(&mut self, kind: &'static str) -> TxResult<usize> {
        let count = self.read_compact_size()?;
        let remaining = self.inner.remaining().len();
        if count > remaining as u64 {
            return Err(TxError::CountTooLarge { kind, count, remaining });
        }
        Ok(count as usize)
    }

    fn read_var_bytes(&mut self) -> TxResult<&'a [u8]> {
        let len = self.read_compact_size()?;
        let len = usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        Ok(self.inner.read_bytes(len)?)
    }

    fn read_string(&mut self) -> TxResult<String> {
        let bytes = self.read_var_bytes()?;
        let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(s.to_string())
    }

    fn read_metadata_value(&mut self) -> TxResult<MetadataValue> {
        match self.inner.read_u8()? {
            MetadataValue::BOOL_TAG => match self.inner.read_u8()? {
                0 => Ok(MetadataValue::Bool(false)),
                1 => Ok(MetadataValue::Bool(true)),
                other => Err(TxError::InvalidBool(other)),
            },
            MetadataValue::INTEGER_TAG => Ok(MetadataValue::Integer(self.inner.read_i64_le()?)),
            MetadataValue::TEXT_TAG => Ok(MetadataValue::Text(self.read_string()?)),
            MetadataValue::BYTES_TAG => Ok(MetadataValue::Bytes(self.read_var_bytes()?.to_vec())),
            tag => Err(TxError::UnknownMetadataTag(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionData {
        let mut tx = TransactionData::new(1, 0);
        tx.add_input(TransactionInput::new("aa", 0, "sig")).add_output(TransactionOutput::new(Amount::from_sat(253), "spk"));
        tx
    }

    #[test]
    fn test_layout() {
        let bytes = sample().serialize();
        #[rustfmt::skip]
        let expected: [&[u8]; 7] = [
            &[1, 0, 0, 0],                       // version
            &[1, 2, b'a', b'a', 0, 0, 0, 0],     // 1 input, txid "aa", index 0
            &[3, b's', b'i', b'g', 0xff, 0xff, 0xff, 0xff], // script, sequence
            &[1, 253, 0, 0, 0, 0, 0, 0, 0],      // 1 output, value 253
            &[3, b's', b'p', b'k'],              // script public key
            &[0, 0, 0, 0],                       // lock time
            &[0],                                // no metadata
        ];
        assert_eq!(bytes, expected.concat());
    }

    #[test]
    fn test_round_trip_with_metadata() {
        let mut tx = sample();
        tx.add_input(TransactionInput::new("x".repeat(300), u32::MAX, "").with_sequence(0));
        tx.update_metadata([
            ("flag", MetadataValue::Bool(true)),
            ("height", MetadataValue::Integer(-42)),
            ("memo", MetadataValue::from("rent")),
            ("raw", MetadataValue::Bytes(vec![0, 1, 2])),
        ]);
        tx.set_header(2, 800_000);

        let bytes = tx.serialize();
        assert_eq!(TransactionData::deserialize(&bytes).unwrap(), tx);
        assert_eq!(TransactionData::deserialize_canonical(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_non_canonical_counts() {
        let canonical = sample().serialize();
        // Re-encode the input count (at offset 4) as fd 01 00
        let parts: [&[u8]; 3] = [&canonical[..4], &[0xfd, 0x01, 0x00], &canonical[5..]];
        let bytes = parts.concat();

        assert_eq!(TransactionData::deserialize(&bytes).unwrap(), sample());
        assert_eq!(
            TransactionData::deserialize_canonical(&bytes),
            Err(TxError::Codec(CodecError::NonCanonical { value: 1, len: 3 }))
        );
    }

    #[test]
    fn test_malformed() {
        let bytes = sample().serialize();

        assert!(matches!(TransactionData::deserialize(&bytes[..bytes.len() - 1]), Err(TxError::Codec(CodecError::TooShort { .. }))));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert_eq!(TransactionData::deserialize(&trailing), Err(TxError::TrailingBytes(1)));

        let mut huge_count = bytes[..4].to_vec();
        huge_count.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(
            TransactionData::deserialize(&huge_count),
            Err(TxError::CountTooLarge { kind: "input", count: u64::MAX, remaining: 0 })
        );

        let mut bad_tag = bytes.clone();
        let last = bad_tag.len() - 1;
        bad_tag[last] = 1;
        bad_tag.extend_from_slice(&[1, b'k', 9]);
        assert_eq!(TransactionData::deserialize(&bad_tag), Err(TxError::UnknownMetadataTag(9)));

        let mut bad_bool = bytes.clone();
        bad_bool[last] = 1;
        bad_bool.extend_from_slice(&[1, b'k', 0, 2]);
        assert_eq!(TransactionData::deserialize(&bad_bool), Err(TxError::InvalidBool(2)));
    }

    #[test]
    fn test_metadata_keys_must_increase() {
        let bytes = sample().serialize();
        let last = bytes.len() - 1;
        let with_entries = |entries: &[&[u8]]| {
            let mut buf = bytes.clone();
            buf[last] = entries.len() as u8;
            entries.iter().for_each(|entry| buf.extend_from_slice(entry));
            buf
        };
        let k1: &[u8] = &[1, b'k', 1, 1, 0, 0, 0, 0, 0, 0, 0];
        let k2: &[u8] = &[1, b'k', 1, 2, 0, 0, 0, 0, 0, 0, 0];
        let j: &[u8] = &[1, b'j', 0, 1];

        let duplicate = with_entries(&[k1, k2]);
        for result in [TransactionData::deserialize(&duplicate), TransactionData::deserialize_canonical(&duplicate)] {
            assert_eq!(result, Err(TxError::DuplicateOrUnsortedMetadataKey("k".to_string())));
        }
        assert_eq!(
            TransactionData::deserialize(&with_entries(&[k1, j])),
            Err(TxError::DuplicateOrUnsortedMetadataKey("j".to_string()))
        );

        // Sorted entries decode and re-serialize to the same bytes
        let sorted = with_entries(&[j, k2]);
        let tx = TransactionData::deserialize_canonical(&sorted).unwrap();
        assert_eq!(tx.metadata_value("k"), Some(&MetadataValue::Integer(2)));
        assert_eq!(tx.serialize(), sorted);
    }
}
