use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Typed transaction metadata, ordered by key
pub type Metadata = BTreeMap<String, MetadataValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl MetadataValue {
    pub(crate) const BOOL_TAG: u8 = 0;
    pub(crate) const INTEGER_TAG: u8 = 1;
    pub(crate) const TEXT_TAG: u8 = 2;
    pub(crate) const BYTES_TAG: u8 = 3;

    /// The tag byte identifying this variant in the binary encoding
    pub fn tag(&self) -> u8 {
        match self {
            MetadataValue::Bool(_) => Self::BOOL_TAG,
            MetadataValue::Integer(_) => Self::INTEGER_TAG,
            MetadataValue::Text(_) => Self::TEXT_TAG,
            MetadataValue::Bytes(_) => Self::BYTES_TAG,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MetadataValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Text(s) => write!(f, "{s:?}"),
            MetadataValue::Bytes(b) => write!(f, "0x{}", faster_hex::hex_string(b)),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(value: Vec<u8>) -> Self {
        MetadataValue::Bytes(value)
    }
}
