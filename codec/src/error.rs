use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("value {0} is not representable as a CompactSize (expected an integer in 0..=18446744073709551615)")]
    InvalidValue(String),

    #[error("input too short: expected at least {expected} bytes but only {actual} available")]
    TooShort { expected: usize, actual: usize },

    #[error("value {value} encoded with a {len} byte prefix is not in canonical form")]
    NonCanonical { value: u64, len: usize },

    #[error("declared length {0} does not fit in addressable memory")]
    LengthOverflow(u64),

    #[error("var-length string is not valid UTF-8")]
    InvalidUtf8,
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
