use satledger_codec::CodecError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unknown metadata value tag {0}")]
    UnknownMetadataTag(u8),

    #[error("invalid boolean byte {0:#04x} in metadata")]
    InvalidBool(u8),

    #[error("declared {kind} count {count} exceeds the {remaining} remaining bytes")]
    CountTooLarge { kind: &'static str, count: u64, remaining: usize },

    #[error("metadata key {0:?} is not greater than the key before it")]
    DuplicateOrUnsortedMetadataKey(String),

    #[error("{0} unexpected bytes after the transaction")]
    TrailingBytes(usize),
}

pub type TxResult<T> = std::result::Result<T, TxError>;
