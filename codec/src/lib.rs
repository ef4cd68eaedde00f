//! Satledger wire codec.
//!
//! [`compact_size`] implements the CompactSize variable length integer encoding and
//! [`framing`] builds length-prefixed fields on top of it.

pub mod compact_size;
pub mod error;
pub mod framing;

pub use compact_size::{CompactSizeBytes, MAX_COMPACT_SIZE_LEN, decode, decode_canonical, encode, encoded_len, try_encode};
pub use error::{CodecError, CodecResult};
pub use framing::{CompactSizeReader, CompactSizeWriterExt, read_var_bytes};
