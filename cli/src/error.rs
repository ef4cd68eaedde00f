use satledger_codec::CodecError;
use satledger_ledger::{Amount, AmountSum};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid hex string: {0}")]
    ParseHex(#[from] faster_hex::Error),

    #[error("insufficient funds: balance {balance} is below target {target}")]
    InsufficientFunds { balance: AmountSum, target: Amount },

    #[error("no command given")]
    MissingCommand,
}

pub type CliResult<T> = std::result::Result<T, CliError>;
