use crate::amount::Amount;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// The index of an output within its transaction
pub type TransactionIndexType = u32;

/// An unspent transaction output.
///
/// Identity is structural over all three fields: the same `transaction_id` and `index` carrying a
/// different `amount` is a different UTXO.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Utxo {
    pub transaction_id: String,
    pub index: TransactionIndexType,
    pub amount: Amount,
}

impl Utxo {
    pub fn new(transaction_id: impl Into<String>, index: TransactionIndexType, amount: u64) -> Self {
        Self { transaction_id: transaction_id.into(), index, amount: Amount::from_sat(amount) }
    }

    /// Orders by descending amount, ties broken by transaction id and then index, ascending.
    /// This is the order in which UTXOs are considered for selection.
    pub fn selection_order(&self, other: &Self) -> Ordering {
        other
            .amount
            .cmp(&self.amount)
            .then_with(|| self.transaction_id.cmp(&other.transaction_id))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.transaction_id, self.index, self.amount)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtxoParseError {
    #[error("expected <transaction_id>:<index>:<amount>, got {0:?}")]
    Format(String),

    #[error("invalid output index: {0}")]
    Index(ParseIntError),

    #[error("invalid amount: {0}")]
    Amount(ParseIntError),
}

/// Parses the `<transaction_id>:<index>:<amount>` form. The transaction id may itself contain colons.
impl FromStr for Utxo {
    type Err = UtxoParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(amount), Some(index), Some(transaction_id)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UtxoParseError::Format(s.to_string()));
        };
        if transaction_id.is_empty() {
            return Err(UtxoParseError::Format(s.to_string()));
        }
        let index = index.parse().map_err(UtxoParseError::Index)?;
        let amount = amount.parse().map_err(UtxoParseError::Amount)?;
        Ok(Self::new(transaction_id, index, amount))
    }
}
