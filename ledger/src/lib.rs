//! Ledger primitives: satoshi amounts, the UTXO registry and its selection policies,
//! transaction containers framed with CompactSize, and header nonce iteration.

pub mod amount;
pub mod config;
pub mod header;
pub mod tx;
pub mod utxo;

pub use amount::{Amount, AmountSum};
pub use utxo::{SelectionPolicy, SharedUtxoRegistry, Utxo, UtxoCollection, UtxoRegistry};
