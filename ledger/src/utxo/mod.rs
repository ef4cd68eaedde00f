pub mod selection;
pub mod shared;
pub mod utxo_entry;
pub mod utxo_registry;

pub use selection::SelectionPolicy;
pub use shared::SharedUtxoRegistry;
pub use utxo_entry::{TransactionIndexType, Utxo, UtxoParseError};
pub use utxo_registry::{UtxoCollection, UtxoRegistry};
