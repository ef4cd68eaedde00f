use crate::utxo::SelectionPolicy;
use serde::{Deserialize, Serialize};

/// Tunables of the ledger primitives
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Params {
    /// Policy used when a caller does not pick one explicitly
    pub selection_policy: SelectionPolicy,

    /// Output summarisation stops once the included total exceeds this many satoshis
    pub summary_cap: u64,

    /// Number of nonces a header candidate walk tries by default
    pub max_header_attempts: u64,

    /// A progress line is logged every this many header attempts
    pub progress_interval: u64,
}

pub const DEFAULT_PARAMS: Params = Params {
    selection_policy: SelectionPolicy::Exhaustive,
    summary_cap: 1_000_000_000,
    max_header_attempts: 1000,
    progress_interval: 100,
};

impl Default for Params {
    fn default() -> Self {
        DEFAULT_PARAMS
    }
}
