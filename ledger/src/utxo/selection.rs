use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// How [`UtxoRegistry::select_for_target_with`](super::UtxoRegistry::select_for_target_with)
/// accumulates UTXOs. Both walk the registry by descending amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Accumulates every held UTXO. Returns all of them if their total covers the target,
    /// and nothing otherwise.
    #[default]
    Exhaustive,

    /// Stops as soon as the running total covers the target and returns the UTXOs taken so far.
    /// Returns nothing if the whole registry does not cover the target.
    EarlyStop,
}

impl SelectionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::Exhaustive => "exhaustive",
            SelectionPolicy::EarlyStop => "early-stop",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown selection policy {0:?} (expected exhaustive or early-stop)")]
pub struct SelectionPolicyParseError(String);

impl FromStr for SelectionPolicy {
    type Err = SelectionPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhaustive" => Ok(SelectionPolicy::Exhaustive),
            "early-stop" | "earlystop" => Ok(SelectionPolicy::EarlyStop),
            _ => Err(SelectionPolicyParseError(s.to_string())),
        }
    }
}
