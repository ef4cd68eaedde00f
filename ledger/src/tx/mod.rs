//! Ordered transaction bookkeeping: inputs, outputs, header fields and typed metadata.

mod encoding;
pub mod error;
pub mod metadata;

use crate::{
    amount::{Amount, AmountSum},
    config::params::Params,
    utxo::{TransactionIndexType, Utxo},
};
use borsh::{BorshDeserialize, BorshSerialize};
use log::debug;
use serde::{Deserialize, Serialize};

pub use error::{TxError, TxResult};
pub use metadata::{Metadata, MetadataValue};

/// The sequence number of an input which opts out of any relative lock
pub const MAX_SEQUENCE: u32 = u32::MAX;

pub const DEFAULT_TX_VERSION: u32 = 1;

/// Spends output `previous_index` of transaction `previous_transaction_id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionInput {
    pub previous_transaction_id: String,
    pub previous_index: TransactionIndexType,
    pub signature_script: String,
    pub sequence: u32,
}

impl TransactionInput {
    pub fn new(
        previous_transaction_id: impl Into<String>,
        previous_index: TransactionIndexType,
        signature_script: impl Into<String>,
    ) -> Self {
        Self {
            previous_transaction_id: previous_transaction_id.into(),
            previous_index,
            signature_script: signature_script.into(),
            sequence: MAX_SEQUENCE,
        }
    }

    pub fn with_sequence(self, sequence: u32) -> Self {
        Self { sequence, ..self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub script_public_key: String,
}

impl TransactionOutput {
    pub fn new(value: Amount, script_public_key: impl Into<String>) -> Self {
        Self { value, script_public_key: script_public_key.into() }
    }
}

/// Header fields of a transaction, with the input/output lists reduced to their lengths
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionHeader {
    pub version: u32,
    pub input_count: usize,
    pub output_count: usize,
    pub lock_time: u32,
}

/// Result of [`TransactionData::summarize_outputs`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputSummary {
    pub total: AmountSum,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionData {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
    pub metadata: Metadata,
}

impl Default for TransactionData {
    fn default() -> Self {
        Self::new(DEFAULT_TX_VERSION, 0)
    }
}

impl TransactionData {
    pub fn new(version: u32, lock_time: u32) -> Self {
        Self { version, inputs: Vec::new(), outputs: Vec::new(), lock_time, metadata: Metadata::new() }
    }

    pub fn add_input(&mut self, input: TransactionInput) -> &mut Self {
        debug!("Added input {}:{}", input.previous_transaction_id, input.previous_index);
        self.inputs.push(input);
        self
    }

    pub fn add_output(&mut self, output: TransactionOutput) -> &mut Self {
        debug!("Added output of {} to {}", output.value, output.script_public_key);
        self.outputs.push(output);
        self
    }

    /// Copies of all inputs, in order
    pub fn input_details(&self) -> Vec<TransactionInput> {
        for (i, input) in self.inputs.iter().enumerate() {
            debug!(
                "Input {i}: previous transaction {}, output {}, script {}",
                input.previous_transaction_id, input.previous_index, input.signature_script
            );
        }
        self.inputs.clone()
    }

    /// Totals the outputs worth at least `min_value`, in order, stopping right after the running
    /// total exceeds `cap`
    pub fn summarize_outputs(&self, min_value: Amount, cap: u64) -> OutputSummary {
        let mut summary = OutputSummary::default();
        for (i, output) in self.outputs.iter().enumerate() {
            if output.value < min_value {
                debug!("Skipping output {i} worth {} below minimum {min_value}", output.value);
                continue;
            }
            summary.total += AmountSum::from(output.value);
            summary.count += 1;
            debug!("Including output {i} worth {} to {}", output.value, output.script_public_key);

            if summary.total > cap as AmountSum {
                debug!("Output total {} exceeded cap {cap}, stopping", summary.total);
                break;
            }
        }
        summary
    }

    /// [`Self::summarize_outputs`] capped at [`Params::summary_cap`]
    pub fn summarize_outputs_with(&self, params: &Params, min_value: Amount) -> OutputSummary {
        self.summarize_outputs(min_value, params.summary_cap)
    }

    /// Merges `entries` into the metadata, replacing values of existing keys
    pub fn update_metadata<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<MetadataValue>,
    {
        self.metadata.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        debug!("Metadata now holds {} entries", self.metadata.len());
    }

    pub fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    pub fn header(&self) -> TransactionHeader {
        TransactionHeader {
            version: self.version,
            input_count: self.inputs.len(),
            output_count: self.outputs.len(),
            lock_time: self.lock_time,
        }
    }

    /// Overwrites the header scalars. Input and output counts follow the lists and cannot be set.
    pub fn set_header(&mut self, version: u32, lock_time: u32) {
        self.version = version;
        self.lock_time = lock_time;
        debug!("Set header {:?}", self.header());
    }

    /// The UTXOs created by this transaction once it is known under `transaction_id`
    pub fn output_utxos<'a>(&'a self, transaction_id: &'a str) -> impl Iterator<Item = Utxo> + 'a {
        self.outputs
            .iter()
            .enumerate()
            .map(move |(i, output)| Utxo::new(transaction_id, i as TransactionIndexType, output.value.as_u64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ConfigBuilder, utxo::UtxoRegistry};

    fn output(value: u64) -> TransactionOutput {
        TransactionOutput::new(Amount::from_sat(value), format!("spk{value}"))
    }

    #[test]
    fn test_inputs() {
        let mut tx = TransactionData::default();
        tx.add_input(TransactionInput::new("aa", 0, "sig0")).add_input(TransactionInput::new("bb", 3, "sig1").with_sequence(7));

        let details = tx.input_details();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].sequence, MAX_SEQUENCE);
        assert_eq!(details[1].previous_transaction_id, "bb");
        assert_eq!(details[1].previous_index, 3);
        assert_eq!(details[1].sequence, 7);
    }

    #[test]
    fn test_summarize_outputs() {
        let mut tx = TransactionData::default();
        for value in [100, 5, 400, 50] {
            tx.add_output(output(value));
        }
        assert_eq!(tx.summarize_outputs(Amount::ZERO, u64::MAX), OutputSummary { total: 555, count: 4 });
        assert_eq!(tx.summarize_outputs(Amount::from_sat(50), u64::MAX), OutputSummary { total: 550, count: 3 });

        // Stops right after the output that pushes the total past the cap
        assert_eq!(tx.summarize_outputs(Amount::ZERO, 300), OutputSummary { total: 505, count: 3 });
        // Reaching the cap exactly does not stop
        assert_eq!(tx.summarize_outputs(Amount::ZERO, 505), OutputSummary { total: 555, count: 4 });

        assert_eq!(TransactionData::default().summarize_outputs_with(&Params::default(), Amount::ZERO), OutputSummary::default());
    }

    #[test]
    fn test_summary_cap_from_params() {
        let mut tx = TransactionData::default();
        for value in [600_000_000, 600_000_000, 1] {
            tx.add_output(output(value));
        }
        assert_eq!(tx.summarize_outputs_with(&Params::default(), Amount::ZERO), OutputSummary { total: 1_200_000_000, count: 2 });

        let mut small = TransactionData::default();
        for _ in 0..3 {
            small.add_output(output(100));
        }
        let config = ConfigBuilder::new(Params::default()).edit_params(|p| p.summary_cap = 10).build();
        assert_eq!(small.summarize_outputs_with(&config, Amount::ZERO), OutputSummary { total: 100, count: 1 });
        assert_eq!(small.summarize_outputs_with(&Params::default(), Amount::ZERO), OutputSummary { total: 300, count: 3 });
    }

    #[test]
    fn test_metadata() {
        let mut tx = TransactionData::default();
        tx.update_metadata([("memo", MetadataValue::from("rent")), ("fee_rate", MetadataValue::from(3i64))]);
        tx.update_metadata([("memo", "utilities")]);

        assert_eq!(tx.metadata_value("memo").and_then(|v| v.as_text()), Some("utilities"));
        assert_eq!(tx.metadata_value("fee_rate").and_then(|v| v.as_integer()), Some(3));
        assert_eq!(tx.metadata_value("missing"), None);
        assert_eq!(tx.metadata.keys().collect::<Vec<_>>(), vec!["fee_rate", "memo"]);
    }

    #[test]
    fn test_header() {
        let mut tx = TransactionData::new(2, 500_000);
        tx.add_input(TransactionInput::new("aa", 0, "")).add_output(output(1)).add_output(output(2));
        assert_eq!(tx.header(), TransactionHeader { version: 2, input_count: 1, output_count: 2, lock_time: 500_000 });

        tx.set_header(3, 0);
        assert_eq!(tx.header(), TransactionHeader { version: 3, input_count: 1, output_count: 2, lock_time: 0 });
        assert_eq!(TransactionData::default().header().version, DEFAULT_TX_VERSION);
    }

    #[test]
    fn test_output_utxos() {
        let mut tx = TransactionData::default();
        tx.add_output(output(500)).add_output(output(1500));

        let registry: UtxoRegistry = tx.output_utxos("feed").collect();
        assert_eq!(registry.balance(), 2000);
        assert!(registry.contains(&Utxo::new("feed", 1, 1500)));
    }
}
