use cubic_consensus_core::TxData;
use cubic_hashes::Hash;
use serde::{Deserialize, Serialize};

/// A single validator's report: when it began validating, in nanoseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub validator_id: String,
    pub timestamp_ns: u64,
}

/// Mempool stage 1: a submitted, not-yet-validated transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawTxRecord {
    pub tx_data: TxData,
    pub validation_entries: Vec<ValidationEntry>,
    pub submission_timestamp: u64,
    pub leader_id: String,
}

impl RawTxRecord {
    pub fn new(leader_id: String, tx_data: TxData, submission_timestamp: u64) -> Self {
        Self { tx_data, validation_entries: Vec::new(), submission_timestamp, leader_id }
    }

    /// Distinct validators that have reported so far.
    pub fn distinct_validator_count(&self) -> usize {
        let mut seen: Vec<&str> = self.validation_entries.iter().map(|e| e.validator_id.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// Mempool stage 2: quorum reached, averaged timestamp bound into `tx_data`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingTxRecord {
    pub tx_data: TxData,
    pub leader_id: String,
    pub validator_timestamps: Vec<ValidationEntry>,
    pub raw_tx_id: Hash,
}

/// Mempool stage 3: terminal state, consumed by the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinalizedTxRecord {
    pub tx_data: TxData,
}
