use crate::errors::{SubmitError, SubmitResult};
use cubic_consensus_core::{content_hash_of, from_utxos, TransactionValidator, TxData};
use cubic_hashes::Hash;
use cubic_mempool::{with_validation_timestamp, Mempool, ProcessingTxRecord};
use cubic_notify::{
    EventBus, Notification, RawTxAddedNotification, TxFinalizedNotification, TxProcessingNotification,
    ValidationCompleteNotification, ValidationTasksCreatedNotification,
};
use cubic_tasks::{task_name, TaskManager};
use parking_lot::RwLock;
use std::sync::Arc;

pub const DEFAULT_REQUIRED_VALIDATIONS: usize = 3;

/// Verifies a transaction's signature against a public key. Returning `false` aborts
/// the validation completion silently — the task is not marked complete.
pub type VerifySignatureFn = Arc<dyn Fn(&TxData, &str) -> bool + Send + Sync>;

/// Resolves an address to the public key bound to it. Absence of both hooks skips
/// verification entirely.
pub type LookupPublicKeyFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SignatureHooks {
    pub verify_signature: Option<VerifySignatureFn>,
    pub lookup_public_key: Option<LookupPublicKeyFn>,
}

/// Tracks which leader a still-raw transaction was submitted under, so validator
/// completions (which name only the transaction and validator) can find their way
/// back to the right `(leader_id, raw_tx_id)` mempool key.
#[derive(Default)]
struct InFlight {
    leader_by_raw_tx: std::collections::HashMap<Hash, String>,
}

/// Orchestrates `Submitted -> Validating -> Processing -> Finalized`. Owns no
/// persistent state directly: all durable records live in the [`Mempool`] it wraps.
pub struct ConsensusWorkflow {
    mempool: Mempool,
    tasks: TaskManager,
    events: EventBus,
    validator: TransactionValidator,
    validator_set: RwLock<Vec<String>>,
    required_validations: usize,
    hooks: SignatureHooks,
    in_flight: RwLock<InFlight>,
}

impl ConsensusWorkflow {
    pub fn new(mempool: Mempool, events: EventBus) -> Self {
        Self {
            mempool,
            tasks: TaskManager::new(),
            events,
            validator: TransactionValidator::new(),
            validator_set: RwLock::new(Vec::new()),
            required_validations: DEFAULT_REQUIRED_VALIDATIONS,
            hooks: SignatureHooks::default(),
            in_flight: RwLock::new(InFlight::default()),
        }
    }

    pub fn with_required_validations(mut self, required_validations: usize) -> Self {
        self.required_validations = required_validations.max(1);
        self
    }

    pub fn with_signature_hooks(mut self, hooks: SignatureHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn set_validator_set(&self, validators: Vec<String>) {
        *self.validator_set.write() = validators;
    }

    /// `Submitted -> Validating`. Validates the transaction, locks referenced UTXOs
    /// (set-semantics: a duplicate lock never blocks submission), records the raw
    /// transaction, and issues one validation task per validator.
    pub fn submit(&self, leader_id: &str, tx_data: TxData) -> SubmitResult<Hash> {
        self.validator.validate(&tx_data)?;

        let utxos = from_utxos(&tx_data);
        self.mempool.lock_utxos(&utxos);

        let raw_tx_id = self.mempool.submit(leader_id, tx_data)?;
        self.in_flight.write().leader_by_raw_tx.insert(raw_tx_id, leader_id.to_string());

        self.events.publish(Notification::RawTxAdded(Arc::new(RawTxAddedNotification {
            raw_tx_id,
            leader_id: leader_id.to_string(),
        })));

        let validators: Vec<String> = self.validator_set.read().iter().take(self.required_validations).cloned().collect();
        let task_list = self.tasks.create_tasks(raw_tx_id, &validators);
        self.tasks.assign(&task_list);
        self.events.publish(Notification::ValidationTasksCreated(Arc::new(ValidationTasksCreatedNotification {
            raw_tx_id,
            validator_ids: validators,
        })));

        Ok(raw_tx_id)
    }

    /// `Validating -> Processing` on the Nth distinct validator completion.
    /// A failed signature verification rejects the completion silently: the task is
    /// never marked complete and no progress is recorded.
    pub fn complete_validation(&self, raw_tx_id: Hash, task_name_str: &str, timestamp_ns: u64, validator_id: &str) {
        let Some(leader_id) = self.in_flight.read().leader_by_raw_tx.get(&raw_tx_id).cloned() else {
            // Already promoted, or never submitted: a late/duplicate report is a no-op.
            return;
        };

        let Some(raw) = self.mempool.read_raw(&leader_id, raw_tx_id) else {
            return;
        };

        if let (Some(verify), Some(lookup)) = (&self.hooks.verify_signature, &self.hooks.lookup_public_key) {
            let address = raw.tx_data.get("from").and_then(|v| v.as_str()).unwrap_or_default();
            match lookup(address) {
                Some(public_key) if verify(&raw.tx_data, &public_key) => {}
                _ => {
                    log::warn!("signature verification failed for {raw_tx_id}, validator {validator_id}");
                    return;
                }
            }
        }

        self.tasks.complete(validator_id, task_name_str);
        if let Err(err) = self.mempool.record_validation(&leader_id, raw_tx_id, validator_id, timestamp_ns) {
            log::error!("failed to record validation for {raw_tx_id}: {err}");
            return;
        }

        self.events.publish(Notification::ValidationComplete(Arc::new(ValidationCompleteNotification {
            raw_tx_id,
            validator_id: validator_id.to_string(),
            timestamp_ns,
        })));

        let Some(raw) = self.mempool.read_raw(&leader_id, raw_tx_id) else {
            return;
        };
        if raw.distinct_validator_count() < self.required_validations {
            return;
        }

        let average_ns = average_timestamp_ns(&raw.validation_entries);
        let augmented_tx = with_validation_timestamp(&raw.tx_data, average_ns);
        let validated_hash = content_hash_of(&augmented_tx);
        let processing_record = ProcessingTxRecord {
            tx_data: augmented_tx,
            leader_id: leader_id.clone(),
            validator_timestamps: raw.validation_entries.clone(),
            raw_tx_id,
        };

        if let Err(err) = self.mempool.promote_to_processing(&leader_id, raw_tx_id, validated_hash, processing_record) {
            log::error!("failed to promote {raw_tx_id} to processing: {err}");
            return;
        }
        self.in_flight.write().leader_by_raw_tx.remove(&raw_tx_id);

        self.events.publish(Notification::TxProcessing(Arc::new(TxProcessingNotification {
            validated_hash,
            raw_tx_id,
            validation_timestamp_ns: average_ns,
        })));
    }

    /// `Processing -> Finalized`. Idempotent: returns `false` without error on an
    /// unknown `validated_hash`.
    pub fn finalize(&self, validated_hash: Hash) -> bool {
        if !self.mempool.finalize(validated_hash) {
            return false;
        }
        let tx_data = self.mempool.read_finalized(validated_hash).map(|r| r.tx_data).unwrap_or_default();
        self.events.publish(Notification::TxFinalized(Arc::new(TxFinalizedNotification { validated_hash, tx_data })));
        true
    }
}

/// Integer mean of the recorded validator timestamps, widened to nanoseconds.
fn average_timestamp_ns(entries: &[cubic_mempool::ValidationEntry]) -> u64 {
    if entries.is_empty() {
        return 0;
    }
    let sum: u128 = entries.iter().map(|e| e.timestamp_ns as u128).sum();
    (sum / entries.len() as u128) as u64
}

/// The task name a validator reports completion against.
pub fn validator_task_name(raw_tx_id: Hash, validator_id: &str) -> String {
    task_name(raw_tx_id, validator_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubic_database::{create_temp_db, prelude::ConnBuilder};
    use serde_json::json;

    fn workflow() -> (cubic_database::utils::DbLifetime, ConsensusWorkflow) {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default()).unwrap();
        let mempool = Mempool::new(db);
        let workflow = ConsensusWorkflow::new(mempool, EventBus::new());
        workflow.set_validator_set(vec!["v1".to_string(), "v2".to_string(), "v3".to_string()]);
        (lifetime, workflow)
    }

    #[test]
    fn single_transaction_reaches_processing_then_finalizes() {
        let (_lifetime, workflow) = workflow();
        let tx = json!({"type": "utxo", "from": "A", "to": "B", "amount": 100});
        let raw_tx_id = workflow.submit("L1", tx).unwrap();

        for (validator, ts) in [("v1", 1_000_000u64), ("v2", 2_000_000), ("v3", 3_000_000)] {
            let name = validator_task_name(raw_tx_id, validator);
            workflow.complete_validation(raw_tx_id, &name, ts, validator);
        }

        let stats = workflow.mempool.stats();
        assert_eq!(stats.raw_count, 0);
        assert_eq!(stats.processing_count, 1);
        assert_eq!(stats.finalized_count, 0);
        assert_eq!(stats.locked_utxos_count, 1);
    }

    #[test]
    fn rejects_transaction_missing_required_field() {
        let (_lifetime, workflow) = workflow();
        let tx = json!({"type": "utxo", "from": "A", "to": "B"});
        assert!(workflow.submit("L1", tx).is_err());
    }

    #[test]
    fn duplicate_submission_surfaces_as_an_error() {
        let (_lifetime, workflow) = workflow();
        let tx = json!({"type": "utxo", "from": "A", "to": "B", "amount": 1});
        workflow.submit("L1", tx.clone()).unwrap();
        assert_eq!(workflow.submit("L1", tx), Err(SubmitError::DuplicateSubmission("L1".to_string())));
    }

    #[test]
    fn average_timestamp_is_integer_mean() {
        let entries = vec![
            cubic_mempool::ValidationEntry { validator_id: "v1".to_string(), timestamp_ns: 1_000_000 },
            cubic_mempool::ValidationEntry { validator_id: "v2".to_string(), timestamp_ns: 2_000_000 },
            cubic_mempool::ValidationEntry { validator_id: "v3".to_string(), timestamp_ns: 3_000_000 },
        ];
        assert_eq!(average_timestamp_ns(&entries), 2_000_000);
    }
}
