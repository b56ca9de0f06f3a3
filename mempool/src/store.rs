use crate::{
    errors::{MempoolError, MempoolResult},
    key::RawTxKey,
    record::{FinalizedTxRecord, ProcessingTxRecord, RawTxRecord, ValidationEntry},
};
use cubic_consensus_core::{content_hash_of, from_utxos, with_field, TxData, VALIDATION_TIMESTAMP_FIELD};
use cubic_database::prelude::*;
use cubic_hashes::Hash;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_nanos() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is after the epoch").as_nanos() as u64
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MempoolStats {
    pub raw_count: usize,
    pub processing_count: usize,
    pub finalized_count: usize,
    pub locked_utxos_count: usize,
}

/// Durable storage for the three mempool stages and the UTXO lock set.
///
/// Every mutator is internally serialized through the stores' own write-through
/// caches; callers never observe a partially-applied transition. Persistence
/// failures are logged and otherwise swallowed: in-memory state is authoritative,
/// and a node that loses its store recovers from peers via gossip (outside this
/// crate's scope).
#[derive(Clone)]
pub struct Mempool {
    db: Arc<DB>,
    raw: CachedDbAccess<RawTxKey, RawTxRecord>,
    processing: CachedDbAccess<Hash, ProcessingTxRecord>,
    finalized: CachedDbAccess<Hash, FinalizedTxRecord>,
    locked_utxos: Arc<Mutex<CachedDbSetItem<String>>>,
}

impl Mempool {
    pub fn new(db: Arc<DB>) -> Self {
        Self {
            raw: CachedDbAccess::new(db.clone(), DatabaseStorePrefixes::RawTx.into()),
            processing: CachedDbAccess::new(db.clone(), DatabaseStorePrefixes::ProcessingTx.into()),
            finalized: CachedDbAccess::new(db.clone(), DatabaseStorePrefixes::FinalizedTx.into()),
            locked_utxos: Arc::new(Mutex::new(CachedDbSetItem::new(db.clone(), DatabaseStorePrefixes::LockedUtxo.into()))),
            db,
        }
    }

    /// Computes `content_hash(tx)` (full 64-hex), stores a fresh [`RawTxRecord`]
    /// keyed by `(leader_id, raw_tx_id)`, and returns the raw transaction id.
    pub fn submit(&self, leader_id: &str, tx_data: TxData) -> MempoolResult<Hash> {
        let raw_tx_id = content_hash_of(&tx_data);
        let key = RawTxKey::new(leader_id, raw_tx_id);
        if self.raw.has(key.clone()).unwrap_or(false) {
            return Err(MempoolError::DuplicateSubmission(leader_id.to_string()));
        }
        let record = RawTxRecord::new(leader_id.to_string(), tx_data, now_nanos());
        if let Err(err) = self.raw.write(DirectDbWriter::new(&self.db), key, record) {
            log::error!("failed to persist raw tx {raw_tx_id} from leader {leader_id}: {err}");
        }
        Ok(raw_tx_id)
    }

    /// Idempotent, never fails: adds every identifier to the lock set.
    pub fn lock_utxos(&self, utxos: &[String]) {
        if utxos.is_empty() {
            return;
        }
        let mut locked = self.locked_utxos.lock();
        if let Err(err) = locked.update(DirectDbWriter::new(&self.db), utxos, &[]) {
            log::error!("failed to persist utxo locks: {err}");
        }
    }

    /// Idempotent: removes every identifier from the lock set.
    pub fn unlock_utxos(&self, utxos: &[String]) {
        if utxos.is_empty() {
            return;
        }
        let mut locked = self.locked_utxos.lock();
        if let Err(err) = locked.update(DirectDbWriter::new(&self.db), &[], utxos) {
            log::error!("failed to persist utxo unlocks: {err}");
        }
    }

    /// Appends a validator's report to the raw record's validation list.
    pub fn record_validation(&self, leader_id: &str, raw_tx_id: Hash, validator_id: &str, timestamp_ns: u64) -> MempoolResult<()> {
        let key = RawTxKey::new(leader_id, raw_tx_id);
        let mut record = self.raw.read(key.clone()).map_err(|_| MempoolError::NotFound)?;
        record.validation_entries.push(ValidationEntry { validator_id: validator_id.to_string(), timestamp_ns });
        if let Err(err) = self.raw.write(DirectDbWriter::new(&self.db), key, record) {
            log::error!("failed to persist validation report for {raw_tx_id}: {err}");
        }
        Ok(())
    }

    pub fn read_raw(&self, leader_id: &str, raw_tx_id: Hash) -> Option<RawTxRecord> {
        self.raw.read(RawTxKey::new(leader_id, raw_tx_id)).ok()
    }

    /// Atomically removes the raw record and inserts the processing record under
    /// `validated_hash`. Fails with [`MempoolError::NotFound`] if the raw record is
    /// absent.
    pub fn promote_to_processing(
        &self,
        leader_id: &str,
        raw_tx_id: Hash,
        validated_hash: Hash,
        processing_record: ProcessingTxRecord,
    ) -> MempoolResult<()> {
        let raw_key = RawTxKey::new(leader_id, raw_tx_id);
        if !self.raw.has(raw_key.clone()).unwrap_or(false) {
            return Err(MempoolError::NotFound);
        }
        if let Err(err) = self.raw.delete(DirectDbWriter::new(&self.db), raw_key) {
            log::error!("failed to delete raw tx {raw_tx_id} on promotion: {err}");
        }
        if let Err(err) = self.processing.write(DirectDbWriter::new(&self.db), validated_hash, processing_record) {
            log::error!("failed to persist processing tx {validated_hash}: {err}");
        }
        Ok(())
    }

    /// Moves a processing record to the finalized mapping and unlocks its UTXOs.
    /// Returns `false` (never an error) if `validated_hash` is unknown — finalization
    /// is idempotent.
    pub fn finalize(&self, validated_hash: Hash) -> bool {
        let Ok(record) = self.processing.read(validated_hash) else {
            return false;
        };
        if let Err(err) = self.processing.delete(DirectDbWriter::new(&self.db), validated_hash) {
            log::error!("failed to delete processing tx {validated_hash} on finalize: {err}");
        }
        let utxos = from_utxos(&record.tx_data);
        let finalized = FinalizedTxRecord { tx_data: record.tx_data };
        if let Err(err) = self.finalized.write(DirectDbWriter::new(&self.db), validated_hash, finalized) {
            log::error!("failed to persist finalized tx {validated_hash}: {err}");
        }
        self.unlock_utxos(&utxos);
        true
    }

    pub fn read_finalized(&self, validated_hash: Hash) -> Option<FinalizedTxRecord> {
        self.finalized.read(validated_hash).ok()
    }

    pub fn stats(&self) -> MempoolStats {
        MempoolStats {
            raw_count: self.raw.iterator().count(),
            processing_count: self.processing.iterator().count(),
            finalized_count: self.finalized.iterator().count(),
            locked_utxos_count: self.locked_utxos.lock().read().map(|set| set.read().len()).unwrap_or(0),
        }
    }
}

/// Builds the field-augmented `tx_data` a [`ProcessingTxRecord`] carries: the
/// submitter's fields, in their original order, plus a trailing validation timestamp.
pub fn with_validation_timestamp(tx_data: &TxData, validation_timestamp_ns: u64) -> TxData {
    with_field(tx_data, VALIDATION_TIMESTAMP_FIELD, serde_json::json!(validation_timestamp_ns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubic_database::{create_temp_db, prelude::ConnBuilder};
    use serde_json::json;

    fn temp_mempool() -> (cubic_database::utils::DbLifetime, Mempool) {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default()).unwrap();
        (lifetime, Mempool::new(db))
    }

    #[test]
    fn submit_then_record_then_promote_then_finalize() {
        let (_lifetime, mempool) = temp_mempool();
        let tx = json!({"type": "utxo", "from": "utxo-A", "to": "B", "amount": 100});
        let raw_tx_id = mempool.submit("L1", tx.clone()).unwrap();
        mempool.lock_utxos(&["utxo-A".to_string()]);

        assert_eq!(
            mempool.submit("L1", tx.clone()),
            Err(MempoolError::DuplicateSubmission("L1".to_string()))
        );

        mempool.record_validation("L1", raw_tx_id, "v1", 1_000_000).unwrap();
        mempool.record_validation("L1", raw_tx_id, "v2", 2_000_000).unwrap();
        mempool.record_validation("L1", raw_tx_id, "v3", 3_000_000).unwrap();

        let augmented = with_validation_timestamp(&tx, 2_000_000);
        let validated_hash = content_hash_of(&augmented);
        let processing = ProcessingTxRecord {
            tx_data: augmented,
            leader_id: "L1".to_string(),
            validator_timestamps: vec![],
            raw_tx_id,
        };
        mempool.promote_to_processing("L1", raw_tx_id, validated_hash, processing).unwrap();

        let stats = mempool.stats();
        assert_eq!(stats, MempoolStats { raw_count: 0, processing_count: 1, finalized_count: 0, locked_utxos_count: 1 });

        assert!(mempool.finalize(validated_hash));
        assert!(!mempool.finalize(validated_hash));

        let stats = mempool.stats();
        assert_eq!(stats, MempoolStats { raw_count: 0, processing_count: 0, finalized_count: 1, locked_utxos_count: 0 });
    }

    #[test]
    fn double_spend_coexistence_in_raw_mempool() {
        let (_lifetime, mempool) = temp_mempool();
        let tx_a = json!({"type": "utxo", "from": "utxo-X", "to": "B", "amount": 1});
        let tx_b = json!({"type": "utxo", "from": "utxo-X", "to": "C", "amount": 2});
        mempool.submit("L1", tx_a).unwrap();
        mempool.submit("L1", tx_b).unwrap();
        mempool.lock_utxos(&["utxo-X".to_string()]);
        mempool.lock_utxos(&["utxo-X".to_string()]);

        let stats = mempool.stats();
        assert_eq!(stats.raw_count, 2);
        assert_eq!(stats.locked_utxos_count, 1);
    }

    #[test]
    fn promote_unknown_raw_tx_fails_not_found() {
        let (_lifetime, mempool) = temp_mempool();
        let bogus = Hash::from_bytes([9u8; 32]);
        let processing = ProcessingTxRecord { tx_data: json!({}), leader_id: "L1".to_string(), validator_timestamps: vec![], raw_tx_id: bogus };
        assert_eq!(mempool.promote_to_processing("L1", bogus, bogus, processing), Err(MempoolError::NotFound));
    }
}
