use cubic_geometry::Location;
use cubic_hashes::Hash;
use std::sync::Arc;

/// Every lifecycle event the consensus workflow and ledger engine publish.
#[derive(Debug, Clone)]
pub enum Notification {
    RawTxAdded(Arc<RawTxAddedNotification>),
    ValidationTasksCreated(Arc<ValidationTasksCreatedNotification>),
    ValidationComplete(Arc<ValidationCompleteNotification>),
    TxProcessing(Arc<TxProcessingNotification>),
    TxFinalized(Arc<TxFinalizedNotification>),
    BlockAdded(Arc<BlockAddedNotification>),
    FaceComplete(Arc<FaceCompleteNotification>),
    CubeComplete(Arc<CubeCompleteNotification>),
    SupercubeComplete(Arc<SupercubeCompleteNotification>),
}

#[derive(Debug, Clone)]
pub struct RawTxAddedNotification {
    pub raw_tx_id: Hash,
    pub leader_id: String,
}

#[derive(Debug, Clone)]
pub struct ValidationTasksCreatedNotification {
    pub raw_tx_id: Hash,
    pub validator_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationCompleteNotification {
    pub raw_tx_id: Hash,
    pub validator_id: String,
    pub timestamp_ns: u64,
}

#[derive(Debug, Clone)]
pub struct TxProcessingNotification {
    pub validated_hash: Hash,
    pub raw_tx_id: Hash,
    pub validation_timestamp_ns: u64,
}

#[derive(Debug, Clone)]
pub struct TxFinalizedNotification {
    pub validated_hash: Hash,
    pub tx_data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct BlockAddedNotification {
    pub block_id: String,
    pub tx_id: Hash,
    pub coordinates: (i64, i64, i64),
    pub location: Location,
    pub hash: Hash,
    pub timestamp: u64,
}

#[derive(Debug, Clone)]
pub struct FaceCompleteNotification {
    pub face_index: u8,
    pub block_count: usize,
    pub timestamp: u64,
    pub block_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CubeCompleteNotification {
    pub cube_id: String,
    pub level: u32,
    pub face_count: usize,
    pub validator_average_timestamp: Option<u64>,
    pub timestamp: u64,
}

#[derive(Debug, Clone)]
pub struct SupercubeCompleteNotification {
    pub cube_id: String,
    pub level: u32,
    pub face_count: usize,
    pub timestamp: u64,
}
