use cubic_hashes::Hash;
use serde::{Deserialize, Serialize};

/// Durable cube metadata: `cube:<cube_id>` in the persisted-state layout. The live
/// [`crate::cube::Cube`] keeps its sealed faces in memory; only this summary is
/// written through, since faces and their blocks are independently reconstructible
/// from the blocks store and gossip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CubeRecord {
    pub id: String,
    pub hash: Hash,
    pub level: u32,
    pub index: u64,
    pub timestamp: u64,
    pub face_merkle_roots: [Hash; 3],
    pub validator_average_timestamp: Option<u64>,
}
