use cubic_consensus_core::TxData;
use cubic_geometry::{absolute_coordinates, build_fractal_address, Coordinates, FractalAddress, Location, Vector};
use cubic_hashes::Hash;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A finalized transaction wrapped with its content hash, timestamp, and geometric
/// placement. Location mutates twice: once tentatively on admission into a pending
/// face, once finally once its face — and then its cube — has sealed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub tx: TxData,
    pub hash: Hash,
    pub timestamp: u64,
    pub location: Location,
    pub coordinates: Coordinates,
    pub vector: Vector,
    pub fractal_address: FractalAddress,
}

impl Block {
    pub fn new(tx: TxData, hash: Hash, timestamp: u64) -> Self {
        Self {
            id: hash.id_prefix(),
            tx,
            hash,
            timestamp,
            location: Location::default(),
            coordinates: Coordinates::ZERO,
            vector: Vector::from_coordinates(Coordinates::ZERO),
            fractal_address: Vec::new(),
        }
    }

    /// Recomputes coordinates, vector, and fractal address for a new location. At
    /// level 1 the ancestry is just this block's own cube index; levels above 1 are
    /// not yet known at block-construction time (the geometry engine only descends
    /// to whatever ancestry is known so far).
    pub fn relocate(&mut self, location: Location) {
        self.location = location;
        self.coordinates = absolute_coordinates(location.level, location.cube_sequential_index, location.face_index, location.position);
        self.vector = Vector::from_coordinates(self.coordinates);
        self.fractal_address =
            build_fractal_address(&[(location.level, location.cube_sequential_index)], location.face_index, location.position);
    }
}

/// Blocks are shared by reference between a face's placed elements and any external
/// holder (e.g. a lookup-by-id index); the ledger is the authoritative mutator.
pub type BlockRef = Arc<RwLock<Block>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_is_the_hash_prefix() {
        let hash = Hash::from_bytes([7u8; 32]);
        let block = Block::new(json!({"type": "utxo"}), hash, 1);
        assert_eq!(block.id, hash.id_prefix());
    }

    #[test]
    fn relocate_recomputes_geometry() {
        let mut block = Block::new(json!({}), Hash::ZERO, 1);
        assert_eq!(block.coordinates, Coordinates::ZERO);

        block.relocate(Location::new(1, 0, 0, 0));
        assert_ne!(block.coordinates, Coordinates::ZERO);
        assert_eq!(block.fractal_address.len(), 1);
    }
}
