use crate::element::FaceElement;
use cubic_hashes::Hash;
use cubic_merkle::merkle_root;

pub const FACE_CAPACITY: usize = 9;

/// An ordered set of exactly 9 elements, sorted by content hash upon saturation.
pub struct Face {
    pub timestamp: u64,
    pub index: u8,
    pending: Vec<FaceElement>,
    placed: Vec<Option<FaceElement>>,
    pub sorted: bool,
}

impl Face {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp, index: 0, pending: Vec::new(), placed: vec![None; FACE_CAPACITY], sorted: false }
    }

    pub fn len(&self) -> usize {
        if self.sorted {
            FACE_CAPACITY
        } else {
            self.pending.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `element` to the pending list. A duplicate content hash, or a call on
    /// an already-full face, is a silent no-op. Returns `true` iff this call was the
    /// one that sealed the face.
    pub fn add(&mut self, element: FaceElement) -> bool {
        if self.sorted {
            return false;
        }
        let key = element.sort_bytes();
        if self.pending.iter().any(|existing| existing.sort_bytes() == key) {
            return false;
        }
        if self.pending.len() >= FACE_CAPACITY {
            return false;
        }
        self.pending.push(element);
        if self.pending.len() == FACE_CAPACITY {
            self.seal();
            return true;
        }
        false
    }

    fn seal(&mut self) {
        let mut elements = std::mem::take(&mut self.pending);
        elements.sort_by(|a, b| a.sort_bytes().cmp(&b.sort_bytes()));
        self.placed = elements.into_iter().map(Some).collect();
        self.sorted = true;
    }

    pub fn placed(&self) -> impl Iterator<Item = &FaceElement> {
        self.placed.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn merkle_root(&self) -> Hash {
        let leaves: Vec<Hash> = self.placed.iter().map(|slot| slot.as_ref().map(FaceElement::leaf_hash).unwrap_or(Hash::ZERO)).collect();
        merkle_root(leaves.into_iter())
    }

    pub fn block_ids(&self) -> Vec<String> {
        self.placed().filter_map(FaceElement::block_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockRef};
    use cubic_hashes::Hash;
    use parking_lot::RwLock;
    use serde_json::json;
    use std::sync::Arc;

    fn block_element(byte: u8) -> FaceElement {
        let hash = Hash::from_bytes([byte; 32]);
        let block: BlockRef = Arc::new(RwLock::new(Block::new(json!({}), hash, 1)));
        FaceElement::Block(block)
    }

    #[test]
    fn open_face_has_empty_placed_and_sealed_face_has_empty_pending() {
        let mut face = Face::new(1);
        assert!(!face.sorted);
        assert_eq!(face.placed().count(), 0);

        for i in 0..9u8 {
            face.add(block_element(i));
        }
        assert!(face.sorted);
        assert_eq!(face.placed().count(), 9);
        assert_eq!(face.len(), 9);
    }

    #[test]
    fn duplicate_content_hash_is_a_silent_no_op() {
        let mut face = Face::new(1);
        face.add(block_element(5));
        face.add(block_element(5));
        assert_eq!(face.len(), 1);
    }

    #[test]
    fn adding_past_capacity_is_a_silent_no_op() {
        let mut face = Face::new(1);
        for i in 0..9u8 {
            face.add(block_element(i));
        }
        assert!(!face.add(block_element(200)));
        assert_eq!(face.len(), 9);
    }

    #[test]
    fn sealed_positions_are_ascending_by_hash() {
        let mut face = Face::new(1);
        for i in (0..9u8).rev() {
            face.add(block_element(i));
        }
        let placed: Vec<Hash> = face.placed().map(FaceElement::leaf_hash).collect();
        for window in placed.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn merkle_root_on_partial_face_zero_fills_unplaced_slots() {
        // Elements only move into `placed` atomically at seal time, so a face that
        // hasn't sealed yet reports an all-zero-leaf root regardless of pending count.
        let mut face = Face::new(1);
        face.add(block_element(1));
        let root = face.merkle_root();
        assert_eq!(root, merkle_root(std::iter::repeat(Hash::ZERO).take(9)));
    }
}
