use crate::block::BlockRef;
use crate::cube::Cube;
use cubic_hashes::Hash;
use std::sync::Arc;

/// An entry placed in a face: a block at level 1, or a lower-level cube at level ≥ 2.
#[derive(Clone)]
pub enum FaceElement {
    Block(BlockRef),
    Cube(Arc<Cube>),
}

impl FaceElement {
    /// The bytes a face sorts elements by. For a block this is its full content hash;
    /// for a cube it is the cube's `id` (the spec's own words: "their hash for sorting
    /// is the cube's id"), which is shorter than a full hash but always compared
    /// consistently within a single face (a face never mixes blocks and cubes).
    pub fn sort_bytes(&self) -> Vec<u8> {
        match self {
            FaceElement::Block(block) => block.read().hash.as_bytes().to_vec(),
            FaceElement::Cube(cube) => cube.id().into_bytes(),
        }
    }

    /// The 32-byte leaf a face's merkle root is computed over. For a cube this is its
    /// full content digest (`id` is only its first 8 bytes, too short for a leaf).
    pub fn leaf_hash(&self) -> Hash {
        match self {
            FaceElement::Block(block) => block.read().hash,
            FaceElement::Cube(cube) => cube.hash(),
        }
    }

    pub fn block_id(&self) -> Option<String> {
        match self {
            FaceElement::Block(block) => Some(block.read().id.clone()),
            FaceElement::Cube(_) => None,
        }
    }
}
