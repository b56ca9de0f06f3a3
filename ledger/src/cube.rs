use crate::element::FaceElement;
use crate::face::Face;
use cubic_hashes::{content_hash, Hash};
use std::collections::HashMap;

pub const CUBE_CAPACITY: usize = 3;

/// An ordered set of exactly 3 faces, sorted by merkle root upon saturation. At
/// level 1 its elements are blocks; at levels ≥ 2 its faces hold lower-level cubes.
pub struct Cube {
    pub timestamp: u64,
    pub index: u64,
    pub level: u32,
    pending_faces: HashMap<u64, Face>,
    sealed_faces: Option<Vec<Face>>,
    id: Option<String>,
    hash: Option<Hash>,
    pub validator_average_timestamp: Option<u64>,
}

impl Cube {
    pub fn new(timestamp: u64, index: u64, level: u32) -> Self {
        Self {
            timestamp,
            index,
            level,
            pending_faces: HashMap::new(),
            sealed_faces: None,
            id: None,
            hash: None,
            validator_average_timestamp: None,
        }
    }

    pub fn face_count(&self) -> usize {
        match &self.sealed_faces {
            Some(faces) => faces.len(),
            None => self.pending_faces.len(),
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.id.is_some()
    }

    /// The 16-hex content-hash prefix, finalized once the cube saturates. Empty
    /// before then — a cube is only ever exposed as a [`crate::element::FaceElement`]
    /// after it has saturated.
    pub fn id(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    pub fn hash(&self) -> Hash {
        self.hash.unwrap_or(Hash::ZERO)
    }

    pub fn sealed_faces(&self) -> Option<&[Face]> {
        self.sealed_faces.as_deref()
    }

    /// The average block timestamp across whatever sealed faces are already attached
    /// (0, 9, or 18 blocks). Used to pick a target cube before it has saturated; `None`
    /// once no faces have been attached yet.
    pub fn average_block_timestamp_so_far(&self) -> Option<u64> {
        if self.pending_faces.is_empty() {
            return None;
        }
        let faces: Vec<&Face> = self.pending_faces.values().collect();
        let mut sum: u128 = 0;
        let mut count: u128 = 0;
        for face in faces {
            for element in face.placed() {
                if let FaceElement::Block(block) = element {
                    sum += block.read().timestamp as u128;
                    count += 1;
                }
            }
        }
        if count == 0 {
            None
        } else {
            Some((sum / count) as u64)
        }
    }

    /// Inserts `face` keyed by its creation timestamp. Returns `true` iff this call
    /// saturated the cube (sealed its three faces and finalized its id).
    pub fn add_face(&mut self, face: Face) -> bool {
        if self.is_saturated() {
            return false;
        }
        self.pending_faces.insert(face.timestamp, face);
        if self.pending_faces.len() == CUBE_CAPACITY {
            self.finalize();
            return true;
        }
        false
    }

    fn finalize(&mut self) {
        let mut faces: Vec<Face> = self.pending_faces.drain().map(|(_, face)| face).collect();
        faces.sort_by(|a, b| a.merkle_root().cmp(&b.merkle_root()));
        for (position, face) in faces.iter_mut().enumerate() {
            face.index = position as u8;
        }

        let mut concatenated = Vec::with_capacity(32 * CUBE_CAPACITY);
        for face in &faces {
            concatenated.extend_from_slice(face.merkle_root().as_bytes());
        }
        let hash = content_hash(concatenated);
        self.id = Some(hash.id_prefix());
        self.hash = Some(hash);

        if self.level == 1 {
            self.validator_average_timestamp = Some(average_block_timestamp(&faces));
        }
        self.sealed_faces = Some(faces);
    }
}

/// Integer mean, in nanoseconds, of every constituent block's timestamp across the
/// cube's three sealed faces.
fn average_block_timestamp(faces: &[Face]) -> u64 {
    let mut sum: u128 = 0;
    let mut count: u128 = 0;
    for face in faces {
        for element in face.placed() {
            if let FaceElement::Block(block) = element {
                sum += block.read().timestamp as u128;
                count += 1;
            }
        }
    }
    if count == 0 {
        0
    } else {
        (sum / count) as u64
    }
}
