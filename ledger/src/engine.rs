use crate::block::{Block, BlockRef};
use crate::cube::Cube;
use crate::element::FaceElement;
use crate::errors::LedgerResult;
use crate::face::Face;
use crate::record::CubeRecord;
use cubic_consensus_core::{content_hash_of, TransactionValidator, TxData};
use cubic_core::time::unix_now_nanos;
use cubic_database::prelude::*;
use cubic_geometry::Location;
use cubic_hashes::Hash;
use cubic_notify::{
    BlockAddedNotification, CubeCompleteNotification, EventBus, FaceCompleteNotification, Notification, SupercubeCompleteNotification,
};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// All state the recursive aggregator mutates. Serialized behind a single lock, the
/// way the mempool serializes its own stages — the ledger's cascade (face -> cube ->
/// higher face -> higher cube) must complete atomically with respect to the block
/// insertion that triggered it.
#[derive(Default)]
struct WorkingState {
    /// level -> face creation timestamp -> face (not yet attached to a cube).
    pending_faces: HashMap<u32, HashMap<u64, Face>>,
    /// level -> cube sequential index -> cube with fewer than 3 faces.
    cubes_in_progress: HashMap<u32, HashMap<u64, Cube>>,
    /// level -> next sequential index to assign a newly created cube.
    cube_counters: HashMap<u32, u64>,
    /// level -> saturated cubes awaiting aggregation into a face at level + 1.
    completed_cubes: HashMap<u32, VecDeque<Cube>>,
    /// block id -> block, for external lookup by back-reference.
    blocks_by_id: HashMap<String, BlockRef>,
}

/// The recursive aggregation engine: groups finalized transactions into blocks,
/// blocks into 9-element faces, faces into 3-face cubes, and cubes into higher-level
/// cubes ad infinitum.
pub struct Ledger {
    db: Arc<DB>,
    validator: TransactionValidator,
    events: EventBus,
    blocks: CachedDbAccess<Hash, Block>,
    cubes: CachedDbAccess<Hash, CubeRecord>,
    state: RwLock<WorkingState>,
}

impl Ledger {
    pub fn new(db: Arc<DB>, events: EventBus) -> Self {
        Self {
            blocks: CachedDbAccess::new(db.clone(), DatabaseStorePrefixes::Block.into()),
            cubes: CachedDbAccess::new(db.clone(), DatabaseStorePrefixes::Cube.into()),
            db,
            validator: TransactionValidator::new(),
            events,
            state: RwLock::new(WorkingState::default()),
        }
    }

    pub fn block_by_id(&self, id: &str) -> Option<BlockRef> {
        self.state.read().blocks_by_id.get(id).cloned()
    }

    /// Admits a finalized transaction: validates it, builds a block, places it in the
    /// oldest level-1 face with room, and runs the full upward cascade triggered by
    /// any saturation that results.
    pub fn admit(&self, tx_data: TxData) -> LedgerResult<BlockRef> {
        self.validator.validate(&tx_data)?;

        let hash = content_hash_of(&tx_data);
        let timestamp = block_timestamp(&tx_data);
        let block: BlockRef = Arc::new(RwLock::new(Block::new(tx_data, hash, timestamp)));

        let mut state = self.state.write();

        let face_ts = self.select_or_create_level1_face(&mut state);
        let tentative = self.select_tentative_cube(&state);
        let position = state.pending_faces.get(&1).and_then(|t| t.get(&face_ts)).map(|f| f.len() as u8).unwrap_or(0);

        block.write().relocate(Location::new(1, tentative.1, tentative.0, position));
        self.persist_block(&block);
        state.blocks_by_id.insert(block.read().id.clone(), block.clone());

        {
            let block_snapshot = block.read();
            self.events.publish(Notification::BlockAdded(Arc::new(BlockAddedNotification {
                block_id: block_snapshot.id.clone(),
                tx_id: hash,
                coordinates: (block_snapshot.coordinates.x, block_snapshot.coordinates.y, block_snapshot.coordinates.z),
                location: block_snapshot.location,
                hash: block_snapshot.hash,
                timestamp: block_snapshot.timestamp,
            })));
        }

        let face_table = state.pending_faces.entry(1).or_default();
        let face = face_table.get_mut(&face_ts).expect("just selected or created above");
        let saturated = face.add(FaceElement::Block(block.clone()));

        if saturated {
            let face = face_table.remove(&face_ts).expect("just saturated");
            self.face_finalize(&mut state, 1, face);
        }

        Ok(block)
    }

    /// Step 3: the oldest level-1 face with room, or a freshly created one.
    fn select_or_create_level1_face(&self, state: &mut WorkingState) -> u64 {
        let table = state.pending_faces.entry(1).or_default();
        if let Some(ts) = table.iter().filter(|(_, face)| !face.sorted).map(|(ts, _)| *ts).min() {
            return ts;
        }
        let ts = unix_now_nanos();
        table.insert(ts, Face::new(ts));
        log::debug!("gossip: face created at level 1, timestamp {ts}");
        ts
    }

    /// Step 4: among level-1 cubes with room, the one with the earliest
    /// average-block-timestamp so far; `(tentative_face_index, cube_sequential_index)`.
    fn select_tentative_cube(&self, state: &WorkingState) -> (u8, u64) {
        let Some(cubes) = state.cubes_in_progress.get(&1) else {
            return (0, 0);
        };
        cubes
            .iter()
            .filter(|(_, cube)| cube.face_count() < 3)
            .min_by_key(|(_, cube)| cube.average_block_timestamp_so_far().unwrap_or(u64::MAX))
            .map(|(&index, cube)| (cube.face_count() as u8, index))
            .unwrap_or((0, 0))
    }

    /// `FaceFinalize`: level 1 only in practice, since higher levels build a complete
    /// 9-element face in one shot (see [`Self::form_one_higher_face`]) rather than one
    /// block at a time.
    fn face_finalize(&self, state: &mut WorkingState, level: u32, face: Face) {
        if level == 1 {
            self.events.publish(Notification::FaceComplete(Arc::new(FaceCompleteNotification {
                face_index: face.index,
                block_count: face.placed().count(),
                timestamp: face.timestamp,
                block_ids: face.block_ids(),
            })));
        }

        let target_index = {
            let cubes = state.cubes_in_progress.entry(level).or_default();
            cubes
                .iter()
                .filter(|(_, cube)| cube.face_count() < 3)
                .min_by_key(|(_, cube)| cube.average_block_timestamp_so_far().unwrap_or(u64::MAX))
                .map(|(&idx, _)| idx)
        };
        let cube_index = target_index.unwrap_or_else(|| {
            let counter = state.cube_counters.entry(level).or_insert(0);
            let index = *counter;
            *counter += 1;
            let ts = unix_now_nanos();
            state.cubes_in_progress.entry(level).or_default().insert(index, Cube::new(ts, index, level));
            log::debug!("gossip: cube created at level {level}, index {index}");
            index
        });

        let cubes = state.cubes_in_progress.entry(level).or_default();
        let cube = cubes.get_mut(&cube_index).expect("just selected or created above");
        if cube.add_face(face) {
            let cube = cubes.remove(&cube_index).expect("just saturated");
            self.on_cube_saturated(state, level, cube);
            self.propagate(state, level);
        }
    }

    /// `CubeFinalize` steps 2-4: block relocation (level 1), persistence, event, and
    /// enqueueing for the upward cascade. Does not itself drive [`Self::propagate`] —
    /// callers that sit outside propagate's own loop (i.e. [`Self::face_finalize`])
    /// must call it afterwards; [`Self::form_one_higher_cube`] is invoked from inside
    /// that loop already and relies on it to continue the drain.
    fn on_cube_saturated(&self, state: &mut WorkingState, level: u32, mut cube: Cube) {
        if level == 1 {
            self.relocate_blocks_to_final_positions(&mut cube);
        }
        self.persist_cube(&cube);

        if level == 1 {
            self.events.publish(Notification::CubeComplete(Arc::new(CubeCompleteNotification {
                cube_id: cube.id(),
                level,
                face_count: cube.face_count(),
                validator_average_timestamp: cube.validator_average_timestamp,
                timestamp: cube.timestamp,
            })));
        } else {
            self.events.publish(Notification::SupercubeComplete(Arc::new(SupercubeCompleteNotification {
                cube_id: cube.id(),
                level,
                face_count: cube.face_count(),
                timestamp: cube.timestamp,
            })));
        }

        state.completed_cubes.entry(level).or_default().push_back(cube);
    }

    /// The final block-location mutation: once a cube's three faces are sorted and
    /// indexed, every constituent block's `faceIndex` and position are both known.
    fn relocate_blocks_to_final_positions(&self, cube: &mut Cube) {
        let Some(faces) = cube.sealed_faces() else { return };
        for face in faces {
            for (position, element) in face.placed().enumerate() {
                if let FaceElement::Block(block) = element {
                    block.write().relocate(Location::new(cube.level, cube.index, face.index, position as u8));
                    self.persist_block(block);
                }
            }
        }
    }

    /// Iteratively drains whatever thresholds were crossed at `start_level` and above,
    /// instead of recursing through `FormHigherFace`/`FormHigherCube` directly — bounds
    /// call-stack depth regardless of how many levels a large transaction volume
    /// eventually produces.
    fn propagate(&self, state: &mut WorkingState, start_level: u32) {
        let mut levels = vec![start_level];
        while let Some(level) = levels.pop() {
            while state.pending_faces.get(&level).map(|t| t.len()).unwrap_or(0) >= 3 {
                self.form_one_higher_cube(state, level);
                levels.push(level);
            }
            let next_level = level + 1;
            while state.completed_cubes.get(&level).map(|q| q.len()).unwrap_or(0) >= 9 {
                self.form_one_higher_face(state, level);
                levels.push(next_level);
            }
        }
    }

    /// `FormHigherFace`: drains 9 completed cubes at `level`, sorts them by id
    /// ascending — no timestamps at level ≥ 2 — and inserts the resulting face into
    /// the pending-face table for `level + 1`.
    fn form_one_higher_face(&self, state: &mut WorkingState, level: u32) {
        let queue = state.completed_cubes.entry(level).or_default();
        let mut batch: Vec<Cube> = (0..9).filter_map(|_| queue.pop_front()).collect();
        batch.sort_by(|a, b| a.id().cmp(&b.id()));

        let next_level = level + 1;
        let ts = unix_now_nanos();
        let mut face = Face::new(ts);
        for cube in batch {
            face.add(FaceElement::Cube(Arc::new(cube)));
        }
        state.pending_faces.entry(next_level).or_default().insert(ts, face);
        log::debug!("gossip: face created at level {next_level}, timestamp {ts}");
    }

    /// `FormHigherCube`: takes any 3 pending faces at `next_level`, sorts them by
    /// merkle root ascending, and constructs a fully-saturated cube in one shot.
    fn form_one_higher_cube(&self, state: &mut WorkingState, next_level: u32) {
        let table = state.pending_faces.entry(next_level).or_default();
        let keys: Vec<u64> = table.keys().take(3).copied().collect();
        let mut faces: Vec<Face> = keys.iter().filter_map(|ts| table.remove(ts)).collect();
        faces.sort_by(|a, b| a.merkle_root().cmp(&b.merkle_root()));

        let index = {
            let counter = state.cube_counters.entry(next_level).or_insert(0);
            let index = *counter;
            *counter += 1;
            index
        };
        let ts = unix_now_nanos();
        let mut cube = Cube::new(ts, index, next_level);
        for face in faces {
            cube.add_face(face);
        }
        self.on_cube_saturated(state, next_level, cube);
    }

    fn persist_block(&self, block: &BlockRef) {
        let snapshot = block.read().clone();
        let hash = snapshot.hash;
        if let Err(err) = self.blocks.write(DirectDbWriter::new(&self.db), hash, snapshot) {
            log::error!("failed to persist block {hash}: {err}");
        }
    }

    fn persist_cube(&self, cube: &Cube) {
        let Some(faces) = cube.sealed_faces() else { return };
        let mut roots = [Hash::ZERO; 3];
        for face in faces {
            roots[face.index as usize] = face.merkle_root();
        }
        let record = CubeRecord {
            id: cube.id(),
            hash: cube.hash(),
            level: cube.level,
            index: cube.index,
            timestamp: cube.timestamp,
            face_merkle_roots: roots,
            validator_average_timestamp: cube.validator_average_timestamp,
        };
        let key = record.hash;
        if let Err(err) = self.cubes.write(DirectDbWriter::new(&self.db), key, record) {
            log::error!("failed to persist cube {key}: {err}");
        }
    }
}

/// `tx.validation_timestamp or tx.timestamp or monotonic_now_ns()`, per block
/// construction. Accepts either a JSON number or a decimal-string encoding, since
/// canonicalized large integers round-trip as strings.
fn block_timestamp(tx_data: &TxData) -> u64 {
    read_u64_field(tx_data, "validationTimestamp")
        .or_else(|| read_u64_field(tx_data, "timestamp"))
        .unwrap_or_else(unix_now_nanos)
}

fn read_u64_field(tx_data: &TxData, field: &str) -> Option<u64> {
    let value = tx_data.get(field)?;
    value.as_u64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubic_database::{create_temp_db, prelude::ConnBuilder};
    use serde_json::json;

    fn ledger() -> (cubic_database::utils::DbLifetime, Ledger) {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default()).unwrap();
        (lifetime, Ledger::new(db, EventBus::new()))
    }

    fn utxo_tx(amount: u64, validation_timestamp_ns: u64) -> TxData {
        json!({"type": "utxo", "from": "A", "to": "B", "amount": amount, "validationTimestamp": validation_timestamp_ns})
    }

    #[test]
    fn rejects_invalid_transactions() {
        let (_lifetime, ledger) = ledger();
        assert!(ledger.admit(json!({"type": "utxo"})).is_err());
    }

    #[test]
    fn a_single_block_does_not_saturate_anything() {
        let (_lifetime, ledger) = ledger();
        let block = ledger.admit(utxo_tx(1, 1_000)).unwrap();
        assert_eq!(block.read().location.level, 1);
        let state = ledger.state.read();
        assert_eq!(state.pending_faces.get(&1).unwrap().values().next().unwrap().len(), 1);
    }

    #[test]
    fn nine_blocks_seal_exactly_one_level_one_face() {
        let (_lifetime, ledger) = ledger();
        for i in 0..9u64 {
            ledger.admit(utxo_tx(i, 1_000 * (i + 1))).unwrap();
        }
        let state = ledger.state.read();
        assert_eq!(state.pending_faces.get(&1).map(|t| t.len()).unwrap_or(0), 0);
        assert_eq!(state.cubes_in_progress.get(&1).unwrap().len(), 1);
    }

    #[test]
    fn twenty_seven_blocks_seal_one_level_one_cube() {
        let (_lifetime, ledger) = ledger();
        for i in 0..27u64 {
            ledger.admit(utxo_tx(i, 1_000 * (i + 1))).unwrap();
        }
        let state = ledger.state.read();
        assert_eq!(state.cubes_in_progress.get(&1).map(|t| t.len()).unwrap_or(0), 0);
        assert_eq!(state.completed_cubes.get(&1).unwrap().len(), 1);
        let cube = &state.completed_cubes.get(&1).unwrap()[0];
        assert!(cube.is_saturated());
        assert!(cube.validator_average_timestamp.is_some());
    }

    #[test]
    fn two_hundred_forty_three_blocks_seal_one_level_two_cube() {
        let (_lifetime, ledger) = ledger();
        for i in 0..243u64 {
            ledger.admit(utxo_tx(i, 1_000 * (i + 1))).unwrap();
        }
        let state = ledger.state.read();
        assert_eq!(state.completed_cubes.get(&1).map(|q| q.len()).unwrap_or(0), 0);
        assert_eq!(state.completed_cubes.get(&2).map(|q| q.len()).unwrap_or(0), 1);
        assert!(state.completed_cubes.get(&2).unwrap()[0].is_saturated());
    }

    /// §9 is explicit that level-1 grouping is insertion-order, not content-addressed,
    /// so two nodes admitting the same transactions in a different order *can* produce
    /// different level-1 partitions. What must converge is levels ≥ 2, which sort
    /// purely by content hash — exercised directly on [`Face`]/[`Cube`] in
    /// `double_sorting_invariant_tests` below, without going through insertion-order
    /// sensitive admission.
    #[test]
    fn same_transaction_stream_produces_a_saturated_level_two_cube() {
        let (_lifetime, ledger) = ledger();
        for i in 0..243u64 {
            ledger.admit(utxo_tx(i, 1_000 * (i + 1))).unwrap();
        }
        let state = ledger.state.read();
        let cube = &state.completed_cubes.get(&2).unwrap()[0];
        assert!(cube.is_saturated());
        assert_eq!(cube.validator_average_timestamp, None);
    }
}

#[cfg(test)]
mod double_sorting_invariant_tests {
    use crate::cube::Cube;
    use crate::element::FaceElement;
    use crate::face::Face;
    use cubic_hashes::Hash;
    use std::sync::Arc;

    fn saturated_cube(seed: u8, level: u32) -> Cube {
        let mut cube = Cube::new(seed as u64, seed as u64, level);
        for f in 0..3u8 {
            let mut face = Face::new((seed as u64) * 10 + f as u64);
            for b in 0..9u8 {
                let byte = seed.wrapping_mul(31).wrapping_add(f * 9 + b);
                let block_hash = Hash::from_bytes([byte; 32]);
                let block = std::sync::Arc::new(parking_lot::RwLock::new(crate::block::Block::new(
                    serde_json::json!({}),
                    block_hash,
                    1,
                )));
                face.add(FaceElement::Block(block));
            }
            cube.add_face(face);
        }
        cube
    }

    /// Scenario 6: the same 9 level-1 cubes, fed to a level-2 face in reverse order,
    /// still sort themselves into an identical merkle root — ordering depends only on
    /// cube ids, never on arrival order.
    #[test]
    fn face_of_cubes_is_order_independent() {
        let mut forward = Face::new(1);
        for id in [0, 1, 2, 3, 4, 5, 6, 7, 8] {
            forward.add(FaceElement::Cube(Arc::new(saturated_cube(id, 1))));
        }
        let mut reversed = Face::new(2);
        for id in [8, 7, 6, 5, 4, 3, 2, 1, 0] {
            reversed.add(FaceElement::Cube(Arc::new(saturated_cube(id, 1))));
        }

        assert_eq!(forward.merkle_root(), reversed.merkle_root());
    }

    #[test]
    fn cube_of_faces_is_order_independent() {
        let make_face = |seed: u8| {
            let mut face = Face::new(seed as u64);
            for b in 0..9u8 {
                let hash = Hash::from_bytes([seed.wrapping_mul(7).wrapping_add(b); 32]);
                let block = Arc::new(parking_lot::RwLock::new(crate::block::Block::new(serde_json::json!({}), hash, 1)));
                face.add(FaceElement::Block(block));
            }
            face
        };

        let mut forward = Cube::new(1, 0, 1);
        forward.add_face(make_face(1));
        forward.add_face(make_face(2));
        forward.add_face(make_face(3));

        let mut reversed = Cube::new(2, 0, 1);
        reversed.add_face(make_face(3));
        reversed.add_face(make_face(2));
        reversed.add_face(make_face(1));

        assert_eq!(forward.id(), reversed.id());
    }
}
