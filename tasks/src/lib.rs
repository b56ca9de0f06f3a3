use cubic_hashes::Hash;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One validation task assigned to a single validator for a single raw transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationTask {
    pub raw_tx_id: Hash,
    pub validator_id: String,
    pub complete: bool,
}

impl ValidationTask {
    fn new(raw_tx_id: Hash, validator_id: String) -> Self {
        Self { raw_tx_id, validator_id, complete: false }
    }

    /// The task's unique name: `"{raw_tx_id}:{validator_id}:validate"`.
    pub fn name(&self) -> String {
        task_name(self.raw_tx_id, &self.validator_id)
    }
}

pub fn task_name(raw_tx_id: Hash, validator_id: &str) -> String {
    format!("{raw_tx_id}:{validator_id}:validate")
}

/// Tracks one validation task per `(raw_tx_id, validator_id)` pair, queued per
/// validator. Task completion is a no-op on an unknown task: validators may crash
/// and retry, and a stale or duplicate report must never be treated as an error.
#[derive(Default)]
pub struct TaskManager {
    // validator_id -> task_name -> task
    queues: RwLock<HashMap<String, HashMap<String, ValidationTask>>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces one task per validator, all `complete=false`. Does not store them —
    /// call [`Self::assign`] to enqueue the returned tasks.
    pub fn create_tasks(&self, raw_tx_id: Hash, validator_list: &[String]) -> Vec<ValidationTask> {
        validator_list.iter().map(|validator_id| ValidationTask::new(raw_tx_id, validator_id.clone())).collect()
    }

    /// Stores each task in its validator's queue.
    pub fn assign(&self, task_list: &[ValidationTask]) {
        let mut queues = self.queues.write();
        for task in task_list {
            queues.entry(task.validator_id.clone()).or_default().insert(task.name(), task.clone());
        }
    }

    /// Marks a task complete. A missing task is a silent no-op, not an error.
    pub fn complete(&self, validator_id: &str, task_name: &str) {
        let mut queues = self.queues.write();
        if let Some(queue) = queues.get_mut(validator_id) {
            if let Some(task) = queue.get_mut(task_name) {
                task.complete = true;
            }
        }
    }

    pub fn get(&self, validator_id: &str, task_name: &str) -> Option<ValidationTask> {
        self.queues.read().get(validator_id).and_then(|queue| queue.get(task_name)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assign_complete_get_round_trip() {
        let manager = TaskManager::new();
        let raw_tx_id = Hash::from_bytes([1u8; 32]);
        let validators = vec!["v1".to_string(), "v2".to_string(), "v3".to_string()];
        let tasks = manager.create_tasks(raw_tx_id, &validators);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| !t.complete));

        manager.assign(&tasks);
        let name = task_name(raw_tx_id, "v1");
        assert_eq!(manager.get("v1", &name).unwrap().complete, false);

        manager.complete("v1", &name);
        assert!(manager.get("v1", &name).unwrap().complete);
    }

    #[test]
    fn completing_unknown_task_is_a_silent_no_op() {
        let manager = TaskManager::new();
        manager.complete("nobody", "bogus:task:validate");
        assert!(manager.get("nobody", "bogus:task:validate").is_none());
    }

    #[test]
    fn task_name_format() {
        let raw_tx_id = Hash::from_bytes([2u8; 32]);
        assert_eq!(task_name(raw_tx_id, "v1"), format!("{raw_tx_id}:v1:validate"));
    }
}
