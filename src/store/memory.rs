use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::slot::SlotRecord;

/// The key-value collection the slot store is written against: get-one,
/// set-one (full overwrite), delete-one, delete-all, list-all.
///
/// Each call is atomic on its own, but nothing ties a get to a following
/// set. Callers that check-then-act span two calls and accept the race
/// window that comes with it.
#[async_trait]
pub trait SlotBackend: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Option<SlotRecord>;
    async fn set(&self, key: &str, record: SlotRecord);
    async fn delete(&self, key: &str);
    async fn delete_all(&self);
    async fn all(&self) -> Vec<(String, SlotRecord)>;
}

/// In-process backend. The mutex is held only for the duration of a single
/// operation, so writes land in lock-acquisition order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, SlotRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Option<SlotRecord> {
        self.slots.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, record: SlotRecord) {
        self.slots.lock().unwrap().insert(key.to_string(), record);
    }

    async fn delete(&self, key: &str) {
        self.slots.lock().unwrap().remove(key);
    }

    async fn delete_all(&self) {
        self.slots.lock().unwrap().clear();
    }

    async fn all(&self) -> Vec<(String, SlotRecord)> {
        self.slots
            .lock()
            .unwrap()
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect()
    }
}
