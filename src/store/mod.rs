pub mod memory;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;

use crate::error::{Result, SlotError};
use crate::slot::{slot_key, total_minutes, Slot, SlotRecord};
use memory::{MemoryBackend, SlotBackend};

/// Snapshots are full-state, so a subscriber that falls behind can safely
/// skip intermediates; the buffer just bounds how far behind it may drift.
const SNAPSHOT_BUFFER: usize = 64;

/// The operations clients run against the shared slot collection.
///
/// Every mutation is a whole-record read-modify-write against the backend,
/// followed by a snapshot push to all subscribers. The duplicate-slot and
/// duplicate-signup checks are check-then-act: two callers racing past the
/// same check can both write, and the later full-record write wins. The
/// backend offers no conditional write, so that window is a known
/// limitation of these operations.
#[derive(Clone)]
pub struct SlotStore {
    backend: Arc<dyn SlotBackend>,
    snapshots: broadcast::Sender<Vec<Slot>>,
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStore {
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    pub fn with_backend(backend: Arc<dyn SlotBackend>) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_BUFFER);
        Self { backend, snapshots }
    }

    /// Creates a new slot with an empty attendee list.
    ///
    /// Rejects an inverted or empty time range before touching the backend,
    /// then refuses to overwrite an existing slot with the same key.
    pub async fn create_slot(
        &self,
        date: &str,
        start_hour: u8,
        start_minute: u8,
        end_hour: u8,
        end_minute: u8,
    ) -> Result<Slot> {
        if date.trim().is_empty() {
            return Err(SlotError::MissingDate);
        }
        // Keys and snapshot ordering both rely on dates being YYYY-MM-DD,
        // where lexicographic order is chronological order.
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(SlotError::InvalidDate(date.to_string()));
        }
        if start_hour > 23 || end_hour > 23 || start_minute > 59 || end_minute > 59 {
            return Err(SlotError::InvalidTime);
        }
        if total_minutes(end_hour, end_minute) <= total_minutes(start_hour, start_minute) {
            return Err(SlotError::InvalidRange);
        }

        let key = slot_key(date, start_hour, start_minute, end_hour, end_minute);
        if self.backend.get(&key).await.is_some() {
            return Err(SlotError::SlotExists);
        }

        let record = SlotRecord {
            date: date.to_string(),
            start_hour,
            start_minute,
            end_hour,
            end_minute,
            attendees: Vec::new(),
            created_at: Utc::now().timestamp_millis(),
        };
        self.backend.set(&key, record.clone()).await;
        self.publish().await;

        Ok(Slot { key, record })
    }

    /// Appends `name` to the slot's attendee list. Matching is exact and
    /// case-sensitive; the caller is expected to have trimmed the input.
    pub async fn add_attendee(&self, key: &str, name: &str) -> Result<()> {
        let mut record = self
            .backend
            .get(key)
            .await
            .ok_or(SlotError::SlotNotFound)?;

        if record.attendees.iter().any(|n| n == name) {
            return Err(SlotError::AlreadySignedUp);
        }

        record.attendees.push(name.to_string());
        self.backend.set(key, record).await;
        self.publish().await;
        Ok(())
    }

    /// Removes `name` from the slot's attendee list. Removing a name that is
    /// not on the list succeeds as a no-op.
    pub async fn remove_attendee(&self, key: &str, name: &str) -> Result<()> {
        let mut record = self
            .backend
            .get(key)
            .await
            .ok_or(SlotError::SlotNotFound)?;

        let before = record.attendees.len();
        record.attendees.retain(|n| n != name);
        if record.attendees.len() == before {
            return Ok(());
        }

        self.backend.set(key, record).await;
        self.publish().await;
        Ok(())
    }

    /// Deletes the slot unconditionally.
    pub async fn remove_slot(&self, key: &str) {
        self.backend.delete(key).await;
        self.publish().await;
    }

    /// Deletes every slot unconditionally.
    pub async fn clear_all(&self) {
        self.backend.delete_all().await;
        self.publish().await;
    }

    /// The current collection, sorted by date ascending then start time
    /// ascending.
    pub async fn snapshot(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .backend
            .all()
            .await
            .into_iter()
            .map(|(key, record)| Slot { key, record })
            .collect();
        slots.sort_by(|a, b| {
            a.record
                .date
                .cmp(&b.record.date)
                .then(a.record.start_minutes().cmp(&b.record.start_minutes()))
        });
        slots
    }

    /// Registers for snapshot pushes. The current snapshot is delivered
    /// first, then one snapshot per change; dropping the handle releases the
    /// subscription.
    pub async fn subscribe(&self) -> Subscription {
        Subscription {
            pending: Some(self.snapshot().await),
            rx: self.snapshots.subscribe(),
        }
    }

    async fn publish(&self) {
        // No subscribers is fine
        let _ = self.snapshots.send(self.snapshot().await);
    }
}

/// A live feed of slot collection snapshots.
pub struct Subscription {
    pending: Option<Vec<Slot>>,
    rx: broadcast::Receiver<Vec<Slot>>,
}

impl Subscription {
    /// The next snapshot, or `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Vec<Slot>> {
        if let Some(first) = self.pending.take() {
            return Some(first);
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                // Skipped intermediates are harmless, each snapshot is the
                // whole collection
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
