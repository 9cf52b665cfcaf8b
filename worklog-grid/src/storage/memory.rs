use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{event_channel, KeyValueStore, StorageEvent};
use crate::error::StorageError;

/// Process-local store, also used to simulate other contexts in tests.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    reject_writes: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            events: event_channel(),
            reject_writes: AtomicBool::new(false),
            write_count: AtomicUsize::new(0),
        }
    }

    /// Seed an entry without counting it as a write.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Make every following `set` fail as if the quota were exhausted.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of successful writes made through `set`.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Write `key` as another context would, notifying subscribers.
    pub fn write_external(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        let _ = self.events.send(StorageEvent::new(key));
    }

    /// Current raw value, bypassing error handling.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded(key.to_string()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn rejected_writes_leave_value_untouched() {
        let store = MemoryStore::new().with_entry("k", "old");
        store.set_reject_writes(true);

        let err = store.set("k", "new").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded(_)));
        assert_eq!(store.raw("k").as_deref(), Some("old"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn external_writes_notify_subscribers_but_own_writes_do_not() {
        let store = MemoryStore::new();
        let mut events = store.subscribe();

        store.set("k", "mine").unwrap();
        assert!(events.try_recv().is_err());

        store.write_external("k", "theirs");
        assert_eq!(events.try_recv().unwrap(), StorageEvent::new("k"));
        assert_eq!(store.raw("k").as_deref(), Some("theirs"));
    }
}
