//! Key-value persistence behind the row collection and the selected date.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::StorageError;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the ordered row collection as JSON.
pub const ROWS_KEY: &str = "worklog-rows";

/// Key holding the last selected date as `YYYY-MM-DD`.
pub const SELECTED_DATE_KEY: &str = "selected-date";

const EVENT_CAPACITY: usize = 16;

/// Announces that another context wrote `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Changes made by other contexts. Writes made through `set` are not echoed.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

fn event_channel() -> broadcast::Sender<StorageEvent> {
    broadcast::channel(EVENT_CAPACITY).0
}
