//! The ordered row collection and its persisted mirror.

use tokio::sync::watch;
use tracing::{debug, warn};
use worklog_api::{RowId, WorklogRow};

use crate::error::StorageError;
use crate::storage::{SharedStore, ROWS_KEY};

/// In-memory rows, written through to the key-value store on every change.
///
/// The in-memory collection is authoritative for the session: a failed write is
/// logged and the mutation stands.
pub struct RowStore {
    rows: Vec<WorklogRow>,
    store: SharedStore,
    changes: watch::Sender<Vec<WorklogRow>>,
}

impl RowStore {
    /// Open the store with whatever the persisted mirror currently holds.
    pub fn open(store: SharedStore) -> Self {
        let rows = read_rows(&store);
        let (changes, _) = watch::channel(rows.clone());
        Self {
            rows,
            store,
            changes,
        }
    }

    /// Read the persisted mirror. Absent or malformed data reads as empty.
    pub fn load(&self) -> Vec<WorklogRow> {
        read_rows(&self.store)
    }

    pub fn rows(&self) -> &[WorklogRow] {
        &self.rows
    }

    pub fn get(&self, id: RowId) -> Option<&WorklogRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.get(id).is_some()
    }

    /// Receiver that sees the full collection after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<WorklogRow>> {
        self.changes.subscribe()
    }

    pub fn replace_all(&mut self, rows: Vec<WorklogRow>) -> &[WorklogRow] {
        self.rows = dedupe(rows);
        self.write_through();
        &self.rows
    }

    /// Append `row`. A row whose id is already present is ignored.
    pub fn add(&mut self, row: WorklogRow) -> &[WorklogRow] {
        if self.contains(row.id) {
            debug!("Ignoring add of existing row {}", row.id);
            return &self.rows;
        }
        self.rows.push(row);
        self.write_through();
        &self.rows
    }

    /// Replace the row with the same id. Unknown ids leave the collection as is.
    pub fn update(&mut self, row: WorklogRow) -> &[WorklogRow] {
        let Some(slot) = self.rows.iter_mut().find(|r| r.id == row.id) else {
            debug!("Ignoring update of unknown row {}", row.id);
            return &self.rows;
        };
        *slot = row;
        self.write_through();
        &self.rows
    }

    pub fn remove(&mut self, id: RowId) -> &[WorklogRow] {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        if self.rows.len() != before {
            self.write_through();
        }
        &self.rows
    }

    /// Replace the in-memory rows with the persisted mirror, without writing back.
    ///
    /// Used when another context changed the mirror; the last writer wins.
    pub fn reload(&mut self) -> &[WorklogRow] {
        self.rows = self.load();
        debug!("Reloaded {} worklog rows from storage", self.rows.len());
        self.changes.send_replace(self.rows.clone());
        &self.rows
    }

    fn write_through(&mut self) {
        if let Err(e) = self.persist() {
            warn!("Failed to persist worklog rows: {}", e);
        }
        self.changes.send_replace(self.rows.clone());
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.rows)?;
        self.store.set(ROWS_KEY, &raw)
    }
}

fn read_rows(store: &SharedStore) -> Vec<WorklogRow> {
    let raw = match store.get(ROWS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read worklog rows: {}", e);
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring malformed worklog rows: {}", e);
            return Vec::new();
        }
    };

    // One unreadable row must not cost the others.
    let rows = entries
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, entry)| match serde_json::from_value::<WorklogRow>(entry) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Skipping unreadable worklog row {}: {}", index, e);
                    None
                }
            },
        )
        .collect();
    dedupe(rows)
}

/// Keep the first row for every id.
fn dedupe(rows: Vec<WorklogRow>) -> Vec<WorklogRow> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter().filter(|row| seen.insert(row.id)).collect()
}
