use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};
use tokio::sync::broadcast;

use super::{event_channel, KeyValueStore, StorageEvent};
use crate::error::StorageError;

/// One file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            events: event_channel(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Tell subscribers that something outside this process changed `key`.
    pub fn announce_external_change(&self, key: &str) {
        let _ = self.events.send(StorageEvent::new(key));
    }
}

fn secure_write(path: &Path, content: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        secure_write(&self.path_for(key), value)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("worklog-rows").unwrap(), None);
    }

    #[test]
    fn writes_create_the_directory_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("worklog"));

        store.set("selected-date", "2024-01-05").unwrap();
        assert_eq!(
            store.get("selected-date").unwrap().as_deref(),
            Some("2024-01-05")
        );

        store.set("selected-date", "2024-01-06").unwrap();
        assert_eq!(
            store.get("selected-date").unwrap().as_deref(),
            Some("2024-01-06")
        );
    }

    #[cfg(unix)]
    #[test]
    fn files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("worklog-rows", "[]").unwrap();

        let mode = std::fs::metadata(dir.path().join("worklog-rows"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn announced_changes_reach_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut events = store.subscribe();

        store.announce_external_change("worklog-rows");
        assert_eq!(events.try_recv().unwrap(), StorageEvent::new("worklog-rows"));
    }
}
