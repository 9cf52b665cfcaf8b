use thiserror::Error;
use worklog_api::RowId;

/// Failure of the key-value store behind the persisted mirror.
///
/// These never reach the user: reads fall back to "no data" and writes are
/// logged and dropped.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage quota exceeded while writing {0}")]
    QuotaExceeded(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An edit the grid refused to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("No row is in edit mode")]
    NotEditing,
    #[error("Row {0} does not exist")]
    RowMissing(RowId),
    #[error("Unknown client: {0}")]
    UnknownClient(String),
    #[error("SOW {sow} is not offered for this client")]
    SowNotOffered { sow: String },
    #[error("Hours must be between 0 and 12, got {0}")]
    HoursOutOfRange(u32),
    #[error("Minutes must be one of 0, 15, 30 or 45, got {0}")]
    MinutesNotOffered(u32),
    #[error("Details editor is not open")]
    DetailsClosed,
    #[error("This row is not in edit mode. Click Edit on the row to modify details.")]
    DetailsReadOnly,
}
