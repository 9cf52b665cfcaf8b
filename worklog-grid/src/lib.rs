pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod details;
pub mod draft;
pub mod error;
pub mod grid;
pub mod page;
pub mod row_store;
pub mod storage;
pub mod time_codec;
pub mod time_utils;

pub use bootstrap::open_page;
pub use config::WorklogConfig;
pub use details::{DetailsEditor, DetailsState};
pub use draft::{DraftController, DraftState, FieldUpdate};
pub use error::{EditRejected, StorageError};
pub use grid::{GridRow, GridView, Pager, PAGE_SIZE};
pub use page::{DailyWorklogPage, SubmitOutcome, SubmitPhase};
pub use row_store::RowStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageEvent};
pub use time_codec::HoursMinutes;
pub use worklog_api::{RowId, SubmitRequest, WorklogRow};
