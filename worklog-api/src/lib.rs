mod client;
mod mock;
mod models;

pub use client::{HttpSubmitClient, SubmitApi, SubmitError};
pub use mock::RecordingSubmitter;
pub use models::{RowId, SubmitRequest, WorklogRow};
