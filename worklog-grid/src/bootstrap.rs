use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use worklog_api::HttpSubmitClient;

use crate::config::WorklogConfig;
use crate::page::DailyWorklogPage;
use crate::storage::FileStore;

/// Open the page against the file store and HTTP backend named by `config`.
pub fn open_page(config: &WorklogConfig) -> Result<DailyWorklogPage> {
    let data_path = config.data_path()?;
    let api = HttpSubmitClient::new(&config.api_url, &config.submit_path)
        .with_context(|| format!("Failed to set up submit client for {}", config.api_url))?;
    let store = Arc::new(FileStore::new(data_path));
    info!(
        "Opening worklog with data in {} submitting to {}",
        store.root().display(),
        api.endpoint()
    );

    Ok(DailyWorklogPage::open(store, Arc::new(api)))
}
