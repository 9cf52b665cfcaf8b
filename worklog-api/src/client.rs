use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::models::SubmitRequest;

/// The backend that accepts a day's worklog entries.
#[async_trait]
pub trait SubmitApi: Send + Sync {
    /// Send `request`. Any 2xx response counts as accepted.
    async fn submit(&self, request: &SubmitRequest) -> Result<(), SubmitError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The server answered with a non-2xx status.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("{0}")]
    Transport(String),
    #[error("Invalid submit endpoint: {0}")]
    InvalidEndpoint(String),
}

impl SubmitError {
    /// Build a rejection from a response status and its body text.
    ///
    /// The body is the detail when present, otherwise `HTTP {status}`.
    pub fn rejected(status: u16, body: &str) -> Self {
        let body = body.trim();
        let detail = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        };
        SubmitError::Rejected { status, detail }
    }
}

#[derive(Debug, Clone)]
pub struct HttpSubmitClient {
    client: Client,
    endpoint: Url,
}

impl HttpSubmitClient {
    pub fn new(base_url: &str, submit_path: &str) -> Result<Self, SubmitError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SubmitError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        let endpoint = base_url
            .join(submit_path)
            .map_err(|e| SubmitError::InvalidEndpoint(format!("{submit_path}: {e}")))?;

        let client = Client::builder()
            .build()
            .map_err(|e| SubmitError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmitApi for HttpSubmitClient {
    #[instrument(skip(self, request), fields(date = %request.date, items = request.items.len()))]
    async fn submit(&self, request: &SubmitRequest) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let _ = response.bytes().await;
            tracing::debug!("submit accepted with status {}", status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("submit rejected with status {}", status);
        Err(SubmitError::rejected(status.as_u16(), &body))
    }
}
