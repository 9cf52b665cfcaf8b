//! In-process submit backend for tests and offline runs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::client::{SubmitApi, SubmitError};
use crate::models::SubmitRequest;

/// Records every request and answers with a configurable outcome.
///
/// # Examples
///
/// ```
/// use worklog_api::RecordingSubmitter;
///
/// // Accept everything
/// let api = RecordingSubmitter::accepting();
///
/// // Answer like a server returning 500 "server error"
/// let api = RecordingSubmitter::rejecting(500, "server error");
/// ```
#[derive(Debug, Clone)]
pub struct RecordingSubmitter {
    requests: Arc<Mutex<Vec<SubmitRequest>>>,
    outcome: Arc<Mutex<Result<(), SubmitError>>>,
}

impl RecordingSubmitter {
    pub fn accepting() -> Self {
        Self::with_outcome(Ok(()))
    }

    pub fn rejecting(status: u16, body: &str) -> Self {
        Self::with_outcome(Err(SubmitError::rejected(status, body)))
    }

    pub fn unreachable(message: &str) -> Self {
        Self::with_outcome(Err(SubmitError::Transport(message.to_string())))
    }

    fn with_outcome(outcome: Result<(), SubmitError>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            outcome: Arc::new(Mutex::new(outcome)),
        }
    }

    /// Change the answer given to subsequent requests.
    pub fn set_outcome(&self, outcome: Result<(), SubmitError>) {
        *self.outcome.lock().expect("submit outcome lock poisoned") = outcome;
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<SubmitRequest> {
        self.requests
            .lock()
            .expect("submit request log lock poisoned")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("submit request log lock poisoned")
            .len()
    }
}

impl Default for RecordingSubmitter {
    fn default() -> Self {
        Self::accepting()
    }
}

#[async_trait]
impl SubmitApi for RecordingSubmitter {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), SubmitError> {
        self.requests
            .lock()
            .expect("submit request log lock poisoned")
            .push(request.clone());
        self.outcome
            .lock()
            .expect("submit outcome lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn request() -> SubmitRequest {
        SubmitRequest {
            date: date!(2024 - 01 - 05),
            items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn records_requests_in_order() {
        let api = RecordingSubmitter::accepting();

        api.submit(&request()).await.unwrap();
        let mut second = request();
        second.date = date!(2024 - 01 - 06);
        api.submit(&second).await.unwrap();

        let requests = api.requests();
        assert_eq!(api.call_count(), 2);
        assert_eq!(requests[0].date, date!(2024 - 01 - 05));
        assert_eq!(requests[1].date, date!(2024 - 01 - 06));
    }

    #[tokio::test]
    async fn outcome_can_be_switched() {
        let api = RecordingSubmitter::rejecting(500, "server error");
        assert_eq!(
            api.submit(&request()).await.unwrap_err().to_string(),
            "server error"
        );

        api.set_outcome(Ok(()));
        assert!(api.submit(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_the_request_log() {
        let api = RecordingSubmitter::unreachable("connection refused");
        let handle = api.clone();

        let err = api.submit(&request()).await.unwrap_err();
        assert_eq!(err, SubmitError::Transport("connection refused".to_string()));
        assert_eq!(handle.call_count(), 1);
    }
}
