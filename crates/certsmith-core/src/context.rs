use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::models::RequestId;

/// Request descriptor carried through one issuance call
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
    /// Budget the deadline was derived from
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            cancel: CancellationToken::new(),
            deadline: None,
            timeout: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self.timeout = Some(timeout);
        self
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(RequestId::new())
    }
}
