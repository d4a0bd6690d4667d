use std::{sync::Arc, time::Duration};

use certsmith_core::Issuer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<Issuer>,
    /// Budget of one issuance request
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(issuer: Issuer, request_timeout: Option<Duration>) -> Self {
        Self {
            issuer: Arc::new(issuer),
            request_timeout,
        }
    }
}
