use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use certsmith_core::IssueError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    #[allow(clippy::enum_variant_names)]
    ConfigError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    #[allow(clippy::enum_variant_names)]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Issue(#[from] IssueError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not acceptable: {0}")]
    NotAcceptable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ConfigError(_) | AppError::IoError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::Issue(IssueError::InvalidDays(_)) => StatusCode::BAD_REQUEST,
            AppError::Issue(e) if e.is_interrupted() => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T, E = AppError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotAcceptable("x".into()).status(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            AppError::from(IssueError::InvalidDays(0)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(IssueError::Canceled).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(IssueError::Timeout(Duration::from_secs(1))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(IssueError::KeyGen(Box::new(IssueError::Io(
                std::io::Error::other("x")
            ))))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
