//! Issuance request form

use certsmith_core::IssueInput;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, Result};

pub const CONFLICTING_INPUT: &str = "either should be present csr or config";

/// Multipart form of `POST /issuing/cert`
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct IssueRequest {
    /// Certificate validity in days
    #[validate(range(min = 1))]
    pub days: u32,

    /// PEM signing request to sign as is
    #[schema(value_type = Option<String>, format = Binary)]
    pub csr: Option<Vec<u8>>,

    /// openssl `req` configuration used to generate key and request
    #[schema(value_type = Option<String>, format = Binary)]
    pub config: Option<Vec<u8>>,
}

impl IssueRequest {
    /// Validate the form and turn it into pipeline input.
    pub fn into_input(self) -> Result<(u32, IssueInput)> {
        self.validate()?;
        let days = self.days;
        let input = IssueInput::from_parts(self.config, self.csr)
            .ok_or_else(|| AppError::BadRequest(CONFLICTING_INPUT.to_string()))?;
        Ok((days, input))
    }
}
