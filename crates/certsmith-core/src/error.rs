//! Error types for the issuance pipeline

use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

/// Issuance error
#[derive(Error, Debug)]
pub enum IssueError {
    /// The per-request workspace could not be created or written
    #[error("workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool binary could not be started
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully
    #[error("`{command}` exited with {status}: {stderr}")]
    Execution {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Private key generation failed
    #[error("key generation failed: {0}")]
    KeyGen(#[source] Box<IssueError>),

    /// Signing request generation failed
    #[error("signing request generation failed: {0}")]
    CsrGen(#[source] Box<IssueError>),

    /// Certificate signing failed
    #[error("certificate signing failed: {0}")]
    Signing(#[source] Box<IssueError>),

    /// Public key extraction failed
    #[error("public key extraction failed: {0}")]
    PubKeyExtract(#[source] Box<IssueError>),

    /// The caller withdrew the request
    #[error("issuance canceled")]
    Canceled,

    /// The request deadline elapsed while a tool was running
    #[error("issuance timed out after {0:?}")]
    Timeout(Duration),

    /// Reading back an intermediate artifact failed
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Validity period must be at least one day
    #[error("days must be at least 1, got {0}")]
    InvalidDays(u32),

    /// Root certificate or key is unusable
    #[error("root authority unavailable at {path}: {source}")]
    RootAuthority {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IssueError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, IssueError::Canceled)
    }

    /// Whether the error came from cancellation or the deadline
    pub fn is_interrupted(&self) -> bool {
        matches!(self, IssueError::Canceled | IssueError::Timeout(_))
    }

    /// Wrap a step failure into its step error kind.
    ///
    /// Interruptions pass through unwrapped so callers can tell them apart.
    pub(crate) fn in_step(self, wrap: fn(Box<IssueError>) -> IssueError) -> IssueError {
        if self.is_interrupted() {
            self
        } else {
            wrap(Box::new(self))
        }
    }
}

pub type Result<T, E = IssueError> = core::result::Result<T, E>;
