//! # certsmith-core
//!
//! X.509 certificate issuance driven by the `openssl` command line tool.
//!
//! ## Modules
//!
//! - `workspace` - isolated per-request scratch directories
//! - `invoker` - external tool execution behind the `ProcessInvoker` trait
//! - `commands` - openssl argument lists for each pipeline step
//! - `pipeline` - the `Issuer` and its two issuance modes
//! - `assembler` - bundling of produced artifacts
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use certsmith_core::{
//!     Issuer, IssuerConfig, RequestContext, ScratchRoot, SubprocessInvoker, ToolConfig,
//! };
//!
//! # async fn run() -> certsmith_core::Result<()> {
//! let scratch = ScratchRoot::init_default()?;
//! let issuer = Issuer::new(IssuerConfig::new(
//!     "assets/ssl/root.crt",
//!     "assets/ssl/root.key",
//!     scratch,
//!     Arc::new(SubprocessInvoker::new()),
//! ))?;
//!
//! let config = ToolConfig(b"[req]\nprompt=no\ndistinguished_name=dn\n[dn]\nCN=example.com\n".to_vec());
//! let bundle = issuer
//!     .issue_from_config(&RequestContext::default(), 365, config)
//!     .await?;
//! assert!(bundle.private_key.is_some());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod commands;
pub mod context;
pub mod error;
pub mod invoker;
pub mod models;
pub mod pipeline;
pub mod workspace;

pub use context::RequestContext;
pub use error::{IssueError, Result};
pub use invoker::{Invocation, ProcessInvoker, RecordingInvoker, SubprocessInvoker, ToolStep};
pub use models::{
    Certificate, Csr, IssueInput, Key, Payload, ProducedBundle, RequestId, ToolConfig,
};
pub use pipeline::{Issuer, IssuerConfig};
pub use workspace::{ScratchRoot, WorkspaceFile, WorkspaceHandle, WorkspaceManager};
