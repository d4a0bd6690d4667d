//! # certsmith
//!
//! Certificate issuance service built around the `openssl` tool.
//!
//! ## Crates
//!
//! - `certsmith_core` - workspaces, process invocation and the issuance pipeline
//! - `certsmith-server` - HTTP front end packaging bundles as tar or zip archives

// Re-export the core crate
pub use certsmith_core;
pub use certsmith_core::{Issuer, IssuerConfig, ProducedBundle};
