//! Issuance pipeline
//!
//! Drives key generation, request generation, signing and public key
//! extraction in strict order inside a fresh workspace. The first failing
//! step aborts the request; the workspace is destroyed on every exit path.

use std::{path::PathBuf, sync::Arc};

use tracing::info;

use crate::{
    assembler::{assemble_generated, assemble_signed},
    commands::OpenSslCommands,
    context::RequestContext,
    error::{IssueError, Result},
    invoker::{Invocation, ProcessInvoker},
    models::{Certificate, Csr, IssueInput, ProducedBundle, ToolConfig},
    workspace::{ScratchRoot, WorkspaceFile, WorkspaceHandle, WorkspaceManager},
};

/// Default tool binary
pub const DEFAULT_PROGRAM: &str = "openssl";

/// Construction options of an [`Issuer`]
pub struct IssuerConfig {
    pub root_cert_path: PathBuf,
    pub root_key_path: PathBuf,
    pub scratch: Arc<ScratchRoot>,
    /// Keep workspaces after each request for inspection
    pub retain_workspaces: bool,
    pub invoker: Arc<dyn ProcessInvoker>,
    pub program: String,
}

impl IssuerConfig {
    pub fn new(
        root_cert_path: impl Into<PathBuf>,
        root_key_path: impl Into<PathBuf>,
        scratch: Arc<ScratchRoot>,
        invoker: Arc<dyn ProcessInvoker>,
    ) -> Self {
        Self {
            root_cert_path: root_cert_path.into(),
            root_key_path: root_key_path.into(),
            scratch,
            retain_workspaces: false,
            invoker,
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    pub fn retain_workspaces(mut self, retain: bool) -> Self {
        self.retain_workspaces = retain;
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// Certificate issuance orchestrator
///
/// Holds only immutable state; share it between tasks with `Arc`.
pub struct Issuer {
    root_certificate: Certificate,
    commands: OpenSslCommands,
    workspaces: WorkspaceManager,
    invoker: Arc<dyn ProcessInvoker>,
}

impl Issuer {
    /// Load the root certificate and verify the root key is readable.
    pub fn new(config: IssuerConfig) -> Result<Self> {
        let payload = std::fs::read(&config.root_cert_path).map_err(|source| {
            IssueError::RootAuthority {
                path: config.root_cert_path.clone(),
                source,
            }
        })?;
        std::fs::File::open(&config.root_key_path).map_err(|source| {
            IssueError::RootAuthority {
                path: config.root_key_path.clone(),
                source,
            }
        })?;

        let form = config
            .root_cert_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pem".to_string());

        info!(
            root = %config.root_cert_path.display(),
            form = %form,
            retain = config.retain_workspaces,
            "issuer ready"
        );

        Ok(Self {
            root_certificate: Certificate::new(form, payload),
            commands: OpenSslCommands::new(
                config.program,
                config.root_cert_path,
                config.root_key_path,
            ),
            workspaces: WorkspaceManager::new(config.scratch, config.retain_workspaces),
            invoker: config.invoker,
        })
    }

    pub fn root_certificate(&self) -> &Certificate {
        &self.root_certificate
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Issue for either kind of caller input.
    pub async fn issue(
        &self,
        ctx: &RequestContext,
        days: u32,
        input: IssueInput,
    ) -> Result<ProducedBundle> {
        match input {
            IssueInput::FromConfig(config) => self.issue_from_config(ctx, days, config).await,
            IssueInput::FromCsr(csr) => self.issue_from_csr(ctx, days, csr).await,
        }
    }

    /// Generate a key and request from `config`, then sign it.
    pub async fn issue_from_config(
        &self,
        ctx: &RequestContext,
        days: u32,
        config: ToolConfig,
    ) -> Result<ProducedBundle> {
        check_days(days)?;
        info!(request_id = %ctx.request_id, days, "issuing from config");

        let ws = self.workspaces.prepare(&ctx.request_id).await?;
        let result = self.run_generated(ctx, &ws, days, config).await;
        ws.destroy().await;
        result
    }

    /// Sign a caller-supplied request.
    pub async fn issue_from_csr(
        &self,
        ctx: &RequestContext,
        days: u32,
        csr: Csr,
    ) -> Result<ProducedBundle> {
        check_days(days)?;
        info!(request_id = %ctx.request_id, days, "issuing from csr");

        let ws = self.workspaces.prepare(&ctx.request_id).await?;
        let result = self.run_signed(ctx, &ws, days, csr).await;
        ws.destroy().await;
        result
    }

    async fn run_generated(
        &self,
        ctx: &RequestContext,
        ws: &WorkspaceHandle,
        days: u32,
        config: ToolConfig,
    ) -> Result<ProducedBundle> {
        ws.write(WorkspaceFile::Config, &config.0).await?;

        self.step(ctx, &self.commands.genrsa(ws), IssueError::KeyGen)
            .await?;
        self.step(ctx, &self.commands.req(ws), IssueError::CsrGen)
            .await?;
        let csr_path = ws.file(WorkspaceFile::Request);
        self.step(ctx, &self.commands.sign(ws, &csr_path, days), IssueError::Signing)
            .await?;
        let public_key = self
            .step(
                ctx,
                &self.commands.pubkey(ws, self.workspaces.retains()),
                IssueError::PubKeyExtract,
            )
            .await?;

        let private_key = ws.read(WorkspaceFile::PrivateKey).await?;
        let request = ws.read(WorkspaceFile::Request).await?;
        let certificate = ws.read(WorkspaceFile::Certificate).await?;

        info!(request_id = %ctx.request_id, "issued certificate from config");
        Ok(assemble_generated(
            config,
            private_key,
            request,
            certificate,
            public_key,
            &self.root_certificate,
        ))
    }

    async fn run_signed(
        &self,
        ctx: &RequestContext,
        ws: &WorkspaceHandle,
        days: u32,
        csr: Csr,
    ) -> Result<ProducedBundle> {
        let csr_path = ws.write(WorkspaceFile::ExternalRequest, &csr.0).await?;

        self.step(ctx, &self.commands.sign(ws, &csr_path, days), IssueError::Signing)
            .await?;
        let public_key = self
            .step(
                ctx,
                &self.commands.pubkey(ws, self.workspaces.retains()),
                IssueError::PubKeyExtract,
            )
            .await?;

        let certificate = ws.read(WorkspaceFile::Certificate).await?;

        info!(request_id = %ctx.request_id, "issued certificate from csr");
        Ok(assemble_signed(
            csr,
            certificate,
            public_key,
            &self.root_certificate,
        ))
    }

    async fn step(
        &self,
        ctx: &RequestContext,
        invocation: &Invocation,
        wrap: fn(Box<IssueError>) -> IssueError,
    ) -> Result<Vec<u8>> {
        info!(request_id = %ctx.request_id, step = %invocation.step, "running step");
        self.invoker
            .invoke(ctx, invocation)
            .await
            .map_err(|e| e.in_step(wrap))
    }
}

fn check_days(days: u32) -> Result<()> {
    if days < 1 {
        return Err(IssueError::InvalidDays(days));
    }
    Ok(())
}
