mod archive;
mod cli;
mod error;
mod handlers;
mod logging;
mod models;
mod routes;
mod settings;
mod state;

use std::{sync::Arc, time::Duration};

use certsmith_core::{Issuer, IssuerConfig, ScratchRoot, SubprocessInvoker};
use clap::Parser;
use tokio::net::TcpListener;

use crate::{
    cli::Cli, error::Result, logging::init_tracing_to_file, settings::Settings, state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("certsmith-server: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;
    cli.apply(&mut settings);

    let debug = settings.issuer.retain_workspaces;
    let _log_guard = init_tracing_to_file(settings.log.dir.as_deref(), debug)?;

    let issuer_cfg = &settings.issuer;
    let scratch = match &issuer_cfg.scratch_dir {
        Some(dir) => ScratchRoot::init(dir)?,
        None => ScratchRoot::init_default()?,
    };
    tracing::info!("Scratch root: {}", scratch.path().display());

    let invoker = Arc::new(SubprocessInvoker::new().with_command_logging(debug));
    let issuer = Issuer::new(
        IssuerConfig::new(
            issuer_cfg.root_cert.clone(),
            issuer_cfg.root_key.clone(),
            scratch,
            invoker,
        )
        .retain_workspaces(debug)
        .program(issuer_cfg.program.clone()),
    )?;

    let request_timeout = (issuer_cfg.request_timeout_secs > 0)
        .then(|| Duration::from_secs(issuer_cfg.request_timeout_secs));
    let router = routes::create_routes(AppState::new(issuer, request_timeout));

    let listener = TcpListener::bind(settings.http.address.as_str()).await?;
    tracing::info!("certsmith-server started on {}", listener.local_addr()?);
    if debug {
        tracing::warn!("Debug mode: request workspaces are kept on disk");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("certsmith-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
