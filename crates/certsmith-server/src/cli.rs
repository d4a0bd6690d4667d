use std::path::PathBuf;

use clap::Parser;

use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "certsmith-server")]
#[command(about = "Issues X.509 certificates signed by a local root CA")]
#[command(version)]
pub struct Cli {
    /// Settings file
    #[arg(long, default_value = "config/services.toml")]
    pub config: PathBuf,

    /// Listen address, e.g. localhost:8080
    #[arg(long)]
    pub address: Option<String>,

    /// Root CA certificate
    #[arg(long = "ca")]
    pub ca: Option<PathBuf>,

    /// Root CA private key
    #[arg(long = "ca-key")]
    pub ca_key: Option<PathBuf>,

    /// Keep request workspaces and log every openssl command
    #[arg(long)]
    pub debug: bool,

    /// Per-request timeout in seconds, 0 disables it
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Overlay flags on top of file settings.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(address) = self.address {
            settings.http.address = address;
        }
        if let Some(ca) = self.ca {
            settings.issuer.root_cert = ca;
        }
        if let Some(ca_key) = self.ca_key {
            settings.issuer.root_key = ca_key;
        }
        if self.debug {
            settings.issuer.retain_workspaces = true;
        }
        if let Some(secs) = self.timeout_secs {
            settings.issuer.request_timeout_secs = secs;
        }
        if let Some(dir) = self.log_dir {
            settings.log.dir = Some(dir);
        }
    }
}
