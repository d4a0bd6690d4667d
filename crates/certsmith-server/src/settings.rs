use std::{io, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpCfg,
    pub issuer: IssuerCfg,
    pub log: LogCfg,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpCfg {
    pub address: String,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            address: "localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IssuerCfg {
    /// Root CA certificate; its extension is reported as the certificate form
    pub root_cert: PathBuf,
    pub root_key: PathBuf,
    /// Tool binary, looked up on PATH
    pub program: String,
    /// Scratch root, `<tmp>/certsmith` when unset
    pub scratch_dir: Option<PathBuf>,
    /// Keep per-request workspaces and log every tool command
    pub retain_workspaces: bool,
    /// Per-request budget in seconds, 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for IssuerCfg {
    fn default() -> Self {
        Self {
            root_cert: PathBuf::from("assets/ssl/root.crt"),
            root_key: PathBuf::from("assets/ssl/root.key"),
            program: "openssl".to_string(),
            scratch_dir: None,
            retain_workspaces: false,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogCfg {
    /// Directory for daily rolling log files; console only when unset
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        match std::fs::read_to_string(config_path.as_ref()) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.http.address, "localhost:8080");
        assert_eq!(settings.issuer.root_cert, PathBuf::from("assets/ssl/root.crt"));
        assert_eq!(settings.issuer.program, "openssl");
        assert!(settings.log.dir.is_none());
    }

    #[test]
    fn test_partial_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("services.toml");
        std::fs::write(
            &path,
            "[http]\naddress = \"0.0.0.0:9000\"\n\n[issuer]\nretain_workspaces = true\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.http.address, "0.0.0.0:9000");
        assert!(settings.issuer.retain_workspaces);
        assert_eq!(settings.issuer.request_timeout_secs, 5);
        assert_eq!(settings.issuer.root_key, PathBuf::from("assets/ssl/root.key"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("services.toml");
        std::fs::write(&path, "[http\naddress = 1").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
