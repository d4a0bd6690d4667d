use std::path::{Path, PathBuf};

use crate::{
    invoker::{Invocation, ToolStep},
    workspace::{WorkspaceFile, WorkspaceHandle},
};

/// Builds the openssl command lines of each pipeline step
#[derive(Debug, Clone)]
pub struct OpenSslCommands {
    program: String,
    root_cert: PathBuf,
    root_key: PathBuf,
}

impl OpenSslCommands {
    pub fn new(program: impl Into<String>, root_cert: PathBuf, root_key: PathBuf) -> Self {
        Self {
            program: program.into(),
            root_cert,
            root_key,
        }
    }

    fn base(&self, step: ToolStep, ws: &WorkspaceHandle) -> Invocation {
        Invocation::new(step, self.program.clone()).working_dir(ws.path().to_path_buf())
    }

    /// `genrsa -out <ws>/private.key`
    pub fn genrsa(&self, ws: &WorkspaceHandle) -> Invocation {
        self.base(ToolStep::KeyGen, ws)
            .arg("genrsa")
            .arg("-out")
            .path_arg(&ws.file(WorkspaceFile::PrivateKey))
    }

    /// `req -new -key <key> -out <ws>/request.csr -config <ws>/openssl.conf`
    pub fn req(&self, ws: &WorkspaceHandle) -> Invocation {
        self.base(ToolStep::CsrGen, ws)
            .arg("req")
            .arg("-new")
            .arg("-key")
            .path_arg(&ws.file(WorkspaceFile::PrivateKey))
            .arg("-out")
            .path_arg(&ws.file(WorkspaceFile::Request))
            .arg("-config")
            .path_arg(&ws.file(WorkspaceFile::Config))
    }

    /// `x509 -req -in <csr> -days N -out <ws>/certificate.crt -CA .. -CAkey .. -CAcreateserial`
    pub fn sign(&self, ws: &WorkspaceHandle, csr: &Path, days: u32) -> Invocation {
        self.base(ToolStep::Signing, ws)
            .arg("x509")
            .arg("-req")
            .arg("-in")
            .path_arg(csr)
            .arg("-days")
            .arg(days.to_string())
            .arg("-out")
            .path_arg(&ws.file(WorkspaceFile::Certificate))
            .arg("-CA")
            .path_arg(&self.root_cert)
            .arg("-CAkey")
            .path_arg(&self.root_key)
            .arg("-CAcreateserial")
    }

    /// `x509 -in <ws>/certificate.crt -pubkey -noout`, stdout captured.
    ///
    /// With `tee` the key is also left in the workspace as `pub.pem`.
    pub fn pubkey(&self, ws: &WorkspaceHandle, tee: bool) -> Invocation {
        let inv = self
            .base(ToolStep::PubKeyExtract, ws)
            .arg("x509")
            .arg("-in")
            .path_arg(&ws.file(WorkspaceFile::Certificate))
            .arg("-pubkey")
            .arg("-noout")
            .capture_stdout();
        if tee {
            inv.tee_to(ws.file(WorkspaceFile::PublicKey))
        } else {
            inv
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        models::RequestId,
        workspace::{ScratchRoot, WorkspaceManager},
    };

    #[tokio::test]
    async fn test_sign_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let root = ScratchRoot::init(temp_dir.path()).unwrap();
        let ws = WorkspaceManager::new(root, false)
            .prepare(&RequestId::new())
            .await
            .unwrap();
        let cmds = OpenSslCommands::new(
            "openssl",
            PathBuf::from("/ca/root.crt"),
            PathBuf::from("/ca/root.key"),
        );

        let csr = ws.file(WorkspaceFile::ExternalRequest);
        let inv = cmds.sign(&ws, &csr, 365);
        assert_eq!(inv.step, ToolStep::Signing);
        assert_eq!(inv.flag_value("-days").unwrap(), "365");
        assert_eq!(inv.flag_value("-in").unwrap(), csr.as_os_str());
        assert_eq!(inv.flag_value("-CA").unwrap(), "/ca/root.crt");
        assert_eq!(inv.flag_value("-CAkey").unwrap(), "/ca/root.key");
        assert_eq!(inv.args.last().unwrap(), "-CAcreateserial");
        assert!(!inv.capture_stdout);

        let inv = cmds.pubkey(&ws, true);
        assert!(inv.capture_stdout);
        assert_eq!(inv.tee_to, Some(ws.file(WorkspaceFile::PublicKey)));
        assert!(cmds.pubkey(&ws, false).tee_to.is_none());
    }
}
