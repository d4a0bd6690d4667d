//! Per-request scratch directories
//!
//! Every issuance stages its inputs and the tool's outputs in its own
//! directory under a process-wide scratch root. The directory is removed when
//! the [`WorkspaceHandle`] is destroyed or dropped, unless the manager runs in
//! retain mode.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    error::{IssueError, Result},
    models::RequestId,
};

/// Default directory name under the system temp dir
pub const DEFAULT_SCRATCH_NAME: &str = "certsmith";

/// Fixed file names inside a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceFile {
    Config,
    PrivateKey,
    Request,
    ExternalRequest,
    Certificate,
    PublicKey,
}

impl WorkspaceFile {
    pub fn file_name(self) -> &'static str {
        match self {
            WorkspaceFile::Config => "openssl.conf",
            WorkspaceFile::PrivateKey => "private.key",
            WorkspaceFile::Request => "request.csr",
            WorkspaceFile::ExternalRequest => "external.csr",
            WorkspaceFile::Certificate => "certificate.crt",
            WorkspaceFile::PublicKey => "pub.pem",
        }
    }
}

/// Process-wide scratch root, created once at startup
#[derive(Debug)]
pub struct ScratchRoot {
    path: PathBuf,
}

impl ScratchRoot {
    /// Create (or reuse) the scratch root at `path`.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path).map_err(|source| IssueError::Workspace {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "scratch root ready");
        Ok(Arc::new(Self { path }))
    }

    /// `<system temp>/certsmith`
    pub fn init_default() -> Result<Arc<Self>> {
        Self::init(std::env::temp_dir().join(DEFAULT_SCRATCH_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates and destroys per-request workspaces
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: Arc<ScratchRoot>,
    retain: bool,
}

impl WorkspaceManager {
    pub fn new(root: Arc<ScratchRoot>, retain: bool) -> Self {
        Self { root, retain }
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    /// Workspace location for a request id.
    pub fn path_for(&self, request_id: &RequestId) -> PathBuf {
        self.root.path().join(format!("request-{}", request_id))
    }

    /// Create an empty, owner-only workspace for `request_id`.
    ///
    /// A leftover entry with the same name is removed first.
    pub async fn prepare(&self, request_id: &RequestId) -> Result<WorkspaceHandle> {
        let path = self.path_for(request_id);
        let workspace_err = |source: io::Error| IssueError::Workspace {
            path: path.clone(),
            source,
        };

        match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) => {
                warn!(path = %path.display(), "removing stale workspace");
                if meta.is_dir() {
                    tokio::fs::remove_dir_all(&path).await.map_err(workspace_err)?;
                } else {
                    tokio::fs::remove_file(&path).await.map_err(workspace_err)?;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(workspace_err(e)),
        }

        let mut builder = tokio::fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o700);
        builder.create(&path).await.map_err(workspace_err)?;

        debug!(request_id = %request_id, path = %path.display(), "workspace created");
        Ok(WorkspaceHandle {
            path,
            should_delete: !self.retain,
        })
    }
}

/// An existing per-request workspace
///
/// Dropping the handle removes the directory unless it was retained.
#[derive(Debug)]
pub struct WorkspaceHandle {
    path: PathBuf,
    should_delete: bool,
}

impl WorkspaceHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of a fixed file inside the workspace
    pub fn file(&self, file: WorkspaceFile) -> PathBuf {
        self.path.join(file.file_name())
    }

    pub async fn write(&self, file: WorkspaceFile, contents: &[u8]) -> Result<PathBuf> {
        let target = self.file(file);
        tokio::fs::write(&target, contents)
            .await
            .map_err(|source| IssueError::Workspace {
                path: target.clone(),
                source,
            })?;
        Ok(target)
    }

    pub async fn read(&self, file: WorkspaceFile) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.file(file)).await?)
    }

    /// Remove the workspace now. Failures are logged, never returned.
    pub async fn destroy(mut self) {
        if !self.should_delete {
            debug!(path = %self.path.display(), "workspace retained");
            return;
        }
        self.should_delete = false;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "workspace removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove workspace"),
        }
    }

    /// Disable removal and return the path.
    pub fn keep(mut self) -> PathBuf {
        self.should_delete = false;
        self.path.clone()
    }
}

impl Drop for WorkspaceHandle {
    fn drop(&mut self) {
        if self.should_delete {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "failed to remove workspace");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn manager(retain: bool) -> (TempDir, WorkspaceManager) {
        let temp_dir = TempDir::new().unwrap();
        let root = ScratchRoot::init(temp_dir.path().join("scratch")).unwrap();
        (temp_dir, WorkspaceManager::new(root, retain))
    }

    #[test]
    fn test_scratch_root_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let first = ScratchRoot::init(temp_dir.path().join("s")).unwrap();
        let second = ScratchRoot::init(temp_dir.path().join("s")).unwrap();
        assert_eq!(first.path(), second.path());
        assert!(first.path().is_dir());
    }

    #[tokio::test]
    async fn test_prepare_and_destroy() {
        let (_tmp, manager) = manager(false);
        let id = RequestId::new();

        let ws = manager.prepare(&id).await.unwrap();
        let path = ws.path().to_path_buf();
        assert_eq!(path, manager.path_for(&id));
        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("request-"));

        ws.write(WorkspaceFile::Config, b"[req]\n").await.unwrap();
        assert_eq!(ws.read(WorkspaceFile::Config).await.unwrap(), b"[req]\n");

        ws.destroy().await;
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_workspace_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, manager) = manager(false);
        let ws = manager.prepare(&RequestId::new()).await.unwrap();
        let mode = fs::metadata(ws.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[tokio::test]
    async fn test_drop_removes_workspace() {
        let (_tmp, manager) = manager(false);
        let path = {
            let ws = manager.prepare(&RequestId::new()).await.unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_retain_mode_keeps_workspace() {
        let (_tmp, manager) = manager(true);
        let ws = manager.prepare(&RequestId::new()).await.unwrap();
        let path = ws.path().to_path_buf();
        ws.destroy().await;
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_stale_workspace_is_replaced() {
        let (_tmp, manager) = manager(false);
        let id = RequestId::new();
        let stale = manager.path_for(&id);
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover"), b"old").unwrap();

        let ws = manager.prepare(&id).await.unwrap();
        assert!(!ws.path().join("leftover").exists());
    }

    #[tokio::test]
    async fn test_keep_disables_removal() {
        let (_tmp, manager) = manager(false);
        let ws = manager.prepare(&RequestId::new()).await.unwrap();
        let path = ws.keep();
        assert!(path.is_dir());
    }
}
