//! Workspace file access
//!
//! All engine I/O funnels through [`WorkspaceIo`], so the applier and the
//! hot-reload validator can run against a real project directory or an
//! in-memory snapshot. The on-disk files are the only shared mutable
//! resource; exclusive access during an apply is a caller contract, not
//! something enforced here.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

/// Injected read/write capability over project files
#[async_trait]
pub trait WorkspaceIo: Send + Sync {
    async fn read_file(&self, path: &Path) -> io::Result<String>;
    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Workspace I/O over a real project directory
pub struct DiskWorkspace {
    root: PathBuf,
}

impl DiskWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl WorkspaceIo for DiskWorkspace {
    async fn read_file(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(self.resolve(path)).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(self.resolve(path), contents).await
    }
}

/// In-memory workspace, used by tests and by embedders that stage edits
/// before committing them to disk
#[derive(Default)]
pub struct MemoryWorkspace {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .expect("workspace lock poisoned")
            .insert(path.into(), contents.into());
    }

    /// Current contents of one file, if present
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .expect("workspace lock poisoned")
            .get(path)
            .cloned()
    }

    /// Copy of the whole file map
    pub fn snapshot(&self) -> HashMap<PathBuf, String> {
        self.files.lock().expect("workspace lock poisoned").clone()
    }
}

#[async_trait]
impl WorkspaceIo for MemoryWorkspace {
    async fn read_file(&self, path: &Path) -> io::Result<String> {
        self.contents(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_workspace_round_trip() {
        let ws = MemoryWorkspace::new();
        ws.insert("scripts/scr_a.gml", "scr_a();");

        let read = ws.read_file(Path::new("scripts/scr_a.gml")).await.unwrap();
        assert_eq!(read, "scr_a();");

        ws.write_file(Path::new("scripts/scr_a.gml"), "scr_b();")
            .await
            .unwrap();
        assert_eq!(
            ws.contents(Path::new("scripts/scr_a.gml")).unwrap(),
            "scr_b();"
        );
    }

    #[tokio::test]
    async fn test_memory_workspace_missing_file() {
        let ws = MemoryWorkspace::new();
        let err = ws.read_file(Path::new("missing.gml")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
