//! Transpiler contract for hot-reload patch generation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// A transpile failure, carrying the offending file and the frontend's
/// diagnostic text
#[derive(Error, Debug, Clone)]
#[error("transpile failed for {}: {message}", file_path.display())]
pub struct TranspileError {
    pub file_path: PathBuf,
    pub message: String,
}

impl TranspileError {
    pub fn new(file_path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            message: message.into(),
        }
    }
}

/// Converts GML source into a runtime-loadable payload
///
/// Injected only when hot reload is in play; the engine treats the payload
/// as opaque.
#[async_trait]
pub trait Transpiler: Send + Sync {
    async fn transpile(&self, file_path: &Path, source: &str) -> Result<String, TranspileError>;
}
