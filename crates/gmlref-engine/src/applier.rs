//! Workspace edit application
//!
//! Physically applies a workspace edit: group edits by file, read each file
//! once, splice in descending offset order, write back. Application is
//! best-effort per file; one file's read or write failure is recorded in
//! its `ApplyResult` and the remaining files still get processed. This is
//! the deliberate counterpart to planning, which is all-or-nothing in
//! memory: real filesystems cannot offer multi-file atomicity, so the
//! per-file status rows are the caller's recovery surface.
//!
//! The engine assumes exclusive access to the project files for the
//! duration of an apply; that is a caller contract, not something enforced
//! with locks.

use std::path::PathBuf;

use serde::Serialize;

use gmlref_core::{apply_edits, WorkspaceEdit};
use gmlref_semantic::WorkspaceIo;

use crate::cancel::CancelToken;
use crate::error::RefactorError;
use crate::logging::{self, Phase};

/// Per-file outcome of an apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    /// New contents were written
    Applied,
    /// Nothing was written (dry run, or contents already matched)
    Skipped,
    /// The file could not be read, spliced, or written
    Failed,
}

/// Result row for one file in a workspace edit
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResult {
    pub file_path: PathBuf,
    pub status: ApplyStatus,
    pub error: Option<String>,
    /// Length of the (would-be) new contents; present unless the file
    /// failed before splicing
    pub new_len: Option<usize>,
}

/// Options for applying a workspace edit
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Compute every file's new contents but write nothing
    pub dry_run: bool,
    pub cancel: CancelToken,
}

/// Applies workspace edits through the injected I/O capability
pub struct WorkspaceEditApplier<'a> {
    io: &'a dyn WorkspaceIo,
}

impl<'a> WorkspaceEditApplier<'a> {
    pub fn new(io: &'a dyn WorkspaceIo) -> Self {
        Self { io }
    }

    /// Apply the workspace edit file by file, returning one result row per
    /// file. Only cancellation aborts the loop; per-file failures do not.
    pub async fn apply(
        &self,
        workspace: &WorkspaceEdit,
        options: &ApplyOptions,
    ) -> Result<Vec<ApplyResult>, RefactorError> {
        let mut results = Vec::new();

        for (path, edits) in workspace.group_by_file() {
            if options.cancel.is_cancelled() {
                return Err(RefactorError::Cancelled);
            }

            let source = match self.io.read_file(path).await {
                Ok(source) => source,
                Err(err) => {
                    results.push(ApplyResult {
                        file_path: path.to_path_buf(),
                        status: ApplyStatus::Failed,
                        error: Some(format!("read failed: {err}")),
                        new_len: None,
                    });
                    continue;
                }
            };

            let new_contents = match apply_edits(&source, &edits) {
                Ok(contents) => contents,
                Err(err) => {
                    results.push(ApplyResult {
                        file_path: path.to_path_buf(),
                        status: ApplyStatus::Failed,
                        error: Some(format!("splice failed: {err}")),
                        new_len: None,
                    });
                    continue;
                }
            };

            if options.dry_run || new_contents == source {
                results.push(ApplyResult {
                    file_path: path.to_path_buf(),
                    status: ApplyStatus::Skipped,
                    error: None,
                    new_len: Some(new_contents.len()),
                });
                continue;
            }

            match self.io.write_file(path, &new_contents).await {
                Ok(()) => results.push(ApplyResult {
                    file_path: path.to_path_buf(),
                    status: ApplyStatus::Applied,
                    error: None,
                    new_len: Some(new_contents.len()),
                }),
                Err(err) => results.push(ApplyResult {
                    file_path: path.to_path_buf(),
                    status: ApplyStatus::Failed,
                    error: Some(format!("write failed: {err}")),
                    new_len: Some(new_contents.len()),
                }),
            }
        }

        let failed = results
            .iter()
            .filter(|r| r.status == ApplyStatus::Failed)
            .count();
        logging::trace(
            Phase::Apply,
            &format!(
                "{} file(s), {} failed, dry_run={}",
                results.len(),
                failed,
                options.dry_run,
            ),
        );
        Ok(results)
    }
}
