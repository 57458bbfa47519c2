//! Transpiler patch generation
//!
//! Turns prepared hot-reload updates into runtime-loadable payloads by
//! transpiling each affected file's current contents. Runs after the
//! workspace edit has been applied, so the sources read here are the
//! post-edit sources the runtime should be running.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use gmlref_semantic::{SymbolId, Transpiler, WorkspaceIo};

use crate::error::RefactorError;
use crate::hot_reload::HotReloadUpdate;
use crate::logging::{self, Phase};

/// An opaque runtime-loadable payload for one patched symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranspilerPatch {
    pub symbol_id: SymbolId,
    pub file_path: PathBuf,
    pub patch: String,
}

/// Generates transpiler patches for hot-reload updates
pub struct TranspilerPatchGenerator<'a> {
    io: &'a dyn WorkspaceIo,
    transpiler: &'a dyn Transpiler,
}

impl<'a> TranspilerPatchGenerator<'a> {
    pub fn new(io: &'a dyn WorkspaceIo, transpiler: &'a dyn Transpiler) -> Self {
        Self { io, transpiler }
    }

    /// Produce one patch per update. Unlike applying edits, patch
    /// generation is all-or-nothing: a payload set with holes in it is
    /// useless to the runtime, so the first failure aborts.
    pub async fn generate(
        &self,
        updates: &[HotReloadUpdate],
    ) -> Result<Vec<TranspilerPatch>, RefactorError> {
        let mut sources: HashMap<PathBuf, String> = HashMap::new();
        let mut patches = Vec::with_capacity(updates.len());

        for update in updates {
            if !sources.contains_key(&update.file_path) {
                let contents = self.io.read_file(&update.file_path).await?;
                sources.insert(update.file_path.clone(), contents);
            }
            let source = &sources[&update.file_path];

            let patch = self
                .transpiler
                .transpile(&update.file_path, source)
                .await
                .map_err(|err| RefactorError::TranspileFailed {
                    file: err.file_path.clone(),
                    message: err.message,
                })?;

            patches.push(TranspilerPatch {
                symbol_id: update.symbol_id.clone(),
                file_path: update.file_path.clone(),
                patch,
            });
        }

        logging::trace(
            Phase::Patch,
            &format!(
                "{} patch(es) for {} update(s)",
                patches.len(),
                updates.len(),
            ),
        );
        Ok(patches)
    }
}
