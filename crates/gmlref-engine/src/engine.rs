//! The refactoring engine façade
//!
//! Composes planning, conflict detection, impact analysis, hot-reload
//! validation, patch generation, and edit application over
//! constructor-injected collaborators. The engine holds no global state;
//! analyzer caches and workspace I/O come in through the constructor so
//! independent engines can run side by side.

use std::path::Path;
use std::sync::Arc;

use gmlref_core::WorkspaceEdit;
use gmlref_semantic::{
    Occurrence, ParserBridge, SemanticAnalyzer, Symbol, SymbolId, SymbolRef, Transpiler,
    WorkspaceIo,
};

use crate::applier::{ApplyOptions, ApplyResult, WorkspaceEditApplier};
use crate::cancel::CancelToken;
use crate::config::RefactorConfig;
use crate::conflict::{Conflict, ConflictDetector};
use crate::error::RefactorError;
use crate::hot_reload::{HotReloadOptions, HotReloadReport, HotReloadUpdate, HotReloadValidator};
use crate::impact::{ImpactAnalyzer, RenameImpactAnalysis};
use crate::patch::{TranspilerPatch, TranspilerPatchGenerator};
use crate::planner::{resolve_unique, RenamePlanner, RenameRequest};

/// Options for `execute_rename` / `execute_batch_rename`
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Plan and validate but write nothing
    pub dry_run: bool,
    /// Validate hot-reload compatibility and prepare runtime updates
    pub prepare_hot_reload: bool,
    /// During hot-reload validation, transpile post-edit sources
    pub check_transpiler: bool,
    pub cancel: CancelToken,
}

/// Everything an execute call produced
#[derive(Debug)]
pub struct ExecuteOutcome {
    /// The planned workspace edit that was applied
    pub workspace: WorkspaceEdit,
    /// Per-file apply status
    pub apply_results: Vec<ApplyResult>,
    /// Runtime updates prepared when hot reload was requested
    pub hot_reload: Vec<HotReloadUpdate>,
    /// Transpiler patches for the prepared updates, when a transpiler is
    /// configured and the run was not a dry run
    pub patches: Vec<TranspilerPatch>,
}

/// Scope-aware rename refactoring over injected language collaborators
pub struct RefactorEngine {
    parser: Arc<dyn ParserBridge>,
    analyzer: Arc<dyn SemanticAnalyzer>,
    io: Arc<dyn WorkspaceIo>,
    transpiler: Option<Arc<dyn Transpiler>>,
    config: RefactorConfig,
}

impl RefactorEngine {
    pub fn new(
        parser: Arc<dyn ParserBridge>,
        analyzer: Arc<dyn SemanticAnalyzer>,
        io: Arc<dyn WorkspaceIo>,
    ) -> Self {
        Self {
            parser,
            analyzer,
            io,
            transpiler: None,
            config: RefactorConfig::default(),
        }
    }

    /// Attach a transpiler for hot-reload patch generation
    pub fn with_transpiler(mut self, transpiler: Arc<dyn Transpiler>) -> Self {
        self.transpiler = Some(transpiler);
        self
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: RefactorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RefactorConfig {
        &self.config
    }

    // ---- planning ----------------------------------------------------

    /// Plan a validated single rename
    pub fn plan_rename(&self, request: &RenameRequest) -> Result<WorkspaceEdit, RefactorError> {
        self.planner().plan_rename(request)
    }

    /// Plan a validated batch rename; atomic across requests
    pub fn plan_batch_rename(
        &self,
        requests: &[RenameRequest],
    ) -> Result<WorkspaceEdit, RefactorError> {
        self.planner().plan_batch_rename(requests)
    }

    /// Compute a read-only impact report for a prospective rename
    pub fn analyze_rename_impact(
        &self,
        request: &RenameRequest,
    ) -> Result<RenameImpactAnalysis, RefactorError> {
        ImpactAnalyzer::new(self.parser.as_ref(), self.analyzer.as_ref(), &self.config)
            .analyze_rename_impact(request)
    }

    /// Detect conflicts for a proposed rename without planning it
    pub fn detect_rename_conflicts(&self, symbol_id: &SymbolId, new_name: &str) -> Vec<Conflict> {
        ConflictDetector::new(self.analyzer.as_ref()).detect_rename_conflicts(symbol_id, new_name)
    }

    /// Re-validate an already-built workspace edit for a request: re-runs
    /// conflict detection and checks that every edit still matches a
    /// current occurrence span (edits go stale once any mutation lands)
    pub fn validate_rename(
        &self,
        request: &RenameRequest,
        workspace: &WorkspaceEdit,
    ) -> Result<(), RefactorError> {
        let symbol = resolve_unique(self.analyzer.as_ref(), &request.symbol_id)?;
        let occurrences = self.analyzer.occurrences(&request.symbol_id);

        let detector = ConflictDetector::new(self.analyzer.as_ref());
        let conflicts = detector.detect_for_symbol(&symbol, &request.new_name, &occurrences);
        let has_blocking = conflicts.iter().any(Conflict::is_blocking);
        if has_blocking || (!conflicts.is_empty() && !self.config.rename.allow_warning_conflicts) {
            return Err(RefactorError::RenameConflict {
                symbol_id: request.symbol_id.clone(),
                conflicts,
            });
        }

        for edit in workspace.edits() {
            let current = occurrences.iter().any(|o| {
                o.file_path == edit.file_path
                    && o.start_offset == edit.start_offset
                    && o.end_offset == edit.end_offset
            });
            if !current {
                return Err(RefactorError::StaleEdit {
                    file: edit.file_path.clone(),
                    offset: edit.start_offset,
                });
            }
        }
        Ok(())
    }

    // ---- execution ---------------------------------------------------

    /// Plan a rename, optionally prepare hot reload, and apply the edit
    pub async fn execute_rename(
        &self,
        request: &RenameRequest,
        options: &ExecuteOptions,
    ) -> Result<ExecuteOutcome, RefactorError> {
        let workspace = self.plan_rename(request)?;
        self.execute_workspace(workspace, options).await
    }

    /// Plan a batch rename atomically, then execute it. A planning failure
    /// means zero edits reach zero files.
    pub async fn execute_batch_rename(
        &self,
        requests: &[RenameRequest],
        options: &ExecuteOptions,
    ) -> Result<ExecuteOutcome, RefactorError> {
        let workspace = self.plan_batch_rename(requests)?;
        self.execute_workspace(workspace, options).await
    }

    async fn execute_workspace(
        &self,
        workspace: WorkspaceEdit,
        options: &ExecuteOptions,
    ) -> Result<ExecuteOutcome, RefactorError> {
        let mut hot_reload = Vec::new();
        if options.prepare_hot_reload {
            let validator = self.hot_reload_validator();
            let report = validator
                .validate(
                    &workspace,
                    HotReloadOptions {
                        check_transpiler: options.check_transpiler
                            || self.config.hot_reload.check_transpiler,
                    },
                )
                .await;
            if !report.valid {
                return Err(RefactorError::HotReloadIncompatible {
                    errors: report.errors,
                });
            }
            // Prepared against pre-apply occurrences; they go stale the
            // moment the edit lands
            hot_reload = validator.prepare_updates(&workspace);
        }

        let applier = WorkspaceEditApplier::new(self.io.as_ref());
        let apply_results = applier
            .apply(
                &workspace,
                &ApplyOptions {
                    dry_run: options.dry_run,
                    cancel: options.cancel.clone(),
                },
            )
            .await?;

        let patches = match (&self.transpiler, options.prepare_hot_reload && !options.dry_run) {
            (Some(transpiler), true) => {
                TranspilerPatchGenerator::new(self.io.as_ref(), transpiler.as_ref())
                    .generate(&hot_reload)
                    .await?
            }
            _ => Vec::new(),
        };

        Ok(ExecuteOutcome {
            workspace,
            apply_results,
            hot_reload,
            patches,
        })
    }

    // ---- hot reload --------------------------------------------------

    /// Check whether a workspace edit can be patched into the running
    /// interpreter; returned as data, never thrown
    pub async fn validate_hot_reload_compatibility(
        &self,
        workspace: &WorkspaceEdit,
        check_transpiler: bool,
    ) -> HotReloadReport {
        self.hot_reload_validator()
            .validate(workspace, HotReloadOptions { check_transpiler })
            .await
    }

    /// Map each edited, patchable symbol to a runtime update
    pub fn prepare_hot_reload_updates(&self, workspace: &WorkspaceEdit) -> Vec<HotReloadUpdate> {
        self.hot_reload_validator().prepare_updates(workspace)
    }

    /// Generate transpiler patches for prepared updates from current file
    /// contents
    pub async fn generate_transpiler_patches(
        &self,
        updates: &[HotReloadUpdate],
    ) -> Result<Vec<TranspilerPatch>, RefactorError> {
        let transpiler = self
            .transpiler
            .as_ref()
            .ok_or(RefactorError::TranspilerUnavailable)?;
        TranspilerPatchGenerator::new(self.io.as_ref(), transpiler.as_ref())
            .generate(updates)
            .await
    }

    // ---- application -------------------------------------------------

    /// Apply a workspace edit file by file; see `WorkspaceEditApplier`
    pub async fn apply_workspace_edit(
        &self,
        workspace: &WorkspaceEdit,
        options: &ApplyOptions,
    ) -> Result<Vec<ApplyResult>, RefactorError> {
        WorkspaceEditApplier::new(self.io.as_ref())
            .apply(workspace, options)
            .await
    }

    // ---- symbol queries ----------------------------------------------

    /// Resolve the symbol under a file offset
    pub fn find_symbol_at_location(&self, file_path: &Path, offset: usize) -> Option<SymbolRef> {
        self.parser.find_symbol_at_offset(file_path, offset)
    }

    /// Resolve a symbol id, erroring for unknown or ambiguous ids
    pub fn validate_symbol_exists(&self, symbol_id: &SymbolId) -> Result<Symbol, RefactorError> {
        resolve_unique(self.analyzer.as_ref(), symbol_id)
    }

    /// Fetch the current occurrence set for a symbol that must exist
    pub fn gather_symbol_occurrences(
        &self,
        symbol_id: &SymbolId,
    ) -> Result<Vec<Occurrence>, RefactorError> {
        resolve_unique(self.analyzer.as_ref(), symbol_id)?;
        Ok(self.analyzer.occurrences(symbol_id))
    }

    // ---- internals ---------------------------------------------------

    fn planner(&self) -> RenamePlanner<'_> {
        RenamePlanner::new(self.parser.as_ref(), self.analyzer.as_ref(), &self.config)
    }

    fn hot_reload_validator(&self) -> HotReloadValidator<'_> {
        HotReloadValidator::new(
            self.parser.as_ref(),
            self.analyzer.as_ref(),
            self.io.as_ref(),
            self.transpiler.as_deref(),
        )
    }
}
