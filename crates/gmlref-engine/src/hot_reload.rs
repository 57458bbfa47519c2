//! Hot-reload compatibility analysis
//!
//! Decides whether a workspace edit can be patched into a running
//! interpreter without a restart, and maps edited symbols to the updates
//! the runtime must load. Script and function bodies can be swapped in
//! place; macros, enums, globals, and object declarations are baked into
//! compiled state and force a restart.
//!
//! Incompatibility is reported as data (`HotReloadReport` with
//! `valid = false`), never thrown: callers routinely want to inspect the
//! errors and fall back to a restart.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use gmlref_core::{apply_edits, WorkspaceEdit};
use gmlref_semantic::{
    ParserBridge, SemanticAnalyzer, SymbolId, SymbolKind, SymbolResolution, Transpiler,
    WorkspaceIo,
};

use crate::logging::{self, Phase};

/// Whether the running interpreter can patch a symbol of this kind without
/// a full reload
pub fn is_patchable_kind(kind: SymbolKind) -> bool {
    matches!(kind, SymbolKind::Script | SymbolKind::Function)
}

/// One symbol whose runtime representation must be repatched after an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotReloadUpdate {
    pub symbol_id: SymbolId,
    pub file_path: PathBuf,
    pub reason: String,
}

/// Outcome of hot-reload validation
#[derive(Debug, Clone, Default, Serialize)]
pub struct HotReloadReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Options for hot-reload validation
#[derive(Debug, Clone, Copy, Default)]
pub struct HotReloadOptions {
    /// Transpile each affected file's post-edit source to catch edits that
    /// are fine in isolation but break their enclosing scope
    pub check_transpiler: bool,
}

/// Validates workspace edits against the running interpreter's patching
/// abilities
pub struct HotReloadValidator<'a> {
    parser: &'a dyn ParserBridge,
    analyzer: &'a dyn SemanticAnalyzer,
    io: &'a dyn WorkspaceIo,
    transpiler: Option<&'a dyn Transpiler>,
}

impl<'a> HotReloadValidator<'a> {
    pub fn new(
        parser: &'a dyn ParserBridge,
        analyzer: &'a dyn SemanticAnalyzer,
        io: &'a dyn WorkspaceIo,
        transpiler: Option<&'a dyn Transpiler>,
    ) -> Self {
        Self {
            parser,
            analyzer,
            io,
            transpiler,
        }
    }

    /// Classify every edit in the workspace and, when requested, transpile
    /// the post-edit sources. Pure analysis: the workspace and the files on
    /// disk are left untouched.
    pub async fn validate(
        &self,
        workspace: &WorkspaceEdit,
        options: HotReloadOptions,
    ) -> HotReloadReport {
        let mut report = HotReloadReport::default();

        for (path, edits) in workspace.group_by_file() {
            for edit in &edits {
                match self.parser.find_symbol_at_offset(path, edit.start_offset) {
                    None => report.warnings.push(format!(
                        "edit at {}:{} does not map to a known symbol",
                        path.display(),
                        edit.start_offset,
                    )),
                    Some(symbol_ref) => {
                        if let SymbolResolution::Resolved(symbol) =
                            self.analyzer.resolve_symbol(&symbol_ref.symbol_id)
                        {
                            if !is_patchable_kind(symbol.kind) {
                                report.errors.push(format!(
                                    "{} is a {}; patching it requires a full restart",
                                    symbol.name, symbol.kind,
                                ));
                            }
                        }
                    }
                }
            }

            if options.check_transpiler {
                match self.transpiler {
                    None => report
                        .warnings
                        .push("transpiler check requested but no transpiler configured".to_string()),
                    Some(transpiler) => {
                        self.check_post_edit_source(path.to_path_buf(), &edits, transpiler, &mut report)
                            .await;
                    }
                }
            }
        }

        report.valid = report.errors.is_empty();
        logging::trace(
            Phase::HotReload,
            &format!(
                "valid={} ({} error(s), {} warning(s))",
                report.valid,
                report.errors.len(),
                report.warnings.len(),
            ),
        );
        report
    }

    /// Splice the file's edits in memory and run the transpiler over the
    /// result, folding failures into the report
    async fn check_post_edit_source(
        &self,
        path: PathBuf,
        edits: &[&gmlref_core::TextEdit],
        transpiler: &dyn Transpiler,
        report: &mut HotReloadReport,
    ) {
        let source = match self.io.read_file(&path).await {
            Ok(source) => source,
            Err(err) => {
                report
                    .errors
                    .push(format!("cannot read {}: {err}", path.display()));
                return;
            }
        };
        let patched = match apply_edits(&source, edits) {
            Ok(patched) => patched,
            Err(err) => {
                report
                    .errors
                    .push(format!("cannot splice edits into {}: {err}", path.display()));
                return;
            }
        };
        if let Err(err) = transpiler.transpile(&path, &patched).await {
            report.errors.push(err.to_string());
        }
    }

    /// Map each edited, patchable symbol to the update the runtime must
    /// load. One update per (symbol, file) pair: a rename touches the
    /// definition's file and every referencing file, and each of those
    /// compiled bodies changes.
    pub fn prepare_updates(&self, workspace: &WorkspaceEdit) -> Vec<HotReloadUpdate> {
        let mut seen: BTreeSet<(SymbolId, PathBuf)> = BTreeSet::new();
        let mut updates = Vec::new();

        for (path, edits) in workspace.group_by_file() {
            for edit in edits {
                let Some(symbol_ref) = self.parser.find_symbol_at_offset(path, edit.start_offset)
                else {
                    continue;
                };
                let SymbolResolution::Resolved(symbol) =
                    self.analyzer.resolve_symbol(&symbol_ref.symbol_id)
                else {
                    continue;
                };
                if !is_patchable_kind(symbol.kind) {
                    continue;
                }
                if seen.insert((symbol.id.clone(), path.to_path_buf())) {
                    updates.push(HotReloadUpdate {
                        symbol_id: symbol.id.clone(),
                        file_path: path.to_path_buf(),
                        reason: format!(
                            "identifier {} edited in {}",
                            symbol.name,
                            path.display(),
                        ),
                    });
                }
            }
        }

        updates
    }
}
