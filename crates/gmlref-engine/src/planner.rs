//! Rename planning
//!
//! Turns validated rename requests into workspace edits. Planning is pure
//! in-memory work over analyzer facts: resolve, detect conflicts, emit one
//! edit per occurrence. Batch planning is atomic; a failure in any request
//! means no workspace edit escapes at all.

use serde::{Deserialize, Serialize};

use gmlref_core::{TextEdit, WorkspaceEdit};
use gmlref_semantic::{
    ParserBridge, SemanticAnalyzer, Symbol, SymbolId, SymbolResolution,
};

use crate::config::RefactorConfig;
use crate::conflict::{Conflict, ConflictDetector, ConflictKind};
use crate::error::RefactorError;
use crate::logging::{self, Phase};

/// A request to rename one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub symbol_id: SymbolId,
    pub new_name: String,
}

impl RenameRequest {
    pub fn new(symbol_id: impl Into<SymbolId>, new_name: impl Into<String>) -> Self {
        Self {
            symbol_id: symbol_id.into(),
            new_name: new_name.into(),
        }
    }
}

/// Plans single and batch renames against the injected collaborators
pub struct RenamePlanner<'a> {
    parser: &'a dyn ParserBridge,
    analyzer: &'a dyn SemanticAnalyzer,
    config: &'a RefactorConfig,
}

impl<'a> RenamePlanner<'a> {
    pub fn new(
        parser: &'a dyn ParserBridge,
        analyzer: &'a dyn SemanticAnalyzer,
        config: &'a RefactorConfig,
    ) -> Self {
        Self {
            parser,
            analyzer,
            config,
        }
    }

    /// Plan a single rename, returning the workspace edit that replaces
    /// every occurrence's identifier span with the new name
    pub fn plan_rename(&self, request: &RenameRequest) -> Result<WorkspaceEdit, RefactorError> {
        let (_, workspace) = self.plan_resolved(request)?;
        Ok(workspace)
    }

    /// Plan a batch of renames atomically.
    ///
    /// Requests are planned in input order (first request wins a contested
    /// name); any per-request failure or cross-request collision fails the
    /// whole batch before a merged edit is built.
    pub fn plan_batch_rename(
        &self,
        requests: &[RenameRequest],
    ) -> Result<WorkspaceEdit, RefactorError> {
        let mut planned: Vec<(&RenameRequest, Symbol, WorkspaceEdit)> = Vec::new();
        for request in requests {
            let (symbol, workspace) = self.plan_resolved(request)?;
            planned.push((request, symbol, workspace));
        }

        let conflicts = cross_request_conflicts(&planned);
        if !conflicts.is_empty() {
            return Err(RefactorError::BatchConflict { conflicts });
        }

        let mut merged = WorkspaceEdit::new();
        for (request, _, workspace) in planned {
            merged.merge(workspace).map_err(|err| {
                // Overlapping spans across requests surface here
                RefactorError::BatchConflict {
                    conflicts: vec![Conflict {
                        kind: ConflictKind::NameCollision,
                        description: format!(
                            "request for {} produces edits overlapping an earlier request: {err}",
                            request.symbol_id,
                        ),
                        occurrence: None,
                    }],
                }
            })?;
        }

        logging::trace(
            Phase::Plan,
            &format!(
                "batch of {} request(s): {} edit(s)",
                requests.len(),
                merged.len(),
            ),
        );
        Ok(merged)
    }

    /// Resolve, validate, and build the edit for one request
    fn plan_resolved(
        &self,
        request: &RenameRequest,
    ) -> Result<(Symbol, WorkspaceEdit), RefactorError> {
        if !self.parser.is_valid_identifier(&request.new_name) {
            return Err(RefactorError::InvalidNewName {
                name: request.new_name.clone(),
                reason: "not a legal GML identifier".to_string(),
            });
        }

        let symbol = resolve_unique(self.analyzer, &request.symbol_id)?;
        if symbol.name == request.new_name {
            return Err(RefactorError::InvalidNewName {
                name: request.new_name.clone(),
                reason: "identical to the current name".to_string(),
            });
        }

        let occurrences = self.analyzer.occurrences(&request.symbol_id);
        let detector = ConflictDetector::new(self.analyzer);
        let conflicts = detector.detect_for_symbol(&symbol, &request.new_name, &occurrences);
        let has_blocking = conflicts.iter().any(Conflict::is_blocking);
        if has_blocking || (!conflicts.is_empty() && !self.config.rename.allow_warning_conflicts) {
            return Err(RefactorError::RenameConflict {
                symbol_id: request.symbol_id.clone(),
                conflicts,
            });
        }

        let mut workspace = WorkspaceEdit::new();
        for occurrence in &occurrences {
            workspace.add_edit(TextEdit::new(
                occurrence.file_path.clone(),
                occurrence.start_offset,
                occurrence.end_offset,
                request.new_name.clone(),
            )?)?;
        }

        logging::trace(
            Phase::Plan,
            &format!(
                "{} -> {}: {} occurrence(s) across {} file(s)",
                symbol.name,
                request.new_name,
                occurrences.len(),
                workspace.file_paths().len(),
            ),
        );
        Ok((symbol, workspace))
    }
}

/// Resolve a symbol id that must be unique, mapping the failure modes onto
/// the planner's error taxonomy
pub(crate) fn resolve_unique(
    analyzer: &dyn SemanticAnalyzer,
    symbol_id: &SymbolId,
) -> Result<Symbol, RefactorError> {
    match analyzer.resolve_symbol(symbol_id) {
        SymbolResolution::Resolved(symbol) => Ok(symbol),
        SymbolResolution::Ambiguous(candidates) => Err(RefactorError::AmbiguousSymbol {
            symbol_id: symbol_id.clone(),
            candidates,
        }),
        SymbolResolution::Unknown => Err(RefactorError::SymbolNotFound {
            symbol_id: symbol_id.clone(),
        }),
    }
}

/// Detect collisions between requests in one batch: duplicate targets and
/// old/new name races. First request wins; the later request is reported.
fn cross_request_conflicts(planned: &[(&RenameRequest, Symbol, WorkspaceEdit)]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, (req_a, sym_a, _)) in planned.iter().enumerate() {
        for (req_b, sym_b, _) in &planned[i + 1..] {
            if req_a.symbol_id == req_b.symbol_id {
                conflicts.push(Conflict {
                    kind: ConflictKind::NameCollision,
                    description: format!("symbol {} is renamed twice in one batch", req_a.symbol_id),
                    occurrence: None,
                });
                continue;
            }
            if req_a.new_name == req_b.new_name {
                conflicts.push(Conflict {
                    kind: ConflictKind::NameCollision,
                    description: format!(
                        "requests for {} and {} both target the name {}",
                        req_a.symbol_id, req_b.symbol_id, req_a.new_name,
                    ),
                    occurrence: None,
                });
            }
            if req_b.new_name == sym_a.name {
                conflicts.push(Conflict {
                    kind: ConflictKind::NameCollision,
                    description: format!(
                        "request for {} targets {}, the current name of {} renamed earlier \
                         in the batch",
                        req_b.symbol_id, req_b.new_name, req_a.symbol_id,
                    ),
                    occurrence: None,
                });
            }
            if req_a.new_name == sym_b.name {
                conflicts.push(Conflict {
                    kind: ConflictKind::NameCollision,
                    description: format!(
                        "request for {} targets {}, the current name of {} also renamed \
                         in this batch",
                        req_a.symbol_id, req_a.new_name, req_b.symbol_id,
                    ),
                    occurrence: None,
                });
            }
        }
    }
    conflicts
}
