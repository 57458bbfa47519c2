//! Rename impact analysis
//!
//! A read-only preview of what a rename would touch: occurrence tallies,
//! affected files, dependent symbols, hazards. Never builds a workspace
//! edit and never mutates analyzer state, so it is safe to call repeatedly
//! while a user types a new name.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use serde::Serialize;

use gmlref_semantic::{OccurrenceRole, ParserBridge, SemanticAnalyzer, SymbolId};

use crate::config::RefactorConfig;
use crate::conflict::{Conflict, ConflictDetector};
use crate::error::RefactorError;
use crate::hot_reload::is_patchable_kind;
use crate::planner::{resolve_unique, RenameRequest};

/// Aggregate numbers for a prospective rename
#[derive(Debug, Clone, Serialize)]
pub struct RenameSummary {
    pub old_name: String,
    pub new_name: String,
    pub total_occurrences: usize,
    pub definition_count: usize,
    pub reference_count: usize,
    pub affected_files: Vec<PathBuf>,
    /// Whether the symbol's kind is one the running interpreter can patch
    pub hot_reload_required: bool,
    pub dependent_symbols: Vec<SymbolId>,
}

/// Full impact report for a prospective rename
#[derive(Debug, Clone, Serialize)]
pub struct RenameImpactAnalysis {
    pub summary: RenameSummary,
    pub conflicts: Vec<Conflict>,
    pub warnings: Vec<String>,
}

/// Computes impact reports without touching project state
pub struct ImpactAnalyzer<'a> {
    parser: &'a dyn ParserBridge,
    analyzer: &'a dyn SemanticAnalyzer,
    config: &'a RefactorConfig,
}

impl<'a> ImpactAnalyzer<'a> {
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

    /// Analyze a prospective rename. Resolution failures error like
    /// planning does; detected conflicts are returned in the report for the
    /// caller to inspect, not thrown.
    pub fn analyze_rename_impact(
        &self,
        request: &RenameRequest,
    ) -> Result<RenameImpactAnalysis, RefactorError> {
        let symbol = resolve_unique(self.analyzer, &request.symbol_id)?;
        let occurrences = self.analyzer.occurrences(&request.symbol_id);

        let definition_count = occurrences
            .iter()
            .filter(|o| o.role == OccurrenceRole::Definition)
            .count();
        let affected_files: BTreeSet<PathBuf> =
            occurrences.iter().map(|o| o.file_path.clone()).collect();

        let dependent_symbols = if self.config.rename.transitive_dependents {
            self.transitive_dependents(&request.symbol_id)
        } else {
            let mut one_hop = self.analyzer.dependents(&request.symbol_id);
            one_hop.sort();
            one_hop.dedup();
            one_hop
        };

        let detector = ConflictDetector::new(self.analyzer);
        let conflicts = detector.detect_for_symbol(&symbol, &request.new_name, &occurrences);

        let mut warnings = Vec::new();
        if !self.parser.is_valid_identifier(&request.new_name) {
            warnings.push(format!(
                "{} is not a legal GML identifier; planning will refuse it",
                request.new_name,
            ));
        }
        if occurrences.is_empty() {
            warnings.push(format!("{} has no recorded occurrences", symbol.name));
        }
        if !is_patchable_kind(symbol.kind) {
            warnings.push(format!(
                "{} is a {}; the running interpreter cannot patch it and must restart",
                symbol.name, symbol.kind,
            ));
        }

        Ok(RenameImpactAnalysis {
            summary: RenameSummary {
                old_name: symbol.name.clone(),
                new_name: request.new_name.clone(),
                total_occurrences: occurrences.len(),
                definition_count,
                reference_count: occurrences.len() - definition_count,
                affected_files: affected_files.into_iter().collect(),
                hot_reload_required: is_patchable_kind(symbol.kind),
                dependent_symbols,
            },
            conflicts,
            warnings,
        })
    }

    /// Breadth-first closure over dependent edges, excluding the root
    fn transitive_dependents(&self, root: &SymbolId) -> Vec<SymbolId> {
        let mut seen: BTreeSet<SymbolId> = BTreeSet::new();
        let mut queue: VecDeque<SymbolId> = self.analyzer.dependents(root).into();
        while let Some(id) = queue.pop_front() {
            if id != *root && seen.insert(id.clone()) {
                queue.extend(self.analyzer.dependents(&id));
            }
        }
        seen.into_iter().collect()
    }
}
