//! Rename conflict detection
//!
//! Pure analysis over the occurrence set and the analyzer's scope facts:
//! no I/O, deterministic for identical analyzer responses. The detector
//! partitions the scope chain of each occurrence so a single binding of the
//! new name is reported exactly once:
//!
//! - bound strictly between the occurrence and the defining scope: the
//!   renamed reference would bind to that nearer declaration after the
//!   rename (`ScopeCapture`)
//! - bound in the defining scope itself: two declarations would share one
//!   name in one scope (`NameCollision`)
//! - bound outside the defining scope: the renamed declaration would hide
//!   it; reported as `Shadowing` only when the renamed symbol's own body
//!   references the hidden declaration, since resolution of the renamed
//!   references themselves stays correct

use std::collections::BTreeSet;

use serde::Serialize;

use gmlref_semantic::{
    Occurrence, ScopeId, SemanticAnalyzer, Symbol, SymbolId, SymbolResolution,
};

/// Kind of rename hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Another symbol with the new name is already declared in the renamed
    /// symbol's scope
    NameCollision,
    /// A renamed reference would bind to a nested declaration of the new
    /// name instead of the renamed symbol
    ScopeCapture,
    /// The renamed declaration would hide an outer declaration the symbol's
    /// body references; behavior-preserving but a code smell
    Shadowing,
    /// The symbol id does not resolve uniquely; nothing else can be checked
    AmbiguousSymbol,
}

impl ConflictKind {
    /// Whether planning must refuse to build an edit for this conflict.
    /// `Shadowing` is warning-severity; everything else blocks.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ConflictKind::Shadowing)
    }
}

/// One detected rename hazard
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub description: String,
    /// The occurrence the hazard was observed at, when location-specific
    pub occurrence: Option<Occurrence>,
}

impl Conflict {
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }
}

/// Detects naming collisions and scope-capture/shadowing hazards for a
/// proposed rename
pub struct ConflictDetector<'a> {
    analyzer: &'a dyn SemanticAnalyzer,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(analyzer: &'a dyn SemanticAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Detect conflicts for renaming `symbol_id` to `new_name`.
    ///
    /// When the id does not resolve uniquely, the result is the single
    /// `AmbiguousSymbol` conflict; an unknown id yields no conflicts (the
    /// planner reports it as `SymbolNotFound` instead).
    pub fn detect_rename_conflicts(&self, symbol_id: &SymbolId, new_name: &str) -> Vec<Conflict> {
        match self.analyzer.resolve_symbol(symbol_id) {
            SymbolResolution::Ambiguous(candidates) => {
                vec![Conflict {
                    kind: ConflictKind::AmbiguousSymbol,
                    description: format!(
                        "symbol {} resolves to {} candidates ({}); cannot rename safely",
                        symbol_id,
                        candidates.len(),
                        candidates
                            .iter()
                            .map(|c| c.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    ),
                    occurrence: None,
                }]
            }
            SymbolResolution::Unknown => Vec::new(),
            SymbolResolution::Resolved(symbol) => {
                let occurrences = self.analyzer.occurrences(symbol_id);
                self.detect_for_symbol(&symbol, new_name, &occurrences)
            }
        }
    }

    /// Detect conflicts for an already-resolved symbol and its current
    /// occurrence set
    pub fn detect_for_symbol(
        &self,
        symbol: &Symbol,
        new_name: &str,
        occurrences: &[Occurrence],
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        // Collision: another declaration of new_name in the defining scope.
        // Checked once; the defining scope is visible from every occurrence.
        if let Some(bound) = self.analyzer.binding_in_scope(symbol.scope, new_name) {
            if bound != symbol.id {
                conflicts.push(Conflict {
                    kind: ConflictKind::NameCollision,
                    description: format!(
                        "{} is already bound to {} in the scope declaring {}",
                        new_name, bound, symbol.name,
                    ),
                    occurrence: occurrences.first().cloned(),
                });
            }
        }

        // Capture: a declaration of new_name in a scope strictly between an
        // occurrence and the defining scope would win resolution after the
        // rename. One conflict per capturing scope.
        let mut captured_scopes: BTreeSet<ScopeId> = BTreeSet::new();
        for occurrence in occurrences {
            let mut cursor = Some(occurrence.scope);
            while let Some(scope) = cursor {
                if scope == symbol.scope {
                    break;
                }
                if let Some(bound) = self.analyzer.binding_in_scope(scope, new_name) {
                    if bound != symbol.id && captured_scopes.insert(scope) {
                        conflicts.push(Conflict {
                            kind: ConflictKind::ScopeCapture,
                            description: format!(
                                "renaming {} to {} would make this reference bind to {} \
                                 declared in a nested scope",
                                symbol.name, new_name, bound,
                            ),
                            occurrence: Some(occurrence.clone()),
                        });
                    }
                    // Nearer binding wins resolution; outer scopes are moot
                    break;
                }
                cursor = self.analyzer.scope_parent(scope);
            }
        }

        // Shadowing: the renamed declaration would hide an outer declaration
        // of new_name that the symbol's own body references.
        for dep_id in self.analyzer.dependencies(&symbol.id) {
            if let SymbolResolution::Resolved(dep) = self.analyzer.resolve_symbol(&dep_id) {
                if dep.name == new_name && self.is_strict_ancestor(dep.scope, symbol.scope) {
                    conflicts.push(Conflict {
                        kind: ConflictKind::Shadowing,
                        description: format!(
                            "renaming {} to {} shadows {} from an outer scope, \
                             which {}'s body references",
                            symbol.name, new_name, dep_id, symbol.name,
                        ),
                        occurrence: None,
                    });
                }
            }
        }

        conflicts
    }

    /// Whether `candidate` is a proper ancestor of `scope`
    fn is_strict_ancestor(&self, candidate: ScopeId, scope: ScopeId) -> bool {
        let mut cursor = self.analyzer.scope_parent(scope);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.analyzer.scope_parent(current);
        }
        false
    }
}
