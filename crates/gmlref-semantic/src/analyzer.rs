//! Semantic analyzer contract
//!
//! The analyzer owns project-wide symbol resolution: definitions,
//! occurrences, dependency edges, and scope bindings. Everything here is
//! synchronous; resolution runs over already-analyzed state and never
//! suspends.

use crate::scope::ScopeId;
use crate::symbol::{Occurrence, Symbol, SymbolId};

/// Outcome of resolving a symbol id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolResolution {
    /// Exactly one symbol carries this id
    Resolved(Symbol),
    /// The id matches several candidates and cannot be renamed safely
    Ambiguous(Vec<SymbolId>),
    /// No symbol carries this id
    Unknown,
}

impl SymbolResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SymbolResolution::Resolved(_))
    }
}

/// Project-wide symbol resolution capability
pub trait SemanticAnalyzer: Send + Sync {
    /// Resolve a symbol id to its definition
    fn resolve_symbol(&self, id: &SymbolId) -> SymbolResolution;

    /// All occurrences (definitions and references) of a symbol.
    /// Results go stale after any edit is applied; never cache them.
    fn occurrences(&self, id: &SymbolId) -> Vec<Occurrence>;

    /// Symbols whose definitions reference `id` (one hop)
    fn dependents(&self, id: &SymbolId) -> Vec<SymbolId>;

    /// Symbols referenced by `id`'s own definition (one hop)
    fn dependencies(&self, id: &SymbolId) -> Vec<SymbolId>;

    /// Whether `name` is bound directly in `scope` (parents not consulted)
    fn is_name_bound_in_scope(&self, scope: ScopeId, name: &str) -> bool;

    /// The symbol `name` is bound to directly in `scope`, if any
    fn binding_in_scope(&self, scope: ScopeId, name: &str) -> Option<SymbolId>;

    /// Parent of `scope`, or `None` for the global scope
    fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId>;
}
