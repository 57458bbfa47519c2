//! Scope handles and bindings
//!
//! Scopes form a parent-linked tree rooted at the global scope. The engine
//! only ever walks the chain upward through
//! [`SemanticAnalyzer::scope_parent`](crate::SemanticAnalyzer::scope_parent);
//! the concrete tree lives with the analyzer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolId;

/// Opaque handle for a scope in the analyzed project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

/// One scope's bindings and its parent link
#[derive(Debug, Clone, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    bindings: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            bindings: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Bind a name in this scope, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, symbol: SymbolId) {
        self.bindings.insert(name.into(), symbol);
    }

    pub fn binding(&self, name: &str) -> Option<&SymbolId> {
        self.bindings.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}
