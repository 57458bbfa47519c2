//! In-memory project index
//!
//! `ProjectIndex` is the concrete symbol store behind the analyzer and
//! parser-bridge contracts. A language frontend feeds it with scopes,
//! symbols, occurrences, and dependency edges after analyzing a project;
//! tests feed it by hand. It is deliberately dumb: it answers queries over
//! registered facts and performs no analysis of its own.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::analyzer::{SemanticAnalyzer, SymbolResolution};
use crate::parser::ParserBridge;
use crate::scope::{Scope, ScopeId};
use crate::symbol::{Occurrence, Symbol, SymbolId, SymbolRef};

/// Errors raised while registering project facts
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("symbol {0} is already registered")]
    DuplicateSymbol(SymbolId),

    #[error("symbol {0} is not registered")]
    UnknownSymbol(SymbolId),

    #[error("scope {0:?} is not registered")]
    UnknownScope(ScopeId),
}

/// Symbol facts for one analyzed project
#[derive(Debug, Default)]
pub struct ProjectIndex {
    scopes: HashMap<ScopeId, Scope>,
    symbols: HashMap<SymbolId, Symbol>,
    occurrences: HashMap<SymbolId, Vec<Occurrence>>,
    /// Edges: symbol -> symbols its definition references
    dependencies: HashMap<SymbolId, Vec<SymbolId>>,
    /// Reverse edges, kept in sync with `dependencies`
    dependents: HashMap<SymbolId, Vec<SymbolId>>,
    /// Ids the frontend could not resolve uniquely, with their candidates
    ambiguous: HashMap<SymbolId, Vec<SymbolId>>,
    next_scope: u32,
}

impl ProjectIndex {
    /// Create an index with the global scope already registered
    pub fn new() -> Self {
        let mut index = Self::default();
        index.scopes.insert(ScopeId(0), Scope::new(None));
        index.next_scope = 1;
        index
    }

    /// The root scope every project has
    pub fn global_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Register a child scope of `parent`
    pub fn add_scope(&mut self, parent: ScopeId) -> Result<ScopeId, IndexError> {
        if !self.scopes.contains_key(&parent) {
            return Err(IndexError::UnknownScope(parent));
        }
        let id = ScopeId(self.next_scope);
        self.next_scope += 1;
        self.scopes.insert(id, Scope::new(Some(parent)));
        Ok(id)
    }

    /// Register a symbol and bind its name into its defining scope
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<(), IndexError> {
        if self.symbols.contains_key(&symbol.id) {
            return Err(IndexError::DuplicateSymbol(symbol.id));
        }
        let scope = self
            .scopes
            .get_mut(&symbol.scope)
            .ok_or(IndexError::UnknownScope(symbol.scope))?;
        scope.bind(symbol.name.clone(), symbol.id.clone());
        self.symbols.insert(symbol.id.clone(), symbol);
        Ok(())
    }

    /// Register one occurrence of an already-registered symbol
    pub fn add_occurrence(&mut self, occurrence: Occurrence) -> Result<(), IndexError> {
        if !self.symbols.contains_key(&occurrence.symbol_id) {
            return Err(IndexError::UnknownSymbol(occurrence.symbol_id));
        }
        if !self.scopes.contains_key(&occurrence.scope) {
            return Err(IndexError::UnknownScope(occurrence.scope));
        }
        self.occurrences
            .entry(occurrence.symbol_id.clone())
            .or_default()
            .push(occurrence);
        Ok(())
    }

    /// Register a dependency edge: `from`'s definition references `to`
    pub fn add_dependency(&mut self, from: &SymbolId, to: &SymbolId) -> Result<(), IndexError> {
        if !self.symbols.contains_key(from) {
            return Err(IndexError::UnknownSymbol(from.clone()));
        }
        if !self.symbols.contains_key(to) {
            return Err(IndexError::UnknownSymbol(to.clone()));
        }
        self.dependencies
            .entry(from.clone())
            .or_default()
            .push(to.clone());
        self.dependents
            .entry(to.clone())
            .or_default()
            .push(from.clone());
        Ok(())
    }

    /// Mark an id the frontend could not resolve uniquely
    pub fn add_ambiguous(&mut self, id: SymbolId, candidates: Vec<SymbolId>) {
        self.ambiguous.insert(id, candidates);
    }

    /// Number of registered symbols
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

impl SemanticAnalyzer for ProjectIndex {
    fn resolve_symbol(&self, id: &SymbolId) -> SymbolResolution {
        if let Some(candidates) = self.ambiguous.get(id) {
            return SymbolResolution::Ambiguous(candidates.clone());
        }
        match self.symbols.get(id) {
            Some(symbol) => SymbolResolution::Resolved(symbol.clone()),
            None => SymbolResolution::Unknown,
        }
    }

    fn occurrences(&self, id: &SymbolId) -> Vec<Occurrence> {
        self.occurrences.get(id).cloned().unwrap_or_default()
    }

    fn dependents(&self, id: &SymbolId) -> Vec<SymbolId> {
        self.dependents.get(id).cloned().unwrap_or_default()
    }

    fn dependencies(&self, id: &SymbolId) -> Vec<SymbolId> {
        self.dependencies.get(id).cloned().unwrap_or_default()
    }

    fn is_name_bound_in_scope(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes
            .get(&scope)
            .map_or(false, |s| s.is_bound(name))
    }

    fn binding_in_scope(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes.get(&scope).and_then(|s| s.binding(name).cloned())
    }

    fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(&scope).and_then(|s| s.parent())
    }
}

impl ParserBridge for ProjectIndex {
    fn find_symbol_at_offset(&self, file_path: &Path, offset: usize) -> Option<SymbolRef> {
        for (id, occurrences) in &self.occurrences {
            for occ in occurrences {
                if occ.file_path == file_path
                    && occ.start_offset <= offset
                    && offset < occ.end_offset
                {
                    let name = self
                        .symbols
                        .get(id)
                        .map(|s| s.name.clone())
                        .unwrap_or_default();
                    return Some(SymbolRef {
                        symbol_id: id.clone(),
                        name,
                        start_offset: occ.start_offset,
                        end_offset: occ.end_offset,
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{OccurrenceRole, SymbolKind};

    fn script(index: &mut ProjectIndex, name: &str) -> SymbolId {
        let id = SymbolId::new(format!("gml/script/{name}"));
        index
            .add_symbol(Symbol {
                id: id.clone(),
                name: name.to_string(),
                kind: SymbolKind::Script,
                file_path: format!("scripts/{name}.gml").into(),
                scope: index.global_scope(),
            })
            .unwrap();
        id
    }

    #[test]
    fn test_register_and_resolve() {
        let mut index = ProjectIndex::new();
        let id = script(&mut index, "scr_attack");

        match index.resolve_symbol(&id) {
            SymbolResolution::Resolved(symbol) => assert_eq!(symbol.name, "scr_attack"),
            other => panic!("expected resolution, got {other:?}"),
        }
        assert!(index.is_name_bound_in_scope(index.global_scope(), "scr_attack"));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut index = ProjectIndex::new();
        script(&mut index, "scr_attack");

        let dup = Symbol {
            id: SymbolId::from("gml/script/scr_attack"),
            name: "scr_attack".to_string(),
            kind: SymbolKind::Script,
            file_path: "scripts/scr_attack.gml".into(),
            scope: ScopeId(0),
        };
        assert!(matches!(
            index.add_symbol(dup),
            Err(IndexError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn test_scope_chain() {
        let mut index = ProjectIndex::new();
        let inner = index.add_scope(index.global_scope()).unwrap();
        let innermost = index.add_scope(inner).unwrap();

        assert_eq!(index.scope_parent(innermost), Some(inner));
        assert_eq!(index.scope_parent(inner), Some(index.global_scope()));
        assert_eq!(index.scope_parent(index.global_scope()), None);
    }

    #[test]
    fn test_dependency_edges_are_mirrored() {
        let mut index = ProjectIndex::new();
        let caller = script(&mut index, "scr_caller");
        let callee = script(&mut index, "scr_callee");
        index.add_dependency(&caller, &callee).unwrap();

        assert_eq!(index.dependencies(&caller), vec![callee.clone()]);
        assert_eq!(index.dependents(&callee), vec![caller]);
    }

    #[test]
    fn test_ambiguous_resolution() {
        let mut index = ProjectIndex::new();
        let a = script(&mut index, "scr_draw_a");
        let b = script(&mut index, "scr_draw_b");
        index.add_ambiguous(SymbolId::from("gml/script/scr_draw"), vec![a, b]);

        match index.resolve_symbol(&SymbolId::from("gml/script/scr_draw")) {
            SymbolResolution::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_find_symbol_at_offset() {
        let mut index = ProjectIndex::new();
        let id = script(&mut index, "scr_attack");
        index
            .add_occurrence(Occurrence {
                symbol_id: id.clone(),
                file_path: "objects/obj_player.gml".into(),
                start_offset: 12,
                end_offset: 22,
                role: OccurrenceRole::Reference,
                scope: index.global_scope(),
            })
            .unwrap();

        let hit = index
            .find_symbol_at_offset(Path::new("objects/obj_player.gml"), 15)
            .unwrap();
        assert_eq!(hit.symbol_id, id);
        assert_eq!(hit.name, "scr_attack");

        // End offset is exclusive
        assert!(index
            .find_symbol_at_offset(Path::new("objects/obj_player.gml"), 22)
            .is_none());
    }
}
