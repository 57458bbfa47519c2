//! Symbol and occurrence types
//!
//! Symbols are owned by the semantic analyzer collaborator; the engine holds
//! them only by id. Occurrences are produced fresh per query and go stale as
//! soon as any edit is applied.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scope::ScopeId;

/// Stable qualified symbol name, e.g. `gml/script/scr_player_move`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of declared entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Top-level script asset
    Script,
    /// Function declared inside a script
    Function,
    /// `#macro` definition
    Macro,
    /// `enum` declaration
    EnumDecl,
    /// `globalvar` / `global.` variable
    GlobalVar,
    /// `var` local
    LocalVar,
    /// Object asset
    Object,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Script => "script",
            SymbolKind::Function => "function",
            SymbolKind::Macro => "macro",
            SymbolKind::EnumDecl => "enum",
            SymbolKind::GlobalVar => "global variable",
            SymbolKind::LocalVar => "local variable",
            SymbolKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A resolved symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    /// Bare identifier as written in source
    pub name: String,
    pub kind: SymbolKind,
    /// File holding the definition
    pub file_path: PathBuf,
    /// Scope the definition introduces its binding into
    pub scope: ScopeId,
}

/// Whether an occurrence defines or references its symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceRole {
    Definition,
    Reference,
}

/// A concrete source location where a symbol is defined or referenced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub symbol_id: SymbolId,
    pub file_path: PathBuf,
    /// Byte offset where the identifier starts
    pub start_offset: usize,
    /// Byte offset just past the identifier
    pub end_offset: usize,
    pub role: OccurrenceRole,
    /// Innermost scope enclosing the occurrence
    pub scope: ScopeId,
}

impl Occurrence {
    /// Byte length of the identifier span
    pub fn span_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// What the parser found at a requested location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub symbol_id: SymbolId,
    pub name: String,
    pub start_offset: usize,
    pub end_offset: usize,
}
