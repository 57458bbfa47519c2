//! Error taxonomy for the refactoring engine
//!
//! Every failure path either surfaces one of these typed errors or an
//! explicit status field (`ApplyResult`, `HotReloadReport`); nothing is
//! swallowed into logging.

use std::path::PathBuf;

use thiserror::Error;

use gmlref_core::EditError;
use gmlref_semantic::SymbolId;

use crate::conflict::Conflict;

/// Errors surfaced by planning, validation, and execution
#[derive(Error, Debug)]
pub enum RefactorError {
    /// The requested symbol id does not resolve; not retried
    #[error("symbol {symbol_id} was not found")]
    SymbolNotFound { symbol_id: SymbolId },

    /// The id matches several candidates; a rename cannot proceed safely
    #[error("symbol {symbol_id} is ambiguous ({} candidates)", candidates.len())]
    AmbiguousSymbol {
        symbol_id: SymbolId,
        candidates: Vec<SymbolId>,
    },

    /// The proposed name is not a legal identifier for the target language
    #[error("invalid new name {name:?}: {reason}")]
    InvalidNewName { name: String, reason: String },

    /// Conflict detection blocked the rename; the caller decides whether to
    /// override or abort
    #[error("rename of {symbol_id} blocked by {} conflict(s)", conflicts.len())]
    RenameConflict {
        symbol_id: SymbolId,
        conflicts: Vec<Conflict>,
    },

    /// Cross-request validation failed; no partial batch escapes
    #[error("batch rename blocked by {} cross-request conflict(s)", conflicts.len())]
    BatchConflict { conflicts: Vec<Conflict> },

    /// A workspace edit no longer matches any current occurrence span
    #[error("workspace edit is stale at {}:{offset}", file.display())]
    StaleEdit { file: PathBuf, offset: usize },

    /// Hot-reload preparation was requested but the edit set cannot be
    /// patched into the running interpreter
    #[error("hot reload incompatible: {}", errors.join("; "))]
    HotReloadIncompatible { errors: Vec<String> },

    /// Patch generation was requested without an injected transpiler
    #[error("no transpiler is configured")]
    TranspilerUnavailable,

    /// The transpiler rejected post-edit source
    #[error("transpile failed for {}: {message}", file.display())]
    TranspileFailed { file: PathBuf, message: String },

    /// The caller's cancellation token fired between files
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
