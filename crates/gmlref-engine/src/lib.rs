//! gmlref-engine: Scope-aware rename refactoring for GML projects
//!
//! This crate provides:
//! - `RenamePlanner`: turns rename requests into validated workspace edits
//! - `ConflictDetector`: collision, scope-capture, and shadowing hazards
//! - `ImpactAnalyzer`: read-only previews of a prospective rename
//! - `HotReloadValidator` / `TranspilerPatchGenerator`: live-patch support
//!   for a running interpreter
//! - `WorkspaceEditApplier`: per-file best-effort application with dry-run
//! - `RefactorEngine`: the façade composing all of the above over injected
//!   parser/analyzer/transpiler/I-O collaborators
//!
//! Planning is atomic in memory; application is best-effort per file. Both
//! halves of that split are deliberate: an invalid batch must never leak a
//! partial plan, and a disk failure on one file must never discard apply
//! results for its siblings.

pub mod applier;
pub mod cancel;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod hot_reload;
pub mod impact;
pub mod logging;
pub mod patch;
pub mod planner;

pub use applier::{ApplyOptions, ApplyResult, ApplyStatus, WorkspaceEditApplier};
pub use cancel::CancelToken;
pub use config::{ConfigError, HotReloadConfig, RefactorConfig, RenameConfig};
pub use conflict::{Conflict, ConflictDetector, ConflictKind};
pub use engine::{ExecuteOptions, ExecuteOutcome, RefactorEngine};
pub use error::RefactorError;
pub use hot_reload::{
    is_patchable_kind, HotReloadOptions, HotReloadReport, HotReloadUpdate, HotReloadValidator,
};
pub use impact::{ImpactAnalyzer, RenameImpactAnalysis, RenameSummary};
pub use patch::{TranspilerPatch, TranspilerPatchGenerator};
pub use planner::{RenamePlanner, RenameRequest};
