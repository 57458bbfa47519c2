//! gmlref-core: Core abstractions for GML refactoring
//!
//! This crate provides:
//! - `TextEdit`: A byte-offset code modification in a single file
//! - `WorkspaceEdit`: An ordered batch of edits spanning one or more files
//! - `apply_edits()`: Function to splice a file's edits into its source text
//!
//! Edits for the same file must never overlap; overlap is rejected when an
//! edit is added, not when the batch is applied.

mod edit;

pub use edit::{apply_edits, EditError, TextEdit, WorkspaceEdit};
