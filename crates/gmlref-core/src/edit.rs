//! Byte-offset source editing across a multi-file workspace

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building or applying edits
#[derive(Error, Debug)]
pub enum EditError {
    #[error("edit span {start}..{end} is inverted")]
    InvertedSpan { start: usize, end: usize },

    #[error("overlapping edits in {file} at offset {offset}")]
    OverlappingEdits { file: PathBuf, offset: usize },

    #[error("edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("edit offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

/// A single text replacement in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// File the edit applies to
    pub file_path: PathBuf,
    /// Byte offset where the replaced span starts
    pub start_offset: usize,
    /// Byte offset where the replaced span ends (exclusive)
    pub end_offset: usize,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    /// Create a new edit. Fails if the span is inverted.
    pub fn new(
        file_path: impl Into<PathBuf>,
        start_offset: usize,
        end_offset: usize,
        new_text: impl Into<String>,
    ) -> Result<Self, EditError> {
        if start_offset > end_offset {
            return Err(EditError::InvertedSpan {
                start: start_offset,
                end: end_offset,
            });
        }
        Ok(Self {
            file_path: file_path.into(),
            start_offset,
            end_offset,
            new_text: new_text.into(),
        })
    }

    /// Length of the replaced span in bytes
    pub fn span_len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Whether this edit's span intersects another edit in the same file.
    /// Edits that merely touch (one ends where the other starts) do not
    /// count as overlapping.
    pub fn overlaps(&self, other: &TextEdit) -> bool {
        self.file_path == other.file_path
            && self.start_offset < other.end_offset
            && other.start_offset < self.end_offset
    }
}

/// An ordered batch of text edits spanning one or more files
///
/// Built incrementally with [`WorkspaceEdit::add_edit`], which rejects
/// overlapping same-file spans, so a constructed batch is always safe to
/// apply. [`WorkspaceEdit::group_by_file`] hands back each file's edits in
/// descending `start_offset` order: splicing from the end of a file toward
/// its start never invalidates the offsets of edits not yet applied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkspaceEdit {
    edits: Vec<TextEdit>,
}

impl WorkspaceEdit {
    /// Create an empty workspace edit
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace edit from a list of edits, validating overlap
    pub fn from_edits(edits: Vec<TextEdit>) -> Result<Self, EditError> {
        let mut workspace = Self::new();
        for edit in edits {
            workspace.add_edit(edit)?;
        }
        Ok(workspace)
    }

    /// Add an edit, rejecting it if it overlaps an existing same-file edit
    pub fn add_edit(&mut self, edit: TextEdit) -> Result<(), EditError> {
        if let Some(existing) = self.edits.iter().find(|e| e.overlaps(&edit)) {
            return Err(EditError::OverlappingEdits {
                file: edit.file_path.clone(),
                offset: edit.start_offset.max(existing.start_offset),
            });
        }
        self.edits.push(edit);
        Ok(())
    }

    /// Merge another workspace edit into this one, re-validating overlap
    pub fn merge(&mut self, other: WorkspaceEdit) -> Result<(), EditError> {
        for edit in other.edits {
            self.add_edit(edit)?;
        }
        Ok(())
    }

    /// Whether the batch contains no edits
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits in the batch
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// All edits in insertion order
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Distinct files touched by the batch, sorted
    pub fn file_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.edits.iter().map(|e| e.file_path.as_path()).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Whether the batch touches the given file
    pub fn touches(&self, path: &Path) -> bool {
        self.edits.iter().any(|e| e.file_path == path)
    }

    /// Group edits by file, each file's edits sorted by descending
    /// `start_offset`
    pub fn group_by_file(&self) -> BTreeMap<&Path, Vec<&TextEdit>> {
        let mut groups: BTreeMap<&Path, Vec<&TextEdit>> = BTreeMap::new();
        for edit in &self.edits {
            groups.entry(edit.file_path.as_path()).or_default().push(edit);
        }
        for edits in groups.values_mut() {
            edits.sort_by(|a, b| b.start_offset.cmp(&a.start_offset));
        }
        groups
    }
}

/// Apply one file's edits to its source text
///
/// Edits are applied in descending `start_offset` order so earlier spans
/// stay valid while later spans are spliced.
///
/// # Arguments
/// * `source` - The current contents of the file
/// * `edits` - The file's edits, in any order
///
/// # Returns
/// * `Ok(String)` - The modified source text
/// * `Err(EditError)` - If edits overlap, fall out of bounds, or split a
///   character
pub fn apply_edits(source: &str, edits: &[&TextEdit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort by start position (descending) for safe replacement
    let mut sorted: Vec<&TextEdit> = edits.to_vec();
    sorted.sort_by(|a, b| b.start_offset.cmp(&a.start_offset));

    // Validate bounds, boundaries, and overlap before touching the text
    let source_len = source.len();
    let mut prev_start: Option<usize> = None;

    for edit in &sorted {
        let (start, end) = (edit.start_offset, edit.end_offset);

        if end > source_len {
            return Err(EditError::SpanOutOfBounds {
                start,
                end,
                len: source_len,
            });
        }
        if !source.is_char_boundary(start) {
            return Err(EditError::NotCharBoundary { offset: start });
        }
        if !source.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { offset: end });
        }
        if let Some(prev) = prev_start {
            if end > prev {
                return Err(EditError::OverlappingEdits {
                    file: edit.file_path.clone(),
                    offset: start,
                });
            }
        }
        prev_start = Some(start);
    }

    // Apply from end to start
    let mut result = source.to_string();
    for edit in sorted {
        result.replace_range(edit.start_offset..edit.end_offset, &edit.new_text);
    }

    Ok(result)
}
