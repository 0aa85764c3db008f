//! core::document
//!
//! In-memory model of an inlist file.
//!
//! # Format
//!
//! ```text
//! ! full-line comments are skipped
//! &controls ! block open, inline comment ignored
//!   initial_mass = 1.0 ! inline comment stripped
//!   history_interval = 10
//! /
//! ```
//!
//! Values are raw text: whatever sits between `=` and the first `!` (or the
//! end of the line), trimmed. Nothing is coerced.
//!
//! # Invariants
//!
//! - Block names are unique within a document, parameter names within a block
//! - Blocks and parameters iterate in first-seen order, so rendering a loaded
//!   document reproduces a stable file
//! - Parsing never fails; unrecognised lines are skipped

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

/// Inline and full-line comment marker.
const COMMENT: char = '!';

/// Block open marker.
const BLOCK_OPEN: char = '&';

/// Block close line.
const BLOCK_CLOSE: &str = "/";

/// Errors from reading or writing inlist files.
#[derive(Debug, Error)]
pub enum InlistError {
    #[error("failed to read inlist '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write inlist '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One `block.param = value` edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub block: String,
    pub param: String,
    pub value: String,
}

impl Assignment {
    pub fn new(
        block: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            block: block.into(),
            param: param.into(),
            value: value.into(),
        }
    }
}

/// A named group of parameters (`&name ... /`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    params: IndexMap<String, String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter's raw value.
    pub fn get(&self, param: &str) -> Option<&str> {
        self.params.get(param).map(String::as_str)
    }

    pub fn contains(&self, param: &str) -> bool {
        self.params.contains_key(param)
    }

    /// Set a parameter, returning the previous value.
    ///
    /// New parameters go to the end; existing ones keep their position.
    pub fn set(&mut self, param: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(param.into(), value.into())
    }

    /// Remove a parameter, keeping the order of the rest.
    pub fn remove(&mut self, param: &str) -> Option<String> {
        self.params.shift_remove(param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An ordered mapping from block name to [`Block`].
///
/// # Example
///
/// ```
/// use inlist_grid::core::document::Document;
///
/// let doc = Document::parse("&controls\n  T_start = 5000 ! initial guess\n/\n");
/// assert_eq!(doc.get("controls", "T_start"), Some("5000"));
/// assert_eq!(doc.render(), "&controls\n  T_start = 5000\n/\n\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: IndexMap<String, Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse inlist text.
    pub fn parse(text: &str) -> Self {
        let mut doc = Document::new();
        let mut current: Option<String> = None;

        for raw in text.lines() {
            let line = raw.trim();

            if line.starts_with(COMMENT) {
                continue;
            }

            if let Some(rest) = line.strip_prefix(BLOCK_OPEN) {
                let name = strip_comment(rest);
                doc.blocks.entry(name.to_string()).or_default();
                // An unnamed block exists but never receives parameters.
                current = (!name.is_empty()).then(|| name.to_string());
            } else if line == BLOCK_CLOSE {
                current = None;
            } else if let Some(block) = current.as_ref() {
                let Some((param, value)) = line.split_once('=') else {
                    continue;
                };
                let param = strip_comment(param);
                let value = strip_comment(value);
                if let Some(block) = doc.blocks.get_mut(block) {
                    block.set(param, value);
                }
            }
        }

        doc
    }

    /// Render in the canonical output form.
    ///
    /// Each block becomes `&name`, one `  param = value` line per parameter,
    /// then `/` and a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, block) in &self.blocks {
            out.push(BLOCK_OPEN);
            out.push_str(name);
            out.push('\n');
            for (param, value) in block.iter() {
                out.push_str("  ");
                out.push_str(param);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
            out.push_str(BLOCK_CLOSE);
            out.push_str("\n\n");
        }
        out
    }

    /// Load an inlist from disk.
    ///
    /// A missing file yields an empty document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InlistError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let doc = Self::parse(&text);
                tracing::debug!(path = %path.display(), blocks = doc.len(), "loaded inlist");
                Ok(doc)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "inlist missing, starting empty");
                Ok(Self::new())
            }
            Err(e) => Err(InlistError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Overwrite `path` with the rendered document.
    ///
    /// The write is a plain truncate-and-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), InlistError> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|e| InlistError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), blocks = self.len(), "saved inlist");
        Ok(())
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    /// Get a parameter value; `None` if either the block or parameter is absent.
    pub fn get(&self, block: &str, param: &str) -> Option<&str> {
        self.blocks.get(block).and_then(|b| b.get(param))
    }

    /// Set a parameter, creating the block if needed.
    pub fn set(
        &mut self,
        block: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.blocks
            .entry(block.into())
            .or_default()
            .set(param, value)
    }

    /// Remove a parameter. The block stays even if it becomes empty.
    pub fn remove(&mut self, block: &str, param: &str) -> Option<String> {
        self.blocks.get_mut(block).and_then(|b| b.remove(param))
    }

    /// Apply a series of assignments in order.
    pub fn apply<'a>(&mut self, assignments: impl IntoIterator<Item = &'a Assignment>) {
        for a in assignments {
            self.set(a.block.as_str(), a.param.as_str(), a.value.as_str());
        }
    }

    /// Blocks in first-seen order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Drop everything from the first `!` on, then trim.
fn strip_comment(s: &str) -> &str {
    s.split(COMMENT).next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
! MESA project inlist
&star_job
  create_pre_main_sequence_model = .true.
  mass = 1.0 ! star_job copy
/ ! end of star_job

&controls ! physics
  ! commented_out = 3
  initial_mass = 1.0
  T_start = 5000 ! initial guess
  mass = 2.0
/
";

    #[test]
    fn parse_blocks_in_order() {
        let doc = Document::parse(SAMPLE);
        let names: Vec<_> = doc.blocks().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["star_job", "controls"]);
    }

    #[test]
    fn inline_comment_stripped() {
        let doc = Document::parse(SAMPLE);
        assert_eq!(doc.get("controls", "T_start"), Some("5000"));
        assert_eq!(doc.get("star_job", "mass"), Some("1.0"));
    }

    #[test]
    fn commented_parameter_ignored() {
        let doc = Document::parse(SAMPLE);
        assert!(!doc.block("controls").unwrap().contains("commented_out"));
        assert_eq!(doc.block("controls").unwrap().len(), 3);
    }

    #[test]
    fn close_line_must_be_exact() {
        // "/ ! end of star_job" is not a close, so star_job stays open until &controls.
        let doc = Document::parse("&a\n/ ! not a close\nx = 1\n/\ny = 2\n");
        assert_eq!(doc.get("a", "x"), Some("1"));
        assert_eq!(doc.get("a", "y"), None);
    }

    #[test]
    fn full_line_comment_does_not_close_block() {
        let doc = Document::parse("&a\n! this is ignored\nx = 1\n/\n");
        assert_eq!(doc.get("a", "x"), Some("1"));
    }

    #[test]
    fn assignment_outside_block_ignored() {
        let doc = Document::parse("x = 1\n&a\n/\ny = 2\n");
        assert_eq!(doc.len(), 1);
        assert!(doc.block("a").unwrap().is_empty());
    }

    #[test]
    fn stray_close_ignored() {
        let doc = Document::parse("/\n&a\nx = 1\n/\n/\n");
        assert_eq!(doc.get("a", "x"), Some("1"));
    }

    #[test]
    fn value_keeps_raw_text() {
        let doc = Document::parse("&a\n  s = 'hello world'\n  f = 1d-3\n  eq = a=b\n/\n");
        assert_eq!(doc.get("a", "s"), Some("'hello world'"));
        assert_eq!(doc.get("a", "f"), Some("1d-3"));
        assert_eq!(doc.get("a", "eq"), Some("a=b"));
    }

    #[test]
    fn reopened_block_keeps_parameters() {
        let doc = Document::parse("&a\nx = 1\n/\n&b\n/\n&a\ny = 2\nx = 3\n/\n");
        let block = doc.block("a").unwrap();
        let params: Vec<_> = block.iter().collect();
        assert_eq!(params, vec![("x", "3"), ("y", "2")]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn unnamed_block_takes_no_parameters() {
        let doc = Document::parse("& ! nothing\nx = 1\n/\n");
        assert_eq!(doc.len(), 1);
        assert!(doc.block("").unwrap().is_empty());
    }

    #[test]
    fn empty_parameter_name_is_kept() {
        let doc = Document::parse("&a\n = 5 ! no name\n/\n");
        assert_eq!(doc.get("a", ""), Some("5"));
        assert_eq!(doc.render(), "&a\n   = 5\n/\n\n");
    }

    #[test]
    fn render_canonical_form() {
        let mut doc = Document::new();
        doc.set("controls", "x", "1");
        doc.set("controls", "y", "a");
        doc.set("pgstar", "z", ".false.");
        assert_eq!(
            doc.render(),
            "&controls\n  x = 1\n  y = a\n/\n\n&pgstar\n  z = .false.\n/\n\n"
        );
    }

    #[test]
    fn remove_keeps_order_and_block() {
        let mut doc = Document::parse("&a\nx = 1\ny = 2\nz = 3\n/\n");
        assert_eq!(doc.remove("a", "y"), Some("2".to_string()));
        let params: Vec<_> = doc.block("a").unwrap().iter().collect();
        assert_eq!(params, vec![("x", "1"), ("z", "3")]);

        assert_eq!(doc.remove("a", "x"), Some("1".to_string()));
        assert_eq!(doc.remove("a", "z"), Some("3".to_string()));
        assert!(doc.block("a").is_some());
    }

    #[test]
    fn apply_assignments() {
        let mut doc = Document::new();
        doc.apply(&[
            Assignment::new("controls", "x", "1"),
            Assignment::new("star_job", "y", "2"),
            Assignment::new("controls", "x", "3"),
        ]);
        assert_eq!(doc.get("controls", "x"), Some("3"));
        assert_eq!(doc.get("star_job", "y"), Some("2"));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let doc = Document::load(temp.path().join("nope")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn load_directory_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Document::load(temp.path()).unwrap_err();
        assert!(matches!(err, InlistError::Read { .. }));
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inlist");
        let doc = Document::parse(SAMPLE);
        doc.save(&path).unwrap();
        assert_eq!(Document::load(&path).unwrap(), doc);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = Document::new()
            .save(temp.path().join("missing/inlist"))
            .unwrap_err();
        assert!(matches!(err, InlistError::Write { .. }));
    }
}
