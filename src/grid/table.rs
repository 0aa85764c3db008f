//! grid::table
//!
//! Tabular grid files.
//!
//! # Format
//!
//! Whitespace-delimited columns. The first row names the parameters, the
//! second their blocks, and every further row is one configuration:
//!
//! ```text
//! # mass grid
//! initial_mass  initial_z  use_Type2_opacities
//! controls      controls   controls
//! 1.0           0.02       .true.
//! 1.5           0.02       .false.
//! ```
//!
//! Everything from a `#` to the end of its line is a comment. Lines left
//! blank are skipped. Every row must have the same number of columns.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::document::Assignment;

/// Line comment marker in table files.
const COMMENT: char = '#';

/// Errors from reading a grid table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read grid table '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("grid table needs a parameter row and a block row, found {found} row(s)")]
    MissingHeader { found: usize },

    #[error("grid table line {line}: expected {expected} column(s), found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A parsed grid table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTable {
    params: Vec<String>,
    blocks: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl GridTable {
    /// Read and parse a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TableError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            columns = table.params.len(),
            rows = table.rows.len(),
            "loaded grid table"
        );
        Ok(table)
    }

    /// Parse table text.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        // (1-based line number, fields)
        let content: Vec<(usize, Vec<String>)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, strip_comment(line)))
            .filter(|(_, line)| !line.is_empty())
            .map(|(n, line)| (n, line.split_whitespace().map(str::to_string).collect()))
            .collect();

        let found = content.len();
        let mut lines = content.into_iter();
        let (Some((_, params)), Some((block_line, blocks))) = (lines.next(), lines.next()) else {
            return Err(TableError::MissingHeader { found });
        };

        let expected = params.len();
        let check = |line: usize, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(TableError::Ragged {
                    line,
                    expected,
                    found,
                })
            }
        };

        check(block_line, blocks.len())?;
        let rows = lines
            .map(|(line, fields)| check(line, fields.len()).map(|()| fields))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            params,
            blocks,
            rows,
        })
    }

    /// Parameter names, one per column.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Owning blocks, one per column.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// One assignment list per data row, columns in order.
    pub fn combinations(&self) -> impl ExactSizeIterator<Item = Vec<Assignment>> + '_ {
        self.rows.iter().map(move |row| {
            self.params
                .iter()
                .zip(&self.blocks)
                .zip(row)
                .map(|((param, block), value)| {
                    Assignment::new(block.as_str(), param.as_str(), value.as_str())
                })
                .collect()
        })
    }
}

/// Drop everything from the first `#` on, then trim.
fn strip_comment(line: &str) -> &str {
    line.split(COMMENT).next().unwrap_or_default().trim()
}
