//! core::store
//!
//! The inlist store: one document bound to one file.
//!
//! # Persistence
//!
//! Every successful mutation rewrites the whole file immediately. There is
//! no batching and no temp-file rename; a failed write leaves the file as
//! the OS left it and the error is returned.
//!
//! # Not-found handling
//!
//! Updating or removing something that does not exist is not an error. The
//! operator gets a warning line, nothing is written, and the call returns
//! [`Edit::NotFound`]. `get_parameter` reports a missing block but is silent
//! about a missing parameter in an existing block.

use std::fmt;
use std::path::{Path, PathBuf};

use super::document::{Document, InlistError};
use crate::ui::output::{self, Verbosity};

/// What an update or remove did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Edit {
    /// The change was made and the file rewritten.
    Applied,
    /// The target does not exist; nothing was written.
    NotFound(Missing),
}

impl Edit {
    pub fn is_applied(&self) -> bool {
        matches!(self, Edit::Applied)
    }
}

/// The missing target of an edit or lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Block { block: String },
    Parameter { block: String, param: String },
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Block { block } => write!(f, "Block '{}' not found.", block),
            Missing::Parameter { block, param } => {
                write!(f, "Parameter '{}' not found in block '{}'.", param, block)
            }
        }
    }
}

/// A document bound to its source path.
///
/// # Example
///
/// ```no_run
/// use inlist_grid::core::store::InlistStore;
///
/// let mut store = InlistStore::open("inlist_project")?;
/// store.add_parameter("controls", "initial_mass", "1.5")?;
/// assert_eq!(store.get_parameter("controls", "initial_mass"), Some("1.5"));
///
/// if !store.remove_parameter("controls", "max_age")?.is_applied() {
///     // already absent; the file was not touched
/// }
/// # Ok::<(), inlist_grid::core::document::InlistError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InlistStore {
    path: PathBuf,
    document: Document,
    verbosity: Verbosity,
}

impl InlistStore {
    /// Load the inlist at `path`. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, InlistError> {
        let path = path.into();
        let document = Document::load(&path)?;
        Ok(Self {
            path,
            document,
            verbosity: Verbosity::Normal,
        })
    }

    /// Set how chatty operator messages are.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Path the store was opened from and saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Rewrite the source file from memory.
    pub fn save(&self) -> Result<(), InlistError> {
        self.document.save(&self.path)
    }

    /// Write the current document somewhere else. The store keeps its path.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<(), InlistError> {
        self.document.save(path)
    }

    /// Set a parameter (creating the block if needed) and persist.
    pub fn add_parameter(
        &mut self,
        block: &str,
        param: &str,
        value: &str,
    ) -> Result<(), InlistError> {
        self.document.set(block, param, value);
        self.save()
    }

    /// Change an existing parameter and persist.
    pub fn update_parameter(
        &mut self,
        block: &str,
        param: &str,
        value: &str,
    ) -> Result<Edit, InlistError> {
        let exists = self
            .document
            .block(block)
            .is_some_and(|b| b.contains(param));
        if !exists {
            return Ok(self.not_found(Missing::Parameter {
                block: block.to_string(),
                param: param.to_string(),
            }));
        }
        self.document.set(block, param, value);
        self.save()?;
        Ok(Edit::Applied)
    }

    /// Delete an existing parameter and persist.
    pub fn remove_parameter(&mut self, block: &str, param: &str) -> Result<Edit, InlistError> {
        if self.document.remove(block, param).is_none() {
            return Ok(self.not_found(Missing::Parameter {
                block: block.to_string(),
                param: param.to_string(),
            }));
        }
        self.save()?;
        Ok(Edit::Applied)
    }

    /// Look up a parameter's raw value.
    ///
    /// A missing block is reported to the operator; a missing parameter is not.
    pub fn get_parameter(&self, block: &str, param: &str) -> Option<&str> {
        match self.lookup(block, param) {
            Ok(value) => value,
            Err(missing) => {
                self.report(&missing);
                None
            }
        }
    }

    /// Look up a parameter without reporting anything.
    ///
    /// A missing block is `Err(Missing::Block)`; a missing parameter in an
    /// existing block is `Ok(None)`.
    pub fn lookup(&self, block: &str, param: &str) -> Result<Option<&str>, Missing> {
        self.document
            .block(block)
            .map(|b| b.get(param))
            .ok_or_else(|| Missing::Block {
                block: block.to_string(),
            })
    }

    pub(crate) fn replace_document(&mut self, document: Document) {
        self.document = document;
    }

    fn not_found(&self, missing: Missing) -> Edit {
        self.report(&missing);
        Edit::NotFound(missing)
    }

    fn report(&self, missing: &Missing) {
        tracing::debug!(path = %self.path.display(), "{}", missing);
        output::warn(missing, self.verbosity);
    }
}
