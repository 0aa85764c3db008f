//! core::config
//!
//! Grid job configuration loading.
//!
//! # Overview
//!
//! A grid job can be described in a TOML file instead of being assembled in
//! code. The caller passes the file path explicitly; nothing is discovered
//! from the environment.
//!
//! # Path resolution
//!
//! Relative paths in the file (`inlist`, `work_dir`, `table`) are resolved
//! against the directory containing the config file. `work_dir` defaults to
//! that directory.
//!
//! # Example
//!
//! ```no_run
//! use inlist_grid::core::config::Config;
//!
//! let config = Config::load("grid.toml").unwrap();
//! let mut store = config.open_store().unwrap();
//! let source = config.source().unwrap();
//! let runner = config.runner();
//! store
//!     .run_grid(source.as_ref(), &config.work_dir(), &runner)
//!     .unwrap();
//! ```

pub mod schema;

pub use schema::{GridConfig, ParamValue, ParameterConfig, RunnerConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::document::InlistError;
use crate::core::store::InlistStore;
use crate::grid::{GridSource, GridTable, ParameterSets, ProcessRunner, TableError};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// A loaded, validated grid job.
#[derive(Debug, Clone)]
pub struct Config {
    /// The parsed file
    pub grid: GridConfig,
    /// Directory relative paths resolve against
    base_dir: PathBuf,
    /// Where the config was read from
    path: Option<PathBuf>,
}

impl Config {
    /// Load and validate a grid job file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML,
    /// or fails validation. Unlike inlists, a missing config file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let grid: GridConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        grid.validate()?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), "loaded grid config");

        Ok(Self {
            grid,
            base_dir,
            path: Some(path.to_path_buf()),
        })
    }

    /// Build from an already-parsed config, resolving against `base_dir`.
    pub fn from_parts(grid: GridConfig, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        grid.validate()?;
        Ok(Self {
            grid,
            base_dir: base_dir.into(),
            path: None,
        })
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        self.base_dir.join(p)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// The source inlist path.
    pub fn inlist(&self) -> PathBuf {
        // validate() guarantees presence
        self.grid
            .inlist
            .as_deref()
            .map(|p| self.resolve(p))
            .unwrap_or_default()
    }

    /// Directory for generated inlists and runner invocations.
    pub fn work_dir(&self) -> PathBuf {
        match &self.grid.work_dir {
            Some(p) => self.resolve(p),
            None => self.base_dir.clone(),
        }
    }

    /// The configured launcher, defaulting to `./rn` with no arguments.
    pub fn runner(&self) -> ProcessRunner {
        let runner = self.grid.runner.clone().unwrap_or_default();
        let program = runner
            .program
            .unwrap_or_else(|| ProcessRunner::DEFAULT_PROGRAM.to_string());
        ProcessRunner::new(program).args(runner.args.unwrap_or_default())
    }

    /// The grid input, loading the table file if one is named.
    ///
    /// `None` when neither a table nor parameters are configured.
    pub fn source(&self) -> Result<Option<GridSource>, TableError> {
        if let Some(table) = &self.grid.table {
            let table = GridTable::load(self.resolve(table))?;
            return Ok(Some(GridSource::Table(table)));
        }

        Ok(self.grid.parameters.as_ref().map(|params| {
            let sets = params.iter().fold(ParameterSets::new(), |sets, p| {
                sets.with(
                    p.name.as_str(),
                    p.block.as_str(),
                    p.values.iter().map(ParamValue::to_namelist),
                )
            });
            GridSource::Sets(sets)
        }))
    }

    /// Open the source inlist as a store.
    pub fn open_store(&self) -> Result<InlistStore, InlistError> {
        InlistStore::open(self.inlist())
    }

    /// Get the path the config was loaded from, if it came from a file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
