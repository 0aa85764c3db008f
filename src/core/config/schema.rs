//! core::config::schema
//!
//! Grid job configuration schema.
//!
//! # Validation
//!
//! Values are validated after parsing: a job names its source inlist, picks
//! at most one grid input, and never repeats a parameter.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A grid job.
///
/// # Example
///
/// ```toml
/// inlist = "inlist_project"
/// work_dir = "."
///
/// [runner]
/// program = "./rn"
///
/// [[parameters]]
/// name = "initial_mass"
/// block = "controls"
/// values = [1.0, 1.5, 2.0]
///
/// [[parameters]]
/// name = "use_Type2_opacities"
/// block = "controls"
/// values = [true, false]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Source inlist every combination starts from
    pub inlist: Option<PathBuf>,

    /// Where generated inlists land and the runner runs (default: config dir)
    pub work_dir: Option<PathBuf>,

    /// Tabular grid file (exclusive with `parameters`)
    pub table: Option<PathBuf>,

    /// External simulation launcher
    pub runner: Option<RunnerConfig>,

    /// Explicit parameter sets (exclusive with `table`)
    pub parameters: Option<Vec<ParameterConfig>>,
}

impl GridConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.inlist {
            None => {
                return Err(ConfigError::InvalidValue(
                    "inlist is required".to_string(),
                ))
            }
            Some(p) if p.as_os_str().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "inlist cannot be empty".to_string(),
                ))
            }
            Some(_) => {}
        }

        if self.table.is_some() && self.parameters.is_some() {
            return Err(ConfigError::InvalidValue(
                "table and parameters are mutually exclusive".to_string(),
            ));
        }

        if let Some(params) = &self.parameters {
            let mut seen = HashSet::new();
            for p in params {
                p.validate()?;
                if !seen.insert(p.name.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "parameter '{}' listed more than once",
                        p.name
                    )));
                }
            }
        }

        if let Some(runner) = &self.runner {
            runner.validate()?;
        }

        Ok(())
    }
}

/// External launcher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Program to run (default: `./rn`)
    pub program: Option<String>,

    /// Arguments passed to the program
    pub args: Option<Vec<String>>,
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(program) = &self.program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "runner program cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One parameter axis of an explicit grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    /// Parameter name
    pub name: String,

    /// Owning block
    pub block: String,

    /// Candidate values, in enumeration order
    pub values: Vec<ParamValue>,
}

impl ParameterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "parameter name cannot be empty".to_string(),
            ));
        }
        if self.block.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "block for parameter '{}' cannot be empty",
                self.name
            )));
        }
        Ok(())
    }
}

/// A candidate value as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Raw namelist text for this value.
    ///
    /// Strings pass through untouched, so `"1.5d0"` or `"'summary.txt'"` can
    /// be given exactly.
    ///
    /// ```
    /// use inlist_grid::core::config::schema::ParamValue;
    ///
    /// assert_eq!(ParamValue::Bool(true).to_namelist(), ".true.");
    /// assert_eq!(ParamValue::Float(1.0).to_namelist(), "1.0");
    /// assert_eq!(ParamValue::Text("1d-3".into()).to_namelist(), "1d-3");
    /// ```
    pub fn to_namelist(&self) -> String {
        match self {
            ParamValue::Bool(true) => ".true.".to_string(),
            ParamValue::Bool(false) => ".false.".to_string(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Float(f) => format!("{:?}", f),
            ParamValue::Text(s) => s.clone(),
        }
    }
}
