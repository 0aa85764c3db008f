//! inlist-grid - Namelist inlist editing and parameter grid expansion
//!
//! Inlists are Fortran-style namelist files that drive an external
//! stellar-evolution run. This crate reads them into an ordered in-memory
//! document, edits parameters, writes them back, and enumerates parameter
//! grids into one inlist per combination, optionally running the simulation
//! after each one.
//!
//! # Architecture
//!
//! - [`core`] - Document model, the inlist store, and grid job configuration
//! - [`grid`] - Parameter sets, tabular grids, expansion and the runner seam
//! - [`ui`] - Operator-facing output
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use inlist_grid::core::store::InlistStore;
//! use inlist_grid::grid::{GridSource, ParameterSets};
//! use std::path::Path;
//!
//! let mut store = InlistStore::open("inlist_project").unwrap();
//! store.add_parameter("controls", "initial_mass", "1.0").unwrap();
//!
//! let sets = ParameterSets::new()
//!     .with("initial_mass", "controls", ["1.0", "2.0"])
//!     .with("initial_z", "controls", ["0.02", "0.001"]);
//! let written = store
//!     .expand_grid(Some(&GridSource::Sets(sets)), Path::new("."))
//!     .unwrap();
//! assert_eq!(written.len(), 4);
//! ```

pub mod core;
pub mod grid;
pub mod logging;
pub mod ui;
