//! core
//!
//! Domain types, persistence and configuration.
//!
//! # Modules
//!
//! - [`document`] - Inlist document model, parsing and rendering
//! - [`store`] - A document bound to its file, with persisting edits
//! - [`config`] - Grid job configuration schema and loading
//!
//! # Design Principles
//!
//! - Values are raw text; nothing is coerced or validated against MESA
//! - Block and parameter order is preserved so rewrites diff cleanly
//! - Missing targets are reported, not raised

pub mod config;
pub mod document;
pub mod store;
