//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All text meant for the operator (progress lines, not-found reports)
//! goes through this module so quiet runs stay quiet.

pub mod output;
