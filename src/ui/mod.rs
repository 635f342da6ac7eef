//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - JSON result rendering and one-line diagnostics
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Design
//!
//! Results and usage messages go to stdout; diagnostics and logs go to
//! stderr so piping the JSON into another tool stays clean.

pub mod logging;
pub mod output;
