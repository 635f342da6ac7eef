//! gbif - command-line access to the GBIF occurrence API
//!
//! A single binary that searches, fetches, counts and downloads occurrence
//! records from the Global Biodiversity Information Facility and prints
//! GBIF's JSON answers unchanged.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing and the command dispatch table
//! - [`backend`] - The `Occurrences` trait, its HTTP client and a mock
//! - [`core`] - Credentials and the settings file
//! - [`ui`] - JSON printing, diagnostics and logging setup
//!
//! # Invariants
//!
//! 1. A command whose companion arguments are missing never reaches the
//!    network
//! 2. `--verbose` exits before any backend call
//! 3. Credentials come from the environment only
//! 4. Every diagnostic is a single line

pub mod backend;
pub mod cli;
pub mod core;
pub mod ui;
