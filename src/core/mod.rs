//! core
//!
//! Process-wide configuration shared by the CLI and the backend.
//!
//! # Modules
//!
//! - [`config`] - Credentials and settings file loading

pub mod config;
