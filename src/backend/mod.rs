//! backend
//!
//! Abstraction over the GBIF occurrence API.
//!
//! # Architecture
//!
//! The `Occurrences` trait defines the operations the CLI can invoke.
//! The dispatcher only sees the trait; the binary wires in [`http::GbifClient`]
//! and tests wire in [`mock::MockOccurrences`].
//!
//! # Modules
//!
//! - `traits`: `Occurrences` trait and `BackendError`
//! - `types`: search/count parameters and download requests
//! - `vocab`: closed GBIF vocabularies (basis of record, continent, ...)
//! - [`http`]: implementation over the GBIF REST API
//! - [`mock`]: recording implementation for deterministic tests

pub mod http;
pub mod mock;
mod traits;
mod types;
mod vocab;

pub use traits::*;
pub use types::*;
pub use vocab::*;
