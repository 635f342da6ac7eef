//! backend::traits
//!
//! The `Occurrences` trait: the operations the dispatcher can invoke against
//! the GBIF occurrence API.
//!
//! # Design
//!
//! The trait is async because every operation is a network call. Each
//! method returns the decoded JSON body unchanged so the printer can show
//! exactly what GBIF answered. Implementations perform one request per
//! call and never retry, paginate or cache.
//!
//! # Example
//!
//! ```ignore
//! use gbif_occ::backend::{Occurrences, BackendError};
//!
//! async fn show(backend: &dyn Occurrences) -> Result<(), BackendError> {
//!     let record = backend.get(1258202889).await?;
//!     println!("{}", record);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::types::{BasicAuth, CountParams, DownloadRequest, SearchParams};

/// Errors from backend operations.
///
/// The dispatcher does not distinguish between these for recovery: any of
/// them ends the run with exit code 1. The variants exist so the one-line
/// diagnostic says something useful.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Credentials were rejected (401/403).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested record or download does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// A download key that is not shaped like one.
    #[error("invalid download key '{0}'")]
    InvalidKey(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Writing a downloaded archive failed.
    #[error("failed to write '{}': {message}", path.display())]
    Io {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        message: String,
    },
}

/// Operations of the GBIF occurrence API used by the CLI.
///
/// Implementations must be `Send + Sync` so a single instance can be
/// borrowed by the dispatcher for the whole run.
#[async_trait]
pub trait Occurrences: Send + Sync {
    /// Backend name, used in debug logging.
    fn name(&self) -> &'static str;

    /// Search occurrences.
    async fn search(&self, params: &SearchParams) -> Result<Value, BackendError>;

    /// Get a single interpreted occurrence.
    async fn get(&self, key: u64) -> Result<Value, BackendError>;

    /// Get the verbatim (uninterpreted) record of an occurrence.
    async fn get_verbatim(&self, key: u64) -> Result<Value, BackendError>;

    /// Get the raw fragment of an occurrence.
    ///
    /// Fragments may be XML; a body that is not JSON comes back as a JSON
    /// string.
    async fn get_fragment(&self, key: u64) -> Result<Value, BackendError>;

    /// Occurrence count over a predefined set of dimensions.
    async fn count(&self, params: &CountParams) -> Result<Value, BackendError>;

    /// Occurrence counts by basis of record.
    async fn count_basisofrecord(&self) -> Result<Value, BackendError>;

    /// Occurrence counts by year. `year` may be a range such as `1990,2000`.
    async fn count_year(&self, year: &str) -> Result<Value, BackendError>;

    /// Occurrence counts for datasets covering a taxon and/or country.
    async fn count_datasets(
        &self,
        taxon_key: Option<u64>,
        country: Option<&str>,
    ) -> Result<Value, BackendError>;

    /// Counts for all countries covered by data published by `publishing_country`.
    async fn count_countries(&self, publishing_country: &str) -> Result<Value, BackendError>;

    /// Metrics supported by the count service.
    async fn count_schema(&self) -> Result<Value, BackendError>;

    /// Counts for all countries publishing data about `country`.
    async fn count_publishingcountries(&self, country: &str) -> Result<Value, BackendError>;

    /// Request a download. Returns the download key and the submitted request.
    async fn download(&self, request: &DownloadRequest) -> Result<Value, BackendError>;

    /// Metadata of a download.
    async fn download_meta(&self, key: &str) -> Result<Value, BackendError>;

    /// Downloads created by a user.
    async fn download_list(
        &self,
        auth: &BasicAuth,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError>;

    /// Fetch a finished download into `dir/<key>.zip`.
    ///
    /// Returns `{"key", "path", "size"}` describing the written file.
    async fn download_get(&self, key: &str, dir: &Path) -> Result<Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        assert_eq!(
            format!("{}", BackendError::AuthFailed("bad password".into())),
            "authentication failed: bad password"
        );
        assert_eq!(
            format!("{}", BackendError::NotFound("occurrence 42".into())),
            "not found: occurrence 42"
        );
        assert_eq!(format!("{}", BackendError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                BackendError::ApiError {
                    status: 400,
                    message: "Invalid search parameter".into()
                }
            ),
            "API error: 400 - Invalid search parameter"
        );
        assert_eq!(
            format!("{}", BackendError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
        assert_eq!(
            format!(
                "{}",
                BackendError::Io {
                    path: PathBuf::from("/tmp/x.zip"),
                    message: "disk full".into()
                }
            ),
            "failed to write '/tmp/x.zip': disk full"
        );
    }
}
