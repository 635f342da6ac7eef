//! backend::mock
//!
//! In-memory `Occurrences` implementation for deterministic testing.
//!
//! # Design
//!
//! Every call is recorded as a [`MockOperation`] so tests can assert which
//! backend operation ran with which arguments, or that none ran at all.
//! Responses are canned: by default each call answers
//! `{"operation": "<name>"}`; [`MockOccurrences::with_response`] replaces
//! that, and [`MockOccurrences::fail_with`] makes every call fail.
//!
//! # Example
//!
//! ```
//! use gbif_occ::backend::mock::{MockOccurrences, MockOperation};
//! use gbif_occ::backend::Occurrences;
//!
//! # tokio_test::block_on(async {
//! let backend = MockOccurrences::new();
//! let value = backend.count_year("2020").await.unwrap();
//!
//! assert_eq!(value["operation"], "count_year");
//! assert_eq!(
//!     backend.operations(),
//!     vec![MockOperation::CountYear { year: "2020".to_string() }]
//! );
//! # });
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::traits::{BackendError, Occurrences};
use super::types::{BasicAuth, CountParams, DownloadRequest, SearchParams};

/// Mock backend for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockOccurrences {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    /// Fixed response for every call, if set.
    response: Option<Value>,
    /// Error returned by every call, if set.
    failure: Option<BackendError>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    Search(SearchParams),
    Get { key: u64 },
    GetVerbatim { key: u64 },
    GetFragment { key: u64 },
    Count(CountParams),
    CountBasisOfRecord,
    CountYear { year: String },
    CountDatasets { taxon_key: Option<u64>, country: Option<String> },
    CountCountries { publishing_country: String },
    CountSchema,
    CountPublishingCountries { country: String },
    Download { user: String, email: String, predicate: Value },
    DownloadMeta { key: String },
    DownloadList { user: String, limit: u32, offset: u32 },
    DownloadGet { key: String, dir: PathBuf },
}

impl MockOperation {
    /// Operation name as used in the default response.
    pub fn name(&self) -> &'static str {
        match self {
            MockOperation::Search(_) => "search",
            MockOperation::Get { .. } => "get",
            MockOperation::GetVerbatim { .. } => "get_verbatim",
            MockOperation::GetFragment { .. } => "get_fragment",
            MockOperation::Count(_) => "count",
            MockOperation::CountBasisOfRecord => "count_basisofrecord",
            MockOperation::CountYear { .. } => "count_year",
            MockOperation::CountDatasets { .. } => "count_datasets",
            MockOperation::CountCountries { .. } => "count_countries",
            MockOperation::CountSchema => "count_schema",
            MockOperation::CountPublishingCountries { .. } => "count_publishingcountries",
            MockOperation::Download { .. } => "download",
            MockOperation::DownloadMeta { .. } => "download_meta",
            MockOperation::DownloadList { .. } => "download_list",
            MockOperation::DownloadGet { .. } => "download_get",
        }
    }
}

impl MockOccurrences {
    /// Create a mock answering `{"operation": "<name>"}` to every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `value`.
    pub fn with_response(self, value: Value) -> Self {
        self.lock().response = Some(value);
        self
    }

    /// Fail every call with `error`.
    pub fn fail_with(self, error: BackendError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// All recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.lock().operations.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        // A panicking test thread must not hide the recorded operations
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `op` and produce the configured outcome.
    fn answer(&self, op: MockOperation) -> Result<Value, BackendError> {
        let mut inner = self.lock();
        let name = op.name();
        inner.operations.push(op);
        if let Some(ref err) = inner.failure {
            return Err(err.clone());
        }
        Ok(inner
            .response
            .clone()
            .unwrap_or_else(|| json!({ "operation": name })))
    }
}

#[async_trait]
impl Occurrences for MockOccurrences {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, params: &SearchParams) -> Result<Value, BackendError> {
        self.answer(MockOperation::Search(params.clone()))
    }

    async fn get(&self, key: u64) -> Result<Value, BackendError> {
        self.answer(MockOperation::Get { key })
    }

    async fn get_verbatim(&self, key: u64) -> Result<Value, BackendError> {
        self.answer(MockOperation::GetVerbatim { key })
    }

    async fn get_fragment(&self, key: u64) -> Result<Value, BackendError> {
        self.answer(MockOperation::GetFragment { key })
    }

    async fn count(&self, params: &CountParams) -> Result<Value, BackendError> {
        self.answer(MockOperation::Count(params.clone()))
    }

    async fn count_basisofrecord(&self) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountBasisOfRecord)
    }

    async fn count_year(&self, year: &str) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountYear {
            year: year.to_string(),
        })
    }

    async fn count_datasets(
        &self,
        taxon_key: Option<u64>,
        country: Option<&str>,
    ) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountDatasets {
            taxon_key,
            country: country.map(str::to_string),
        })
    }

    async fn count_countries(&self, publishing_country: &str) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountCountries {
            publishing_country: publishing_country.to_string(),
        })
    }

    async fn count_schema(&self) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountSchema)
    }

    async fn count_publishingcountries(&self, country: &str) -> Result<Value, BackendError> {
        self.answer(MockOperation::CountPublishingCountries {
            country: country.to_string(),
        })
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Value, BackendError> {
        self.answer(MockOperation::Download {
            user: request.auth.user.clone(),
            email: request.email.clone(),
            predicate: request.predicate.clone(),
        })
    }

    async fn download_meta(&self, key: &str) -> Result<Value, BackendError> {
        self.answer(MockOperation::DownloadMeta {
            key: key.to_string(),
        })
    }

    async fn download_list(
        &self,
        auth: &BasicAuth,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError> {
        self.answer(MockOperation::DownloadList {
            user: auth.user.clone(),
            limit,
            offset,
        })
    }

    async fn download_get(&self, key: &str, dir: &Path) -> Result<Value, BackendError> {
        self.answer(MockOperation::DownloadGet {
            key: key.to_string(),
            dir: dir.to_path_buf(),
        })
    }
}
