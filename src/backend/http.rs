//! backend::http
//!
//! `Occurrences` implementation over the GBIF REST API.
//!
//! # Design
//!
//! One method, one request. Responses are decoded into `serde_json::Value`
//! and returned as-is; status codes are mapped to `BackendError` variants.
//! There is no retry and no pagination: `limit`/`offset` are forwarded and
//! GBIF's own paging fields come back in the body.
//!
//! # Authentication
//!
//! Only the download endpoints that act on behalf of a user (`download`,
//! `download_list`) send HTTP basic auth. Everything else is anonymous.
//!
//! # Example
//!
//! ```ignore
//! use gbif_occ::backend::http::GbifClient;
//! use gbif_occ::backend::Occurrences;
//!
//! let client = GbifClient::new()?;
//! let counts = client.count_year("1990,2000").await?;
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::traits::{BackendError, Occurrences};
use super::types::{is_download_key, BasicAuth, CountParams, DownloadRequest, Query, SearchParams};

/// Default GBIF API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.gbif.org/v1";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("gbif-occ/", env!("CARGO_PKG_VERSION"));

/// `Accept` for endpoints that do not answer with JSON.
const ANY_CONTENT: &str = "*/*";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// GBIF occurrence API client.
#[derive(Debug, Clone)]
pub struct GbifClient {
    /// HTTP client for making requests
    client: Client,
    /// API base URL without trailing slash
    api_base: String,
}

impl GbifClient {
    /// Client against the public GBIF API with the default timeout.
    pub fn new() -> Result<Self, BackendError> {
        Self::with_api_base(DEFAULT_API_BASE, DEFAULT_TIMEOUT)
    }

    /// Client against a custom base URL (GBIF's UAT environment, a test
    /// server).
    pub fn with_api_base(api_base: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        let api_base: String = api_base.into();
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// The configured API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the URL for an API path (leading slash included).
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send a request, mapping transport failures to `NetworkError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        request
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))
    }

    /// GET a JSON endpoint.
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value, BackendError> {
        let url = self.url(path);
        tracing::debug!(%url, ?query, "GET");
        let response = self.send(self.client.get(&url).query(query)).await?;
        Self::handle_response(response).await
    }

    /// Decode a successful response or map the error status.
    async fn handle_response(response: Response) -> Result<Value, BackendError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| BackendError::Decode(e.to_string()))
        } else {
            Self::handle_error_response(response, status).await
        }
    }

    /// Map an error status to a `BackendError`.
    ///
    /// GBIF error bodies are usually plain text; fall back to the status
    /// reason when the body is empty.
    async fn handle_error_response<T>(
        response: Response,
        status: StatusCode,
    ) -> Result<T, BackendError> {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let message = match body.trim() {
            "" => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            text => text.to_string(),
        };
        tracing::debug!(status = status.as_u16(), %url, "request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::AuthFailed(message),
            StatusCode::NOT_FOUND => BackendError::NotFound(url),
            StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited,
            _ if status.is_server_error() => BackendError::ApiError {
                status: status.as_u16(),
                message: format!("GBIF server error: {}", message),
            },
            _ => BackendError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Occurrences for GbifClient {
    fn name(&self) -> &'static str {
        "gbif"
    }

    async fn search(&self, params: &SearchParams) -> Result<Value, BackendError> {
        self.get_json("/occurrence/search", &params.to_query()).await
    }

    async fn get(&self, key: u64) -> Result<Value, BackendError> {
        self.get_json(&format!("/occurrence/{}", key), &Query::new())
            .await
    }

    async fn get_verbatim(&self, key: u64) -> Result<Value, BackendError> {
        self.get_json(&format!("/occurrence/{}/verbatim", key), &Query::new())
            .await
    }

    async fn get_fragment(&self, key: u64) -> Result<Value, BackendError> {
        let url = self.url(&format!("/occurrence/{}/fragment", key));
        tracing::debug!(%url, "GET");
        // Fragments may be XML
        let response = self
            .send(self.client.get(&url).header(ACCEPT, ANY_CONTENT))
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Self::handle_error_response(response, status).await;
        }
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        // XML fragments are returned as a JSON string
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn count(&self, params: &CountParams) -> Result<Value, BackendError> {
        self.get_json("/occurrence/count", &params.to_query()).await
    }

    async fn count_basisofrecord(&self) -> Result<Value, BackendError> {
        self.get_json("/occurrence/counts/basisOfRecord", &Query::new())
            .await
    }

    async fn count_year(&self, year: &str) -> Result<Value, BackendError> {
        self.get_json("/occurrence/counts/year", &vec![("year", year.to_string())])
            .await
    }

    async fn count_datasets(
        &self,
        taxon_key: Option<u64>,
        country: Option<&str>,
    ) -> Result<Value, BackendError> {
        let mut query = Query::new();
        if let Some(key) = taxon_key {
            query.push(("taxonKey", key.to_string()));
        }
        if let Some(country) = country {
            query.push(("country", country.to_string()));
        }
        self.get_json("/occurrence/counts/datasets", &query).await
    }

    async fn count_countries(&self, publishing_country: &str) -> Result<Value, BackendError> {
        self.get_json(
            "/occurrence/counts/countries",
            &vec![("publishingCountry", publishing_country.to_string())],
        )
        .await
    }

    async fn count_schema(&self) -> Result<Value, BackendError> {
        self.get_json("/occurrence/count/schema", &Query::new())
            .await
    }

    async fn count_publishingcountries(&self, country: &str) -> Result<Value, BackendError> {
        self.get_json(
            "/occurrence/counts/publishingCountries",
            &vec![("country", country.to_string())],
        )
        .await
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Value, BackendError> {
        let url = self.url("/occurrence/download/request");
        let payload = request.payload();
        tracing::debug!(%url, user = %request.auth.user, "POST download request");

        let response = self
            .send(
                self.client
                    .post(&url)
                    .basic_auth(&request.auth.user, Some(&request.auth.password))
                    .json(&payload),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Self::handle_error_response(response, status).await;
        }
        // The body is the bare download key
        let key = response
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(json!({ "key": key.trim(), "request": payload }))
    }

    async fn download_meta(&self, key: &str) -> Result<Value, BackendError> {
        check_download_key(key)?;
        self.get_json(&format!("/occurrence/download/{}", key), &Query::new())
            .await
    }

    async fn download_list(
        &self,
        auth: &BasicAuth,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError> {
        let url = self.url(&format!("/occurrence/download/user/{}", auth.user));
        tracing::debug!(%url, limit, offset, "GET download list");
        let response = self
            .send(
                self.client
                    .get(&url)
                    .basic_auth(&auth.user, Some(&auth.password))
                    .query(&[("limit", limit), ("offset", offset)]),
            )
            .await?;
        Self::handle_response(response).await
    }

    async fn download_get(&self, key: &str, dir: &Path) -> Result<Value, BackendError> {
        check_download_key(key)?;
        let url = self.url(&format!("/occurrence/download/request/{}", key));
        let path = dir.join(format!("{}.zip", key));
        tracing::debug!(%url, path = %path.display(), "GET download archive");

        let response = self
            .send(self.client.get(&url).header(ACCEPT, ANY_CONTENT))
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Self::handle_error_response(response, status).await;
        }

        // Stream into `<key>.zip.part`; only a complete archive gets the final name
        let partial = dir.join(format!("{}.zip.part", key));
        match save_archive(response, dir, &partial, &path).await {
            Ok(size) => Ok(json!({
                "key": key,
                "path": path.display().to_string(),
                "size": size,
            })),
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial).await {
                    tracing::debug!(
                        path = %partial.display(),
                        error = %cleanup,
                        "no partial archive to remove"
                    );
                }
                Err(e)
            }
        }
    }
}

fn check_download_key(key: &str) -> Result<(), BackendError> {
    if is_download_key(key) {
        Ok(())
    } else {
        Err(BackendError::InvalidKey(key.to_string()))
    }
}

fn io_error(at: &Path) -> impl FnOnce(std::io::Error) -> BackendError {
    let at = at.to_path_buf();
    move |e| BackendError::Io {
        path: at,
        message: e.to_string(),
    }
}

/// Write the response body to `partial`, then rename it to `path`.
async fn save_archive(
    mut response: Response,
    dir: &Path,
    partial: &Path,
    path: &Path,
) -> Result<u64, BackendError> {
    fs::create_dir_all(dir).await.map_err(io_error(dir))?;
    let mut file = fs::File::create(partial).await.map_err(io_error(partial))?;

    let mut size: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| BackendError::NetworkError(e.to_string()))?
    {
        file.write_all(&chunk).await.map_err(io_error(partial))?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error(partial))?;
    drop(file);

    fs::rename(partial, path).await.map_err(io_error(path))?;
    Ok(size)
}
