//! # Backend API Client
//!
//! The REST surface of the captioning backend, split in two layers:
//!
//! - [`Backend`]: the transport seam. Production code uses [`HttpBackend`]
//!   (reqwest); tests substitute a scripted mock, the same way the capture
//!   pipeline this client grew out of swaps frame sources behind a trait.
//! - [`CaptionApi`]: typed calls for each endpoint, decoding into the wire
//!   model types.
//!
//! Every path segment is percent-encoded independently (an image path with
//! subdirectories travels as a single encoded segment). Non-2xx responses are
//! resolved into display strings via [`error_detail`]; a 204 is a valid empty
//! success.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::model::{
    DatasetImagesResponse, DatasetListResponse, ExtendRequest, ImageRecord, MutationOutcome,
    ResizeRequest, UpdateRequest, VocabularyResponse,
};
use crop_geom::ExtendAnchor;

/// Transport seam between the session controller and the network.
#[async_trait]
pub trait Backend: Send + Sync {
    /// GET a JSON document. `segments` are raw path segments, encoded by the
    /// implementation; `query` pairs are appended as-is.
    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> ClientResult<Value>;

    /// POST a JSON body and return the JSON response (204 → `Value::Null`).
    async fn post_json(&self, segments: &[&str], body: Value) -> ClientResult<Value>;

    /// GET raw bytes (image data).
    async fn get_bytes(&self, segments: &[&str], query: &[(&str, String)])
        -> ClientResult<Vec<u8>>;

    /// Absolute URL for a path, for handing to an external viewer.
    fn endpoint_url(&self, segments: &[&str]) -> String {
        format!("/{}", segments.join("/"))
    }
}

/// Resolve the display string for a non-2xx response body.
///
/// JSON bodies are searched for a `detail` then a `message` field; anything
/// else falls back to `HTTP {status}`.
pub fn error_detail(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    format!("HTTP {status}")
}

/// reqwest-backed [`Backend`] implementation.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Build a backend for `server` (e.g. `http://127.0.0.1:8000`) with a
    /// per-request timeout. A hung request stalls only its own operation;
    /// retrying issues a fresh independent request.
    pub fn new(server: &str, timeout: Duration) -> ClientResult<Self> {
        let base =
            Url::parse(server).map_err(|err| ClientError::config("server", err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::config("server", "not a base URL"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::network("client setup", err))?;
        Ok(Self { client, base })
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        {
            // Infallible: `new` rejects cannot-be-a-base URLs.
            let mut path = url.path_segments_mut().expect("base URL");
            path.pop_if_empty();
            path.extend(segments);
        }
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        url
    }

    async fn read_json(response: reqwest::Response, operation: &str) -> ClientResult<Value> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::network(operation.to_string(), err))?;
        if !status.is_success() {
            return Err(ClientError::http(
                status.as_u16(),
                error_detail(status.as_u16(), &body),
            ));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| ClientError::json(operation.to_string(), err))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> ClientResult<Value> {
        let url = self.url(segments, query);
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| ClientError::network(format!("GET {}", url.path()), err))?;
        Self::read_json(response, url.path()).await
    }

    async fn post_json(&self, segments: &[&str], body: Value) -> ClientResult<Value> {
        let url = self.url(segments, &[]);
        debug!("POST {url}");
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| ClientError::network(format!("POST {}", url.path()), err))?;
        Self::read_json(response, url.path()).await
    }

    async fn get_bytes(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ClientResult<Vec<u8>> {
        let url = self.url(segments, query);
        debug!("GET {url} (bytes)");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| ClientError::network(format!("GET {}", url.path()), err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http(
                status.as_u16(),
                error_detail(status.as_u16(), &body),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::network(format!("GET {}", url.path()), err))?;
        Ok(bytes.to_vec())
    }

    fn endpoint_url(&self, segments: &[&str]) -> String {
        self.url(segments, &[]).to_string()
    }
}

/// Typed client for the captioning backend.
pub struct CaptionApi {
    backend: Arc<dyn Backend>,
}

impl CaptionApi {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Convenience constructor over [`HttpBackend`].
    pub fn over_http(server: &str, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::new(Arc::new(HttpBackend::new(server, timeout)?)))
    }

    fn decode<T: serde::de::DeserializeOwned + Default>(
        value: Value,
        operation: &str,
    ) -> ClientResult<T> {
        if value.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(value).map_err(|err| ClientError::json(operation.to_string(), err))
    }

    /// `GET /api/datasets`
    pub async fn list_datasets(&self) -> ClientResult<Vec<String>> {
        let value = self.backend.get_json(&["api", "datasets"], &[]).await?;
        let decoded: DatasetListResponse = serde_json::from_value(value)
            .map_err(|err| ClientError::json("list datasets", err))?;
        Ok(decoded.datasets)
    }

    /// `GET /api/datasets/{name}/images`
    pub async fn dataset_images(&self, dataset: &str) -> ClientResult<Vec<ImageRecord>> {
        let value = self
            .backend
            .get_json(&["api", "datasets", dataset, "images"], &[])
            .await?;
        let decoded: DatasetImagesResponse =
            serde_json::from_value(value).map_err(|err| ClientError::json("load dataset", err))?;
        Ok(decoded.images)
    }

    /// `GET /api/datasets/{name}/images/{path}` with a cache-busting
    /// timestamp query.
    pub async fn image_bytes(
        &self,
        dataset: &str,
        path: &str,
        cache_bust: u64,
    ) -> ClientResult<Vec<u8>> {
        self.backend
            .get_bytes(
                &["api", "datasets", dataset, "images", path],
                &[("t", cache_bust.to_string())],
            )
            .await
    }

    /// `GET /api/datasets/{name}/vocabulary`
    pub async fn dataset_vocabulary(&self, dataset: &str) -> ClientResult<Vec<String>> {
        let value = self
            .backend
            .get_json(&["api", "datasets", dataset, "vocabulary"], &[])
            .await?;
        let decoded: VocabularyResponse = Self::decode(value, "dataset vocabulary")?;
        Ok(decoded.words)
    }

    /// `GET /api/vocabulary` (global, across all datasets)
    pub async fn global_vocabulary(&self) -> ClientResult<Vec<String>> {
        let value = self.backend.get_json(&["api", "vocabulary"], &[]).await?;
        let decoded: VocabularyResponse = Self::decode(value, "global vocabulary")?;
        Ok(decoded.words)
    }

    /// `POST /api/datasets/{name}/images/{path}` — caption save and/or crop.
    pub async fn update_image(
        &self,
        dataset: &str,
        path: &str,
        request: &UpdateRequest,
    ) -> ClientResult<MutationOutcome> {
        let body = serde_json::to_value(request)
            .map_err(|err| ClientError::json("encode update", err))?;
        let value = self
            .backend
            .post_json(&["api", "datasets", dataset, "images", path], body)
            .await?;
        Self::decode(value, "update image")
    }

    /// `POST /api/datasets/{name}/images/{path}/resize`
    pub async fn resize_image(
        &self,
        dataset: &str,
        path: &str,
        max_side: u32,
    ) -> ClientResult<MutationOutcome> {
        let body = serde_json::to_value(ResizeRequest { max_side })
            .map_err(|err| ClientError::json("encode resize", err))?;
        let value = self
            .backend
            .post_json(&["api", "datasets", dataset, "images", path, "resize"], body)
            .await?;
        Self::decode(value, "resize image")
    }

    /// `POST /api/datasets/{name}/images/{path}/extend`
    pub async fn extend_image(
        &self,
        dataset: &str,
        path: &str,
        anchor: ExtendAnchor,
    ) -> ClientResult<MutationOutcome> {
        let body = serde_json::to_value(ExtendRequest {
            anchor: anchor.code().to_string(),
        })
        .map_err(|err| ClientError::json("encode extend", err))?;
        let value = self
            .backend
            .post_json(&["api", "datasets", dataset, "images", path, "extend"], body)
            .await?;
        Self::decode(value, "extend image")
    }

    /// URL of the dataset's metadata export, for opening externally.
    pub fn export_url(&self, dataset: &str) -> String {
        self.backend
            .endpoint_url(&["api", "datasets", dataset, "export"])
    }
}
