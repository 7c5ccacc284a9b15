//! Shared test utilities for the caption client tests.
//!
//! Provides a scripted mock backend so controller flows can be exercised
//! without a network: responses are keyed by `"METHOD /joined/path"` and
//! every call is recorded for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use dataset_caption::api::{error_detail, Backend};
use dataset_caption::error::{ClientError, ClientResult};

/// Scripted stand-in for the HTTP backend.
///
/// Unscripted JSON GETs answer 404; unscripted POSTs answer an empty success
/// (the controller must tolerate bodies with no fields); byte GETs always
/// succeed with placeholder data unless an error is scripted.
#[derive(Default)]
pub struct MockBackend {
    json_routes: HashMap<String, Value>,
    byte_routes: HashMap<String, Vec<u8>>,
    error_routes: HashMap<String, (u16, String)>,
    calls: Mutex<Vec<(String, Option<Value>)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: &str, segments: &[&str]) -> String {
        format!("{method} /{}", segments.join("/"))
    }

    /// Script a JSON response for `GET /path` or `POST /path`.
    pub fn with_json(mut self, method: &str, path: &str, value: Value) -> Self {
        self.json_routes
            .insert(format!("{method} /{path}"), value);
        self
    }

    /// Script raw bytes for `GET /path`.
    #[allow(dead_code)]
    pub fn with_bytes(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.byte_routes.insert(format!("GET /{path}"), bytes);
        self
    }

    /// Script a non-2xx response; the body goes through the same
    /// detail-resolution as the real backend.
    pub fn with_error(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.error_routes
            .insert(format!("{method} /{path}"), (status, body.to_string()));
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// All recorded call keys, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// How many calls hit the given key.
    pub fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|k| k.as_str() == key).count()
    }

    /// The most recent body POSTed to the given key.
    pub fn last_body(&self, key: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, body)| k == key && body.is_some())
            .and_then(|(_, body)| body.clone())
    }

    fn record(&self, key: &str, body: Option<Value>) {
        self.calls.lock().unwrap().push((key.to_string(), body));
    }

    fn scripted_error(&self, key: &str) -> Option<ClientError> {
        self.error_routes
            .get(key)
            .map(|(status, body)| ClientError::http(*status, error_detail(*status, body)))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_json(&self, segments: &[&str], _query: &[(&str, String)]) -> ClientResult<Value> {
        let key = Self::key("GET", segments);
        self.record(&key, None);
        if let Some(err) = self.scripted_error(&key) {
            return Err(err);
        }
        self.json_routes
            .get(&key)
            .cloned()
            .ok_or_else(|| ClientError::http(404, "HTTP 404"))
    }

    async fn post_json(&self, segments: &[&str], body: Value) -> ClientResult<Value> {
        let key = Self::key("POST", segments);
        self.record(&key, Some(body));
        if let Some(err) = self.scripted_error(&key) {
            return Err(err);
        }
        Ok(self.json_routes.get(&key).cloned().unwrap_or(Value::Null))
    }

    async fn get_bytes(
        &self,
        segments: &[&str],
        _query: &[(&str, String)],
    ) -> ClientResult<Vec<u8>> {
        let key = Self::key("GET", segments);
        self.record(&key, None);
        if let Some(err) = self.scripted_error(&key) {
            return Err(err);
        }
        Ok(self
            .byte_routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| vec![0x89, 0x50, 0x4E, 0x47]))
    }
}
