use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskflow_core::config::BackendConfig;
use taskflow_core::{StoreError, StoreResult};
use tracing::{debug, error};

use crate::query::TableQuery;

/// Shared HTTP plumbing: base URL, the project's public key, and status and
/// body handling common to the table and auth APIs.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> StoreResult<Self> {
        if !config.is_configured() {
            return Err(StoreError::Validation(
                "backend url and anon key must be configured".to_string(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the project key; `token` adds a bearer header.
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn table_request(&self, query: &TableQuery, token: &str) -> StoreResult<RequestBuilder> {
        let mut url = Url::parse(&self.url(&query.path()))
            .map_err(|err| StoreError::Validation(format!("invalid backend url: {err}")))?;
        let params = query.params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut builder = self
            .http
            .request(query.method(), url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token);
        if let Some(prefer) = query.prefer() {
            builder = builder.header("Prefer", prefer);
        }
        Ok(builder)
    }

    /// Runs a table query, optionally with a JSON body, and decodes the
    /// reply.
    pub async fn execute<T, B>(&self, query: &TableQuery, token: &str, body: Option<&B>) -> StoreResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.table_request(query, token)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        debug!(table = query.table(), operation = ?query.operation(), "sending table request");
        let text = send(builder).await?;
        decode(&text)
    }
}

/// Sends and returns the body of a successful response.
pub async fn send(builder: RequestBuilder) -> StoreResult<String> {
    let response = builder.send().await.map_err(|err| {
        error!(error = %err, "backend request failed");
        StoreError::Transport(err.to_string())
    })?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| StoreError::Transport(err.to_string()))?;

    if !status.is_success() {
        let message = error_message(&text);
        error!(status = status.as_u16(), message = %message, "backend rejected request");
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(text)
}

pub fn decode<T: DeserializeOwned>(text: &str) -> StoreResult<T> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|err| StoreError::Decode(err.to_string()))
}

/// Best human-readable message in an error body. The table API uses
/// `message`; the auth API uses `msg`, `error_description` or `error`.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str())
                && !text.trim().is_empty()
            {
                return text.trim().to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else {
        trimmed.to_string()
    }
}
