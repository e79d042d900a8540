//! Content store backed by the server's admin API.

use canvas::content::{ContentKind, ContentStore};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentStore {
    pub fn new(base_url: &str) -> Result<Self, HttpStoreError> {
        Ok(Self { client: reqwest::Client::new(), base_url: normalize_base_url(base_url)? })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /healthz`.
    pub async fn ping(&self) -> Result<(), HttpStoreError> {
        let response = self.client.get(self.url("/healthz")).send().await?;
        check_status(response).await.map(drop)
    }
}

impl ContentStore for HttpContentStore {
    type Error = HttpStoreError;

    async fn fetch(&self, kind: ContentKind) -> Result<Vec<Value>, HttpStoreError> {
        let response = self.client.get(self.url(&content_path(kind))).send().await?;
        Ok(check_status(response).await?.json::<Vec<Value>>().await?)
    }

    async fn store(&self, kind: ContentKind, items: &[Value]) -> Result<(), HttpStoreError> {
        let body = json!({ "type": kind, "data": items });
        let response = self.client.post(self.url("/api/admin/content")).json(&body).send().await?;
        check_status(response).await.map(drop)
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, HttpStoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(HttpStoreError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub fn content_path(kind: ContentKind) -> String {
    format!("/api/admin/content?type={kind}")
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, HttpStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(HttpStoreError::Status { status: status.as_u16(), message })
}
