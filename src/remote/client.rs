// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the remote document API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::RemoteDocumentStore;
use crate::hash::normalize_hash;
use crate::models::{SavedDocument, WalletAddress};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote API configuration invalid: {0}")]
    InvalidConfig(String),

    #[error("remote request timed out: {0}")]
    Timeout(String),

    #[error("remote request failed: {0}")]
    Request(String),

    #[error("remote API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote response was invalid: {0}")]
    InvalidResponse(String),
}

/// Body of `POST /documents`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishDocumentRequest<'a> {
    filename: &'a str,
    hash: &'a str,
    wallet_address: &'a str,
    timestamp: i64,
    size: u64,
    #[serde(rename = "type")]
    mime_type: &'a str,
}

/// Document record as returned by the remote API.
///
/// Every field is optional on the wire; a record only counts as a match when
/// it carries a hash.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

impl RemoteDocument {
    /// Convert into a [`SavedDocument`]; `None` when the record has no hash.
    ///
    /// The remote id falls back to the hash when `_id` is absent.
    pub fn into_saved_document(self) -> Option<SavedDocument> {
        let hash = normalize_hash(&self.hash);
        if hash.is_empty() {
            return None;
        }
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| hash.clone());

        Some(SavedDocument {
            id,
            filename: self.filename,
            hash,
            wallet_address: WalletAddress(self.wallet_address),
            size: self.size,
            mime_type: self.mime_type,
            timestamp: self.timestamp,
        })
    }
}

/// reqwest-backed [`RemoteDocumentStore`].
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    base_url: Url,
    http: Client,
}

impl RemoteSyncClient {
    /// Build a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| RemoteError::InvalidConfig(format!("invalid base URL {base_url}: {e}")))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidConfig(format!(
                "base URL must be an http(s) URL: {base_url}"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidConfig("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl RemoteDocumentStore for RemoteSyncClient {
    async fn publish(&self, document: &SavedDocument) -> Result<(), RemoteError> {
        let url = self.endpoint(&["documents"])?;
        let payload = PublishDocumentRequest {
            filename: &document.filename,
            hash: &document.hash,
            wallet_address: document.wallet_address.as_str(),
            timestamp: document.timestamp,
            size: document.size,
            mime_type: &document.mime_type,
        };

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let echoed: Value = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("expected JSON body: {e}")))?;
        if !echoed.is_object() {
            return Err(RemoteError::InvalidResponse(format!(
                "expected JSON object, got {echoed}"
            )));
        }

        tracing::info!(hash = %document.hash, "Mirrored document to remote API");
        Ok(())
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<SavedDocument>, RemoteError> {
        let url = self.endpoint(&["documents", "hash", hash])?;
        let response = self.http.get(url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(map_send_error)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let record: Option<RemoteDocument> = serde_json::from_slice(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("malformed document record: {e}")))?;

        let requested = normalize_hash(hash);
        match record.and_then(RemoteDocument::into_saved_document) {
            Some(document) if document.hash != requested => Err(RemoteError::InvalidResponse(
                format!("asked for hash {requested}, got a record for {}", document.hash),
            )),
            found => Ok(found),
        }
    }
}

fn map_send_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout(e.to_string())
    } else {
        RemoteError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::compute_hash;
    use crate::remote::mock::{self, MockBackend};
    use serde_json::json;

    fn sample_document() -> SavedDocument {
        SavedDocument {
            id: "local-1".to_string(),
            filename: "greeting.txt".to_string(),
            hash: compute_hash(b"hello world"),
            wallet_address: WalletAddress::from("local-user"),
            size: 11,
            mime_type: "text/plain".to_string(),
            timestamp: 1_760_000_000_000,
        }
    }

    #[test]
    fn rejects_invalid_base_urls() {
        for bad in ["not a url", "mailto:vault@example.com", "ftp://example.com/api"] {
            let result = RemoteSyncClient::new(bad, DEFAULT_TIMEOUT);
            assert!(matches!(result, Err(RemoteError::InvalidConfig(_))), "{bad}");
        }
    }

    #[test]
    fn endpoint_handles_trailing_slash_and_escapes_segments() {
        let with_slash = RemoteSyncClient::new("http://localhost:5000/api/", DEFAULT_TIMEOUT).unwrap();
        let without = RemoteSyncClient::new("http://localhost:5000/api", DEFAULT_TIMEOUT).unwrap();

        assert_eq!(with_slash.base_url().as_str(), "http://localhost:5000/api/");
        for client in [&with_slash, &without] {
            let url = client.endpoint(&["documents", "hash", "abc"]).unwrap();
            assert_eq!(url.as_str(), "http://localhost:5000/api/documents/hash/abc");
        }

        let escaped = without.endpoint(&["documents", "hash", "a/b"]).unwrap();
        assert!(escaped.path().ends_with("/hash/a%2Fb"));
    }

    #[test]
    fn remote_record_mapping() {
        let record: RemoteDocument = serde_json::from_value(json!({
            "_id": "65f1c0",
            "filename": "greeting.txt",
            "hash": "ABCDEF",
            "walletAddress": "user-9",
            "timestamp": 1_760_000_000_000i64,
            "size": 11,
            "type": "text/plain"
        }))
        .unwrap();
        let doc = record.into_saved_document().unwrap();
        assert_eq!(doc.id, "65f1c0");
        assert_eq!(doc.hash, "abcdef");
        assert_eq!(doc.wallet_address.as_str(), "user-9");

        let no_id: RemoteDocument =
            serde_json::from_value(json!({ "hash": "abc", "filename": "x" })).unwrap();
        let doc = no_id.into_saved_document().unwrap();
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.wallet_address.as_str(), "");

        let no_hash: RemoteDocument = serde_json::from_value(json!({ "filename": "x" })).unwrap();
        assert!(no_hash.into_saved_document().is_none());
    }

    #[tokio::test]
    async fn publish_sends_wire_payload() {
        let backend = MockBackend::default();
        let base_url = mock::spawn(backend.clone()).await;
        let client = RemoteSyncClient::new(&base_url, DEFAULT_TIMEOUT).unwrap();

        client.publish(&sample_document()).await.unwrap();

        let posted = backend.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0]["filename"], "greeting.txt");
        assert_eq!(posted[0]["hash"], compute_hash(b"hello world"));
        assert_eq!(posted[0]["walletAddress"], "local-user");
        assert_eq!(posted[0]["timestamp"], 1_760_000_000_000i64);
        assert_eq!(posted[0]["size"], 11);
        assert_eq!(posted[0]["type"], "text/plain");
    }

    #[tokio::test]
    async fn publish_surfaces_http_errors() {
        let backend = MockBackend {
            reject_posts: true,
            ..MockBackend::default()
        };
        let base_url = mock::spawn(backend).await;
        let client = RemoteSyncClient::new(&base_url, DEFAULT_TIMEOUT).unwrap();

        let result = client.publish(&sample_document()).await;
        assert!(matches!(result, Err(RemoteError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn find_by_hash_returns_record_or_none() {
        let hash = compute_hash(b"hello world");
        let backend = MockBackend::default().with_record(json!({
            "_id": "remote-42",
            "filename": "from-server.txt",
            "hash": hash,
            "walletAddress": "someone-else",
            "timestamp": 1_750_000_000_000i64,
            "size": 11,
            "type": "text/plain"
        }));
        let base_url = mock::spawn(backend).await;
        let client = RemoteSyncClient::new(&base_url, DEFAULT_TIMEOUT).unwrap();

        let found = client.find_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(found.id, "remote-42");
        assert_eq!(found.filename, "from-server.txt");

        let missing = client.find_by_hash(&compute_hash(b"unknown")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn record_for_another_hash_is_rejected() {
        let backend = MockBackend {
            fixed_reply: Some(json!({
                "_id": "x",
                "filename": "other.pdf",
                "hash": "0".repeat(64),
                "type": "application/pdf"
            })),
            ..MockBackend::default()
        };
        let base_url = mock::spawn(backend).await;
        let client = RemoteSyncClient::new(&base_url, DEFAULT_TIMEOUT).unwrap();

        let result = client.find_by_hash(&compute_hash(b"never saved")).await;
        assert!(matches!(result, Err(RemoteError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let base_url = mock::unreachable_base_url().await;
        let client = RemoteSyncClient::new(&base_url, DEFAULT_TIMEOUT).unwrap();

        let result = client.find_by_hash("abc").await;
        assert!(matches!(result, Err(RemoteError::Request(_))));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let backend = MockBackend {
            lookup_delay: Some(Duration::from_secs(5)),
            ..MockBackend::default()
        };
        let base_url = mock::spawn(backend).await;
        let client = RemoteSyncClient::new(&base_url, Duration::from_millis(200)).unwrap();

        let result = client.find_by_hash("abc").await;
        assert!(matches!(result, Err(RemoteError::Timeout(_))));
    }
}
