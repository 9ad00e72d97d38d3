// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process stand-in for the remote document API, for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    pub records: Arc<Mutex<Vec<Value>>>,
    /// Answer every `POST /documents` with 503.
    pub reject_posts: bool,
    /// Sleep before answering hash lookups.
    pub lookup_delay: Option<Duration>,
    /// Answer every hash lookup with this record, whatever was asked.
    pub fixed_reply: Option<Value>,
}

impl MockBackend {
    pub fn with_record(self, record: Value) -> Self {
        self.records.lock().unwrap().push(record);
        self
    }

    /// Records stored so far (seeded and posted).
    pub fn posted(&self) -> Vec<Value> {
        self.records.lock().unwrap().clone()
    }
}

/// Serve `backend` on an ephemeral port and return its base URL.
pub(crate) async fn spawn(backend: MockBackend) -> String {
    let app = Router::new()
        .route("/api/documents", post(create_document))
        .route("/api/documents/hash/{hash}", get(find_document))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL of a port nothing listens on.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

async fn create_document(
    State(backend): State<MockBackend>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if backend.reject_posts {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let mut records = backend.records.lock().unwrap();
    let mut record = body;
    record["_id"] = json!(format!("remote-{}", records.len() + 1));
    records.push(record.clone());
    Ok(Json(record))
}

async fn find_document(
    State(backend): State<MockBackend>,
    Path(hash): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if let Some(delay) = backend.lookup_delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(reply) = backend.fixed_reply {
        return Ok(Json(reply));
    }
    let found = {
        let records = backend.records.lock().unwrap();
        let found = records.iter().find(|r| r["hash"] == hash).cloned();
        found
    };
    found.map(Json).ok_or(StatusCode::NOT_FOUND)
}
