// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote document API integration.
//!
//! The backend is an opaque HTTP/JSON service:
//!
//! - `POST /documents` stores `{filename, hash, walletAddress, timestamp, size, type}`
//! - `GET /documents/hash/{hash}` returns the matching record or 404
//!
//! [`RemoteDocumentStore`] is the seam the vault and the verifier depend
//! on; [`RemoteSyncClient`] is the reqwest implementation.

pub mod client;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::models::SavedDocument;

pub use client::{RemoteDocument, RemoteError, RemoteSyncClient};

/// Remote store of saved documents, queried by hash.
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Mirror a locally saved document to the remote store.
    async fn publish(&self, document: &SavedDocument) -> Result<(), RemoteError>;

    /// Look up a document by normalized hash. `Ok(None)` means not found.
    async fn find_by_hash(&self, hash: &str) -> Result<Option<SavedDocument>, RemoteError>;
}
