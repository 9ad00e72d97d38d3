// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Hash Verification
//!
//! Looks a candidate hash up in the local vault first and falls back to the
//! remote document API. Results are never cached: every call runs the whole
//! lookup chain again.
//!
//! Remote failures (network error, timeout, bad response) do not fail the
//! verification. They yield a negative result with
//! [`RemoteLookup::Unreachable`] so callers can present it as inconclusive.

use std::sync::Arc;
use std::time::Duration;

use crate::hash::normalize_hash;
use crate::models::{MatchSource, RemoteLookup, VerificationResult};
use crate::remote::{client::DEFAULT_TIMEOUT, RemoteDocumentStore};
use crate::storage::{LocalVaultStore, StorageResult};

pub struct VerificationService {
    store: Arc<LocalVaultStore>,
    remote: Option<Arc<dyn RemoteDocumentStore>>,
    remote_timeout: Duration,
}

impl VerificationService {
    pub fn new(store: Arc<LocalVaultStore>, remote: Option<Arc<dyn RemoteDocumentStore>>) -> Self {
        Self {
            store,
            remote,
            remote_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound on the remote fallback, independent of the client's own timeout.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Verify a user-supplied hash.
    ///
    /// Returns `Ok(None)` for blank input. Both `inputHash` and `currentHash`
    /// of the result hold the normalized candidate.
    pub async fn verify(&self, candidate: &str) -> StorageResult<Option<VerificationResult>> {
        let hash = normalize_hash(candidate);
        if hash.is_empty() {
            tracing::debug!("Ignoring blank verification input");
            return Ok(None);
        }
        self.lookup(hash.clone(), hash).await.map(Some)
    }

    /// Verify that `current` (hash of the file being re-checked) matches the
    /// expected `candidate` and that the hash is known to the vault.
    ///
    /// Differing hashes are a mismatch without any lookup.
    pub async fn verify_current(
        &self,
        candidate: &str,
        current: &str,
    ) -> StorageResult<Option<VerificationResult>> {
        let input_hash = normalize_hash(candidate);
        let current_hash = normalize_hash(current);
        if input_hash.is_empty() || current_hash.is_empty() {
            tracing::debug!("Ignoring blank verification input");
            return Ok(None);
        }

        if input_hash != current_hash {
            tracing::info!(
                input_hash = %input_hash,
                current_hash = %current_hash,
                "Current file does not match the expected hash"
            );
            return Ok(Some(VerificationResult::unmatched(
                input_hash,
                current_hash,
                RemoteLookup::NotAttempted,
            )));
        }
        self.lookup(input_hash, current_hash).await.map(Some)
    }

    async fn lookup(
        &self,
        input_hash: String,
        current_hash: String,
    ) -> StorageResult<VerificationResult> {
        if let Some(document) = self.store.find_by_hash(&input_hash)? {
            tracing::info!(hash = %input_hash, id = %document.id, "Hash matched local vault");
            return Ok(VerificationResult::matched(
                input_hash,
                current_hash,
                &document,
                MatchSource::Local,
                RemoteLookup::NotAttempted,
            ));
        }

        let Some(remote) = &self.remote else {
            tracing::info!(hash = %input_hash, "No local match and remote lookup disabled");
            return Ok(VerificationResult::unmatched(
                input_hash,
                current_hash,
                RemoteLookup::Disabled,
            ));
        };

        let outcome = tokio::time::timeout(self.remote_timeout, remote.find_by_hash(&input_hash)).await;
        let result = match outcome {
            Ok(Ok(Some(document))) if document.hash != input_hash => {
                tracing::warn!(
                    hash = %input_hash,
                    returned = %document.hash,
                    "Remote returned a record for a different hash"
                );
                VerificationResult::unmatched(input_hash, current_hash, RemoteLookup::Unreachable)
            }
            Ok(Ok(Some(document))) => {
                tracing::info!(hash = %input_hash, id = %document.id, "Hash matched remote record");
                VerificationResult::matched(
                    input_hash,
                    current_hash,
                    &document,
                    MatchSource::Remote,
                    RemoteLookup::Found,
                )
            }
            Ok(Ok(None)) => {
                tracing::info!(hash = %input_hash, "Hash not found locally or remotely");
                VerificationResult::unmatched(input_hash, current_hash, RemoteLookup::NotFound)
            }
            Ok(Err(e)) => {
                tracing::warn!(hash = %input_hash, error = %e, "Remote lookup failed");
                VerificationResult::unmatched(input_hash, current_hash, RemoteLookup::Unreachable)
            }
            Err(_) => {
                tracing::warn!(
                    hash = %input_hash,
                    timeout_ms = self.remote_timeout.as_millis() as u64,
                    "Remote lookup timed out"
                );
                VerificationResult::unmatched(input_hash, current_hash, RemoteLookup::Unreachable)
            }
        };
        Ok(result)
    }
}
