// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Vault
//!
//! Ties the pieces together: validate, hash, save locally, mirror to the
//! remote API, verify and export reports.
//!
//! The local save is authoritative. A failed mirror is logged and queued in
//! the pending-mirror outbox; it never undoes the save.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::hash::{
    guess_mime_type, hash_file, validate_file, FileCandidate, HashError, ValidationError,
    HASH_ALGORITHM, MAX_FILE_SIZE,
};
use crate::models::{SavedDocument, VerificationResult, WalletAddress};
use crate::remote::{RemoteDocumentStore, RemoteError, RemoteSyncClient};
use crate::report::{self, ReportFormat};
use crate::storage::{write_atomic, LocalVaultStore, StoragePaths};
use crate::verification::VerificationService;

/// A validated file and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    pub candidate: FileCandidate,
    pub hash: String,
}

/// What happened to the remote copy of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    Mirrored,
    /// Queued in the outbox after a failed attempt.
    Pending { error: String },
    /// Mirror failed and the outbox entry could not be written either.
    Unqueued { error: String, queue_error: String },
    /// No remote API configured.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub document: SavedDocument,
    pub mirror: MirrorStatus,
}

/// Summary of one pass over the pending-mirror outbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub mirrored: usize,
    pub still_pending: usize,
    /// Entries whose document no longer exists locally.
    pub dropped: usize,
}

pub struct DocumentVault {
    store: Arc<LocalVaultStore>,
    remote: Option<Arc<dyn RemoteDocumentStore>>,
    paths: StoragePaths,
    remote_timeout: Duration,
}

impl DocumentVault {
    pub fn new(
        store: Arc<LocalVaultStore>,
        remote: Option<Arc<dyn RemoteDocumentStore>>,
        paths: StoragePaths,
    ) -> Self {
        Self {
            store,
            remote,
            paths,
            remote_timeout: crate::remote::client::DEFAULT_TIMEOUT,
        }
    }

    /// Open the vault described by `config`, creating the data directory if needed.
    pub fn open(config: &VaultConfig) -> VaultResult<Self> {
        let paths = StoragePaths::new(&config.data_dir);
        let store = Arc::new(LocalVaultStore::open(&paths.vault_db())?);

        let remote: Option<Arc<dyn RemoteDocumentStore>> = match &config.api_url {
            Some(url) => {
                let client = RemoteSyncClient::new(url, config.api_timeout)?;
                tracing::info!(base_url = %client.base_url(), "Remote document API enabled");
                Some(Arc::new(client) as Arc<dyn RemoteDocumentStore>)
            }
            None => None,
        };

        tracing::info!(
            data_dir = %paths.root().display(),
            remote = config.api_url.is_some(),
            "Opened document vault"
        );
        Ok(Self::new(store, remote, paths).with_remote_timeout(config.api_timeout))
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn store(&self) -> &LocalVaultStore {
        &self.store
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Verification service sharing this vault's store and remote.
    pub fn verifier(&self) -> VerificationService {
        VerificationService::new(self.store.clone(), self.remote.clone())
            .with_remote_timeout(self.remote_timeout)
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    /// Validate and hash the file at `path`.
    ///
    /// The MIME type is `mime_type` when given, else guessed from the
    /// extension. Validation runs on the file metadata before any content is
    /// read, and the content is streamed so a file that grows past the limit
    /// is rejected without being buffered.
    pub async fn hash_file(&self, path: &Path, mime_type: Option<&str>) -> VaultResult<HashedFile> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = match mime_type {
            Some(mime) => Some(mime.to_string()),
            None => guess_mime_type(path)?.map(str::to_string),
        };

        let metadata = tokio::fs::metadata(path).await.map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let candidate = FileCandidate::new(name, metadata.len(), mime_type);
        validate_file(&candidate)?;

        let owned_path = path.to_path_buf();
        let streamed = tokio::task::spawn_blocking(move || hash_file(&owned_path, MAX_FILE_SIZE))
            .await
            .map_err(|e| HashError::Read(io::Error::other(e)))?;
        let digest = match streamed {
            Ok(digest) => digest,
            Err(HashError::TooLarge { limit }) => {
                return Err(ValidationError::TooLarge {
                    size: metadata.len().max(limit.saturating_add(1)),
                    max: limit,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            file = %candidate.name,
            size = digest.len,
            algorithm = HASH_ALGORITHM,
            hash = %digest.hash,
            "Hashed file"
        );
        Ok(HashedFile {
            candidate: FileCandidate {
                size: digest.len,
                ..candidate
            },
            hash: digest.hash,
        })
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Hash the file at `path` and save it for `owner`.
    pub async fn save_file(
        &self,
        path: &Path,
        mime_type: Option<&str>,
        owner: &WalletAddress,
    ) -> VaultResult<SaveOutcome> {
        let hashed = self.hash_file(path, mime_type).await?;
        self.save_hashed(&hashed.candidate, &hashed.hash, owner).await
    }

    /// Save an already hashed file, then mirror it to the remote API.
    pub async fn save_hashed(
        &self,
        candidate: &FileCandidate,
        hash: &str,
        owner: &WalletAddress,
    ) -> VaultResult<SaveOutcome> {
        validate_file(candidate)?;
        let document = self.store.save(
            &candidate.name,
            hash,
            owner,
            candidate.size,
            candidate.mime_type_or_unknown(),
        )?;
        let mirror = self.mirror(&document).await;
        Ok(SaveOutcome { document, mirror })
    }

    pub fn list(&self, owner: &WalletAddress) -> VaultResult<Vec<SavedDocument>> {
        Ok(self.store.list_by_owner(owner)?)
    }

    pub fn get(&self, id: &str) -> VaultResult<Option<SavedDocument>> {
        Ok(self.store.get(id)?)
    }

    /// Delete a document locally. The remote copy, if any, is left alone.
    pub fn delete(&self, id: &str) -> VaultResult<SavedDocument> {
        Ok(self.store.delete(id)?)
    }

    // =========================================================================
    // Remote Mirroring
    // =========================================================================

    async fn mirror(&self, document: &SavedDocument) -> MirrorStatus {
        let Some(remote) = &self.remote else {
            return MirrorStatus::Disabled;
        };

        match self.publish(remote.as_ref(), document).await {
            Ok(()) => MirrorStatus::Mirrored,
            Err(e) => {
                let error = e.to_string();
                match self.store.mark_pending_mirror(&document.id, &error) {
                    Ok(_) => {
                        tracing::warn!(
                            id = %document.id,
                            hash = %document.hash,
                            error = %error,
                            "Remote mirror failed; queued for retry"
                        );
                        MirrorStatus::Pending { error }
                    }
                    Err(store_err) => {
                        tracing::error!(
                            id = %document.id,
                            error = %error,
                            queue_error = %store_err,
                            "Remote mirror failed and could not be queued"
                        );
                        MirrorStatus::Unqueued {
                            error,
                            queue_error: store_err.to_string(),
                        }
                    }
                }
            }
        }
    }

    async fn publish(
        &self,
        remote: &dyn RemoteDocumentStore,
        document: &SavedDocument,
    ) -> Result<(), RemoteError> {
        match tokio::time::timeout(self.remote_timeout, remote.publish(document)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(format!(
                "no response within {} ms",
                self.remote_timeout.as_millis()
            ))),
        }
    }

    /// Retry every outstanding mirror once.
    ///
    /// Successful entries leave the outbox; failures stay with their attempt
    /// count bumped. Without a remote API nothing is attempted.
    pub async fn retry_pending_mirrors(&self) -> VaultResult<MirrorReport> {
        let pending = self.store.pending_mirrors()?;
        let mut report = MirrorReport::default();

        let Some(remote) = &self.remote else {
            report.still_pending = pending.len();
            return Ok(report);
        };

        for entry in pending {
            let Some(document) = self.store.get(&entry.document_id)? else {
                self.store.clear_pending_mirror(&entry.document_id)?;
                report.dropped += 1;
                continue;
            };

            match self.publish(remote.as_ref(), &document).await {
                Ok(()) => {
                    self.store.clear_pending_mirror(&document.id)?;
                    report.mirrored += 1;
                }
                Err(e) => {
                    let entry = self.store.mark_pending_mirror(&document.id, &e.to_string())?;
                    tracing::warn!(
                        id = %document.id,
                        attempts = entry.attempts,
                        error = %e,
                        "Mirror retry failed"
                    );
                    report.still_pending += 1;
                }
            }
        }

        tracing::info!(
            mirrored = report.mirrored,
            still_pending = report.still_pending,
            dropped = report.dropped,
            "Processed pending mirrors"
        );
        Ok(report)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Render `result` and write it to `destination`, or to the default
    /// report file under the data directory.
    pub fn export_report(
        &self,
        result: &VerificationResult,
        format: ReportFormat,
        destination: Option<&Path>,
    ) -> VaultResult<PathBuf> {
        let body = report::generate(result, format)?;
        let path = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.paths.report_file(format));
        write_atomic(&path, body.as_bytes())?;

        tracing::info!(path = %path.display(), "Exported verification report");
        Ok(path)
    }
}
