// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document vault backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `documents`: document id → serialized `{seq, document}`
//! - `owner_index`: composite key (owner|!seq) → document id
//! - `hash_index`: composite key (hash|seq) → document id
//! - `pending_mirrors`: document id → serialized [`PendingMirror`]
//! - `vault_state`: key → u64 (save sequence counter)
//!
//! Every mutation runs in a single write transaction, so a save or delete
//! either lands completely (record and both index entries) or not at all.
//! redb admits one writer at a time, which serializes concurrent saves.

use std::fs;
use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::hash::{is_sha256_hex, normalize_hash};
use crate::models::{SavedDocument, WalletAddress};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: document id → serialized StoredRecord (JSON bytes).
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Index: owner scope + inverted sequence → document id (newest first).
const OWNER_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("owner_index");

/// Index: hash scope + sequence → document id (oldest first).
const HASH_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("hash_index");

/// Outbox of documents whose remote mirror has not succeeded yet.
const PENDING_MIRRORS: TableDefinition<&str, &[u8]> = TableDefinition::new("pending_mirrors");

/// Vault counters.
const VAULT_STATE: TableDefinition<&str, u64> = TableDefinition::new("vault_state");

const NEXT_SEQ_KEY: &str = "next_seq";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Records
// =============================================================================

/// Value stored in the `documents` table.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    seq: u64,
    document: SavedDocument,
}

/// A saved document whose mirror to the remote API is outstanding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingMirror {
    pub document_id: String,
    /// Failed mirror attempts so far.
    pub attempts: u32,
    pub last_error: String,
    /// Milliseconds since the Unix epoch.
    pub last_attempt_at: i64,
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Length-prefixed scope so that no owner or hash is a prefix of another.
fn scope_prefix(scope: &str) -> Vec<u8> {
    let bytes = scope.as_bytes();
    let mut key = Vec::with_capacity(4 + bytes.len() + 8);
    key.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    key.extend_from_slice(bytes);
    key
}

/// Inclusive upper bound for a scope range scan.
fn scope_end(scope: &str) -> Vec<u8> {
    let mut end = scope_prefix(scope);
    end.extend_from_slice(&[0xFF; 8]);
    end
}

/// Owner index key. The sequence is inverted so newest entries sort first.
fn owner_key(owner: &str, seq: u64) -> Vec<u8> {
    let mut key = scope_prefix(owner);
    key.extend_from_slice(&(!seq).to_be_bytes());
    key
}

/// Hash index key. Oldest entries sort first.
fn hash_key(hash: &str, seq: u64) -> Vec<u8> {
    let mut key = scope_prefix(hash);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn read_record<T>(table: &T, id: &str) -> StorageResult<Option<StoredRecord>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

// =============================================================================
// LocalVaultStore
// =============================================================================

/// Durable per-owner collection of saved documents.
pub struct LocalVaultStore {
    db: Database,
}

impl LocalVaultStore {
    /// Open (or create) the vault database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS)?;
            let _ = write_txn.open_table(OWNER_INDEX)?;
            let _ = write_txn.open_table(HASH_INDEX)?;
            let _ = write_txn.open_table(PENDING_MIRRORS)?;
            let _ = write_txn.open_table(VAULT_STATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Save a new document for `owner`.
    ///
    /// The hash is normalized, a fresh id and timestamp are assigned, and the
    /// record is durably committed before this returns.
    pub fn save(
        &self,
        filename: &str,
        hash: &str,
        owner: &WalletAddress,
        size: u64,
        mime_type: &str,
    ) -> StorageResult<SavedDocument> {
        if filename.trim().is_empty() {
            return Err(StorageError::InvalidRecord(
                "filename must not be empty".to_string(),
            ));
        }
        let normalized = normalize_hash(hash);
        if !is_sha256_hex(&normalized) {
            return Err(StorageError::InvalidRecord(format!(
                "hash is not a SHA-256 hex digest: {normalized}"
            )));
        }

        let document = SavedDocument::new(filename, &normalized, owner.clone(), size, mime_type);
        self.insert(document)
    }

    fn insert(&self, document: SavedDocument) -> StorageResult<SavedDocument> {
        let write_txn = self.db.begin_write()?;
        {
            let mut state = write_txn.open_table(VAULT_STATE)?;
            let seq = state.get(NEXT_SEQ_KEY)?.map(|v| v.value()).unwrap_or(0);
            state.insert(NEXT_SEQ_KEY, seq + 1)?;

            let mut docs = write_txn.open_table(DOCUMENTS)?;
            if docs.get(document.id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Document {}", document.id)));
            }
            let record = StoredRecord {
                seq,
                document: document.clone(),
            };
            let json = serde_json::to_vec(&record)?;
            docs.insert(document.id.as_str(), json.as_slice())?;

            let mut owners = write_txn.open_table(OWNER_INDEX)?;
            let key = owner_key(document.wallet_address.as_str(), seq);
            owners.insert(key.as_slice(), document.id.as_str())?;

            let mut hashes = write_txn.open_table(HASH_INDEX)?;
            let key = hash_key(&document.hash, seq);
            hashes.insert(key.as_slice(), document.id.as_str())?;
        }
        write_txn.commit()?;

        tracing::info!(
            id = %document.id,
            owner = %document.wallet_address,
            hash = %document.hash,
            "Saved document to vault"
        );
        Ok(document)
    }

    /// Look up a single document by id.
    pub fn get(&self, id: &str) -> StorageResult<Option<SavedDocument>> {
        let read_txn = self.db.begin_read()?;
        let docs = read_txn.open_table(DOCUMENTS)?;
        Ok(read_record(&docs, id)?.map(|r| r.document))
    }

    /// All documents of `owner`, most recent first.
    pub fn list_by_owner(&self, owner: &WalletAddress) -> StorageResult<Vec<SavedDocument>> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(OWNER_INDEX)?;
        let docs = read_txn.open_table(DOCUMENTS)?;

        let start = scope_prefix(owner.as_str());
        let end = scope_end(owner.as_str());

        let mut documents = Vec::new();
        for entry in owners.range(start.as_slice()..=end.as_slice())? {
            let entry = entry?;
            let id = entry.1.value();
            match read_record(&docs, id)? {
                Some(record) => documents.push(record.document),
                None => tracing::warn!(id = %id, "Owner index points at a missing document"),
            }
        }
        Ok(documents)
    }

    /// Earliest saved document with this hash, across all owners.
    pub fn find_by_hash(&self, hash: &str) -> StorageResult<Option<SavedDocument>> {
        let hash = normalize_hash(hash);
        let read_txn = self.db.begin_read()?;
        let hashes = read_txn.open_table(HASH_INDEX)?;
        let docs = read_txn.open_table(DOCUMENTS)?;

        let start = scope_prefix(&hash);
        let end = scope_end(&hash);

        for entry in hashes.range(start.as_slice()..=end.as_slice())? {
            let entry = entry?;
            if let Some(record) = read_record(&docs, entry.1.value())? {
                return Ok(Some(record.document));
            }
        }
        Ok(None)
    }

    /// Remove a document and its index entries. Irreversible.
    ///
    /// Returns the removed document, or `NotFound` (with the vault left
    /// untouched) if no document has this id.
    pub fn delete(&self, id: &str) -> StorageResult<SavedDocument> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut docs = write_txn.open_table(DOCUMENTS)?;
            let bytes = docs.remove(id)?.map(|v| v.value().to_vec());
            let Some(bytes) = bytes else {
                return Err(StorageError::NotFound(format!("Document {id}")));
            };
            let record: StoredRecord = serde_json::from_slice(&bytes)?;

            let mut owners = write_txn.open_table(OWNER_INDEX)?;
            let key = owner_key(record.document.wallet_address.as_str(), record.seq);
            owners.remove(key.as_slice())?;

            let mut hashes = write_txn.open_table(HASH_INDEX)?;
            let key = hash_key(&record.document.hash, record.seq);
            hashes.remove(key.as_slice())?;

            let mut pending = write_txn.open_table(PENDING_MIRRORS)?;
            pending.remove(id)?;

            record
        };
        write_txn.commit()?;

        tracing::info!(id = %id, hash = %record.document.hash, "Deleted document from vault");
        Ok(record.document)
    }

    // =========================================================================
    // Pending Mirror Outbox
    // =========================================================================

    /// Record a failed mirror attempt for a saved document.
    pub fn mark_pending_mirror(&self, id: &str, error: &str) -> StorageResult<PendingMirror> {
        let write_txn = self.db.begin_write()?;
        let pending_entry = {
            let docs = write_txn.open_table(DOCUMENTS)?;
            if docs.get(id)?.is_none() {
                return Err(StorageError::NotFound(format!("Document {id}")));
            }

            let mut pending = write_txn.open_table(PENDING_MIRRORS)?;
            let previous: Option<PendingMirror> = match pending.get(id)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            let entry = PendingMirror {
                document_id: id.to_string(),
                attempts: previous.map(|p| p.attempts).unwrap_or(0).saturating_add(1),
                last_error: error.to_string(),
                last_attempt_at: chrono::Utc::now().timestamp_millis(),
            };
            let json = serde_json::to_vec(&entry)?;
            pending.insert(id, json.as_slice())?;
            entry
        };
        write_txn.commit()?;
        Ok(pending_entry)
    }

    /// All outstanding mirror entries.
    pub fn pending_mirrors(&self) -> StorageResult<Vec<PendingMirror>> {
        let read_txn = self.db.begin_read()?;
        let pending = read_txn.open_table(PENDING_MIRRORS)?;

        let mut entries = Vec::new();
        for entry in pending.iter()? {
            let entry = entry?;
            entries.push(serde_json::from_slice(entry.1.value())?);
        }
        Ok(entries)
    }

    /// Drop an outbox entry after a successful mirror. Returns whether one existed.
    pub fn clear_pending_mirror(&self, id: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut pending = write_txn.open_table(PENDING_MIRRORS)?;
            let removed = pending.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

// =============================================================================
// Tests
// =============================================================================
