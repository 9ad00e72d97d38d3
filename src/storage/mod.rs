// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Storage Module
//!
//! Persistent storage for the document vault.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   vault.redb      # Saved documents, owner/hash indexes, mirror outbox
//!   reports/
//!     verification-report.json
//!     verification-report.txt
//! ```
//!
//! The database survives process restarts. Saves and deletes are single
//! redb write transactions; a failed operation leaves no partial record.

pub mod files;
pub mod paths;
pub mod vault_db;

pub use files::write_atomic;
pub use paths::StoragePaths;
pub use vault_db::{LocalVaultStore, PendingMirror, StorageError, StorageResult};
