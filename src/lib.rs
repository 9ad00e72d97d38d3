// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FinGuard Vault - Document Hash Verification & Vault
//!
//! This crate computes SHA-256 content hashes for user documents, keeps a
//! durable per-owner vault of saved hashes, and verifies a known hash against
//! the vault with a fallback to the remote document API.
//!
//! ## Modules
//!
//! - `hash` - Content hashing and file validation
//! - `storage` - redb-backed local vault and export files
//! - `remote` - HTTP client for the remote document API
//! - `verification` - Local-then-remote hash lookup chain
//! - `report` - Structured and plain-text verification reports
//! - `vault` - Save / mirror / verify orchestration used by the CLI

pub mod config;
pub mod error;
pub mod hash;
pub mod logging;
pub mod models;
pub mod remote;
pub mod report;
pub mod storage;
pub mod vault;
pub mod verification;

pub use error::{VaultError, VaultResult};
pub use models::{MatchedDocument, SavedDocument, VerificationResult, WalletAddress};
