// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Data Models
//!
//! Field names serialize in camelCase so stored records, remote payloads and
//! structured reports share the same shape (`walletAddress`, `isMatch`, ...).
//!
//! ## Owner Key
//!
//! Every [`SavedDocument`] belongs to a [`WalletAddress`], the string that
//! identifies the local user or device. Devices without a connected wallet
//! use [`DEFAULT_OWNER`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::hash::normalize_hash;

/// Owner key used when no wallet is connected.
pub const DEFAULT_OWNER: &str = "local-user";

// =============================================================================
// Owner Key
// =============================================================================

/// Owner of a set of vault documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WalletAddress {
    fn default() -> Self {
        WalletAddress(DEFAULT_OWNER.to_string())
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Saved Documents
// =============================================================================

/// A hashed document kept in the vault.
///
/// Created on an explicit save and never mutated afterwards; the only
/// lifecycle transition is deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Display name.
    pub filename: String,
    /// Lowercase hex SHA-256 digest.
    pub hash: String,
    /// Owner key.
    pub wallet_address: WalletAddress,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl SavedDocument {
    /// Build a new record with a fresh id, the current time and a
    /// normalized hash.
    pub fn new(
        filename: impl Into<String>,
        hash: &str,
        wallet_address: WalletAddress,
        size: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            hash: normalize_hash(hash),
            wallet_address,
            size,
            mime_type: mime_type.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Copy of the matched document carried inside a [`VerificationResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDocument {
    pub id: String,
    pub filename: String,
    pub timestamp: i64,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl From<&SavedDocument> for MatchedDocument {
    fn from(doc: &SavedDocument) -> Self {
        Self {
            id: doc.id.clone(),
            filename: doc.filename.clone(),
            timestamp: doc.timestamp,
            size: doc.size,
            mime_type: doc.mime_type.clone(),
        }
    }
}

// =============================================================================
// Verification Results
// =============================================================================

/// Where a match was found.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Local,
    Remote,
    #[serde(rename = "none")]
    Unmatched,
}

/// Outcome of the remote leg of a verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RemoteLookup {
    /// Local vault answered, or the hashes under comparison differed.
    NotAttempted,
    /// No remote API configured.
    Disabled,
    Found,
    NotFound,
    /// Network error, timeout or unexpected response.
    Unreachable,
}

/// Result of a single verification call. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_match: bool,
    /// Normalized hash supplied by the user.
    pub input_hash: String,
    /// Normalized hash of the document being checked.
    pub current_hash: String,
    /// Verification time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// 100 on a match, 0 otherwise.
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_document: Option<MatchedDocument>,
    pub source: MatchSource,
    pub remote_lookup: RemoteLookup,
}

impl VerificationResult {
    pub fn matched(
        input_hash: String,
        current_hash: String,
        document: &SavedDocument,
        source: MatchSource,
        remote_lookup: RemoteLookup,
    ) -> Self {
        Self {
            is_match: true,
            input_hash,
            current_hash,
            timestamp: Utc::now().timestamp_millis(),
            confidence: 100,
            saved_document: Some(MatchedDocument::from(document)),
            source,
            remote_lookup,
        }
    }

    pub fn unmatched(input_hash: String, current_hash: String, remote_lookup: RemoteLookup) -> Self {
        Self {
            is_match: false,
            input_hash,
            current_hash,
            timestamp: Utc::now().timestamp_millis(),
            confidence: 0,
            saved_document: None,
            source: MatchSource::Unmatched,
            remote_lookup,
        }
    }

    /// No match, but only because the remote service could not be asked.
    pub fn is_inconclusive(&self) -> bool {
        !self.is_match && self.remote_lookup == RemoteLookup::Unreachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_document_normalizes_hash_and_assigns_id() {
        let a = SavedDocument::new("a.txt", "  ABCDEF  ", WalletAddress::default(), 3, "text/plain");
        let b = SavedDocument::new("a.txt", "abcdef", WalletAddress::default(), 3, "text/plain");

        assert_eq!(a.hash, "abcdef");
        assert_ne!(a.id, b.id);
        assert_eq!(a.wallet_address.as_str(), DEFAULT_OWNER);
        assert!(a.timestamp > 0);
    }

    #[test]
    fn saved_document_uses_wire_field_names() {
        let doc = SavedDocument {
            id: "doc-1".to_string(),
            filename: "greeting.txt".to_string(),
            hash: "ab".to_string(),
            wallet_address: WalletAddress::from("user-1"),
            size: 11,
            mime_type: "text/plain".to_string(),
            timestamp: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["walletAddress"], "user-1");
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);

        let back: SavedDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn unmatched_result_omits_saved_document() {
        let result = VerificationResult::unmatched("ab".into(), "ab".into(), RemoteLookup::NotFound);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["isMatch"], false);
        assert_eq!(json["confidence"], 0);
        assert_eq!(json["source"], "none");
        assert_eq!(json["remoteLookup"], "notFound");
        assert!(json.get("savedDocument").is_none());
    }

    #[test]
    fn inconclusive_only_when_remote_unreachable() {
        let unreachable =
            VerificationResult::unmatched("ab".into(), "ab".into(), RemoteLookup::Unreachable);
        let not_found = VerificationResult::unmatched("ab".into(), "ab".into(), RemoteLookup::NotFound);

        assert!(unreachable.is_inconclusive());
        assert!(!not_found.is_inconclusive());
    }
}
