// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Crate-level error taxonomy.
//!
//! Each layer owns its own error type; [`VaultError`] groups them into the
//! categories callers act on:
//!
//! | Variant | Raised when | Caller action |
//! |---------|-------------|---------------|
//! | `FileValidation` | file too large or disallowed type | pick another file |
//! | `HashComputation` | file bytes could not be read | retry |
//! | `Storage` | vault read/write failed | retry, state is unchanged |
//! | `RemoteUnavailable` | remote document API failed | informational, local state kept |
//! | `Report` | report could not be rendered | retry |

use crate::hash::{HashError, ValidationError};
use crate::remote::RemoteError;
use crate::report::ReportError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("file validation failed: {0}")]
    FileValidation(#[from] ValidationError),

    #[error("hash computation failed: {0}")]
    HashComputation(#[from] HashError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote document service unavailable: {0}")]
    RemoteUnavailable(#[from] RemoteError),

    #[error("report generation failed: {0}")]
    Report(#[from] ReportError),
}

impl VaultError {
    /// Whether retrying the same operation can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, VaultError::FileValidation(_))
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
