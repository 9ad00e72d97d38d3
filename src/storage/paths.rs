// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-disk vault layout.

use std::path::{Path, PathBuf};

use crate::report::ReportFormat;

/// Default data directory, relative to the working directory.
pub const DATA_ROOT: &str = "finguard-data";

/// Storage path utilities for the vault data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all vault data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the embedded vault database.
    pub fn vault_db(&self) -> PathBuf {
        self.root.join("vault.redb")
    }

    /// Directory receiving exported verification reports.
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// Default export path for a report in the given format.
    pub fn report_file(&self, format: ReportFormat) -> PathBuf {
        self.reports_dir().join(format.file_name())
    }
}
