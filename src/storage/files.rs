// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plain file writes for exported artifacts.
//!
//! Exports are written to a sibling temp file and renamed into place, so a
//! reader never observes a half-written report.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::StorageResult;

/// Sibling temp path: `report.json` becomes `report.json.tmp`.
fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let Some(name) = path.file_name() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        ));
    };
    let mut temp_name = name.to_os_string();
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

/// Write `data` to `path` atomically (temp file + rename).
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path)?;
    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(data)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("verification-report.txt");

        write_atomic(&path, b"Status: MATCH\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"Status: MATCH\n");
        assert!(!temp_path_for(&path).unwrap().exists());
    }

    #[test]
    fn temp_names_differ_per_export_format() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("verification-report.json");
        let txt = dir.path().join("verification-report.txt");

        assert_eq!(
            temp_path_for(&json).unwrap(),
            dir.path().join("verification-report.json.tmp")
        );
        assert_ne!(temp_path_for(&json).unwrap(), temp_path_for(&txt).unwrap());

        write_atomic(&json, b"{}").unwrap();
        write_atomic(&txt, b"Status: MATCH\n").unwrap();
        assert_eq!(fs::read_to_string(&json).unwrap(), "{}");
        assert_eq!(fs::read_to_string(&txt).unwrap(), "Status: MATCH\n");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(write_atomic(Path::new("/"), b"x").is_err());
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verification-report.json");

        write_atomic(&path, b"{\"old\":true}").unwrap();
        write_atomic(&path, b"{\"new\":true}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"new\":true}");
    }
}
