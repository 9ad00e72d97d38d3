// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File checks applied before a document is hashed.
//!
//! A file is accepted when it is at most [`MAX_FILE_SIZE`] bytes and its MIME
//! type is in [`ALLOWED_MIME_TYPES`]. A file with no MIME type and no
//! extension is accepted and recorded as [`UNKNOWN_MIME_TYPE`].

use std::path::Path;

/// Upper bound on the size of a hashed document (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// MIME types a document may have.
pub const ALLOWED_MIME_TYPES: [&str; 7] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "image/jpeg",
    "image/png",
    "image/gif",
    "text/plain",
];

/// Recorded type for files whose MIME type could not be determined.
pub const UNKNOWN_MIME_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file name must not be empty")]
    EmptyName,

    #[error("file size {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("file type {0} is not supported; use PDF, DOCX, DOC, JPG, PNG, GIF or TXT")]
    UnsupportedType(String),
}

/// A user-selected file, as described by the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Display name (no directory component).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type reported by the picker, if any.
    pub mime_type: Option<String>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size: u64, mime_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type,
        }
    }

    /// MIME type to record for this file.
    pub fn mime_type_or_unknown(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(UNKNOWN_MIME_TYPE)
    }
}

/// Check a candidate against the size limit and the MIME allow-list.
pub fn validate_file(candidate: &FileCandidate) -> Result<(), ValidationError> {
    if candidate.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if candidate.size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size: candidate.size,
            max: MAX_FILE_SIZE,
        });
    }

    if let Some(mime) = candidate.mime_type.as_deref() {
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(ValidationError::UnsupportedType(mime.to_string()));
        }
    }

    Ok(())
}

/// Guess a MIME type from the file extension.
///
/// `Ok(None)` only when the path has no extension. Any extension outside
/// [`ALLOWED_MIME_TYPES`] is rejected as unsupported.
pub fn guess_mime_type(path: &Path) -> Result<Option<&'static str>, ValidationError> {
    let Some(ext) = path.extension() else {
        return Ok(None);
    };
    let ext = ext.to_string_lossy().to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => return Err(ValidationError::UnsupportedType(format!(".{ext}"))),
    };
    Ok(Some(mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(size: u64, mime: Option<&str>) -> FileCandidate {
        FileCandidate::new("statement.pdf", size, mime.map(str::to_string))
    }

    #[test]
    fn accepts_allowed_types_within_limit() {
        for mime in ALLOWED_MIME_TYPES {
            assert_eq!(validate_file(&candidate(1024, Some(mime))), Ok(()));
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate_file(&candidate(MAX_FILE_SIZE, Some("application/pdf"))).is_ok());

        let err = validate_file(&candidate(MAX_FILE_SIZE + 1, Some("application/pdf")));
        assert_eq!(
            err,
            Err(ValidationError::TooLarge {
                size: MAX_FILE_SIZE + 1,
                max: MAX_FILE_SIZE
            })
        );
    }

    #[test]
    fn rejects_disallowed_type() {
        let err = validate_file(&candidate(10, Some("application/x-msdownload")));
        assert_eq!(
            err,
            Err(ValidationError::UnsupportedType(
                "application/x-msdownload".to_string()
            ))
        );
    }

    #[test]
    fn missing_type_is_accepted_as_unknown() {
        let c = candidate(10, None);
        assert!(validate_file(&c).is_ok());
        assert_eq!(c.mime_type_or_unknown(), UNKNOWN_MIME_TYPE);
    }

    #[test]
    fn rejects_blank_name() {
        let c = FileCandidate::new("   ", 10, Some("text/plain".to_string()));
        assert_eq!(validate_file(&c), Err(ValidationError::EmptyName));
    }

    #[test]
    fn guesses_type_from_extension() {
        assert_eq!(guess_mime_type(Path::new("a/b/Scan.JPG")), Ok(Some("image/jpeg")));
        assert_eq!(guess_mime_type(Path::new("notes.txt")), Ok(Some("text/plain")));
        assert_eq!(
            guess_mime_type(Path::new("offer.docx")),
            Ok(Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"))
        );
        assert_eq!(guess_mime_type(Path::new("README")), Ok(None));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        assert_eq!(
            guess_mime_type(Path::new("payload.exe")),
            Err(ValidationError::UnsupportedType(".exe".to_string()))
        );
        assert_eq!(
            guess_mime_type(Path::new("archive.tar.GZ")),
            Err(ValidationError::UnsupportedType(".gz".to_string()))
        );
    }
}
