// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content hashing and pre-hash file validation.
//!
//! Hashes are SHA-256 digests rendered as 64 lowercase hex characters. The
//! digest depends only on file content: name, MIME type and upload time
//! never feed into it.

pub mod engine;
pub mod validation;

pub use engine::{
    compute_hash, hash_file, hash_reader, is_sha256_hex, normalize_hash, HashError,
    StreamDigest, HASH_ALGORITHM, HASH_HEX_LEN,
};
pub use validation::{
    guess_mime_type, validate_file, FileCandidate, ValidationError, ALLOWED_MIME_TYPES,
    MAX_FILE_SIZE, UNKNOWN_MIME_TYPE,
};
