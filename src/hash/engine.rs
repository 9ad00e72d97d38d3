// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SHA-256 hash engine.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hash algorithm name shown in reports and CLI output.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Read buffer for streaming hashes (8 KiB).
const BUFFER_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("failed to open {} for hashing: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read file contents: {0}")]
    Read(#[source] io::Error),

    #[error("input exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

/// Digest of a streamed input and the number of bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDigest {
    pub hash: String,
    pub len: u64,
}

/// Compute the SHA-256 digest of `bytes` as lowercase hex.
pub fn compute_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Stream a reader through SHA-256.
///
/// Either the whole input is consumed and hashed or an error is returned;
/// a partial digest is never produced.
pub fn hash_reader<R: Read>(reader: R) -> Result<StreamDigest, HashError> {
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, reader);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut len = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::Read(e)),
        };
        hasher.update(&buffer[..read]);
        len += read as u64;
    }

    Ok(StreamDigest {
        hash: format!("{:x}", hasher.finalize()),
        len,
    })
}

/// Hash a file on disk without loading it into memory.
///
/// At most `limit + 1` bytes are read; a longer file fails with
/// [`HashError::TooLarge`] instead of producing a digest of a prefix.
pub fn hash_file(path: &Path, limit: u64) -> Result<StreamDigest, HashError> {
    let file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = hash_reader(file.take(limit.saturating_add(1)))?;
    if digest.len > limit {
        return Err(HashError::TooLarge { limit });
    }
    Ok(digest)
}

/// Trim surrounding whitespace and lowercase a hash string.
pub fn normalize_hash(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Whether `hash` is a normalized SHA-256 hex digest.
pub fn is_sha256_hex(hash: &str) -> bool {
    hash.len() == HASH_HEX_LEN
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    /// Reader that fails after yielding a few bytes.
    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("handle revoked"));
            }
            self.served = true;
            buf[..3].copy_from_slice(b"abc");
            Ok(3)
        }
    }

    #[test]
    fn known_vectors() {
        assert_eq!(compute_hash(b"hello world"), HELLO_WORLD_SHA256);
        assert_eq!(compute_hash(b""), EMPTY_SHA256);
    }

    #[test]
    fn hash_is_deterministic() {
        let data = b"quarterly statement.pdf contents";
        assert_eq!(compute_hash(data), compute_hash(data));
    }

    #[test]
    fn different_content_gives_different_hash() {
        assert_ne!(compute_hash(b"hello world"), compute_hash(b"hello world!"));
    }

    #[test]
    fn streaming_matches_in_memory() {
        // Larger than one buffer so several reads happen.
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = hash_reader(data.as_slice()).unwrap();
        assert_eq!(streamed.hash, compute_hash(&data));
        assert_eq!(streamed.len, 50_000);
    }

    #[test]
    fn hash_file_ignores_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("greeting.txt");
        let b = dir.path().join("renamed-copy.pdf");
        for path in [&a, &b] {
            let mut f = File::create(path).unwrap();
            f.write_all(b"hello world").unwrap();
        }

        let digest = hash_file(&a, 1024).unwrap();
        assert_eq!(digest.hash, HELLO_WORLD_SHA256);
        assert_eq!(digest.len, 11);
        assert_eq!(digest, hash_file(&b, 1024).unwrap());
    }

    #[test]
    fn hash_file_enforces_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeting.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(hash_file(&path, 11).unwrap().hash, HELLO_WORLD_SHA256);
        assert!(matches!(
            hash_file(&path, 10),
            Err(HashError::TooLarge { limit: 10 })
        ));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = hash_file(&dir.path().join("nope.txt"), 1024);
        assert!(matches!(result, Err(HashError::Open { .. })));
    }

    #[test]
    fn read_failure_yields_no_hash() {
        let result = hash_reader(FailingReader { served: false });
        assert!(matches!(result, Err(HashError::Read(_))));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_hash("  ABCdef\n"), "abcdef");
        assert_eq!(normalize_hash(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["  B94D27  ", "\tabc\n", "", "   ", "MiXeD Case"] {
            let once = normalize_hash(input);
            assert_eq!(normalize_hash(&once), once);
        }
    }

    #[test]
    fn sha256_hex_shape() {
        assert!(is_sha256_hex(HELLO_WORLD_SHA256));
        assert!(!is_sha256_hex(&HELLO_WORLD_SHA256.to_uppercase()));
        assert!(!is_sha256_hex(&HELLO_WORLD_SHA256[..63]));
        assert!(!is_sha256_hex(&HELLO_WORLD_SHA256.replace('b', "g")));
    }
}
