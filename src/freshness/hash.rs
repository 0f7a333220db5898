//! Content hashing using blake3.
//!
//! The change detector compares digests of whole files; equal digests mean
//! an event carried no new content.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash an in-memory buffer.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are plenty for logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// What a file looked like when it was hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDigest {
    /// No bytes, or only whitespace: usually caught mid-write.
    Empty,
    Content(ContentHash),
}

/// Stream a file through blake3.
pub fn hash_file(path: &Path) -> io::Result<FileDigest> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];
    let mut blank = true;

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                blank = blank && buffer[..n].iter().all(u8::is_ascii_whitespace);
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if blank {
        return Ok(FileDigest::Empty);
    }
    Ok(FileDigest::Content(ContentHash::new(
        *hasher.finalize().as_bytes(),
    )))
}
