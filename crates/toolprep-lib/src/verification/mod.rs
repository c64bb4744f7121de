pub mod content_digest_hasher;

pub use content_digest_hasher::{ContentDigestVerifier, VerificationError};

use crate::error::ToolPrepError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;
use tokio::io::AsyncReadExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumKind {
    /// Length of the hex encoded digest.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }
}

impl Display for ChecksumKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        })
    }
}

/// Expected digest of an artifact, as published by its vendor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumSpec {
    pub kind: ChecksumKind,
    pub digest: String,
}

impl ChecksumSpec {
    pub fn new(kind: ChecksumKind, digest: impl AsRef<str>) -> Self {
        Self {
            kind,
            digest: digest.as_ref().trim().to_ascii_lowercase(),
        }
    }

    /// Checks that the digest is hex of the length `kind` produces.
    pub fn validate(&self) -> Result<(), ToolPrepError> {
        let reason = if self.digest.len() != self.kind.hex_len() {
            format!(
                "expected {} hex characters, found {}",
                self.kind.hex_len(),
                self.digest.len()
            )
        } else if !self.digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            "digest is not hexadecimal".to_string()
        } else {
            return Ok(());
        };
        Err(ToolPrepError::InvalidChecksum {
            kind: self.kind.to_string(),
            digest: self.digest.clone(),
            reason,
        })
    }
}

impl Display for ChecksumSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.digest)
    }
}

/// Returns whether `bytes` hash to the digest in `spec`.
pub fn verify_bytes(bytes: &[u8], spec: &ChecksumSpec) -> bool {
    if spec.validate().is_err() {
        return false;
    }
    let mut verifier = ContentDigestVerifier::new(spec);
    verifier.update(bytes);
    verifier.verify().is_ok()
}

/// Streams the file at `path` through the hasher named by `spec`.
///
/// `url` is only used to label the error.
pub async fn verify_file(path: &Path, url: &str, spec: &ChecksumSpec) -> Result<(), ToolPrepError> {
    spec.validate()?;

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ToolPrepError::filesystem(path, e))?;
    let mut reader = tokio::io::BufReader::new(file);
    let mut buffer = vec![0u8; 65536]; // 64KB buffer for reading chunks
    let mut verifier = ContentDigestVerifier::new(spec);

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| ToolPrepError::filesystem(path, e))?;
        if bytes_read == 0 {
            break;
        }
        verifier.update(&buffer[..bytes_read]);
    }

    verifier
        .verify()
        .map_err(|source| ToolPrepError::ChecksumMismatch {
            url: url.to_string(),
            source,
        })
}
