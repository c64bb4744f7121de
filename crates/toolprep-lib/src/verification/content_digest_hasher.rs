use super::{ChecksumKind, ChecksumSpec};
use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Verification failed: expected {expected}, got {actual}")]
    VerificationFailed { expected: String, actual: String },
}

enum ContentDigestHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

/// Incrementally hashes content and compares it to an expected checksum.
pub struct ContentDigestVerifier {
    hasher: ContentDigestHasher,
    expected_digest: String,
}

impl ContentDigestVerifier {
    #[inline]
    pub fn new(spec: &ChecksumSpec) -> Self {
        let hasher = match spec.kind {
            ChecksumKind::Md5 => ContentDigestHasher::Md5(Md5::new()),
            ChecksumKind::Sha1 => ContentDigestHasher::Sha1(Sha1::new()),
            ChecksumKind::Sha256 => ContentDigestHasher::Sha256(Sha256::new()),
            ChecksumKind::Sha512 => ContentDigestHasher::Sha512(Sha512::new()),
        };
        Self {
            hasher,
            expected_digest: spec.digest.to_ascii_lowercase(),
        }
    }

    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        match &mut self.hasher {
            ContentDigestHasher::Md5(digest) => Digest::update(digest, data.as_ref()),
            ContentDigestHasher::Sha1(digest) => Digest::update(digest, data.as_ref()),
            ContentDigestHasher::Sha256(digest) => Digest::update(digest, data.as_ref()),
            ContentDigestHasher::Sha512(digest) => Digest::update(digest, data.as_ref()),
        };
    }

    pub fn finalize_hex(self) -> (String, String) {
        let actual_digest = match self.hasher {
            ContentDigestHasher::Md5(digest) => digest.finalize().to_vec(),
            ContentDigestHasher::Sha1(digest) => digest.finalize().to_vec(),
            ContentDigestHasher::Sha256(digest) => digest.finalize().to_vec(),
            ContentDigestHasher::Sha512(digest) => digest.finalize().to_vec(),
        };
        (self.expected_digest, hex::encode(actual_digest))
    }

    pub fn verify(self) -> Result<(), VerificationError> {
        let (expected, actual) = self.finalize_hex();

        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::VerificationFailed { expected, actual })
        }
    }
}
