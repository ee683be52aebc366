//! Target digests and the two supported hash algorithms.
//!
//! The algorithm is picked from the target alone: 32 hex characters select
//! MD5, 64 select SHA-256. Emails are trimmed and lowercased before hashing.
use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target {0:?}: expected 32 (MD5) or 64 (SHA-256) hex characters")]
    InvalidTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Select the algorithm from the shape of a hex target.
    pub fn detect(target: &str) -> Option<Self> {
        if !target.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match target.len() {
            32 => Some(DigestAlgorithm::Md5),
            64 => Some(DigestAlgorithm::Sha256),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha256 => "SHA256",
        }
    }

    /// Raw digest of `input` exactly as given.
    pub fn digest_bytes(self, input: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Md5 => Md5::digest(input).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
        }
    }

    /// Lowercase hex digest of a canonicalized email.
    pub fn hash_email(self, email: &str) -> String {
        hex::encode(self.digest_bytes(canonical_email(email).as_bytes()))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trim and lowercase, the form avatar services hash.
pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A validated digest to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    hex: String,
    bytes: Vec<u8>,
    algorithm: DigestAlgorithm,
}

impl SearchTarget {
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        let algorithm = DigestAlgorithm::detect(trimmed)
            .ok_or_else(|| TargetError::InvalidTarget(raw.to_string()))?;
        let hex = trimmed.to_ascii_lowercase();
        let bytes = hex::decode(&hex).map_err(|_| TargetError::InvalidTarget(raw.to_string()))?;
        Ok(Self {
            hex,
            bytes,
            algorithm,
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Compare the digest of `email` against the target.
    ///
    /// Generated candidates are already canonical, so the common path hashes
    /// the input without allocating.
    pub fn matches(&self, email: &str) -> bool {
        let needs_canonical = email
            .bytes()
            .any(|b| !b.is_ascii() || b.is_ascii_uppercase() || b.is_ascii_whitespace());
        if needs_canonical {
            self.digest_eq(canonical_email(email).as_bytes())
        } else {
            self.digest_eq(email.as_bytes())
        }
    }

    fn digest_eq(&self, input: &[u8]) -> bool {
        match self.algorithm {
            DigestAlgorithm::Md5 => Md5::digest(input).as_slice() == self.bytes.as_slice(),
            DigestAlgorithm::Sha256 => Sha256::digest(input).as_slice() == self.bytes.as_slice(),
        }
    }
}

impl FromStr for SearchTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
