//! Cache key fingerprints
//!
//! A fingerprint is the SHA-256 of the operation identity, a NUL separator and
//! the canonical JSON encoding of the input. Converting through
//! `serde_json::Value` first sorts object keys, so inputs that differ only in map
//! ordering share a fingerprint. Inputs JSON cannot spell unambiguously
//! (non-finite floats, a null-encoded value inside `Some`) have no fingerprint.
//! Distinct inputs colliding in SHA-256 is accepted as a negligible risk.

use super::canonical;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Why an input has no fingerprint
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The input's encoding would be shared with a different input
    #[error("Input has no canonical encoding: {0}")]
    NonCanonical(String),

    /// The input could not be encoded at all
    #[error("Input could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl FingerprintError {
    pub fn non_canonical<S: Into<String>>(reason: S) -> Self {
        Self::NonCanonical(reason.into())
    }
}

impl serde::ser::Error for FingerprintError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::NonCanonical(msg.to_string())
    }
}

/// Deterministic digest of an `(operation identity, input)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint `input` within the namespace of `identity`
    pub fn compute<T>(identity: &str, input: &T) -> Result<Self, FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        canonical::check(input)?;
        let encoded = serde_json::to_vec(&serde_json::to_value(input)?)?;

        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        hasher.update([0u8]);
        hasher.update(&encoded);

        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
