//! DORG Cryptography
//!
//! Canonical hashing shared by every component that has to agree on a digest:
//! PLCR commitments and deterministic identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of the canonical commit encoding: 16 (power) + 1 (support) + 8 (salt).
pub const COMMIT_ENCODING_LEN: usize = 25;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid digest length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Hash data with SHA256
pub fn hash_sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive a stable identifier from a domain tag and an ordered list of parts.
///
/// Every part is length-prefixed (u64 big-endian) so that `["ab", "c"]` and
/// `["a", "bc"]` never collide.
pub fn derive_id(domain: &[u8], parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// A PLCR commitment: SHA256 over the canonical encoding of a vote.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Commitment for a `(power, in_support, salt)` vote tuple.
    pub fn of_vote(power: u128, in_support: bool, salt: u64) -> Self {
        Self(hash_sha256(&encode_vote(power, in_support, salt)))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Commitment {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let len = bytes.len();
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidLength(len))?;
        Ok(Self(array))
    }
}

impl TryFrom<String> for Commitment {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> String {
        c.to_hex()
    }
}

/// Canonical byte layout of a PLCR vote:
///  power (u128 LE) || in_support (0x00 / 0x01) || salt (u64 LE)
pub fn encode_vote(power: u128, in_support: bool, salt: u64) -> [u8; COMMIT_ENCODING_LEN] {
    let mut out = [0u8; COMMIT_ENCODING_LEN];
    out[..16].copy_from_slice(&power.to_le_bytes());
    out[16] = u8::from(in_support);
    out[17..].copy_from_slice(&salt.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_vote_layout() {
        let bytes = encode_vote(5, true, 42);
        assert_eq!(bytes.len(), COMMIT_ENCODING_LEN);
        assert_eq!(bytes[0], 5);
        assert!(bytes[1..16].iter().all(|b| *b == 0));
        assert_eq!(bytes[16], 1);
        assert_eq!(bytes[17], 42);
        assert!(bytes[18..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_commitment_depends_on_every_field() {
        let base = Commitment::of_vote(5, true, 42);
        assert_eq!(base, Commitment::of_vote(5, true, 42));
        assert_ne!(base, Commitment::of_vote(6, true, 42));
        assert_ne!(base, Commitment::of_vote(5, false, 42));
        assert_ne!(base, Commitment::of_vote(5, true, 43));
    }

    #[test]
    fn test_commitment_hex() {
        let c = Commitment::of_vote(5, true, 42);
        let hex_str = c.to_string();
        assert_eq!(hex_str.len(), 64);

        let parsed: Commitment = hex_str.parse().unwrap();
        assert_eq!(parsed, c);

        let prefixed: Commitment = format!("0x{}", hex_str).parse().unwrap();
        assert_eq!(prefixed, c);
    }

    #[test]
    fn test_commitment_rejects_bad_input() {
        assert!(matches!(
            "zz".parse::<Commitment>(),
            Err(CryptoError::InvalidHex(_))
        ));
        assert_eq!(
            "abcd".parse::<Commitment>(),
            Err(CryptoError::InvalidLength(2))
        );
    }

    #[test]
    fn test_commitment_serde_as_hex_string() {
        let c = Commitment::of_vote(1, false, 7);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{}\"", c.to_hex()));
        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_derive_id_is_length_prefixed() {
        let a = derive_id(b"test", &[b"ab", b"c"]);
        let b = derive_id(b"test", &[b"a", b"bc"]);
        assert_ne!(a, b);
        assert_eq!(a, derive_id(b"test", &[b"ab", b"c"]));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_sha256() {
        assert_eq!(
            hex::encode(hash_sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
