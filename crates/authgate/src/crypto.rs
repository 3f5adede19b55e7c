//! One-way digest encoding for client secrets.
//!
//! [`DigestPasswordEncoder`] hashes a secret with a configurable digest
//! algorithm (MD5, SHA-1 or SHA-2) and renders the digest as lowercase hex. It is what the registry
//! expects in `clientSecret`.

use std::fmt;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// All supported algorithms.
    pub const ALL: [DigestAlgorithm; 6] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Parses an algorithm name such as `MD5`, `SHA`, `SHA-1`, `sha256` or
    /// `Sha-512`. Plain `SHA` means SHA-1.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "MD5" => Some(Self::Md5),
            "SHA" | "SHA1" => Some(Self::Sha1),
            "SHA224" => Some(Self::Sha224),
            "SHA256" => Some(Self::Sha256),
            "SHA384" => Some(Self::Sha384),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Canonical algorithm name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Hashes `bytes` and returns the lowercase hex digest.
    #[must_use]
    pub fn hex_digest(&self, bytes: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(bytes)),
            Self::Sha1 => hex::encode(Sha1::digest(bytes)),
            Self::Sha224 => hex::encode(Sha224::digest(bytes)),
            Self::Sha256 => hex::encode(Sha256::digest(bytes)),
            Self::Sha384 => hex::encode(Sha384::digest(bytes)),
            Self::Sha512 => hex::encode(Sha512::digest(bytes)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `encoding` names a character encoding the encoder accepts.
///
/// Rust strings are UTF-8, so only UTF-8 (or no encoding at all) is accepted.
#[must_use]
pub fn is_supported_encoding(encoding: &str) -> bool {
    let encoding = encoding.trim();
    encoding.is_empty() || encoding.eq_ignore_ascii_case("UTF-8") || encoding.eq_ignore_ascii_case("UTF8")
}

/// Digest-based secret encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPasswordEncoder {
    algorithm: String,
    character_encoding: String,
}

impl DigestPasswordEncoder {
    /// Creates an encoder. Neither argument is validated until use.
    #[must_use]
    pub fn new(algorithm: impl Into<String>, character_encoding: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            character_encoding: character_encoding.into(),
        }
    }

    /// Configured algorithm name.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Configured character encoding.
    #[must_use]
    pub fn character_encoding(&self) -> &str {
        &self.character_encoding
    }

    /// Encodes a secret as a lowercase hex digest.
    ///
    /// Returns `None` if the algorithm is blank or unknown, or if the
    /// character encoding is not supported.
    #[must_use]
    pub fn encode(&self, password: &str) -> Option<String> {
        if self.algorithm.trim().is_empty() {
            tracing::warn!("No encoding algorithm is defined; secret cannot be encoded");
            return None;
        }

        let Some(algorithm) = DigestAlgorithm::parse(&self.algorithm) else {
            tracing::warn!(algorithm = %self.algorithm, "Unsupported digest algorithm");
            return None;
        };

        if !is_supported_encoding(&self.character_encoding) {
            tracing::warn!(
                character_encoding = %self.character_encoding,
                "Unsupported character encoding"
            );
            return None;
        }

        tracing::debug!(algorithm = %algorithm, "Encoding secret");
        Some(algorithm.hex_digest(password.as_bytes()))
    }

    /// Checks a raw secret against an encoded digest.
    ///
    /// The digest must equal `encoded` exactly, case included. A blank raw
    /// secret never matches.
    #[must_use]
    pub fn matches(&self, raw: &str, encoded: &str) -> bool {
        if raw.trim().is_empty() {
            return false;
        }

        let matched = self
            .encode(raw)
            .is_some_and(|digest| digest == encoded);
        tracing::debug!(matched, "Compared secret against encoded digest");
        matched
    }
}

impl Default for DigestPasswordEncoder {
    fn default() -> Self {
        Self::new(DigestAlgorithm::Sha256.as_str(), "UTF-8")
    }
}
