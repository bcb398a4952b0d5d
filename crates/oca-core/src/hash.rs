//! Digest primitives behind SAID derivation.
//!
//! Each algorithm maps to a single-character derivation code from the CESR
//! text coding scheme. The code is what ends up as the first character of
//! every identifier produced with that algorithm.
//!
//! Supported algorithms (behind cargo features):
//! - blake3 (`E`, default)
//! - sha256 (`I`)

use std::fmt;

use crate::errors::{OcaError, OcaResult};

#[cfg(feature = "sha256")]
use sha2::{Digest, Sha256};

/// Size of every supported digest, in bytes.
pub const DIGEST_LEN: usize = 32;

/// Digest algorithm identifier.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    #[default]
    Blake3_256,
    Sha2_256,
}

impl DigestAlgorithm {
    pub fn parse(s: &str) -> OcaResult<Self> {
        match s {
            "blake3" | "blake3-256" => Ok(Self::Blake3_256),
            "sha256" | "sha2-256" => Ok(Self::Sha2_256),
            _ => Err(OcaError::invalid_argument(format!(
                "unsupported digest algorithm: {s}"
            ))),
        }
    }

    pub fn from_code(code: char) -> OcaResult<Self> {
        match code {
            'E' => Ok(Self::Blake3_256),
            'I' => Ok(Self::Sha2_256),
            _ => Err(OcaError::invalid_argument(format!(
                "unknown derivation code: {code}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blake3_256 => "blake3-256",
            Self::Sha2_256 => "sha2-256",
        }
    }

    /// CESR derivation code.
    pub fn code(&self) -> char {
        match self {
            Self::Blake3_256 => 'E',
            Self::Sha2_256 => 'I',
        }
    }

    /// Whether this build was compiled with support for the algorithm.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Blake3_256 => cfg!(feature = "blake3"),
            Self::Sha2_256 => cfg!(feature = "sha256"),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest raw bytes using the selected algorithm.
pub fn digest_bytes(alg: DigestAlgorithm, bytes: &[u8]) -> OcaResult<[u8; DIGEST_LEN]> {
    match alg {
        #[cfg(feature = "blake3")]
        DigestAlgorithm::Blake3_256 => Ok(*blake3::hash(bytes).as_bytes()),

        #[cfg(feature = "sha256")]
        DigestAlgorithm::Sha2_256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            let mut out = [0u8; DIGEST_LEN];
            out.copy_from_slice(&h.finalize());
            Ok(out)
        }

        #[allow(unreachable_patterns)]
        other => {
            let _ = bytes;
            Err(OcaError::invalid_argument(format!(
                "digest algorithm {other} is not enabled in this build"
            )))
        }
    }
}
