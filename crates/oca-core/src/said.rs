//! Self-addressing identifier (SAID) derivation.
//!
//! A SAID is computed over the canonical bytes of a record whose `digest`
//! field holds a placeholder of the same width as the final identifier:
//!
//! 1. digest = H(canonicalize(record))
//! 2. payload = 0x00 || digest (33 bytes)
//! 3. text = base64url(payload) without padding (44 characters)
//! 4. the leading `'A'` produced by the zero byte is replaced by the
//!    algorithm's derivation code (`E` for Blake3-256)
//!
//! Step 4 follows [`PrefixPolicy`]: `FixedWidth` replaces exactly one
//! character, `StripAllLeading` drops every leading `'A'` first.

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::canonical::{canonical_json_bytes, CanonicalJsonOptions};
use crate::config::{PrefixPolicy, SaidConfig};
use crate::errors::{OcaError, OcaResult};
use crate::hash::{digest_bytes, DigestAlgorithm, DIGEST_LEN};
use crate::model::fields;

const BASE64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Reserved lead byte prepended to the digest before encoding.
pub const LEAD_BYTE: u8 = 0;

/// Width of every fixed-width identifier and of the placeholder.
pub const SAID_LEN: usize = encoded_len(DIGEST_LEN + 1);

/// Character used to fill the placeholder.
pub const PLACEHOLDER_CHAR: char = '#';

const ZERO_SYMBOL: char = 'A';

const fn encoded_len(bytes: usize) -> usize {
    (bytes * 4 + 2) / 3
}

/// The placeholder written into `digest` before hashing.
pub fn placeholder() -> String {
    std::iter::repeat(PLACEHOLDER_CHAR).take(SAID_LEN).collect()
}

/// A validated identifier string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Said(String);

impl Said {
    /// Parse identifier text.
    ///
    /// Accepts anything a supported policy can produce: a known derivation code
    /// followed by at most `SAID_LEN - 1` base64url characters.
    pub fn parse(s: &str) -> OcaResult<Self> {
        let mut chars = s.chars();
        let code = chars
            .next()
            .ok_or_else(|| OcaError::invalid_argument("empty identifier"))?;
        DigestAlgorithm::from_code(code)?;

        if s.len() > SAID_LEN {
            return Err(OcaError::invalid_argument(format!(
                "identifier longer than {SAID_LEN} characters"
            )));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(OcaError::invalid_argument(
                "identifier contains characters outside the base64url alphabet",
            ));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Digest algorithm named by the derivation code.
    pub fn algorithm(&self) -> OcaResult<DigestAlgorithm> {
        let code = self
            .0
            .chars()
            .next()
            .ok_or_else(|| OcaError::invariant("empty identifier"))?;
        DigestAlgorithm::from_code(code)
    }

    /// True when the identifier has the placeholder's width.
    pub fn is_full_width(&self) -> bool {
        self.0.len() == SAID_LEN
    }
}

impl fmt::Display for Said {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Said {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Said> for Value {
    fn from(s: Said) -> Self {
        Value::String(s.0)
    }
}

impl Serialize for Said {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Said {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Said::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Encode a raw digest into identifier text.
pub fn encode_said(
    alg: DigestAlgorithm,
    digest: &[u8; DIGEST_LEN],
    policy: PrefixPolicy,
) -> Said {
    let mut payload = [0u8; DIGEST_LEN + 1];
    payload[0] = LEAD_BYTE;
    payload[1..].copy_from_slice(digest);
    let encoded = BASE64.encode(payload);

    // The zero lead byte always encodes to a single leading 'A'.
    let tail = match policy {
        PrefixPolicy::FixedWidth => &encoded[1..],
        PrefixPolicy::StripAllLeading => encoded.trim_start_matches(ZERO_SYMBOL),
    };

    let mut s = String::with_capacity(SAID_LEN);
    s.push(alg.code());
    s.push_str(tail);
    Said(s)
}

/// Derives identifiers for records.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaidEngine {
    config: SaidConfig,
    canonical: CanonicalJsonOptions,
}

impl SaidEngine {
    pub fn new(config: SaidConfig) -> Self {
        Self {
            config,
            canonical: CanonicalJsonOptions::default(),
        }
    }

    pub fn with_canonical_options(mut self, opts: CanonicalJsonOptions) -> Self {
        self.canonical = opts;
        self
    }

    pub fn config(&self) -> &SaidConfig {
        &self.config
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.config.algorithm
    }

    pub fn placeholder(&self) -> String {
        placeholder()
    }

    /// Hash the record exactly as given and encode the result.
    ///
    /// The caller is responsible for having placed the placeholder in the
    /// record's `digest` field; see [`SaidEngine::seal`].
    pub fn derive(&self, record: &Value) -> OcaResult<Said> {
        let bytes = canonical_json_bytes(record, &self.canonical)?;
        let digest = digest_bytes(self.config.algorithm, &bytes)?;
        let said = encode_said(self.config.algorithm, &digest, self.config.prefix_policy);

        if self.config.prefix_policy == PrefixPolicy::FixedWidth && !said.is_full_width() {
            return Err(OcaError::invariant(format!(
                "identifier width {} differs from placeholder width {SAID_LEN}",
                said.as_str().len()
            )));
        }
        Ok(said)
    }

    /// Set `digest` to the placeholder, derive, then overwrite it with the identifier.
    ///
    /// Exactly one placeholder pass and one real pass; the record is not
    /// re-canonicalized after the identifier is written.
    pub fn seal(&self, mut record: Value) -> OcaResult<(Value, Said)> {
        let obj = record
            .as_object_mut()
            .ok_or_else(|| OcaError::structural("only JSON objects can carry a digest"))?;
        obj.insert(fields::DIGEST.to_string(), Value::String(placeholder()));

        let said = self.derive(&record)?;

        if let Some(obj) = record.as_object_mut() {
            obj.insert(fields::DIGEST.to_string(), Value::String(said.as_str().to_string()));
        }
        Ok((record, said))
    }

    /// Recompute the identifier of a sealed record and compare it to its `digest` field.
    pub fn verify(&self, record: &Value) -> OcaResult<bool> {
        let stored = record
            .get(fields::DIGEST)
            .and_then(Value::as_str)
            .ok_or_else(|| OcaError::structural("record has no string digest field"))?
            .to_string();

        let (_, recomputed) = self.seal(record.clone())?;
        Ok(recomputed.as_str() == stored)
    }
}
