//! Configuration structures for oca-core.
//!
//! These are explicit, caller-built objects. The core crate itself does not
//! read environment variables or files; the CLI maps its flags onto them.

use crate::errors::{OcaError, OcaResult};
use crate::hash::DigestAlgorithm;

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub said: SaidConfig,
    pub limits: LimitsConfig,
}

/// Identifier derivation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaidConfig {
    pub algorithm: DigestAlgorithm,
    pub prefix_policy: PrefixPolicy,
}

/// How the derivation code replaces the lead characters of the encoded digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrefixPolicy {
    /// Replace exactly the single character contributed by the zero lead byte.
    /// Every identifier has the same width as the placeholder.
    #[default]
    FixedWidth,
    /// Strip every leading `'A'` before prepending the code. Identifiers whose
    /// digest starts with zero bits come out shorter than the placeholder.
    StripAllLeading,
}

impl PrefixPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedWidth => "fixed-width",
            Self::StripAllLeading => "strip-all-leading",
        }
    }
}

/// Resource limits applied while securing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Maximum nesting depth accepted by the canonicalizer.
    pub max_depth: usize,
    /// Maximum number of overlays per bundle.
    pub max_overlays: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_overlays: 1_024,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> OcaResult<()> {
    if cfg.limits.max_depth == 0 {
        return Err(OcaError::invalid_argument(
            "max_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_overlays == 0 {
        return Err(OcaError::invalid_argument(
            "max_overlays must be greater than zero",
        ));
    }

    if !cfg.said.algorithm.is_enabled() {
        return Err(OcaError::invalid_argument(format!(
            "digest algorithm {} is not enabled in this build",
            cfg.said.algorithm
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "blake3")]
    fn default_config_is_valid() {
        let cfg = CoreConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.said.prefix_policy, PrefixPolicy::FixedWidth);
    }

    #[test]
    fn zero_limits_detected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_depth = 0;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = CoreConfig::default();
        cfg.limits.max_overlays = 0;
        assert!(validate_config(&cfg).is_err());
    }
}
