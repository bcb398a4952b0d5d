//! Bundle securing.
//!
//! Securing runs in a fixed order:
//! 1. the capture base (without `overlays`) is sealed; its identifier is foundational
//! 2. each overlay gets `capture_base` set to that identifier, then is sealed
//! 3. the sealed overlays are reattached in their original order
//!
//! Overlay seals depend only on the finalized capture base, never on sibling
//! overlays, so with the `parallel` feature they are computed concurrently.
//! Output order is the input order either way.

use serde_json::Value;
use tracing::{debug, info};

use crate::bundle::{SecuredBundle, UnsecuredBundle};
use crate::canonical::CanonicalJsonOptions;
use crate::config::{validate_config, CoreConfig};
use crate::errors::{OcaError, OcaResult};
use crate::model::{self, fields, Record};
use crate::said::{Said, SaidEngine};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Secures bundles with a fixed configuration.
#[derive(Debug, Clone)]
pub struct BundleSecurer {
    config: CoreConfig,
    engine: SaidEngine,
}

impl BundleSecurer {
    pub fn new(config: CoreConfig) -> OcaResult<Self> {
        validate_config(&config)?;
        let engine = SaidEngine::new(config.said).with_canonical_options(CanonicalJsonOptions {
            max_depth: config.limits.max_depth,
        });
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &SaidEngine {
        &self.engine
    }

    /// Secure a bundle. All-or-nothing: on error nothing is returned.
    pub fn secure(&self, bundle: UnsecuredBundle) -> OcaResult<SecuredBundle> {
        let (capture_base, overlays) = bundle.into_parts();

        let (capture_base, digest) = self.seal_record(capture_base)?;
        debug!(
            record_type = model::type_tag(&capture_base).unwrap_or(""),
            digest = %digest,
            "sealed capture base"
        );

        let overlays = self.seal_overlays(overlays, &digest)?;

        info!(
            digest = %digest,
            overlays = overlays.len(),
            "secured bundle"
        );
        Ok(SecuredBundle::from_sealed(capture_base, digest, overlays))
    }

    /// Parse, secure and re-emit a bundle in its wire form.
    pub fn secure_value(&self, bundle: Value) -> OcaResult<Value> {
        let unsecured = UnsecuredBundle::from_value(bundle, &self.config.limits)?;
        Ok(self.secure(unsecured)?.into_value())
    }

    #[cfg(not(feature = "parallel"))]
    fn seal_overlays(&self, overlays: Vec<Record>, capture_base: &Said) -> OcaResult<Vec<Record>> {
        overlays
            .into_iter()
            .enumerate()
            .map(|(idx, o)| self.seal_overlay(idx, o, capture_base))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn seal_overlays(&self, overlays: Vec<Record>, capture_base: &Said) -> OcaResult<Vec<Record>> {
        overlays
            .into_par_iter()
            .enumerate()
            .map(|(idx, o)| self.seal_overlay(idx, o, capture_base))
            .collect()
    }

    fn seal_overlay(&self, idx: usize, mut overlay: Record, capture_base: &Said) -> OcaResult<Record> {
        overlay.insert(
            fields::CAPTURE_BASE.to_string(),
            Value::String(capture_base.as_str().to_string()),
        );
        let (overlay, digest) = self.seal_record(overlay)?;
        debug!(
            index = idx,
            record_type = model::type_tag(&overlay).unwrap_or(""),
            digest = %digest,
            "sealed overlay"
        );
        Ok(overlay)
    }

    fn seal_record(&self, record: Record) -> OcaResult<(Record, Said)> {
        let (sealed, said) = self.engine.seal(Value::Object(record))?;
        match sealed {
            Value::Object(map) => Ok((map, said)),
            _ => Err(OcaError::invariant("sealed record is no longer an object")),
        }
    }
}

/// Secure a wire-form bundle with the default configuration.
pub fn secure(bundle: Value) -> OcaResult<Value> {
    BundleSecurer::new(CoreConfig::default())?.secure_value(bundle)
}

#[cfg(test)]
#[cfg(feature = "blake3")]
mod tests {
    use super::*;
    use crate::said::SAID_LEN;
    use serde_json::json;

    fn sample() -> Value {
        json!([{
            "type": "cb/1.0",
            "attributes": {"first_name": "Text"},
            "overlays": [
                {"type": "ov/label/1.0", "attribute_labels": {"first_name": "First Name"}}
            ]
        }])
    }

    #[test]
    fn secures_concrete_scenario() {
        let out = secure(sample()).unwrap();
        let cb = &out[0];
        let digest = cb["digest"].as_str().unwrap();
        assert_eq!(digest.len(), SAID_LEN);
        assert!(digest.starts_with('E'));

        let ov = &cb["overlays"][0];
        assert_eq!(ov["capture_base"], digest);
        let ov_digest = ov["digest"].as_str().unwrap();
        assert_eq!(ov_digest.len(), SAID_LEN);
        assert_ne!(ov_digest, digest);
    }

    #[test]
    fn capture_base_digest_ignores_overlays() {
        let a = secure(sample()).unwrap();
        let mut other = sample();
        other[0]["overlays"] = json!([{"type": "ov/other"}]);
        let b = secure(other).unwrap();
        assert_eq!(a[0]["digest"], b[0]["digest"]);
        assert_ne!(a[0]["overlays"][0]["digest"], b[0]["overlays"][0]["digest"]);
    }

    #[test]
    fn structural_failure_returns_nothing() {
        let bad = json!([{"type": "cb", "overlays": [{"type": "a"}, {"nope": 1}]}]);
        assert!(matches!(secure(bad), Err(OcaError::Structural(_))));
    }

    #[test]
    fn depth_limit_aborts_securing() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_depth = 2;
        let securer = BundleSecurer::new(cfg).unwrap();
        let v = json!([{"overlays": [{"type": "a", "deep": {"x": {"y": 1}}}]}]);
        assert!(matches!(securer.secure_value(v), Err(OcaError::Canonicalization(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_overlays = 0;
        assert!(BundleSecurer::new(cfg).is_err());
    }
}
