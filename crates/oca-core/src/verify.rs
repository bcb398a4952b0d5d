//! Verification of secured bundles.
//!
//! Replays securing on the verifier side and reports what does not match:
//! - each record's `digest` is recomputed with the placeholder substituted
//! - each overlay's `capture_base` must equal the capture base `digest`
//!
//! A report is returned even when verification fails so callers can show every
//! finding. Input that is not a bundle at all is an error instead.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::bundle::UnsecuredBundle;
use crate::config::LimitsConfig;
use crate::errors::OcaResult;
use crate::model::{self, fields, Record};
use crate::said::SaidEngine;

/// A structured verification finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyFinding {
    pub level: VerifyLevel,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyLevel {
    Info,
    Warning,
    Error,
}

/// Verification report.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub ok: bool,
    pub findings: Vec<VerifyFinding>,
    pub capture_base_digest: Option<String>,
}

impl VerifyReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| matches!(f.level, VerifyLevel::Error))
    }

    /// Findings with the given code.
    pub fn findings_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a VerifyFinding> + 'a {
        self.findings.iter().filter(move |f| f.code == code)
    }
}

fn push(
    findings: &mut Vec<VerifyFinding>,
    level: VerifyLevel,
    code: impl Into<String>,
    message: impl Into<String>,
) {
    findings.push(VerifyFinding {
        level,
        code: code.into(),
        message: message.into(),
    });
}

/// Verify a wire-form bundle.
pub fn verify_bundle(bundle: &Value, engine: &SaidEngine) -> OcaResult<VerifyReport> {
    let limits = LimitsConfig {
        max_overlays: usize::MAX,
        ..LimitsConfig::default()
    };
    let (capture_base, overlays) = UnsecuredBundle::from_value(bundle.clone(), &limits)?.into_parts();

    let mut findings = Vec::new();

    // 1) Capture base
    let cb_digest = model::digest_of(&capture_base).map(str::to_string);
    match &cb_digest {
        None => push(
            &mut findings,
            VerifyLevel::Error,
            "capture_base.digest.missing",
            "capture base has no string digest",
        ),
        Some(d) => {
            if check_record(&capture_base, engine)? {
                push(
                    &mut findings,
                    VerifyLevel::Info,
                    "capture_base.digest.ok",
                    format!("capture base digest matches: {d}"),
                );
            } else {
                push(
                    &mut findings,
                    VerifyLevel::Error,
                    "capture_base.digest.mismatch",
                    "recomputed capture base digest does not match stored digest",
                );
            }
        }
    }

    // 2) Overlays
    for (idx, overlay) in overlays.iter().enumerate() {
        let tag = model::type_tag(overlay).unwrap_or("");

        let back_ref = overlay.get(fields::CAPTURE_BASE).and_then(Value::as_str);
        if back_ref.is_none() || back_ref != cb_digest.as_deref() {
            push(
                &mut findings,
                VerifyLevel::Error,
                "overlay.capture_base.mismatch",
                format!("overlay {idx} ({tag}) is not chained to the capture base digest"),
            );
        }

        if model::digest_of(overlay).is_none() {
            push(
                &mut findings,
                VerifyLevel::Error,
                "overlay.digest.missing",
                format!("overlay {idx} ({tag}) has no string digest"),
            );
        } else if !check_record(overlay, engine)? {
            push(
                &mut findings,
                VerifyLevel::Error,
                "overlay.digest.mismatch",
                format!("recomputed digest of overlay {idx} ({tag}) does not match stored digest"),
            );
        }
    }

    if overlays.is_empty() {
        push(&mut findings, VerifyLevel::Warning, "overlays.empty", "bundle has no overlays");
    }

    let ok = !findings.iter().any(|f| matches!(f.level, VerifyLevel::Error));
    if !ok {
        warn!(
            errors = findings.iter().filter(|f| f.level == VerifyLevel::Error).count(),
            "bundle verification failed"
        );
    }

    Ok(VerifyReport {
        ok,
        findings,
        capture_base_digest: cb_digest,
    })
}

fn check_record(record: &Record, engine: &SaidEngine) -> OcaResult<bool> {
    engine.verify(&Value::Object(record.clone()))
}

#[cfg(test)]
#[cfg(feature = "blake3")]
mod tests {
    use super::*;
    use crate::secure::secure;
    use serde_json::json;

    fn secured() -> Value {
        secure(json!([{
            "type": "cb/1.0",
            "attributes": {"a": "Text"},
            "overlays": [{"type": "ov/label/1.0", "attribute_labels": {"a": "A"}}]
        }]))
        .unwrap()
    }

    #[test]
    fn verify_smoke() {
        let rep = verify_bundle(&secured(), &SaidEngine::default()).unwrap();
        assert!(rep.ok);
        assert!(!rep.has_errors());
        assert_eq!(rep.findings_with_code("capture_base.digest.ok").count(), 1);
    }

    #[test]
    fn detects_tampered_overlay() {
        let mut b = secured();
        b[0]["overlays"][0]["attribute_labels"]["a"] = json!("B");
        let rep = verify_bundle(&b, &SaidEngine::default()).unwrap();
        assert!(!rep.ok);
        assert_eq!(rep.findings_with_code("overlay.digest.mismatch").count(), 1);
        assert_eq!(rep.findings_with_code("overlay.capture_base.mismatch").count(), 0);
    }

    #[test]
    fn detects_broken_chain() {
        let mut b = secured();
        b[0]["attributes"]["b"] = json!("Text");
        let rep = verify_bundle(&b, &SaidEngine::default()).unwrap();
        assert_eq!(rep.findings_with_code("capture_base.digest.mismatch").count(), 1);

        let mut b = secured();
        b[0]["digest"] = json!("Eother");
        let rep = verify_bundle(&b, &SaidEngine::default()).unwrap();
        assert_eq!(rep.findings_with_code("overlay.capture_base.mismatch").count(), 1);
    }

    #[test]
    fn unsecured_bundle_reports_missing_digests() {
        let b = json!([{"type": "cb", "overlays": [{"type": "ov"}]}]);
        let rep = verify_bundle(&b, &SaidEngine::default()).unwrap();
        assert!(!rep.ok);
        assert_eq!(rep.findings_with_code("capture_base.digest.missing").count(), 1);
        assert_eq!(rep.findings_with_code("overlay.digest.missing").count(), 1);
        assert_eq!(rep.findings_with_code("overlay.capture_base.mismatch").count(), 1);
    }

    #[test]
    fn non_bundle_is_an_error() {
        assert!(verify_bundle(&json!({"x": 1}), &SaidEngine::default()).is_err());
    }
}
