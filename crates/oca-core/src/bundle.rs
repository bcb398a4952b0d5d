//! Bundle shapes.
//!
//! A bundle travels as a one-element JSON array whose element is a capture
//! base carrying its overlays under `overlays`. In memory the overlays are held
//! apart from the capture base, because the capture base digest is computed
//! without them.
//!
//! Stage types:
//! - [`UnsecuredBundle`]: structurally validated, digests untrusted
//! - [`SecuredBundle`]: capture base digest derived, overlays chained and sealed

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::errors::{OcaError, OcaResult};
use crate::model::{self, fields, Record};
use crate::said::Said;

/// A capture base and its overlays, before securing.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsecuredBundle {
    capture_base: Record,
    overlays: Vec<Record>,
}

impl UnsecuredBundle {
    /// Assemble a bundle from a capture base (without `overlays`) and its overlays.
    pub fn new(capture_base: Record, overlays: Vec<Record>) -> OcaResult<Self> {
        if capture_base.contains_key(fields::OVERLAYS) {
            return Err(OcaError::structural(
                "capture base passed separately must not carry `overlays`",
            ));
        }
        for (idx, overlay) in overlays.iter().enumerate() {
            model::require_type_tag(overlay, &format!("overlay {idx}"))?;
        }
        Ok(Self {
            capture_base,
            overlays,
        })
    }

    /// Parse the wire form: `[ { ..., "overlays": [ {...}, ... ] } ]`.
    pub fn from_value(value: Value, limits: &LimitsConfig) -> OcaResult<Self> {
        let mut capture_base = single_capture_base(value)?;

        let overlays = capture_base
            .shift_remove(fields::OVERLAYS)
            .ok_or_else(|| OcaError::structural("capture base is missing `overlays`"))?;
        let overlays = match overlays {
            Value::Array(items) => items,
            _ => return Err(OcaError::structural("`overlays` must be an array")),
        };

        if overlays.len() > limits.max_overlays {
            return Err(OcaError::structural(format!(
                "bundle has {} overlays (limit {})",
                overlays.len(),
                limits.max_overlays
            )));
        }

        let overlays = overlays
            .into_iter()
            .enumerate()
            .map(|(idx, o)| model::into_record(o, &format!("overlay {idx}")))
            .collect::<OcaResult<Vec<_>>>()?;

        Self::new(capture_base, overlays)
    }

    pub fn capture_base(&self) -> &Record {
        &self.capture_base
    }

    pub fn overlays(&self) -> &[Record] {
        &self.overlays
    }

    pub fn into_parts(self) -> (Record, Vec<Record>) {
        (self.capture_base, self.overlays)
    }

    /// Drop `digest` from every record and `capture_base` from every overlay.
    ///
    /// Re-securing the result reproduces the original secured bundle.
    pub fn strip_seals(mut self) -> Self {
        self.capture_base.shift_remove(fields::DIGEST);
        for overlay in &mut self.overlays {
            overlay.shift_remove(fields::DIGEST);
            overlay.shift_remove(fields::CAPTURE_BASE);
        }
        self
    }

    pub fn to_value(&self) -> Value {
        wire_form(&self.capture_base, &self.overlays)
    }
}

/// A capture base with its derived identifier and sealed overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct SecuredBundle {
    capture_base: Record,
    digest: Said,
    overlays: Vec<Record>,
}

impl SecuredBundle {
    pub(crate) fn from_sealed(capture_base: Record, digest: Said, overlays: Vec<Record>) -> Self {
        Self {
            capture_base,
            digest,
            overlays,
        }
    }

    /// Load an already-secured bundle from its wire form.
    ///
    /// Only structure is checked here; use [`crate::verify::verify_bundle`] to
    /// check the digests.
    pub fn from_value(value: Value, limits: &LimitsConfig) -> OcaResult<Self> {
        let (capture_base, overlays) = UnsecuredBundle::from_value(value, limits)?.into_parts();
        let digest = model::digest_of(&capture_base)
            .ok_or_else(|| OcaError::structural("capture base has no string `digest`"))?;
        let digest = Said::parse(digest)?;
        Ok(Self {
            capture_base,
            digest,
            overlays,
        })
    }

    /// The capture base, without `overlays`.
    pub fn capture_base(&self) -> &Record {
        &self.capture_base
    }

    pub fn overlays(&self) -> &[Record] {
        &self.overlays
    }

    /// The capture base identifier every overlay is chained to.
    pub fn digest(&self) -> &Said {
        &self.digest
    }

    /// First overlay whose `type` equals `type_tag`.
    pub fn find_overlay(&self, type_tag: &str) -> Option<&Record> {
        self.overlays
            .iter()
            .find(|o| model::type_tag(o) == Some(type_tag))
    }

    pub fn to_value(&self) -> Value {
        wire_form(&self.capture_base, &self.overlays)
    }

    pub fn into_value(self) -> Value {
        let mut capture_base = self.capture_base;
        capture_base.insert(
            fields::OVERLAYS.to_string(),
            Value::Array(self.overlays.into_iter().map(Value::Object).collect()),
        );
        Value::Array(vec![Value::Object(capture_base)])
    }

    /// Revert to an unsecured bundle with every seal removed.
    pub fn into_unsecured(self) -> UnsecuredBundle {
        UnsecuredBundle {
            capture_base: self.capture_base,
            overlays: self.overlays,
        }
        .strip_seals()
    }
}

impl Serialize for SecuredBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl Serialize for UnsecuredBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// First overlay in a raw JSON bundle whose `type` equals `type_tag`.
///
/// Accepts either the one-element array form or a bare capture base object.
/// Anything that does not look like a bundle simply has no overlays.
pub fn find_overlay<'a>(bundle: &'a Value, type_tag: &str) -> Option<&'a Value> {
    let capture_base = match bundle {
        Value::Array(items) => items.first()?,
        other => other,
    };
    capture_base
        .get(fields::OVERLAYS)?
        .as_array()?
        .iter()
        .find(|o| o.get(fields::TYPE).and_then(Value::as_str) == Some(type_tag))
}

fn single_capture_base(value: Value) -> OcaResult<Record> {
    let mut items = match value {
        Value::Array(items) => items,
        _ => return Err(OcaError::structural("bundle must be a JSON array")),
    };
    if items.len() != 1 {
        return Err(OcaError::structural(format!(
            "bundle must contain exactly one capture base, found {}",
            items.len()
        )));
    }
    model::into_record(items.remove(0), "capture base")
}

fn wire_form(capture_base: &Record, overlays: &[Record]) -> Value {
    let mut cb = capture_base.clone();
    cb.insert(
        fields::OVERLAYS.to_string(),
        Value::Array(overlays.iter().cloned().map(Value::Object).collect()),
    );
    Value::Array(vec![Value::Object(cb)])
}
