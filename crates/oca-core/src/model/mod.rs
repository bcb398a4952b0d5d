//! OCA record model.
//!
//! Records are plain JSON objects (`serde_json::Map` with insertion order
//! preserved). The bundle securer only cares about a handful of reserved
//! fields; everything else is application data and is hashed as-is.
//!
//! Recommended imports:
//! - `use oca_core::model::{fields, types, Record};`
//! - Or: `use oca_core::prelude::*;`

use serde_json::{Map, Value};

use crate::errors::{OcaError, OcaResult};

/// An ordered mapping from field name to JSON value.
pub type Record = Map<String, Value>;

/// Reserved field names.
pub mod fields {
    /// Identifier of the record itself.
    pub const DIGEST: &str = "digest";
    /// Back-reference from an overlay to its capture base.
    pub const CAPTURE_BASE: &str = "capture_base";
    /// Overlays attached to a capture base.
    pub const OVERLAYS: &str = "overlays";
    /// Type tag of a record.
    pub const TYPE: &str = "type";
}

/// Well-known type tags.
pub mod types {
    pub const CAPTURE_BASE: &str = "spec/capture_base/1.0";
    pub const CHARACTER_ENCODING: &str = "spec/overlays/character_encoding/1.0";
    pub const LABEL: &str = "spec/overlays/label/1.0";
    pub const INFORMATION: &str = "spec/overlays/information/1.0";
    pub const META: &str = "spec/overlays/meta/1.0";
    pub const BRANDING: &str = "aries/overlays/branding/1.0";
    pub const PATH: &str = "vc/overlays/path/1.0";
    pub const CLUSTER: &str = "vc/overlays/cluster/1.0";
}

/// Borrow a value as a record, naming `what` in the error.
pub fn as_record<'a>(value: &'a Value, what: &str) -> OcaResult<&'a Record> {
    value
        .as_object()
        .ok_or_else(|| OcaError::structural(format!("{what} must be a JSON object")))
}

/// Take ownership of a value as a record, naming `what` in the error.
pub fn into_record(value: Value, what: &str) -> OcaResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(OcaError::structural(format!("{what} must be a JSON object"))),
    }
}

/// The record's `type` tag, if it is a string.
pub fn type_tag(record: &Record) -> Option<&str> {
    record.get(fields::TYPE).and_then(Value::as_str)
}

/// The record's `digest` field, if it is a string.
pub fn digest_of(record: &Record) -> Option<&str> {
    record.get(fields::DIGEST).and_then(Value::as_str)
}

/// Require a string `type` tag.
pub fn require_type_tag<'a>(record: &'a Record, what: &str) -> OcaResult<&'a str> {
    type_tag(record).ok_or_else(|| OcaError::structural(format!("{what} is missing a string `type` field")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_and_digest_accessors() {
        let v = json!({"type": "spec/overlays/label/1.0", "digest": "Eabc"});
        let r = as_record(&v, "overlay").unwrap();
        assert_eq!(type_tag(r), Some(types::LABEL));
        assert_eq!(digest_of(r), Some("Eabc"));
    }

    #[test]
    fn missing_type_is_structural() {
        let r = into_record(json!({"type": 7}), "overlay").unwrap();
        let err = require_type_tag(&r, "overlay 0").unwrap_err();
        assert!(err.to_string().contains("overlay 0"));
    }

    #[test]
    fn non_object_rejected() {
        assert!(into_record(json!("x"), "capture base").is_err());
        assert!(as_record(&json!(null), "capture base").is_err());
    }
}
