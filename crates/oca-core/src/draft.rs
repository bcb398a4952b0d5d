//! Drafting unsecured bundles from a small attribute schema.
//!
//! The draft is a starting point for authors: every attribute is typed `Text`
//! and gets default labels, information text, and `utf-8` encoding. The result
//! is an [`UnsecuredBundle`] ready for [`crate::secure::BundleSecurer`].

use serde::Deserialize;
use serde_json::{json, Value};

use crate::bundle::UnsecuredBundle;
use crate::errors::{OcaError, OcaResult};
use crate::model::{into_record, types, Record};

/// Default attribute type in drafted capture bases.
pub const DEFAULT_ATTRIBUTE_TYPE: &str = "Text";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_INFORMATION: &str = "Lorem ipsum";
pub const DEFAULT_HELP_TEXT: &str = "Learn more";

/// Input to [`draft_bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Issuer shown in the meta overlay; defaults to `name`.
    #[serde(default)]
    pub issuer: Option<String>,
    pub attributes: Vec<String>,
}

impl DraftSchema {
    pub fn from_value(value: Value) -> OcaResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| OcaError::serialization(format!("invalid draft schema: {e}")))
    }
}

/// Build an unsecured bundle: a capture base plus encoding, label,
/// information, meta and branding overlays, in that order.
pub fn draft_bundle(schema: &DraftSchema) -> OcaResult<UnsecuredBundle> {
    let attrs = &schema.attributes;

    let capture_base = record(json!({
        "type": types::CAPTURE_BASE,
        "attributes": per_attribute(attrs, |_| DEFAULT_ATTRIBUTE_TYPE.to_string()),
        "flagged_attributes": [],
    }))?;

    let encoding = record(json!({
        "type": types::CHARACTER_ENCODING,
        "default_character_encoding": DEFAULT_ENCODING,
        "attribute_character_encoding": per_attribute(attrs, |_| DEFAULT_ENCODING.to_string()),
    }))?;

    let labels = record(json!({
        "type": types::LABEL,
        "lang": DEFAULT_LANG,
        "attribute_labels": per_attribute(attrs, default_label),
    }))?;

    let information = record(json!({
        "type": types::INFORMATION,
        "lang": DEFAULT_LANG,
        "attribute_information": per_attribute(attrs, |_| DEFAULT_INFORMATION.to_string()),
    }))?;

    let meta = record(json!({
        "type": types::META,
        "language": DEFAULT_LANG,
        "issuer": schema.issuer.as_deref().unwrap_or(&schema.name),
        "name": schema.name,
        "description": schema.description,
        "credential_help_text": DEFAULT_HELP_TEXT,
        "credential_support_url": "",
    }))?;

    let branding = record(json!({
        "type": types::BRANDING,
        "logo": "",
        "background_image": "",
        "background_image_slice": "",
        "primary_background_color": "",
        "secondary_background_color": "",
        "primary_attribute": "",
        "secondary_attribute": "",
        "expiry_date_attribute": "",
    }))?;

    UnsecuredBundle::new(
        capture_base,
        vec![encoding, labels, information, meta, branding],
    )
}

/// `first_name` -> `First name`.
pub fn default_label(attribute: &str) -> String {
    let spaced = attribute.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn per_attribute(attrs: &[String], f: impl Fn(&str) -> String) -> Value {
    Value::Object(
        attrs
            .iter()
            .map(|a| (a.clone(), Value::String(f(a))))
            .collect(),
    )
}

fn record(v: Value) -> OcaResult<Record> {
    into_record(v, "drafted record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields;

    fn schema() -> DraftSchema {
        DraftSchema::from_value(json!({
            "name": "Sample",
            "description": "A sample bundle",
            "issuer": "Demo issuer",
            "attributes": ["first_name", "last_name"]
        }))
        .unwrap()
    }

    #[test]
    fn labels() {
        assert_eq!(default_label("first_name"), "First name");
        assert_eq!(default_label("entityID"), "Entityid");
        assert_eq!(default_label(""), "");
    }

    #[test]
    fn drafting() {
        let b = draft_bundle(&schema()).unwrap();
        assert_eq!(b.capture_base()[fields::TYPE], types::CAPTURE_BASE);
        assert_eq!(b.capture_base()["attributes"]["last_name"], "Text");

        let order: Vec<&str> = b
            .overlays()
            .iter()
            .map(|o| o[fields::TYPE].as_str().unwrap())
            .collect();
        assert_eq!(
            order,
            [types::CHARACTER_ENCODING, types::LABEL, types::INFORMATION, types::META, types::BRANDING]
        );
        assert_eq!(b.overlays()[1]["attribute_labels"]["first_name"], "First name");
        assert_eq!(b.overlays()[3]["issuer"], "Demo issuer");
    }

    #[test]
    fn issuer_defaults_to_name() {
        let mut s = schema();
        s.issuer = None;
        let b = draft_bundle(&s).unwrap();
        assert_eq!(b.overlays()[3]["issuer"], "Sample");
    }

    #[test]
    fn no_attributes_gives_empty_maps() {
        let mut s = schema();
        s.attributes.clear();
        let b = draft_bundle(&s).unwrap();
        assert_eq!(b.capture_base()["attributes"], json!({}));
        assert_eq!(b.overlays()[1]["attribute_labels"], json!({}));
        assert_eq!(b.overlays().len(), 5);
    }

    #[test]
    fn schema_needs_name_and_attributes() {
        assert!(DraftSchema::from_value(json!({"name": "x"})).is_err());
        assert!(DraftSchema::from_value(json!({"attributes": []})).is_err());
    }
}
