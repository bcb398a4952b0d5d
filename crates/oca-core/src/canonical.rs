//! Canonical JSON encoding (RFC 8785 / JCS).
//!
//! Records keep their insertion order in memory (serde_json is built with
//! `preserve_order`), but the bytes fed to the digest never depend on it:
//! - object keys are sorted by their UTF-16 code units
//! - no insignificant whitespace
//! - strings use the minimal JSON escape set
//! - numbers use the ECMAScript `Number.prototype.toString` form
//!
//! Canonical bytes must never come from `serde_json::to_vec`; that output is
//! not a canonical form.

use std::io::Write;

use itertools::Itertools;
use serde_json::{Number, Value};

use crate::errors::{OcaError, OcaResult};

/// Canonicalization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalJsonOptions {
    /// Maximum container nesting depth. The root container is depth 1.
    pub max_depth: usize,
}

impl Default for CanonicalJsonOptions {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

/// Canonicalize with default options.
pub fn canonicalize(value: &Value) -> OcaResult<Vec<u8>> {
    canonical_json_bytes(value, &CanonicalJsonOptions::default())
}

/// Canonicalize a JSON value into its unique byte form.
pub fn canonical_json_bytes(value: &Value, opts: &CanonicalJsonOptions) -> OcaResult<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    write_value(&mut out, value, 0, opts)?;
    Ok(out)
}

/// Canonical form as a UTF-8 string. Handy for diagnostics and tests.
pub fn canonical_json_string(value: &Value, opts: &CanonicalJsonOptions) -> OcaResult<String> {
    let bytes = canonical_json_bytes(value, opts)?;
    String::from_utf8(bytes)
        .map_err(|e| OcaError::invariant(format!("canonical output is not UTF-8: {e}")))
}

fn write_value(
    out: &mut Vec<u8>,
    value: &Value,
    depth: usize,
    opts: &CanonicalJsonOptions,
) -> OcaResult<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s)?,
        Value::Array(items) => {
            enter(depth, opts)?;
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item, depth + 1, opts)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            enter(depth, opts)?;
            out.push(b'{');
            let entries = map
                .iter()
                .sorted_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
            for (i, (k, v)) in entries.enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, k)?;
                out.push(b':');
                write_value(out, v, depth + 1, opts)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn enter(depth: usize, opts: &CanonicalJsonOptions) -> OcaResult<()> {
    if depth >= opts.max_depth {
        return Err(OcaError::canonicalization(format!(
            "nesting exceeds maximum depth of {}",
            opts.max_depth
        )));
    }
    Ok(())
}

// serde_json's escaping is the JCS escape set: short forms for \b \t \n \f \r,
// lowercase \u00xx for other control characters, everything else literal.
fn write_string(out: &mut Vec<u8>, s: &str) -> OcaResult<()> {
    serde_json::to_writer(&mut *out, s)
        .map_err(|e| OcaError::canonicalization(format!("failed to encode string: {e}")))
}

fn write_number(out: &mut Vec<u8>, n: &Number) -> OcaResult<()> {
    let text = if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        let f = n
            .as_f64()
            .ok_or_else(|| OcaError::canonicalization(format!("unsupported number: {n}")))?;
        format_ecmascript(f)?
    };
    out.write_all(text.as_bytes())
        .map_err(|e| OcaError::canonicalization(format!("failed to write number: {e}")))
}

/// Render a double the way ECMAScript `Number.prototype.toString` does.
///
/// Halfway cases between two shortest digit strings resolve to the even one,
/// as the standard requires.
pub fn format_ecmascript(f: f64) -> OcaResult<String> {
    if !f.is_finite() {
        return Err(OcaError::canonicalization(format!(
            "non-finite number cannot be canonicalized: {f}"
        )));
    }
    if f == 0.0 {
        return Ok("0".to_string());
    }
    let mut buf = ryu_js::Buffer::new();
    Ok(buf.format_finite(f).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn canon(v: &Value) -> String {
        canonical_json_string(v, &CanonicalJsonOptions::default()).unwrap()
    }

    #[test]
    fn keys_sorted_no_whitespace() {
        let v = json!({"b": 1, "a": [true, null, "x"], "c": {"z": 1, "y": 2}});
        assert_eq!(canon(&v), r#"{"a":[true,null,"x"],"b":1,"c":{"y":2,"z":1}}"#);
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":{"q":2,"p":3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{ "y": {"p":3, "q":2}, "x": 1 }"#).unwrap();
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }

    #[test]
    fn keys_sort_by_utf16_code_units() {
        // Key set from RFC 8785 section 3.2.3.
        let v = json!({
            "\u{20ac}": "Euro Sign",
            "\r": "Carriage Return",
            "\u{fb33}": "Hebrew Letter Dalet With Dagesh",
            "1": "One",
            "\u{1f600}": "Emoji: Grinning Face",
            "\u{0080}": "Control",
            "\u{00f6}": "Latin Small Letter O With Diaeresis"
        });
        let expected_order = ["\r", "1", "\u{0080}", "\u{00f6}", "\u{20ac}", "\u{1f600}", "\u{fb33}"];
        let s = canon(&v);
        let positions: Vec<usize> = expected_order
            .iter()
            .map(|k| s.find(&serde_json::to_string(k).unwrap()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{s}");
    }

    #[test]
    fn string_escapes() {
        let v = json!("a\"b\\c\n\u{1f}/\u{e9}");
        assert_eq!(canon(&v), "\"a\\\"b\\\\c\\n\\u001f/\u{e9}\"");
    }

    #[test]
    fn ecmascript_numbers() {
        let cases: &[(f64, &str)] = &[
            (4.5, "4.5"),
            (2e-3, "0.002"),
            (1e-6, "0.000001"),
            (1e-7, "1e-7"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (1e30, "1e+30"),
            (-1.5e-9, "-1.5e-9"),
            (333333333.33333329, "333333333.3333333"),
            (1.0, "1"),
            (-0.0, "0"),
            (123.456, "123.456"),
            (5e-324, "5e-324"),
            (1.7976931348623157e308, "1.7976931348623157e+308"),
        ];
        for (f, want) in cases {
            assert_eq!(format_ecmascript(*f).unwrap(), *want, "formatting {f}");
        }
    }

    #[test]
    fn halfway_digits_round_to_even() {
        // Exact value is -569522441543822.25.
        let f = -569522441543822.25_f64;
        assert_eq!(format_ecmascript(f).unwrap(), "-569522441543822.2");
        assert_eq!(
            canon(&json!([f, {"k": f}])),
            "[-569522441543822.2,{\"k\":-569522441543822.2}]"
        );
    }

    proptest! {
        #[test]
        fn floats_match_serde_jcs(bits in any::<u64>()) {
            let f = f64::from_bits(bits);
            prop_assume!(f.is_finite() && f != 0.0);
            let v = json!([f, {"k": f, "a": [f]}]);
            let theirs = serde_jcs::to_string(&v).unwrap();
            prop_assert_eq!(canon(&v), theirs);
        }
    }

    #[test]
    fn integers_are_verbatim() {
        assert_eq!(canon(&json!(-42)), "-42");
        assert_eq!(canon(&json!(u64::MAX)), u64::MAX.to_string());
        assert_eq!(canon(&json!(2.0)), "2");
    }

    #[test]
    fn non_finite_rejected() {
        assert!(format_ecmascript(f64::NAN).is_err());
        assert!(format_ecmascript(f64::INFINITY).is_err());
    }

    #[test]
    fn depth_limit_enforced() {
        let v = json!([[[["deep"]]]]);
        let opts = CanonicalJsonOptions { max_depth: 3 };
        let err = canonical_json_bytes(&v, &opts).unwrap_err();
        assert!(matches!(err, OcaError::Canonicalization(_)));

        let opts = CanonicalJsonOptions { max_depth: 4 };
        assert!(canonical_json_bytes(&v, &opts).is_ok());
    }
}
