//! JSON text in and out, through `serde_json`.
//!
//! `serde_json` is built with `preserve_order` and `arbitrary_precision`, so
//! key order and the exact number text survive a parse/print cycle.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use super::{Json, JsonNumber};
use crate::error::JsonError;

// ── serde ─────────────────────────────────────────────────────────────────

impl Serialize for Json {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Json::Null => serializer.serialize_unit(),
            Json::Boolean(b) => serializer.serialize_bool(*b),
            Json::Number(n) => serde_json::Number::from_str(n.as_str())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            Json::String(s) => serializer.serialize_str(s),
            Json::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Json::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Json {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Json::from_serde_value(value).map_err(D::Error::custom)
    }
}

impl Json {
    /// Converts a `serde_json` value.
    ///
    /// Fails on number text outside the JSON grammar, which only
    /// `serde_json::Number::from_string_unchecked` can produce. The error
    /// path locates the number.
    pub fn from_serde_value(value: Value) -> Result<Json, JsonError> {
        let json = match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Boolean(b),
            Value::Number(n) => Json::Number(JsonNumber::parse(&n.to_string())?),
            Value::String(s) => Json::String(s),
            Value::Array(items) => Json::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Json::from_serde_value(item).map_err(|e| e.at_index(i)))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Json::Object(
                map.into_iter()
                    .map(|(k, v)| match Json::from_serde_value(v) {
                        Ok(json) => Ok((k, json)),
                        Err(e) => Err(e.at_field(k)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(json)
    }
}

impl From<Value> for Json {
    /// Infallible for values parsed from text or built with `json!`. A
    /// number outside the JSON grammar (see [`Json::from_serde_value`]) becomes
    /// `Null`.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Boolean(b),
            Value::Number(n) => JsonNumber::parse(&n.to_string()).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s),
            Value::Array(items) => Json::Array(items.into_iter().map(Json::from).collect()),
            Value::Object(map) => {
                Json::Object(map.into_iter().map(|(k, v)| (k, Json::from(v))).collect())
            }
        }
    }
}

impl From<&Json> for Value {
    /// Duplicate keys collapse to their first occurrence.
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Boolean(b) => Value::Bool(*b),
            // `JsonNumber` text always satisfies the JSON number grammar.
            Json::Number(n) => {
                serde_json::Number::from_str(n.as_str()).map_or(Value::Null, Value::Number)
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    if !map.contains_key(k) {
                        map.insert(k.clone(), Value::from(v));
                    }
                }
                Value::Object(map)
            }
        }
    }
}

// ── Text ──────────────────────────────────────────────────────────────────

impl Json {
    /// Parse JSON text.
    ///
    /// Escapes of unpaired UTF-16 surrogates decode to U+FFFD. A key repeated
    /// in the text keeps its first position and its last value.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let v = Json::parse(r#"{"b": 1, "a": [true, null]}"#).unwrap();
    /// assert_eq!(v.to_string(), r#"{"b":1,"a":[true,null]}"#);
    /// assert!(Json::parse("{").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Json, JsonError> {
        let text = replace_lone_surrogates(text);
        let value: Value = serde_json::from_str(&text)?;
        Json::from_serde_value(value)
    }

    /// Parse UTF-8 bytes. Ill-formed sequences become U+FFFD.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Json, JsonError> {
        Json::parse(&String::from_utf8_lossy(bytes))
    }

    /// A string value from raw UTF-16 code units. Unpaired surrogates
    /// become U+FFFD, one per code unit.
    pub fn string_from_utf16(units: &[u16]) -> Json {
        Json::String(String::from_utf16_lossy(units))
    }

    /// Renders indented JSON text.
    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Compact JSON text as UTF-8 bytes.
    pub fn print_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

impl FromStr for Json {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Json::parse(s)
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Rewrites `\uXXXX` escapes of unpaired surrogates to `\uFFFD`.
fn replace_lone_surrogates(text: &str) -> Cow<'_, str> {
    if !text.contains("\\u") {
        return Cow::Borrowed(text);
    }
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) != Some(&b'u') {
            // Skip the escaped character so that `\\u` is not read as an escape.
            i += 2;
            continue;
        }
        let Some(unit) = hex_unit(bytes, i + 2) else {
            i += 2;
            continue;
        };
        match unit {
            0xD800..=0xDBFF => {
                let paired = bytes.get(i + 6) == Some(&b'\\')
                    && bytes.get(i + 7) == Some(&b'u')
                    && matches!(hex_unit(bytes, i + 8), Some(0xDC00..=0xDFFF));
                if paired {
                    i += 12;
                } else {
                    out.push_str(&text[copied..i]);
                    out.push_str("\\uFFFD");
                    i += 6;
                    copied = i;
                }
            }
            0xDC00..=0xDFFF => {
                out.push_str(&text[copied..i]);
                out.push_str("\\uFFFD");
                i += 6;
                copied = i;
            }
            _ => i += 6,
        }
    }
    if copied == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

fn hex_unit(bytes: &[u8], at: usize) -> Option<u16> {
    let digits = bytes.get(at..at + 4)?;
    let digits = std::str::from_utf8(digits).ok()?;
    u16::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn print_then_parse_is_identity() {
        let v = Json::from(json!({"z": [1, 2.50, "x"], "a": {"nested": null}, "t": true}));
        assert_eq!(Json::parse(&v.to_string()).unwrap(), v);
        assert_eq!(Json::parse(&v.to_string_pretty()).unwrap(), v);
    }

    #[test]
    fn key_order_and_number_text_survive() {
        let text = r#"{"z":1.50,"a":100000000000000000000000000000001}"#;
        assert_eq!(Json::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn lone_surrogates_become_replacement_chars() {
        let v = Json::parse(r#""a\ud800b\udc00c""#).unwrap();
        assert_eq!(v, Json::from("a\u{FFFD}b\u{FFFD}c"));
    }

    #[test]
    fn surrogate_pairs_are_kept() {
        let v = Json::parse(r#""\ud83d\ude00""#).unwrap();
        assert_eq!(v, Json::from("\u{1F600}"));
    }

    #[test]
    fn escaped_backslash_is_not_an_escape() {
        let v = Json::parse(r#""\\ud800""#).unwrap();
        assert_eq!(v, Json::from("\\ud800"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let v = Json::parse_bytes(b"\"a\xffb\"").unwrap();
        assert_eq!(v, Json::from("a\u{FFFD}b"));
    }

    #[test]
    fn utf16_units_with_lone_surrogate() {
        let v = Json::string_from_utf16(&[0x61, 0xD800, 0x62]);
        assert_eq!(v, Json::from("a\u{FFFD}b"));
    }

    #[test]
    fn duplicate_keys_print_and_collapse_to_first_in_values() {
        let v = Json::object([("a", Json::from(1)), ("a", Json::from(2))]);
        assert_eq!(v.to_string(), r#"{"a":1,"a":2}"#);
        assert_eq!(Value::from(&v), json!({"a": 1}));
    }

    #[test]
    fn ungrammatical_number_values_are_rejected() {
        let odd = serde_json::Number::from_string_unchecked("0x1F".to_string());
        let items = Value::Array(vec![json!(1), Value::Number(odd)]);
        let value = Value::Object(Map::from_iter([("a".to_string(), items)]));
        let err = Json::from_serde_value(value.clone()).unwrap_err();
        assert_eq!(err.path.to_string(), ".a[1]");
        assert!(err.message.contains("invalid number literal"), "{}", err.message);
        assert_eq!(Json::from(value), Json::from(json!({"a": [1, null]})));
        assert_eq!(Json::from_serde_value(json!([1.5, "x"])).unwrap(), Json::from(json!([1.5, "x"])));
    }

    #[test]
    fn parse_errors_mention_position() {
        let err = Json::parse("[1,").unwrap_err();
        assert!(err.message.contains("line 1"), "{}", err.message);
    }

    #[test]
    fn bytes_are_compact_utf8() {
        assert_eq!(Json::from(json!([1, "é"])).print_bytes(), "[1,\"é\"]".as_bytes());
    }
}
