//! Encoding native values to `Json` and decoding them back.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{Json, JsonNumber, JsonType};
use crate::error::JsonError;

/// A type with a canonical `Json` encoding.
pub trait ToJson {
    fn to_json(&self) -> Json;
}

/// A type decodable from `Json`.
pub trait FromJson: Sized {
    fn from_json(json: &Json) -> Result<Self, JsonError>;
}

fn mismatch(expected: &str, found: &Json) -> JsonError {
    JsonError::new(format!("expected {expected}, found {}", found.json_type()))
}

impl Json {
    pub fn from_value<T: ToJson + ?Sized>(value: &T) -> Json {
        value.to_json()
    }

    /// Decode this value as a `T`.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let v = Json::parse("[1, 2, 3]").unwrap();
    /// assert_eq!(v.decode::<Vec<i64>>().unwrap(), vec![1, 2, 3]);
    /// assert!(Json::parse("1.5").unwrap().decode::<i32>().is_err());
    /// ```
    pub fn decode<T: FromJson>(&self) -> Result<T, JsonError> {
        T::from_json(self)
    }
}

// ── Json itself ───────────────────────────────────────────────────────────

impl ToJson for Json {
    fn to_json(&self) -> Json {
        self.clone()
    }
}

impl FromJson for Json {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        Ok(json.clone())
    }
}

// ── Primitives ────────────────────────────────────────────────────────────

impl ToJson for bool {
    fn to_json(&self) -> Json {
        Json::Boolean(*self)
    }
}

impl FromJson for bool {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        json.as_bool().ok_or_else(|| mismatch("boolean", json))
    }
}

impl ToJson for str {
    fn to_json(&self) -> Json {
        Json::String(self.to_string())
    }
}

impl ToJson for String {
    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }
}

impl FromJson for String {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        json.as_str().map(str::to_string).ok_or_else(|| mismatch("string", json))
    }
}

impl ToJson for JsonNumber {
    fn to_json(&self) -> Json {
        Json::Number(self.clone())
    }
}

impl FromJson for JsonNumber {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        json.as_number().cloned().ok_or_else(|| mismatch("number", json))
    }
}

impl ToJson for Decimal {
    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl FromJson for Decimal {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        let n = json.as_number().ok_or_else(|| mismatch("number", json))?;
        n.as_decimal()
            .ok_or_else(|| JsonError::new(format!("{n} exceeds decimal precision")))
    }
}

impl ToJson for f64 {
    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl FromJson for f64 {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        json.as_number().map(JsonNumber::as_f64).ok_or_else(|| mismatch("number", json))
    }
}

macro_rules! integer_codec {
    ($($t:ty => $narrow:ident),*) => {
        $(
            impl ToJson for $t {
                fn to_json(&self) -> Json {
                    Json::from(*self)
                }
            }

            impl FromJson for $t {
                fn from_json(json: &Json) -> Result<Self, JsonError> {
                    let n = json.as_number().ok_or_else(|| mismatch("number", json))?;
                    n.$narrow()
                        .and_then(|wide| <$t>::try_from(wide).ok())
                        .ok_or_else(|| {
                            JsonError::new(format!("{n} does not fit {}", stringify!($t)))
                        })
                }
            }
        )*
    };
}

integer_codec!(
    i8 => as_i64, i16 => as_i64, i32 => as_i64, i64 => as_i64,
    u8 => as_u64, u16 => as_u64, u32 => as_u64, u64 => as_u64, usize => as_u64
);

// ── Containers ────────────────────────────────────────────────────────────

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Json {
        self.as_ref().map_or(Json::Null, ToJson::to_json)
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        match json {
            Json::Null => Ok(None),
            other => T::from_json(other).map(Some),
        }
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        let items = json.as_array().ok_or_else(|| mismatch(JsonType::Array.as_str(), json))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_json(item).map_err(|e| e.at_index(i)))
            .collect()
    }
}

impl<T: ToJson> ToJson for BTreeMap<String, T> {
    fn to_json(&self) -> Json {
        Json::Object(self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

impl<T: FromJson> FromJson for BTreeMap<String, T> {
    /// Duplicate keys decode to their first occurrence.
    fn from_json(json: &Json) -> Result<Self, JsonError> {
        let entries = json.as_object().ok_or_else(|| mismatch(JsonType::Object.as_str(), json))?;
        let mut out = BTreeMap::new();
        for (k, v) in entries {
            if out.contains_key(k) {
                continue;
            }
            let decoded = T::from_json(v).map_err(|e| e.at_field(k.clone()))?;
            out.insert(k.clone(), decoded);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_tree_path::Path;
    use serde_json::json;

    #[test]
    fn integers_decode_losslessly_or_fail() {
        let v = Json::from(json!(300));
        assert_eq!(v.decode::<i32>().unwrap(), 300);
        assert!(v.decode::<u8>().is_err());
        assert!(Json::from(json!(-1)).decode::<u64>().is_err());
        assert!(Json::from(json!(2.5)).decode::<i64>().is_err());
    }

    #[test]
    fn decode_errors_carry_the_path() {
        let v = Json::from(json!({"xs": [1, "two"]}));
        let err = v.decode::<BTreeMap<String, Vec<i32>>>().unwrap_err();
        assert_eq!(err.path, Path::root().field("xs").index(1));
        assert_eq!(err.message, "expected number, found string");
    }

    #[test]
    fn options_and_nulls() {
        assert_eq!(Json::Null.decode::<Option<bool>>().unwrap(), None);
        assert_eq!(Json::from(true).decode::<Option<bool>>().unwrap(), Some(true));
        assert_eq!(Json::from_value(&None::<i32>), Json::Null);
    }

    #[test]
    fn encode_then_decode_native_containers() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), vec![1u32, 2]);
        let encoded = Json::from_value(&map);
        assert_eq!(encoded, Json::from(json!({"a": [1, 2]})));
        assert_eq!(encoded.decode::<BTreeMap<String, Vec<u32>>>().unwrap(), map);
    }

    #[test]
    fn decimals_are_exact() {
        let d = Json::from(json!(0.1)).decode::<Decimal>().unwrap();
        assert_eq!(d, Decimal::new(1, 1));
    }
}
