//! The `Json` value tree.
//!
//! `Json` is a closed enum over the six JSON kinds. Objects are an ordered
//! list of `(key, value)` pairs: insertion order survives printing and
//! iteration, while equality, hashing and ordering ignore it (see
//! [`order`]). Duplicate keys may be constructed; lookups see the first one.

pub mod codec;
pub mod dynamic;
pub mod merge;
pub mod number;
pub mod order;
pub mod text;

use std::fmt;

use rust_decimal::Decimal;

pub use codec::{FromJson, ToJson};
pub use dynamic::{DynamicValue, PrimitiveValue};
pub use merge::MergeStrategy;
pub use number::JsonNumber;

#[derive(Debug, Clone, Default)]
pub enum Json {
    #[default]
    Null,
    Boolean(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

// ── Type tags ─────────────────────────────────────────────────────────────

/// The kind of a [`Json`] value, in ascending sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload of a value, borrowed. Produced by [`Json::unwrap_as`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unwrapped<'a> {
    Null,
    Boolean(bool),
    Number(Decimal),
    String(&'a str),
    Array(&'a [Json]),
    Object(&'a [(String, Json)]),
}

impl Json {
    /// The type tag of this value.
    pub fn json_type(&self) -> JsonType {
        match self {
            Json::Null => JsonType::Null,
            Json::Boolean(_) => JsonType::Boolean,
            Json::Number(_) => JsonType::Number,
            Json::String(_) => JsonType::String,
            Json::Array(_) => JsonType::Array,
            Json::Object(_) => JsonType::Object,
        }
    }

    /// Returns true if this value has type `ty`.
    pub fn is(&self, ty: JsonType) -> bool {
        self.json_type() == ty
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Json::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Json::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Json::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Json::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Json::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Json::Object(_))
    }

    /// Returns `self` if it has the given type.
    pub fn narrow(&self, ty: JsonType) -> Option<&Json> {
        self.is(ty).then_some(self)
    }

    /// Extracts the payload if `self` has the given type.
    ///
    /// Numbers beyond decimal precision yield `None`.
    ///
    /// ```
    /// use json_tree::{Json, JsonType, Unwrapped};
    ///
    /// let v = Json::from("hi");
    /// assert_eq!(v.unwrap_as(JsonType::String), Some(Unwrapped::String("hi")));
    /// assert_eq!(v.unwrap_as(JsonType::Number), None);
    /// ```
    pub fn unwrap_as(&self, ty: JsonType) -> Option<Unwrapped<'_>> {
        if !self.is(ty) {
            return None;
        }
        Some(match self {
            Json::Null => Unwrapped::Null,
            Json::Boolean(b) => Unwrapped::Boolean(*b),
            Json::Number(n) => Unwrapped::Number(n.as_decimal()?),
            Json::String(s) => Unwrapped::String(s),
            Json::Array(items) => Unwrapped::Array(items),
            Json::Object(entries) => Unwrapped::Object(entries),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The boolean payload, for `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Json::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The number payload, for `Number`.
    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            Json::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The text payload, for `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Json::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, for `Array`.
    pub fn as_array(&self) -> Option<&[Json]> {
        match self {
            Json::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries in insertion order, duplicates included, for `Object`.
    pub fn as_object(&self) -> Option<&[(String, Json)]> {
        match self {
            Json::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// The value of the first entry named `name`.
    pub fn get_field(&self, name: &str) -> Option<&Json> {
        self.as_object()?.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// The element at `index`, for an `Array` long enough to have one.
    pub fn get_index(&self, index: usize) -> Option<&Json> {
        self.as_array()?.get(index)
    }

    // ── Constructors ──────────────────────────────────────────────────────

    /// An object from `(key, value)` pairs, kept in order.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Json)>) -> Json {
        Json::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// An array of `items`.
    pub fn array(items: impl IntoIterator<Item = Json>) -> Json {
        Json::Array(items.into_iter().collect())
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<bool> for Json {
    fn from(b: bool) -> Self {
        Json::Boolean(b)
    }
}

macro_rules! integer_json {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Json {
                fn from(n: $t) -> Self {
                    Json::Number(JsonNumber::from(n))
                }
            }
        )*
    };
}

integer_json!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for Json {
    /// Non-finite floats become `Null`.
    fn from(f: f64) -> Self {
        JsonNumber::try_from(f).map(Json::Number).unwrap_or(Json::Null)
    }
}

impl From<Decimal> for Json {
    fn from(d: Decimal) -> Self {
        Json::Number(JsonNumber::from(d))
    }
}

impl From<JsonNumber> for Json {
    fn from(n: JsonNumber) -> Self {
        Json::Number(n)
    }
}

impl From<&str> for Json {
    fn from(s: &str) -> Self {
        Json::String(s.to_string())
    }
}

impl From<String> for Json {
    fn from(s: String) -> Self {
        Json::String(s)
    }
}

impl From<Vec<Json>> for Json {
    fn from(items: Vec<Json>) -> Self {
        Json::Array(items)
    }
}

impl<T: Into<Json>> From<Option<T>> for Json {
    fn from(value: Option<T>) -> Self {
        value.map_or(Json::Null, Into::into)
    }
}

impl FromIterator<Json> for Json {
    fn from_iter<I: IntoIterator<Item = Json>>(iter: I) -> Self {
        Json::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(String, Json)> for Json {
    fn from_iter<I: IntoIterator<Item = (String, Json)>>(iter: I) -> Self {
        Json::Object(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags() {
        assert_eq!(Json::Null.json_type(), JsonType::Null);
        assert!(Json::from(1).is(JsonType::Number));
        assert!(Json::Array(vec![]).is_array());
        assert_eq!(JsonType::Object.to_string(), "object");
    }

    #[test]
    fn narrowing_is_type_checked() {
        let v = Json::from(true);
        assert_eq!(v.narrow(JsonType::Boolean), Some(&v));
        assert_eq!(v.narrow(JsonType::String), None);
    }

    #[test]
    fn unwrap_number_beyond_decimal_precision_is_none() {
        let v = Json::from(json!(1.5));
        assert_eq!(v.unwrap_as(JsonType::Number), Some(Unwrapped::Number(Decimal::new(15, 1))));
        let huge = Json::Number(JsonNumber::parse("1e400").unwrap());
        assert_eq!(huge.unwrap_as(JsonType::Number), None);
    }

    #[test]
    fn field_lookup_sees_first_duplicate() {
        let v = Json::object([("a", Json::from(1)), ("a", Json::from(2))]);
        assert_eq!(v.get_field("a"), Some(&Json::from(1)));
        assert_eq!(v.get_field("b"), None);
        assert_eq!(Json::from(1).get_field("a"), None);
    }

    #[test]
    fn non_finite_floats_are_null() {
        assert_eq!(Json::from(f64::NAN), Json::Null);
        assert_eq!(Json::from(0.5), Json::from(json!(0.5)));
    }

    #[test]
    fn options_map_none_to_null() {
        assert_eq!(Json::from(None::<i32>), Json::Null);
        assert_eq!(Json::from(Some("x")), Json::from("x"));
    }
}
