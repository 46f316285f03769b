//! Conversion between `Json` and the generic [`DynamicValue`] model.
//!
//! `DynamicValue` is the schema-agnostic value representation shared with
//! typed records. The mapping is:
//!
//! | Json      | DynamicValue                                         |
//! |-----------|------------------------------------------------------|
//! | `null`    | `Primitive(Unit)`                                    |
//! | boolean   | `Primitive(Boolean)`                                 |
//! | number    | `Int`, else `Long`, else `BigDecimal` (first lossless) |
//! | string    | `Primitive(String)`                                  |
//! | array     | `Sequence`                                           |
//! | object    | `Record` (first occurrence per key)                  |
//!
//! In the other direction a `Map` with string keys becomes an object, any
//! other `Map` becomes an array of `[key, value]` pairs, and a
//! `Variant(case, v)` becomes `{case: v}`.

use super::{Json, JsonNumber};

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Unit,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    BigDecimal(JsonNumber),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Primitive(PrimitiveValue),
    Sequence(Vec<DynamicValue>),
    Record(Vec<(String, DynamicValue)>),
    Map(Vec<(DynamicValue, DynamicValue)>),
    Variant(String, Box<DynamicValue>),
}

impl DynamicValue {
    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::Primitive(PrimitiveValue::String(s.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::Primitive(PrimitiveValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl Json {
    /// ```
    /// use json_tree::{DynamicValue, Json, PrimitiveValue};
    ///
    /// let v = Json::parse("[1, 5000000000, 1.5]").unwrap();
    /// let DynamicValue::Sequence(items) = v.to_dynamic_value() else { unreachable!() };
    /// assert_eq!(items[0], DynamicValue::Primitive(PrimitiveValue::Int(1)));
    /// assert_eq!(items[1], DynamicValue::Primitive(PrimitiveValue::Long(5_000_000_000)));
    /// assert!(matches!(items[2], DynamicValue::Primitive(PrimitiveValue::BigDecimal(_))));
    /// ```
    pub fn to_dynamic_value(&self) -> DynamicValue {
        match self {
            Json::Null => DynamicValue::Primitive(PrimitiveValue::Unit),
            Json::Boolean(b) => DynamicValue::Primitive(PrimitiveValue::Boolean(*b)),
            Json::Number(n) => DynamicValue::Primitive(narrowest(n)),
            Json::String(s) => DynamicValue::string(s.clone()),
            Json::Array(items) => {
                DynamicValue::Sequence(items.iter().map(Json::to_dynamic_value).collect())
            }
            Json::Object(entries) => {
                let mut fields: Vec<(String, DynamicValue)> = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    if !fields.iter().any(|(seen, _)| seen == k) {
                        fields.push((k.clone(), v.to_dynamic_value()));
                    }
                }
                DynamicValue::Record(fields)
            }
        }
    }

    /// Converts a dynamic value into a `Json` tree.
    pub fn from_dynamic_value(value: &DynamicValue) -> Json {
        match value {
            DynamicValue::Primitive(p) => match p {
                PrimitiveValue::Unit => Json::Null,
                PrimitiveValue::Boolean(b) => Json::Boolean(*b),
                PrimitiveValue::Int(i) => Json::from(*i),
                PrimitiveValue::Long(l) => Json::from(*l),
                PrimitiveValue::Double(d) => Json::from(*d),
                PrimitiveValue::BigDecimal(n) => Json::Number(n.clone()),
                PrimitiveValue::String(s) => Json::String(s.clone()),
            },
            DynamicValue::Sequence(items) => {
                Json::Array(items.iter().map(Json::from_dynamic_value).collect())
            }
            DynamicValue::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Json::from_dynamic_value(v)))
                    .collect(),
            ),
            DynamicValue::Map(entries) => {
                let keyed: Option<Vec<(String, Json)>> = entries
                    .iter()
                    .map(|(k, v)| Some((k.as_str()?.to_string(), Json::from_dynamic_value(v))))
                    .collect();
                match keyed {
                    Some(fields) => Json::Object(fields),
                    None => Json::array(entries.iter().map(|(k, v)| {
                        Json::array([Json::from_dynamic_value(k), Json::from_dynamic_value(v)])
                    })),
                }
            }
            DynamicValue::Variant(case, inner) => {
                Json::Object(vec![(case.clone(), Json::from_dynamic_value(inner))])
            }
        }
    }
}

fn narrowest(n: &JsonNumber) -> PrimitiveValue {
    if let Some(i) = n.as_i32() {
        PrimitiveValue::Int(i)
    } else if let Some(l) = n.as_i64() {
        PrimitiveValue::Long(l)
    } else {
        PrimitiveValue::BigDecimal(n.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_dynamic_values() {
        let v = Json::from(json!({"a": [1, 2.5, "x", null, true], "b": {"c": "deep"}}));
        assert_eq!(Json::from_dynamic_value(&v.to_dynamic_value()), v);
    }

    #[test]
    fn big_numbers_become_big_decimals() {
        let v = Json::parse("123456789012345678901234567890").unwrap();
        assert!(matches!(
            v.to_dynamic_value(),
            DynamicValue::Primitive(PrimitiveValue::BigDecimal(_))
        ));
    }

    #[test]
    fn string_keyed_maps_become_objects() {
        let map = DynamicValue::Map(vec![(
            DynamicValue::string("k"),
            DynamicValue::Primitive(PrimitiveValue::Int(1)),
        )]);
        assert_eq!(Json::from_dynamic_value(&map), Json::from(json!({"k": 1})));
    }

    #[test]
    fn other_maps_become_pair_arrays() {
        let map = DynamicValue::Map(vec![(
            DynamicValue::Primitive(PrimitiveValue::Int(7)),
            DynamicValue::Primitive(PrimitiveValue::Boolean(false)),
        )]);
        assert_eq!(Json::from_dynamic_value(&map), Json::from(json!([[7, false]])));
    }

    #[test]
    fn variants_become_single_entry_objects() {
        let v = DynamicValue::Variant("Some".into(), Box::new(DynamicValue::string("x")));
        assert_eq!(Json::from_dynamic_value(&v), Json::from(json!({"Some": "x"})));
    }

    #[test]
    fn non_finite_doubles_become_null() {
        let v = DynamicValue::Primitive(PrimitiveValue::Double(f64::INFINITY));
        assert_eq!(Json::from_dynamic_value(&v), Json::Null);
    }

    #[test]
    fn duplicate_keys_keep_first_in_records() {
        let v = Json::object([("a", Json::from(1)), ("a", Json::from(2))]);
        assert_eq!(
            v.to_dynamic_value(),
            DynamicValue::Record(vec![(
                "a".into(),
                DynamicValue::Primitive(PrimitiveValue::Int(1))
            )])
        );
    }
}
