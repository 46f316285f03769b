//! Query results.
//!
//! A [`JsonSelection`] is either a failure or an ordered list of values.
//! Path evaluation yields one; further navigation, filtering and narrowing
//! keep it in selection form until the caller extracts values. A failure
//! flows through every combinator untouched.

use std::ops::Add;

use json_tree_path::{Path, PathNode};

use crate::error::JsonError;
use crate::json::{FromJson, Json, JsonType};

#[derive(Debug, Clone, PartialEq)]
pub struct JsonSelection {
    result: Result<Vec<Json>, JsonError>,
}

impl JsonSelection {
    /// A successful selection with no values.
    pub fn empty() -> Self {
        Self { result: Ok(Vec::new()) }
    }

    /// A successful selection of exactly `value`.
    pub fn succeed(value: Json) -> Self {
        Self { result: Ok(vec![value]) }
    }

    /// A successful selection of `values`, in order.
    pub fn succeed_many(values: Vec<Json>) -> Self {
        Self { result: Ok(values) }
    }

    /// A failed selection. Every combinator passes the failure through.
    pub fn fail(error: JsonError) -> Self {
        Self { result: Err(error) }
    }

    // ── State ─────────────────────────────────────────────────────────────

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    /// True for a success holding no values.
    pub fn is_empty(&self) -> bool {
        matches!(&self.result, Ok(values) if values.is_empty())
    }

    /// Number of selected values; a failure selects none.
    pub fn size(&self) -> usize {
        self.result.as_ref().map_or(0, Vec::len)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&JsonError> {
        self.result.as_ref().err()
    }

    /// The selected values, or the failure.
    pub fn values(&self) -> Result<&[Json], &JsonError> {
        self.result.as_deref()
    }

    /// Consumes the selection into a plain `Result`.
    pub fn into_result(self) -> Result<Vec<Json>, JsonError> {
        self.result
    }

    /// Iterates over the values of a success; a failure yields nothing.
    pub fn iter(&self) -> std::slice::Iter<'_, Json> {
        match &self.result {
            Ok(values) => values.iter(),
            Err(_) => [].iter(),
        }
    }

    // ── Extraction ────────────────────────────────────────────────────────

    /// The single selected value.
    pub fn one(&self) -> Result<Json, JsonError> {
        match self.values().map_err(Clone::clone)? {
            [single] => Ok(single.clone()),
            values => Err(JsonError::new(format!(
                "expected exactly one value, found {}",
                values.len()
            ))),
        }
    }

    /// The first selected value.
    pub fn any(&self) -> Result<Json, JsonError> {
        self.values()
            .map_err(Clone::clone)?
            .first()
            .cloned()
            .ok_or_else(|| JsonError::new("expected at least one value, found none"))
    }

    /// The value itself when exactly one is selected, otherwise an array of
    /// all values.
    pub fn all(&self) -> Result<Json, JsonError> {
        match self.values().map_err(Clone::clone)? {
            [single] => Ok(single.clone()),
            values => Ok(Json::Array(values.to_vec())),
        }
    }

    /// All values as an array, however many there are.
    pub fn to_array(&self) -> Result<Json, JsonError> {
        self.values().map(|values| Json::Array(values.to_vec())).map_err(Clone::clone)
    }

    /// Like [`one`](Self::one), panicking on failure.
    pub fn expect_one(&self) -> Json {
        match self.one() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`any`](Self::any), panicking on failure.
    pub fn expect_any(&self) -> Json {
        match self.any() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Decodes the single selected value, failing unless exactly one is selected.
    pub fn decode<T: FromJson>(&self) -> Result<T, JsonError> {
        self.one()?.decode()
    }

    /// Decodes every selected value, stopping at the first that does not decode.
    ///
    /// Error paths are prefixed with the failing value's position in the
    /// selection.
    pub fn decode_all<T: FromJson>(&self) -> Result<Vec<T>, JsonError> {
        let values = self.values().map_err(Clone::clone)?;
        values
            .iter()
            .enumerate()
            .map(|(i, v)| v.decode().map_err(|e: JsonError| e.at_index(i)))
            .collect()
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Evaluates `path` against every selected value and concatenates the
    /// results.
    pub fn get(&self, path: &Path) -> JsonSelection {
        self.flat_map(|value| value.get(path))
    }

    /// Narrows every value to its field `name`; non-objects drop out.
    pub fn field(&self, name: &str) -> JsonSelection {
        self.get(&Path::from(PathNode::Field(name.to_string())))
    }

    /// Narrows every value to its element at `index`.
    pub fn index(&self, index: usize) -> JsonSelection {
        self.get(&Path::from(PathNode::AtIndex(index)))
    }

    /// Fans out to the elements of every selected array.
    pub fn elements(&self) -> JsonSelection {
        self.get(&Path::from(PathNode::Elements))
    }

    /// Fans out to the values of every selected object.
    pub fn map_values(&self) -> JsonSelection {
        self.get(&Path::from(PathNode::MapValues))
    }

    /// Fans out to the keys of every selected object, as strings.
    pub fn map_keys(&self) -> JsonSelection {
        self.get(&Path::from(PathNode::MapKeys))
    }

    // ── Combinators ───────────────────────────────────────────────────────

    /// Replaces each value with `f(value)`.
    pub fn map(&self, mut f: impl FnMut(&Json) -> Json) -> JsonSelection {
        match &self.result {
            Ok(values) => JsonSelection::succeed_many(values.iter().map(&mut f).collect()),
            Err(e) => JsonSelection::fail(e.clone()),
        }
    }

    /// Concatenates the selections produced by `f`, stopping at the first
    /// failure.
    pub fn flat_map(&self, mut f: impl FnMut(&Json) -> JsonSelection) -> JsonSelection {
        let values = match &self.result {
            Ok(values) => values,
            Err(e) => return JsonSelection::fail(e.clone()),
        };
        let mut out = Vec::new();
        for value in values {
            match f(value).result {
                Ok(more) => out.extend(more),
                Err(e) => return JsonSelection::fail(e),
            }
        }
        JsonSelection::succeed_many(out)
    }

    /// Keeps the values `predicate` accepts.
    pub fn filter(&self, mut predicate: impl FnMut(&Json) -> bool) -> JsonSelection {
        match &self.result {
            Ok(values) => JsonSelection::succeed_many(
                values.iter().filter(|v| predicate(*v)).cloned().collect(),
            ),
            Err(e) => JsonSelection::fail(e.clone()),
        }
    }

    /// Maps and filters in one pass.
    pub fn collect(&self, mut f: impl FnMut(&Json) -> Option<Json>) -> JsonSelection {
        match &self.result {
            Ok(values) => JsonSelection::succeed_many(values.iter().filter_map(&mut f).collect()),
            Err(e) => JsonSelection::fail(e.clone()),
        }
    }

    /// Folds the values in order, or returns the failure.
    pub fn fold<B>(&self, init: B, f: impl FnMut(B, &Json) -> B) -> Result<B, JsonError> {
        self.values().map(|values| values.iter().fold(init, f)).map_err(Clone::clone)
    }

    /// Values of `self` followed by values of `other`. If both fail, the
    /// errors are combined; if one fails, its error is the result.
    pub fn concat(self, other: JsonSelection) -> JsonSelection {
        match (self.result, other.result) {
            (Ok(mut a), Ok(b)) => {
                a.extend(b);
                JsonSelection::succeed_many(a)
            }
            (Err(a), Err(b)) => JsonSelection::fail(a + b),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => JsonSelection::fail(e),
        }
    }

    /// `self` unless it is a failure.
    pub fn or_else(self, other: impl FnOnce() -> JsonSelection) -> JsonSelection {
        if self.is_failure() {
            other()
        } else {
            self
        }
    }

    // ── Type narrowing ────────────────────────────────────────────────────

    /// Keeps the values of type `ty`.
    pub fn of_type(&self, ty: JsonType) -> JsonSelection {
        self.filter(|v| v.is(ty))
    }

    pub fn nulls(&self) -> JsonSelection {
        self.of_type(JsonType::Null)
    }

    pub fn booleans(&self) -> JsonSelection {
        self.of_type(JsonType::Boolean)
    }

    pub fn numbers(&self) -> JsonSelection {
        self.of_type(JsonType::Number)
    }

    pub fn strings(&self) -> JsonSelection {
        self.of_type(JsonType::String)
    }

    pub fn arrays(&self) -> JsonSelection {
        self.of_type(JsonType::Array)
    }

    pub fn objects(&self) -> JsonSelection {
        self.of_type(JsonType::Object)
    }
}

impl Default for JsonSelection {
    fn default() -> Self {
        JsonSelection::empty()
    }
}

impl From<Vec<Json>> for JsonSelection {
    fn from(values: Vec<Json>) -> Self {
        JsonSelection::succeed_many(values)
    }
}

impl From<Json> for JsonSelection {
    fn from(value: Json) -> Self {
        JsonSelection::succeed(value)
    }
}

impl From<JsonError> for JsonSelection {
    fn from(error: JsonError) -> Self {
        JsonSelection::fail(error)
    }
}

impl From<Result<Vec<Json>, JsonError>> for JsonSelection {
    fn from(result: Result<Vec<Json>, JsonError>) -> Self {
        Self { result }
    }
}

impl Add for JsonSelection {
    type Output = JsonSelection;

    fn add(self, rhs: JsonSelection) -> JsonSelection {
        self.concat(rhs)
    }
}

impl<'a> IntoIterator for &'a JsonSelection {
    type Item = &'a Json;
    type IntoIter = std::slice::Iter<'a, Json>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn j(v: serde_json::Value) -> Json {
        Json::from(v)
    }

    fn sel(v: serde_json::Value) -> JsonSelection {
        let Json::Array(items) = j(v) else {
            panic!("fixture must be an array");
        };
        JsonSelection::succeed_many(items)
    }

    #[test]
    fn one_requires_exactly_one() {
        assert_eq!(sel(json!([1])).one().unwrap(), j(json!(1)));
        assert!(sel(json!([])).one().is_err());
        assert!(sel(json!([1, 2])).one().is_err());
    }

    #[test]
    fn any_takes_the_first() {
        assert_eq!(sel(json!([1, 2])).any().unwrap(), j(json!(1)));
        assert!(JsonSelection::empty().any().is_err());
    }

    #[test]
    fn all_unwraps_singletons() {
        assert_eq!(sel(json!([1])).all().unwrap(), j(json!(1)));
        assert_eq!(sel(json!([1, 2])).all().unwrap(), j(json!([1, 2])));
        assert_eq!(sel(json!([])).all().unwrap(), j(json!([])));
    }

    #[test]
    fn navigation_flat_maps() {
        let s = JsonSelection::succeed(j(json!({"xs": [{"n": 1}, {"n": 2}, {"m": 3}]})));
        assert_eq!(s.field("xs").elements().field("n").to_array().unwrap(), j(json!([1, 2])));
        assert_eq!(s.field("xs").index(2).map_keys().one().unwrap(), j(json!("m")));
    }

    #[test]
    fn failure_propagates_through_combinators() {
        let failed = JsonSelection::fail(JsonError::new("boom"));
        assert!(failed.map(|v| v.clone()).is_failure());
        assert!(failed.filter(|_| true).is_failure());
        assert!(failed.strings().is_failure());
        assert!((failed.clone() + sel(json!([1]))).is_failure());
        assert!((sel(json!([1])) + failed.clone()).is_failure());
        assert!(failed.fold(0, |n, _| n + 1).is_err());
    }

    #[test]
    fn double_failure_combines_messages() {
        let both =
            JsonSelection::fail(JsonError::new("a")) + JsonSelection::fail(JsonError::new("b"));
        assert_eq!(both.error().unwrap().message, "a; b");
    }

    #[test]
    fn concatenation_keeps_order() {
        let s = sel(json!([1, 2])) + sel(json!([3]));
        assert_eq!(s.to_array().unwrap(), j(json!([1, 2, 3])));
        assert_eq!(s.size(), 3);
    }

    #[test]
    fn type_narrowing() {
        let s = sel(json!([1, "a", null, [2], {"k": 3}, true, "b"]));
        assert_eq!(s.strings().to_array().unwrap(), j(json!(["a", "b"])));
        assert_eq!(s.numbers().size(), 1);
        assert_eq!(s.nulls().size(), 1);
        assert_eq!(s.arrays().size(), 1);
        assert_eq!(s.objects().size(), 1);
        assert_eq!(s.booleans().size(), 1);
    }

    #[test]
    fn collect_maps_partially() {
        let s = sel(json!([1, "a", 2]));
        let doubled = s.collect(|v| v.as_number().and_then(|n| n.checked_add(n)).map(Json::Number));
        assert_eq!(doubled.to_array().unwrap(), j(json!([2, 4])));
    }

    #[test]
    fn decoding_selections() {
        let s = sel(json!([1, 2, 3]));
        assert_eq!(s.decode_all::<i32>().unwrap(), vec![1, 2, 3]);
        assert!(s.decode::<i32>().is_err());
        let err = sel(json!([1, "x"])).decode_all::<i32>().unwrap_err();
        assert_eq!(err.path, Path::root().index(1));
    }

    #[test]
    fn or_else_recovers_failures_only() {
        let recovered = JsonSelection::fail(JsonError::new("x")).or_else(|| sel(json!([1])));
        assert_eq!(recovered.size(), 1);
        let kept = JsonSelection::empty().or_else(|| sel(json!([1])));
        assert!(kept.is_empty());
    }

    #[test]
    #[should_panic(expected = "expected exactly one value")]
    fn expect_one_panics_on_many() {
        sel(json!([1, 2])).expect_one();
    }
}
