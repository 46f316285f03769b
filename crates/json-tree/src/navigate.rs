//! Path evaluation and path-addressed edits.
//!
//! Every operation walks the tree along a [`Path`], fanning out at wildcard
//! steps. Concrete locations are reported with a canonical path made of
//! `Field` and `AtIndex` steps only. A step that does not fit the value it
//! meets (a field on an array, an index past the end) is a miss: it
//! contributes no location and is never an error by itself.
//!
//! Edits rebuild only the containers on the way to a changed value; untouched
//! siblings are cloned once, when the first change below a container happens.

use json_tree_path::{Path, PathNode};

use crate::error::JsonError;
use crate::json::Json;
use crate::selection::JsonSelection;

// ── Step resolution ───────────────────────────────────────────────────────

enum Step<'a> {
    Items(&'a [Json], Vec<usize>),
    Entries(&'a [(String, Json)], Vec<usize>),
    Keys(&'a [(String, Json)]),
    Miss,
}

fn first_entry(entries: &[(String, Json)], key: &str) -> Option<usize> {
    entries.iter().position(|(k, _)| k == key)
}

fn resolve<'a>(json: &'a Json, node: &PathNode) -> Step<'a> {
    match (json, node) {
        (Json::Object(entries), PathNode::Field(key) | PathNode::AtKey(key)) => {
            Step::Entries(entries, first_entry(entries, key).into_iter().collect())
        }
        (Json::Object(entries), PathNode::AtKeys(keys)) => {
            let picked = (0..entries.len())
                .filter(|&i| {
                    let key = &entries[i].0;
                    keys.contains(key) && first_entry(entries, key) == Some(i)
                })
                .collect();
            Step::Entries(entries, picked)
        }
        (Json::Object(entries), PathNode::MapValues) => {
            Step::Entries(entries, (0..entries.len()).collect())
        }
        (Json::Object(entries), PathNode::MapKeys) => Step::Keys(entries),
        (Json::Array(items), PathNode::AtIndex(i)) => {
            Step::Items(items, (*i < items.len()).then_some(*i).into_iter().collect())
        }
        (Json::Array(items), PathNode::AtIndices(indices)) => {
            Step::Items(items, indices.iter().copied().filter(|&i| i < items.len()).collect())
        }
        (Json::Array(items), PathNode::Elements) => Step::Items(items, (0..items.len()).collect()),
        _ => Step::Miss,
    }
}

// ── Read-only walk ────────────────────────────────────────────────────────

pub(crate) fn visit_at<F>(json: &Json, nodes: &[PathNode], trail: &mut Path, f: &mut F)
where
    F: FnMut(&Path, &Json),
{
    let Some((node, rest)) = nodes.split_first() else {
        f(trail, json);
        return;
    };
    match resolve(json, node) {
        Step::Items(items, picked) => {
            for i in picked {
                trail.push(PathNode::AtIndex(i));
                visit_at(&items[i], rest, trail, f);
                trail.pop();
            }
        }
        Step::Entries(entries, picked) => {
            for i in picked {
                let (key, value) = &entries[i];
                trail.push(PathNode::Field(key.clone()));
                visit_at(value, rest, trail, f);
                trail.pop();
            }
        }
        Step::Keys(entries) => {
            for (key, _) in entries {
                trail.push(PathNode::Field(key.clone()));
                visit_at(&Json::String(key.clone()), rest, trail, f);
                trail.pop();
            }
        }
        Step::Miss => {}
    }
}

// ── Rebuilding walk ───────────────────────────────────────────────────────

/// Applies `f` at every location `nodes` matches below `json`.
///
/// `f` returns `Some(v)` to replace the value and `None` to leave it. The
/// result is `None` when nothing changed. `trail` holds the path of `json`
/// on entry and is restored on success.
pub(crate) fn update_at<F>(
    json: &Json,
    nodes: &[PathNode],
    trail: &mut Path,
    f: &mut F,
) -> Result<Option<Json>, JsonError>
where
    F: FnMut(&Path, &Json) -> Result<Option<Json>, JsonError>,
{
    let Some((node, rest)) = nodes.split_first() else {
        return f(trail, json);
    };
    match resolve(json, node) {
        Step::Items(items, picked) => {
            let mut out: Option<Vec<Json>> = None;
            for i in picked {
                trail.push(PathNode::AtIndex(i));
                let updated = update_at(&items[i], rest, trail, f);
                trail.pop();
                if let Some(value) = updated? {
                    out.get_or_insert_with(|| items.to_vec())[i] = value;
                }
            }
            Ok(out.map(Json::Array))
        }
        Step::Entries(entries, picked) => {
            let mut out: Option<Vec<(String, Json)>> = None;
            for i in picked {
                let (key, value) = &entries[i];
                trail.push(PathNode::Field(key.clone()));
                let updated = update_at(value, rest, trail, f);
                trail.pop();
                if let Some(value) = updated? {
                    out.get_or_insert_with(|| entries.to_vec())[i].1 = value;
                }
            }
            Ok(out.map(Json::Object))
        }
        Step::Keys(entries) => {
            let mut out: Option<Vec<(String, Json)>> = None;
            for (i, (key, _)) in entries.iter().enumerate() {
                trail.push(PathNode::Field(key.clone()));
                let updated = update_at(&Json::String(key.clone()), rest, trail, f);
                let renamed = match updated {
                    Ok(Some(Json::String(name))) => Ok(Some(name)),
                    Ok(Some(other)) => Err(JsonError::at(
                        trail.clone(),
                        format!("object keys must be strings, found {}", other.json_type()),
                    )),
                    Ok(None) => Ok(None),
                    Err(e) => Err(e),
                };
                trail.pop();
                if let Some(name) = renamed? {
                    out.get_or_insert_with(|| entries.to_vec())[i].0 = name;
                }
            }
            Ok(out.map(Json::Object))
        }
        Step::Miss => Ok(None),
    }
}

fn unresolved(path: &Path) -> JsonError {
    JsonError::at(path.clone(), "path does not resolve to a value")
}

// ── Public API ────────────────────────────────────────────────────────────

impl Json {
    /// Every value `path` matches, in document order.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let doc = Json::parse(r#"{"users": [{"name": "a"}, {"name": "b"}, {}]}"#).unwrap();
    /// let names = doc.get(&".users[*].name".parse().unwrap());
    /// assert_eq!(names.to_array().unwrap(), Json::parse(r#"["a", "b"]"#).unwrap());
    /// ```
    pub fn get(&self, path: &Path) -> JsonSelection {
        let mut found = Vec::new();
        visit_at(self, path.nodes(), &mut Path::root(), &mut |_, v| found.push(v.clone()));
        JsonSelection::succeed_many(found)
    }

    /// Every location `path` matches, with its concrete path.
    pub fn locate(&self, path: &Path) -> Vec<(Path, Json)> {
        let mut found = Vec::new();
        visit_at(self, path.nodes(), &mut Path::root(), &mut |loc, v| {
            found.push((loc.clone(), v.clone()))
        });
        found
    }

    // ── set ───────────────────────────────────────────────────────────────

    /// Replaces every matched value. Unchanged if nothing matches.
    pub fn set(&self, path: &Path, value: Json) -> Json {
        self.set_or_fail(path, value).unwrap_or_else(|_| self.clone())
    }

    /// Like [`set`](Json::set), but fails when nothing matches.
    pub fn set_or_fail(&self, path: &Path, value: Json) -> Result<Json, JsonError> {
        let mut hits = 0;
        let updated = update_at(self, path.nodes(), &mut Path::root(), &mut |_, _| {
            hits += 1;
            Ok(Some(value.clone()))
        })?;
        if hits == 0 {
            return Err(unresolved(path));
        }
        Ok(updated.unwrap_or_else(|| self.clone()))
    }

    // ── insert ────────────────────────────────────────────────────────────

    /// Adds a new object entry or array element. Existing keys, unresolved
    /// parents and out-of-range indices leave the tree unchanged.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let doc = Json::parse(r#"{"a": 1, "xs": [1, 2]}"#).unwrap();
    /// let doc = doc.insert(&".b".parse().unwrap(), Json::from(2));
    /// let doc = doc.insert(&".a".parse().unwrap(), Json::from(100));
    /// let doc = doc.insert(&".xs[1]".parse().unwrap(), Json::from(10));
    /// assert_eq!(doc, Json::parse(r#"{"a": 1, "b": 2, "xs": [1, 10, 2]}"#).unwrap());
    /// ```
    pub fn insert(&self, path: &Path, value: Json) -> Json {
        self.insert_impl(path, value, false).unwrap_or_else(|_| self.clone())
    }

    /// Like [`insert`](Json::insert), but fails when nothing matches.
    pub fn insert_or_fail(&self, path: &Path, value: Json) -> Result<Json, JsonError> {
        self.insert_impl(path, value, true)
    }

    fn insert_impl(&self, path: &Path, value: Json, strict: bool) -> Result<Json, JsonError> {
        let Some((last, parent)) = path.split_last() else {
            return Err(JsonError::new("cannot insert at the root"));
        };
        let mut hits = 0;
        let updated = update_at(self, parent.nodes(), &mut Path::root(), &mut |loc, target| {
            hits += 1;
            match insert_into(loc, target, last, &value) {
                Err(_) if !strict => Ok(None),
                other => other.map(Some),
            }
        })?;
        if hits == 0 {
            return Err(JsonError::at(parent, "parent path does not resolve to a value"));
        }
        Ok(updated.unwrap_or_else(|| self.clone()))
    }

    // ── delete ────────────────────────────────────────────────────────────

    /// Removes every matched location. Array elements after a removed one
    /// shift left; a key removes all its entries.
    pub fn delete(&self, path: &Path) -> Json {
        self.delete_or_fail(path).unwrap_or_else(|_| self.clone())
    }

    /// Like [`delete`](Json::delete), but fails when nothing matches.
    pub fn delete_or_fail(&self, path: &Path) -> Result<Json, JsonError> {
        let Some((last, parent)) = path.split_last() else {
            return Err(JsonError::new("cannot delete the root"));
        };
        let mut removed = 0;
        let updated = update_at(self, parent.nodes(), &mut Path::root(), &mut |_, target| {
            let out = delete_from(target, last);
            removed += usize::from(out.is_some());
            Ok(out)
        })?;
        if removed == 0 {
            return Err(unresolved(path));
        }
        Ok(updated.unwrap_or_else(|| self.clone()))
    }

    // ── modify ────────────────────────────────────────────────────────────

    /// Applies `f` to every matched value. Where `f` returns `None` the
    /// value is kept.
    pub fn modify(&self, path: &Path, mut f: impl FnMut(&Json) -> Option<Json>) -> Json {
        update_at(self, path.nodes(), &mut Path::root(), &mut |_, v| Ok(f(v)))
            .ok()
            .flatten()
            .unwrap_or_else(|| self.clone())
    }

    /// Like [`modify`](Self::modify), but fails at the first matched value
    /// `f` returns `None` for, and when nothing matches.
    pub fn modify_or_fail(
        &self,
        path: &Path,
        mut f: impl FnMut(&Json) -> Option<Json>,
    ) -> Result<Json, JsonError> {
        let mut hits = 0;
        let updated = update_at(self, path.nodes(), &mut Path::root(), &mut |loc, v| {
            hits += 1;
            match f(v) {
                Some(new) => Ok(Some(new)),
                None => Err(JsonError::at(loc.clone(), "value is outside the function's domain")),
            }
        })?;
        if hits == 0 {
            return Err(unresolved(path));
        }
        Ok(updated.unwrap_or_else(|| self.clone()))
    }
}

fn insert_into(
    loc: &Path,
    target: &Json,
    last: &PathNode,
    value: &Json,
) -> Result<Json, JsonError> {
    match (target, last) {
        (Json::Object(entries), PathNode::Field(key) | PathNode::AtKey(key)) => {
            if first_entry(entries, key).is_some() {
                return Err(JsonError::at(loc.clone().field(key.clone()), "key already exists"));
            }
            let mut out = entries.clone();
            out.push((key.clone(), value.clone()));
            Ok(Json::Object(out))
        }
        (Json::Array(items), PathNode::AtIndex(i)) => {
            if *i > items.len() {
                return Err(JsonError::at(
                    loc.clone().index(*i),
                    format!("index {i} out of bounds for array of length {}", items.len()),
                ));
            }
            let mut out = items.clone();
            out.insert(*i, value.clone());
            Ok(Json::Array(out))
        }
        (_, node) if node.is_wildcard() => Err(JsonError::at(
            loc.clone(),
            format!("cannot insert at wildcard {node}"),
        )),
        (other, node) => Err(JsonError::at(
            loc.clone(),
            format!("cannot insert {node} into {}", other.json_type()),
        )),
    }
}

/// The parent with `last` removed, or `None` if `last` matches nothing.
fn delete_from(target: &Json, last: &PathNode) -> Option<Json> {
    match (target, last) {
        (Json::Object(entries), PathNode::Field(key) | PathNode::AtKey(key)) => {
            first_entry(entries, key)?;
            Some(Json::Object(entries.iter().filter(|(k, _)| k != key).cloned().collect()))
        }
        (Json::Object(entries), PathNode::AtKeys(keys)) => {
            let kept: Vec<(String, Json)> =
                entries.iter().filter(|(k, _)| !keys.contains(k)).cloned().collect();
            (kept.len() < entries.len()).then_some(Json::Object(kept))
        }
        (Json::Object(_), PathNode::MapValues | PathNode::MapKeys) => {
            Some(Json::Object(Vec::new()))
        }
        (Json::Array(items), PathNode::AtIndex(i)) => {
            if *i >= items.len() {
                return None;
            }
            let mut out = items.clone();
            out.remove(*i);
            Some(Json::Array(out))
        }
        (Json::Array(items), PathNode::AtIndices(indices)) => {
            let kept: Vec<Json> = items
                .iter()
                .enumerate()
                .filter(|(i, _)| !indices.contains(i))
                .map(|(_, v)| v.clone())
                .collect();
            (kept.len() < items.len()).then_some(Json::Array(kept))
        }
        (Json::Array(_), PathNode::Elements) => Some(Json::Array(Vec::new())),
        _ => None,
    }
}
