//! Whole-tree traversals: pruning, projection, folds, rewrites and
//! canonicalization.
//!
//! Traversals are depth-first in document order. Paths handed to callbacks
//! are concrete (`Field` and `AtIndex` steps) and refer to positions in the
//! input tree.

use std::convert::Infallible;

use json_tree_path::{Path, PathNode};

use crate::error::JsonError;
use crate::json::Json;
use crate::selection::JsonSelection;

// ── prune / retain / partition ────────────────────────────────────────────

fn is_empty_container(json: &Json) -> bool {
    match json {
        Json::Array(items) => items.is_empty(),
        Json::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Splits the children of a container into the matching tree and the rest.
///
/// A matching child goes to the first tree whole. A non-matching container
/// child is split recursively; its matching part is kept only if non-empty.
fn split<F>(json: &Json, trail: &mut Path, pred: &mut F) -> (Json, Json)
where
    F: FnMut(&Path, &Json) -> bool,
{
    match json {
        Json::Array(items) => {
            let (mut hit, mut miss) = (Vec::new(), Vec::new());
            for (i, item) in items.iter().enumerate() {
                trail.push(PathNode::AtIndex(i));
                let (h, m) = route(item, trail, pred);
                trail.pop();
                hit.extend(h);
                miss.extend(m);
            }
            (Json::Array(hit), Json::Array(miss))
        }
        Json::Object(entries) => {
            let (mut hit, mut miss) = (Vec::new(), Vec::new());
            for (key, value) in entries {
                trail.push(PathNode::Field(key.clone()));
                let (h, m) = route(value, trail, pred);
                trail.pop();
                hit.extend(h.map(|v| (key.clone(), v)));
                miss.extend(m.map(|v| (key.clone(), v)));
            }
            (Json::Object(hit), Json::Object(miss))
        }
        other => (other.clone(), other.clone()),
    }
}

fn route<F>(child: &Json, trail: &mut Path, pred: &mut F) -> (Option<Json>, Option<Json>)
where
    F: FnMut(&Path, &Json) -> bool,
{
    if pred(trail, child) {
        return (Some(child.clone()), None);
    }
    match child {
        Json::Array(_) | Json::Object(_) => {
            let (hit, miss) = split(child, trail, pred);
            ((!is_empty_container(&hit)).then_some(hit), Some(miss))
        }
        _ => (None, Some(child.clone())),
    }
}

fn partition_root<F>(json: &Json, mut pred: F) -> (Json, Json)
where
    F: FnMut(&Path, &Json) -> bool,
{
    let root = Path::root();
    match json {
        Json::Array(_) | Json::Object(_) => split(json, &mut Path::root(), &mut pred),
        _ if pred(&root, json) => (json.clone(), Json::Null),
        _ => (Json::Null, json.clone()),
    }
}

impl Json {
    /// Removes every object entry and array element whose value matches,
    /// then recurses into the survivors.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let doc = Json::parse(r#"{"a": null, "b": {"c": null, "d": 1}, "e": [null, 2]}"#).unwrap();
    /// let pruned = doc.prune(Json::is_null);
    /// assert_eq!(pruned, Json::parse(r#"{"b": {"d": 1}, "e": [2]}"#).unwrap());
    /// ```
    pub fn prune(&self, mut pred: impl FnMut(&Json) -> bool) -> Json {
        self.prune_both(|_, v| pred(v))
    }

    pub fn prune_path(&self, mut pred: impl FnMut(&Path) -> bool) -> Json {
        self.prune_both(|p, _| pred(p))
    }

    /// Primitive roots have no children and come back unchanged.
    pub fn prune_both(&self, mut pred: impl FnMut(&Path, &Json) -> bool) -> Json {
        split(self, &mut Path::root(), &mut pred).1
    }

    /// Keeps matching entries whole, and non-matching containers that still
    /// hold a match somewhere below.
    pub fn retain(&self, mut pred: impl FnMut(&Json) -> bool) -> Json {
        self.retain_both(|_, v| pred(v))
    }

    pub fn retain_path(&self, mut pred: impl FnMut(&Path) -> bool) -> Json {
        self.retain_both(|p, _| pred(p))
    }

    /// Primitive roots have no children and come back unchanged.
    pub fn retain_both(&self, mut pred: impl FnMut(&Path, &Json) -> bool) -> Json {
        split(self, &mut Path::root(), &mut pred).0
    }

    /// `(retained, pruned)` in one traversal. A primitive root goes wholly
    /// to one side, the other side being `Null`.
    pub fn partition(&self, mut pred: impl FnMut(&Json) -> bool) -> (Json, Json) {
        partition_root(self, |_, v| pred(v))
    }

    pub fn partition_path(&self, mut pred: impl FnMut(&Path) -> bool) -> (Json, Json) {
        partition_root(self, |p, _| pred(p))
    }

    pub fn partition_both(&self, pred: impl FnMut(&Path, &Json) -> bool) -> (Json, Json) {
        partition_root(self, pred)
    }

    /// The part of the tree reachable through `paths`, in place.
    ///
    /// ```
    /// use json_tree::{Json, Path};
    ///
    /// let doc = Json::parse(r#"{"a": {"x": 1, "y": 2}, "b": [1, 2], "c": 3}"#).unwrap();
    /// let paths: [Path; 3] = [".a.x", ".c", ".nope"].map(|p| p.parse().unwrap());
    /// let picked = doc.project(&paths);
    /// assert_eq!(picked, Json::parse(r#"{"a": {"x": 1}, "c": 3}"#).unwrap());
    /// ```
    pub fn project(&self, paths: &[Path]) -> Json {
        let matched: Vec<Path> =
            paths.iter().flat_map(|p| self.locate(p)).map(|(loc, _)| loc).collect();
        if matched.is_empty() {
            return Json::Null;
        }
        if matched.iter().any(Path::is_root) {
            return self.clone();
        }
        self.retain_path(|loc| matched.iter().any(|m| loc.starts_with(m)))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Every node satisfying `pred`, the root included, in pre-order.
    pub fn query(&self, mut pred: impl FnMut(&Json) -> bool) -> JsonSelection {
        self.query_both(|_, v| pred(v))
    }

    pub fn query_path(&self, mut pred: impl FnMut(&Path) -> bool) -> JsonSelection {
        self.query_both(|p, _| pred(p))
    }

    pub fn query_both(&self, mut pred: impl FnMut(&Path, &Json) -> bool) -> JsonSelection {
        let found = self.fold_down(Vec::new(), |path, value, mut acc| {
            if pred(path, value) {
                acc.push(value.clone());
            }
            acc
        });
        JsonSelection::succeed_many(found)
    }
}

// ── Folds ─────────────────────────────────────────────────────────────────

fn fold_at<B, E, F>(
    json: &Json,
    trail: &mut Path,
    acc: B,
    post_order: bool,
    f: &mut F,
) -> Result<B, E>
where
    F: FnMut(&Path, &Json, B) -> Result<B, E>,
{
    let mut acc = if post_order { acc } else { f(trail, json, acc)? };
    match json {
        Json::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                trail.push(PathNode::AtIndex(i));
                let next = fold_at(item, trail, acc, post_order, f);
                trail.pop();
                acc = next?;
            }
        }
        Json::Object(entries) => {
            for (key, value) in entries {
                trail.push(PathNode::Field(key.clone()));
                let next = fold_at(value, trail, acc, post_order, f);
                trail.pop();
                acc = next?;
            }
        }
        _ => {}
    }
    if post_order {
        f(trail, json, acc)
    } else {
        Ok(acc)
    }
}

fn infallible<B>(result: Result<B, Infallible>) -> B {
    match result {
        Ok(b) => b,
        Err(never) => match never {},
    }
}

impl Json {
    /// Post-order fold: children before their parent, the root last.
    pub fn fold_up<B>(&self, init: B, mut f: impl FnMut(&Path, &Json, B) -> B) -> B {
        infallible(fold_at(self, &mut Path::root(), init, true, &mut |p: &Path, v: &Json, acc| {
            Ok(f(p, v, acc))
        }))
    }

    /// Pre-order fold: the root first, then each child's subtree.
    pub fn fold_down<B>(&self, init: B, mut f: impl FnMut(&Path, &Json, B) -> B) -> B {
        infallible(fold_at(self, &mut Path::root(), init, false, &mut |p: &Path, v: &Json, acc| {
            Ok(f(p, v, acc))
        }))
    }

    pub fn fold_up_or_fail<B>(
        &self,
        init: B,
        mut f: impl FnMut(&Path, &Json, B) -> Result<B, JsonError>,
    ) -> Result<B, JsonError> {
        fold_at(self, &mut Path::root(), init, true, &mut f)
    }

    pub fn fold_down_or_fail<B>(
        &self,
        init: B,
        mut f: impl FnMut(&Path, &Json, B) -> Result<B, JsonError>,
    ) -> Result<B, JsonError> {
        fold_at(self, &mut Path::root(), init, false, &mut f)
    }
}

// ── Rewrites ──────────────────────────────────────────────────────────────

fn transform_up_at<F>(json: &Json, trail: &mut Path, f: &mut F) -> Json
where
    F: FnMut(&Path, &Json) -> Json,
{
    let rebuilt = map_children(json, trail, &mut |child, trail| transform_up_at(child, trail, f));
    f(trail, &rebuilt)
}

fn transform_down_at<F>(json: &Json, trail: &mut Path, f: &mut F) -> Json
where
    F: FnMut(&Path, &Json) -> Json,
{
    let replaced = f(trail, json);
    map_children(&replaced, trail, &mut |child, trail| transform_down_at(child, trail, f))
}

fn map_children(
    json: &Json,
    trail: &mut Path,
    g: &mut dyn FnMut(&Json, &mut Path) -> Json,
) -> Json {
    match json {
        Json::Array(items) => Json::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    trail.push(PathNode::AtIndex(i));
                    let out = g(item, trail);
                    trail.pop();
                    out
                })
                .collect(),
        ),
        Json::Object(entries) => Json::Object(
            entries
                .iter()
                .map(|(key, value)| {
                    trail.push(PathNode::Field(key.clone()));
                    let out = g(value, trail);
                    trail.pop();
                    (key.clone(), out)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn transform_keys_at<F>(json: &Json, trail: &mut Path, f: &mut F) -> Json
where
    F: FnMut(&Path, &str) -> String,
{
    match json {
        Json::Object(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let renamed = f(trail, key);
                trail.push(PathNode::Field(key.clone()));
                out.push((renamed, transform_keys_at(value, trail, f)));
                trail.pop();
            }
            Json::Object(out)
        }
        other => map_children(other, trail, &mut |child, trail| transform_keys_at(child, trail, f)),
    }
}

impl Json {
    /// Rewrites every node bottom-up: `f` sees a node after its children
    /// were rewritten.
    pub fn transform_up(&self, mut f: impl FnMut(&Path, &Json) -> Json) -> Json {
        transform_up_at(self, &mut Path::root(), &mut f)
    }

    /// Rewrites every node top-down: children of the value `f` returns are
    /// rewritten next.
    pub fn transform_down(&self, mut f: impl FnMut(&Path, &Json) -> Json) -> Json {
        transform_down_at(self, &mut Path::root(), &mut f)
    }

    /// Renames every object key. `f` receives the path of the object
    /// holding the key.
    pub fn transform_keys(&self, mut f: impl FnMut(&Path, &str) -> String) -> Json {
        transform_keys_at(self, &mut Path::root(), &mut f)
    }

    // ── Canonicalization ──────────────────────────────────────────────────

    /// Sorts object entries by key at every depth. Duplicates keep their
    /// relative order.
    pub fn sort_keys(&self) -> Json {
        self.transform_up(|_, node| match node {
            Json::Object(entries) => {
                let mut sorted = entries.clone();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                Json::Object(sorted)
            }
            other => other.clone(),
        })
    }

    /// Removes `null` object values and array elements at every depth.
    pub fn drop_nulls(&self) -> Json {
        self.prune(Json::is_null)
    }

    /// Removes empty arrays and objects at every depth, including those
    /// that become empty on the way up. The root itself is kept.
    pub fn drop_empty(&self) -> Json {
        self.transform_up(|_, node| match node {
            Json::Array(items) => Json::Array(
                items.iter().filter(|v| !is_empty_container(v)).cloned().collect(),
            ),
            Json::Object(entries) => Json::Object(
                entries
                    .iter()
                    .filter(|(_, v)| !is_empty_container(v))
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        })
    }

    /// `drop_nulls`, then `drop_empty`, then `sort_keys`.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let doc = Json::parse(r#"{"b": {"x": null}, "a": [null, {}], "c": 1}"#).unwrap();
    /// assert_eq!(doc.normalize().to_string(), r#"{"c":1}"#);
    /// ```
    pub fn normalize(&self) -> Json {
        self.drop_nulls().drop_empty().sort_keys()
    }

    // ── Key/value flattening ──────────────────────────────────────────────

    /// Every leaf and empty container with its path, in document order.
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let doc = Json::parse(r#"{"a": [1, {}], "b": "x"}"#).unwrap();
    /// let kv: Vec<String> = doc.to_kv().iter().map(|(p, v)| format!("{p}={v}")).collect();
    /// assert_eq!(kv, [".a[0]=1", ".a[1]={}", ".b=\"x\""]);
    /// assert_eq!(Json::from_kv(doc.to_kv()).unwrap(), doc);
    /// ```
    pub fn to_kv(&self) -> Vec<(Path, Json)> {
        self.fold_down(Vec::new(), |path, value, mut acc| {
            let leaf = match value {
                Json::Array(items) => items.is_empty(),
                Json::Object(entries) => entries.is_empty(),
                _ => true,
            };
            if leaf {
                acc.push((path.clone(), value.clone()));
            }
            acc
        })
    }

    /// Rebuilds a tree by inserting each pair in turn. `Field` steps create
    /// objects and `AtIndex` steps create arrays; an index must address an
    /// existing element or the next free slot. No pairs give `Null`.
    pub fn from_kv(pairs: impl IntoIterator<Item = (Path, Json)>) -> Result<Json, JsonError> {
        let mut root = Json::Null;
        for (n, (path, value)) in pairs.into_iter().enumerate() {
            kv_insert(&mut root, n == 0, path.nodes(), value, &mut Path::root())?;
        }
        Ok(root)
    }

    /// Like [`from_kv`](Self::from_kv), panicking on conflicting pairs.
    pub fn expect_from_kv(pairs: impl IntoIterator<Item = (Path, Json)>) -> Json {
        match Json::from_kv(pairs) {
            Ok(json) => json,
            Err(err) => panic!("{err}"),
        }
    }
}

fn kv_insert(
    target: &mut Json,
    fresh: bool,
    nodes: &[PathNode],
    value: Json,
    trail: &mut Path,
) -> Result<(), JsonError> {
    let Some((node, rest)) = nodes.split_first() else {
        *target = value;
        return Ok(());
    };
    match node {
        PathNode::Field(key) | PathNode::AtKey(key) => {
            if fresh {
                *target = Json::Object(Vec::new());
            }
            let found = target.json_type();
            let Json::Object(entries) = target else {
                let message = format!("expected an object, found {found}");
                return Err(JsonError::at(trail.clone(), message));
            };
            trail.push(PathNode::Field(key.clone()));
            let result = match entries.iter().position(|(k, _)| k == key) {
                Some(i) => kv_insert(&mut entries[i].1, false, rest, value, trail),
                None => {
                    entries.push((key.clone(), Json::Null));
                    let last = entries.len() - 1;
                    kv_insert(&mut entries[last].1, true, rest, value, trail)
                }
            };
            trail.pop();
            result
        }
        PathNode::AtIndex(i) => {
            if fresh {
                *target = Json::Array(Vec::new());
            }
            let found = target.json_type();
            let Json::Array(items) = target else {
                let message = format!("expected an array, found {found}");
                return Err(JsonError::at(trail.clone(), message));
            };
            let len = items.len();
            if *i > len {
                return Err(JsonError::at(
                    trail.clone(),
                    format!("index {i} skips past the end of an array of length {len}"),
                ));
            }
            trail.push(PathNode::AtIndex(*i));
            let result = if *i == len {
                items.push(Json::Null);
                kv_insert(&mut items[len], true, rest, value, trail)
            } else {
                kv_insert(&mut items[*i], false, rest, value, trail)
            };
            trail.pop();
            result
        }
        wildcard => Err(JsonError::at(
            trail.clone(),
            format!("cannot rebuild a tree from wildcard step {wildcard}"),
        )),
    }
}
