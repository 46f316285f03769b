//! Deep merge of two trees.

use std::fmt;
use std::sync::Arc;

use json_tree_path::{Path, PathNode};

use super::Json;

type MergeFn = dyn Fn(&Path, &Json, &Json) -> Json + Send + Sync;
type RecurseFn = dyn Fn(&Path, &Json, &Json) -> bool + Send + Sync;

/// How [`Json::merge_with`] combines two values.
#[derive(Clone, Default)]
pub enum MergeStrategy {
    /// Objects merge key by key and arrays index by index, recursively. Any
    /// other pairing takes the right value.
    #[default]
    Auto,
    /// Like `Auto` at the root only; children on the right replace children
    /// on the left wholesale.
    Shallow,
    /// Like `Auto`, except that arrays concatenate.
    Concat,
    /// `merge` decides the value wherever both sides hold a value and the
    /// merge does not recurse. `recurse` decides whether two containers of
    /// the same kind are merged child by child; without it only object
    /// pairs recurse.
    Custom {
        merge: Arc<MergeFn>,
        recurse: Option<Arc<RecurseFn>>,
    },
}

impl MergeStrategy {
    /// Recurses into pairs of objects and calls `merge` on every other pair.
    pub fn custom(merge: impl Fn(&Path, &Json, &Json) -> Json + Send + Sync + 'static) -> Self {
        MergeStrategy::Custom {
            merge: Arc::new(merge),
            recurse: None,
        }
    }

    /// Like [`custom`](Self::custom), but recurses into a pair of same-typed
    /// containers only where `recurse` returns true.
    pub fn custom_with_recursion(
        merge: impl Fn(&Path, &Json, &Json) -> Json + Send + Sync + 'static,
        recurse: impl Fn(&Path, &Json, &Json) -> bool + Send + Sync + 'static,
    ) -> Self {
        MergeStrategy::Custom {
            merge: Arc::new(merge),
            recurse: Some(Arc::new(recurse)),
        }
    }
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Auto => f.write_str("Auto"),
            MergeStrategy::Shallow => f.write_str("Shallow"),
            MergeStrategy::Concat => f.write_str("Concat"),
            MergeStrategy::Custom { recurse, .. } => f
                .debug_struct("Custom")
                .field("recurse", &recurse.is_some())
                .finish_non_exhaustive(),
        }
    }
}

impl Json {
    /// Merge with [`MergeStrategy::Auto`].
    ///
    /// ```
    /// use json_tree::Json;
    ///
    /// let left = Json::parse(r#"{"a": {"x": 1}, "k": [1, 2, 3]}"#).unwrap();
    /// let right = Json::parse(r#"{"a": {"y": 2}, "k": [9]}"#).unwrap();
    /// let merged = left.merge(&right);
    /// assert_eq!(merged, Json::parse(r#"{"a": {"x": 1, "y": 2}, "k": [9, 2, 3]}"#).unwrap());
    /// ```
    pub fn merge(&self, other: &Json) -> Json {
        self.merge_with(other, &MergeStrategy::Auto)
    }

    /// Merges `other` into `self` using `strategy`.
    pub fn merge_with(&self, other: &Json, strategy: &MergeStrategy) -> Json {
        merge_at(&mut Path::root(), self, other, strategy)
    }
}

fn merge_at(path: &mut Path, left: &Json, right: &Json, strategy: &MergeStrategy) -> Json {
    if let MergeStrategy::Shallow = strategy {
        if !path.is_root() {
            return right.clone();
        }
    }
    if let MergeStrategy::Custom { merge, recurse } = strategy {
        let same_container = matches!(
            (left, right),
            (Json::Object(_), Json::Object(_)) | (Json::Array(_), Json::Array(_))
        );
        let descend = same_container
            && match recurse {
                Some(recurse) => recurse(path, left, right),
                None => left.is_object(),
            };
        if !descend {
            return merge(path, left, right);
        }
    }
    match (left, right) {
        (Json::Object(l), Json::Object(r)) => merge_objects(path, l, r, strategy),
        (Json::Array(l), Json::Array(r)) => {
            if let MergeStrategy::Concat = strategy {
                return Json::Array(l.iter().chain(r).cloned().collect());
            }
            let len = l.len().max(r.len());
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                let merged = match (l.get(i), r.get(i)) {
                    (Some(a), Some(b)) => {
                        path.push(PathNode::AtIndex(i));
                        let merged = merge_at(path, a, b, strategy);
                        path.pop();
                        merged
                    }
                    (Some(only), None) | (None, Some(only)) => only.clone(),
                    (None, None) => break,
                };
                out.push(merged);
            }
            Json::Array(out)
        }
        _ => right.clone(),
    }
}

/// Left order is kept; keys new on the right are appended in right order.
fn merge_objects(
    path: &mut Path,
    left: &[(String, Json)],
    right: &[(String, Json)],
    strategy: &MergeStrategy,
) -> Json {
    let first_right = |key: &str| right.iter().find(|(k, _)| k == key).map(|(_, v)| v);
    let mut out: Vec<(String, Json)> = Vec::with_capacity(left.len() + right.len());
    for (i, (k, v)) in left.iter().enumerate() {
        let is_first = !left[..i].iter().any(|(seen, _)| seen == k);
        let merged = match first_right(k) {
            Some(r) if is_first => {
                path.push(PathNode::Field(k.clone()));
                let merged = merge_at(path, v, r, strategy);
                path.pop();
                merged
            }
            _ => v.clone(),
        };
        out.push((k.clone(), merged));
    }
    for (k, v) in right {
        let known = |entries: &[(String, Json)]| entries.iter().any(|(seen, _)| seen == k);
        if !known(left) && !known(&out[left.len()..]) {
            out.push((k.clone(), v.clone()));
        }
    }
    Json::Object(out)
}
