//! Type definitions for path descriptors.

use std::fmt;
use std::ops::Add;

use crate::key::JsonKey;

/// A single navigation step.
///
/// `Field`/`AtIndex`/`AtKey` address at most one location. The remaining
/// variants are wildcards and may fan out to many locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathNode {
    /// Value of an object entry, by name.
    Field(String),
    /// Array element, bounds-checked.
    AtIndex(usize),
    /// Several array elements, in the listed order.
    AtIndices(Vec<usize>),
    /// Every array element.
    Elements,
    /// Every object value, in insertion order.
    MapValues,
    /// Every object key, seen as a string value.
    MapKeys,
    /// Object entry addressed by a typed key rendered to its JSON key text.
    AtKey(String),
    /// Several object entries addressed by typed keys.
    AtKeys(Vec<String>),
}

impl PathNode {
    /// Returns true if this step can match more than one location.
    pub fn is_wildcard(&self) -> bool {
        matches!(
            self,
            PathNode::AtIndices(_)
                | PathNode::Elements
                | PathNode::MapValues
                | PathNode::MapKeys
                | PathNode::AtKeys(_)
        )
    }

    /// The object key this step addresses, for `Field` and `AtKey`.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathNode::Field(name) | PathNode::AtKey(name) => Some(name),
            _ => None,
        }
    }

    /// The array index this step addresses, for `AtIndex`.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathNode::AtIndex(i) => Some(*i),
            _ => None,
        }
    }
}

/// An ordered list of navigation steps. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self { nodes: Vec::new() }
    }

    /// A path made of `nodes`, in order.
    pub fn new(nodes: Vec<PathNode>) -> Self {
        Self { nodes }
    }

    /// The steps, first to last.
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Consumes the path, returning its steps.
    pub fn into_nodes(self) -> Vec<PathNode> {
        self.nodes
    }

    /// Returns true for the empty path.
    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Same as [`is_root`](Self::is_root).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the steps, first to last.
    pub fn iter(&self) -> std::slice::Iter<'_, PathNode> {
        self.nodes.iter()
    }

    /// The final step, or `None` for the root.
    pub fn last(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// Returns true if any step is a wildcard.
    pub fn has_wildcards(&self) -> bool {
        self.nodes.iter().any(PathNode::is_wildcard)
    }

    // ── Builders ──────────────────────────────────────────────────────────

    /// Appends `node`, returning the extended path.
    pub fn child(mut self, node: PathNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends a [`PathNode::Field`] step.
    pub fn field(self, name: impl Into<String>) -> Self {
        self.child(PathNode::Field(name.into()))
    }

    /// Appends a [`PathNode::AtIndex`] step.
    pub fn index(self, index: usize) -> Self {
        self.child(PathNode::AtIndex(index))
    }

    /// Appends a [`PathNode::AtIndices`] step.
    pub fn indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.child(PathNode::AtIndices(indices.into_iter().collect()))
    }

    /// Appends the [`PathNode::Elements`] wildcard.
    pub fn elements(self) -> Self {
        self.child(PathNode::Elements)
    }

    /// Appends the [`PathNode::MapValues`] wildcard.
    pub fn map_values(self) -> Self {
        self.child(PathNode::MapValues)
    }

    /// Appends the [`PathNode::MapKeys`] wildcard.
    pub fn map_keys(self) -> Self {
        self.child(PathNode::MapKeys)
    }

    /// Addresses an object entry by a typed key.
    ///
    /// ```
    /// use json_tree_path::{Path, PathNode};
    ///
    /// let path = Path::root().at_key(&42u32);
    /// assert_eq!(path.nodes(), &[PathNode::AtKey("42".to_string())]);
    /// ```
    pub fn at_key<K: JsonKey + ?Sized>(self, key: &K) -> Self {
        self.child(PathNode::AtKey(key.to_json_key()))
    }

    /// Addresses several object entries by typed keys, in the given order.
    pub fn at_keys<'a, K, I>(self, keys: I) -> Self
    where
        K: JsonKey + ?Sized + 'a,
        I: IntoIterator<Item = &'a K>,
    {
        self.child(PathNode::AtKeys(keys.into_iter().map(|k| k.to_json_key()).collect()))
    }

    /// Appends `node` in place.
    pub fn push(&mut self, node: PathNode) {
        self.nodes.push(node);
    }

    /// Removes and returns the last step.
    pub fn pop(&mut self) -> Option<PathNode> {
        self.nodes.pop()
    }

    /// Inserts `node` in front of every other step.
    pub fn prepend(&mut self, node: PathNode) {
        self.nodes.insert(0, node);
    }

    /// Concatenates two paths.
    pub fn join(&self, other: &Path) -> Path {
        let mut nodes = Vec::with_capacity(self.nodes.len() + other.nodes.len());
        nodes.extend_from_slice(&self.nodes);
        nodes.extend_from_slice(&other.nodes);
        Path { nodes }
    }

    // ── Relations ─────────────────────────────────────────────────────────

    /// The path without its last step, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        self.split_last().map(|(_, parent)| parent)
    }

    /// Splits off the last step.
    pub fn split_last(&self) -> Option<(&PathNode, Path)> {
        let (last, init) = self.nodes.split_last()?;
        Some((last, Path { nodes: init.to_vec() }))
    }

    /// Returns true if `prefix` equals this path or is an ancestor of it.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.nodes.starts_with(&prefix.nodes)
    }

    /// Returns true if `self` is a strict ancestor of `other`.
    pub fn is_parent_of(&self, other: &Path) -> bool {
        other.nodes.len() > self.nodes.len() && other.starts_with(self)
    }
}

impl From<Vec<PathNode>> for Path {
    fn from(nodes: Vec<PathNode>) -> Self {
        Path { nodes }
    }
}

impl From<PathNode> for Path {
    fn from(node: PathNode) -> Self {
        Path { nodes: vec![node] }
    }
}

impl FromIterator<PathNode> for Path {
    fn from_iter<I: IntoIterator<Item = PathNode>>(iter: I) -> Self {
        Path { nodes: iter.into_iter().collect() }
    }
}

impl Extend<PathNode> for Path {
    fn extend<I: IntoIterator<Item = PathNode>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl IntoIterator for Path {
    type Item = PathNode;
    type IntoIter = std::vec::IntoIter<PathNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathNode;
    type IntoIter = std::slice::Iter<'a, PathNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Add for Path {
    type Output = Path;

    fn add(mut self, rhs: Path) -> Path {
        self.nodes.extend(rhs.nodes);
        self
    }
}

impl Add<PathNode> for Path {
    type Output = Path;

    fn add(self, rhs: PathNode) -> Path {
        self.child(rhs)
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Field(name) => {
                f.write_str(".")?;
                if crate::is_plain_name(name) {
                    f.write_str(name)
                } else {
                    crate::write_quoted(f, name)
                }
            }
            PathNode::AtIndex(i) => write!(f, "[{i}]"),
            PathNode::AtIndices(indices) => {
                f.write_str("[")?;
                for (n, i) in indices.iter().enumerate() {
                    if n > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{i}")?;
                }
                f.write_str("]")
            }
            PathNode::Elements => f.write_str("[*]"),
            PathNode::MapValues => f.write_str("{*}"),
            PathNode::MapKeys => f.write_str("{*:}"),
            PathNode::AtKey(key) => {
                f.write_str("{")?;
                crate::write_quoted(f, key)?;
                f.write_str("}")
            }
            PathNode::AtKeys(keys) => {
                f.write_str("{")?;
                for (n, key) in keys.iter().enumerate() {
                    if n > 0 {
                        f.write_str(",")?;
                    }
                    crate::write_quoted(f, key)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return f.write_str(".");
        }
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_dot() {
        assert_eq!(Path::root().to_string(), ".");
    }

    #[test]
    fn display_every_node_kind() {
        let path = Path::root()
            .field("a")
            .index(0)
            .indices([1, 2])
            .elements()
            .map_values()
            .map_keys()
            .at_key("k")
            .at_keys(["x", "y"]);
        assert_eq!(path.to_string(), r#".a[0][1,2][*]{*}{*:}{"k"}{"x","y"}"#);
    }

    #[test]
    fn display_quotes_awkward_field_names() {
        let path = Path::root().field("a b").field("q\"x");
        assert_eq!(path.to_string(), r#"."a b"."q\"x""#);
    }

    #[test]
    fn join_concatenates() {
        let a = Path::root().field("a");
        let b = Path::root().index(1);
        assert_eq!(a.join(&b), Path::root().field("a").index(1));
        assert_eq!(a.clone() + b.clone(), a.join(&b));
    }

    #[test]
    fn parent_and_split_last() {
        let path = Path::root().field("a").index(3);
        assert_eq!(path.parent(), Some(Path::root().field("a")));
        let (last, init) = path.split_last().unwrap();
        assert_eq!(last, &PathNode::AtIndex(3));
        assert_eq!(init, Path::root().field("a"));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn prefix_relations() {
        let a = Path::root().field("a");
        let ab = a.clone().field("b");
        assert!(ab.starts_with(&a));
        assert!(ab.starts_with(&Path::root()));
        assert!(a.is_parent_of(&ab));
        assert!(!ab.is_parent_of(&a));
        assert!(!a.is_parent_of(&a));
    }

    #[test]
    fn wildcard_detection() {
        assert!(!Path::root().field("a").index(0).has_wildcards());
        assert!(Path::root().field("a").elements().has_wildcards());
        assert!(Path::root().at_keys(["x"]).has_wildcards());
    }
}
