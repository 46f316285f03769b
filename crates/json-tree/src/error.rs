//! The structured error of the core.

use std::ops::Add;

use json_tree_path::{ParsePathError, Path, PathNode};
use thiserror::Error;

/// A message plus the path of the location it concerns.
///
/// Recursive traversals build the path while unwinding: the innermost frame
/// creates the error at the root and every enclosing frame prepends its own
/// step.
///
/// ```
/// use json_tree::JsonError;
///
/// let err = JsonError::new("expected a number").at_index(2).at_field("items");
/// assert_eq!(err.to_string(), "expected a number at .items[2]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{message} at {path}")]
pub struct JsonError {
    /// What went wrong.
    pub message: String,
    /// Where it went wrong, from the root of the value being processed.
    pub path: Path,
}

impl JsonError {
    /// An error at the root; enclosing frames add their steps with
    /// [`at_field`](Self::at_field) and [`at_index`](Self::at_index).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Path::root(),
        }
    }

    /// An error at an already known location.
    pub fn at(path: Path, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Prepends an object field step to the path.
    pub fn at_field(self, name: impl Into<String>) -> Self {
        self.at_node(PathNode::Field(name.into()))
    }

    /// Prepends an array index step to the path.
    pub fn at_index(self, index: usize) -> Self {
        self.at_node(PathNode::AtIndex(index))
    }

    /// Prepends any path step.
    pub fn at_node(mut self, node: PathNode) -> Self {
        self.path.prepend(node);
        self
    }

    /// Joins both messages with `"; "`, keeping this error's path.
    pub fn combine(self, other: JsonError) -> Self {
        Self {
            message: format!("{}; {}", self.message, other.message),
            path: self.path,
        }
    }
}

impl Add for JsonError {
    type Output = JsonError;

    fn add(self, rhs: JsonError) -> JsonError {
        self.combine(rhs)
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        JsonError::new(err.to_string())
    }
}

impl From<ParsePathError> for JsonError {
    fn from(err: ParsePathError) -> Self {
        JsonError::new(format!("invalid path: {err}"))
    }
}
