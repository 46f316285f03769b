//! Path descriptors for `json-tree`.
//!
//! A [`Path`] is a flat, ordered list of [`PathNode`] steps. Paths are plain
//! data: they compose by concatenation, print to a compact text form and
//! parse back from it.
//!
//! # Example
//!
//! ```
//! use json_tree_path::{Path, PathNode};
//!
//! let path = Path::root().field("users").elements().field("name");
//! assert_eq!(path.to_string(), ".users[*].name");
//! assert!(path.has_wildcards());
//!
//! let parsed: Path = ".users[*].name".parse().unwrap();
//! assert_eq!(parsed, path);
//! assert_eq!(parsed.last(), Some(&PathNode::Field("name".to_string())));
//! ```

use std::fmt;

pub mod key;
pub mod parse;
pub mod types;

pub use key::{FromJsonKey, JsonKey};
pub use parse::{parse_path, ParsePathError};
pub use types::{Path, PathNode};

/// Characters allowed in an unquoted field name.
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

/// Returns true if `name` prints without quotes.
///
/// ```
/// use json_tree_path::is_plain_name;
///
/// assert!(is_plain_name("user_id"));
/// assert!(!is_plain_name("two words"));
/// assert!(!is_plain_name(""));
/// ```
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Writes `s` as a double-quoted string with JSON escapes.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Returns true if `parent` is a strict ancestor of `child`.
///
/// ```
/// use json_tree_path::{is_child, Path};
///
/// let parent = Path::root().field("a");
/// let child = Path::root().field("a").index(0);
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// ```
pub fn is_child(parent: &Path, child: &Path) -> bool {
    parent.is_parent_of(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_then_parse_is_identity_for_single_index_nodes() {
        let path = Path::root().field("a b").index(2).map_keys().at_key("x\"y").elements();
        let text = path.to_string();
        assert_eq!(parse_path(&text).unwrap(), path);
    }

    #[test]
    fn control_characters_are_escaped() {
        let path = Path::root().field("\u{1}");
        assert_eq!(path.to_string(), r#"."\u0001""#);
        assert_eq!(parse_path(&path.to_string()).unwrap(), path);
    }
}
