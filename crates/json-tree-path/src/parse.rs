//! Parser for the textual path syntax.
//!
//! | syntax          | node                  |
//! |-----------------|-----------------------|
//! | `.` or empty    | root                  |
//! | `.name`         | `Field("name")`       |
//! | `."any text"`   | `Field("any text")`   |
//! | `[3]`           | `AtIndex(3)`          |
//! | `[0,2]`         | `AtIndices([0, 2])`   |
//! | `[*]`           | `Elements`            |
//! | `{*}`           | `MapValues`           |
//! | `{*:}`          | `MapKeys`             |
//! | `{"k"}`         | `AtKey("k")`          |
//! | `{"a","b"}`     | `AtKeys(["a", "b"])`  |

use std::str::FromStr;

use thiserror::Error;

use crate::types::{Path, PathNode};

/// Malformed path text. Offsets are byte positions in the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParsePathError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unexpected end of path at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("empty field name at offset {offset}")]
    EmptyField { offset: usize },
    #[error("invalid index at offset {offset}")]
    InvalidIndex { offset: usize },
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
}

/// Parse a path from its textual form.
///
/// # Example
///
/// ```
/// use json_tree_path::{parse_path, Path};
///
/// let path = parse_path(".users[*].name").unwrap();
/// assert_eq!(path, Path::root().field("users").elements().field("name"));
/// assert_eq!(parse_path(".").unwrap(), Path::root());
/// ```
pub fn parse_path(input: &str) -> Result<Path, ParsePathError> {
    if input.is_empty() || input == "." {
        return Ok(Path::root());
    }
    let mut cursor = Cursor { src: input, pos: 0 };
    let mut nodes = Vec::new();
    while let Some(c) = cursor.peek() {
        let node = match c {
            '.' => {
                cursor.bump();
                cursor.field()?
            }
            '[' => {
                cursor.bump();
                cursor.index_list()?
            }
            '{' => {
                cursor.bump();
                cursor.key_list()?
            }
            other => {
                return Err(ParsePathError::UnexpectedChar {
                    found: other,
                    offset: cursor.pos,
                })
            }
        };
        nodes.push(node);
    }
    Ok(Path::new(nodes))
}

impl FromStr for Path {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// `found` was just consumed.
    fn unexpected(&self, found: char) -> ParsePathError {
        ParsePathError::UnexpectedChar {
            found,
            offset: self.pos - found.len_utf8(),
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParsePathError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(self.unexpected(found)),
            None => Err(ParsePathError::UnexpectedEnd { offset: self.pos }),
        }
    }

    fn field(&mut self) -> Result<PathNode, ParsePathError> {
        if self.peek() == Some('"') {
            return Ok(PathNode::Field(self.quoted()?));
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !crate::is_name_char(c) {
                break;
            }
            self.bump();
        }
        if start == self.pos {
            return Err(ParsePathError::EmptyField { offset: start });
        }
        Ok(PathNode::Field(self.src[start..self.pos].to_string()))
    }

    fn index_list(&mut self) -> Result<PathNode, ParsePathError> {
        if self.peek() == Some('*') {
            self.bump();
            self.expect(']')?;
            return Ok(PathNode::Elements);
        }
        let mut indices = vec![self.index()?];
        loop {
            match self.bump() {
                Some(']') => break,
                Some(',') => indices.push(self.index()?),
                Some(found) => return Err(self.unexpected(found)),
                None => return Err(ParsePathError::UnexpectedEnd { offset: self.pos }),
            }
        }
        Ok(match indices.as_slice() {
            [single] => PathNode::AtIndex(*single),
            _ => PathNode::AtIndices(indices),
        })
    }

    fn index(&mut self) -> Result<usize, ParsePathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| ParsePathError::InvalidIndex { offset: start })
    }

    fn key_list(&mut self) -> Result<PathNode, ParsePathError> {
        if self.peek() == Some('*') {
            self.bump();
            return match self.bump() {
                Some('}') => Ok(PathNode::MapValues),
                Some(':') => {
                    self.expect('}')?;
                    Ok(PathNode::MapKeys)
                }
                Some(found) => Err(self.unexpected(found)),
                None => Err(ParsePathError::UnexpectedEnd { offset: self.pos }),
            };
        }
        let mut keys = vec![self.quoted()?];
        loop {
            match self.bump() {
                Some('}') => break,
                Some(',') => keys.push(self.quoted()?),
                Some(found) => return Err(self.unexpected(found)),
                None => return Err(ParsePathError::UnexpectedEnd { offset: self.pos }),
            }
        }
        Ok(match keys.len() {
            1 => PathNode::AtKey(keys.remove(0)),
            _ => PathNode::AtKeys(keys),
        })
    }

    /// A double-quoted string with JSON escapes. Unpaired surrogate escapes
    /// decode to U+FFFD.
    fn quoted(&mut self) -> Result<String, ParsePathError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump() {
                None => return Err(ParsePathError::UnexpectedEnd { offset }),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('/') => out.push('/'),
                    Some('b') => out.push('\u{0008}'),
                    Some('f') => out.push('\u{000c}'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let unit = self.hex4(offset)?;
                        out.push(self.code_point(unit, offset)?);
                    }
                    _ => return Err(ParsePathError::InvalidEscape { offset }),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn hex4(&mut self, offset: usize) -> Result<u16, ParsePathError> {
        let end = self.pos + 4;
        let digits = self.src.get(self.pos..end).ok_or(ParsePathError::InvalidEscape { offset })?;
        let unit = u16::from_str_radix(digits, 16)
            .map_err(|_| ParsePathError::InvalidEscape { offset })?;
        self.pos = end;
        Ok(unit)
    }

    fn code_point(&mut self, unit: u16, offset: usize) -> Result<char, ParsePathError> {
        match unit {
            0xD800..=0xDBFF => {
                if self.src[self.pos..].starts_with("\\u") {
                    let save = self.pos;
                    self.pos += 2;
                    let low = self.hex4(offset)?;
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let high = (unit as u32) - 0xD800;
                        let c = 0x10000 + (high << 10) + ((low as u32) - 0xDC00);
                        return Ok(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    self.pos = save;
                }
                Ok(char::REPLACEMENT_CHARACTER)
            }
            0xDC00..=0xDFFF => Ok(char::REPLACEMENT_CHARACTER),
            _ => Ok(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_and_indices() {
        let path = parse_path(".a.b[3]").unwrap();
        assert_eq!(path, Path::root().field("a").field("b").index(3));
    }

    #[test]
    fn parses_wildcards() {
        assert_eq!(parse_path("[*]").unwrap(), Path::root().elements());
        assert_eq!(parse_path("{*}").unwrap(), Path::root().map_values());
        assert_eq!(parse_path("{*:}").unwrap(), Path::root().map_keys());
        assert_eq!(parse_path("[0,2,5]").unwrap(), Path::root().indices([0, 2, 5]));
    }

    #[test]
    fn parses_keys() {
        assert_eq!(parse_path(r#"{"k"}"#).unwrap(), Path::root().at_key("k"));
        assert_eq!(parse_path(r#"{"a","b"}"#).unwrap(), Path::root().at_keys(["a", "b"]));
    }

    #[test]
    fn parses_quoted_field_with_escapes() {
        let path = parse_path(r#"."a\"b\n\u0041""#).unwrap();
        assert_eq!(path, Path::root().field("a\"b\nA"));
    }

    #[test]
    fn lone_surrogate_escape_becomes_replacement() {
        let path = parse_path(r#"{"x\ud800y"}"#).unwrap();
        assert_eq!(path, Path::root().at_key("x\u{FFFD}y"));
    }

    #[test]
    fn surrogate_pair_escape_decodes() {
        let path = parse_path(r#"."\ud83d\ude00""#).unwrap();
        assert_eq!(path, Path::root().field("\u{1F600}"));
    }

    #[test]
    fn errors_carry_offsets() {
        assert_eq!(parse_path("a"), Err(ParsePathError::UnexpectedChar { found: 'a', offset: 0 }));
        assert_eq!(parse_path(".a."), Err(ParsePathError::EmptyField { offset: 3 }));
        assert_eq!(parse_path("[x]"), Err(ParsePathError::InvalidIndex { offset: 1 }));
        assert_eq!(parse_path("[1"), Err(ParsePathError::UnexpectedEnd { offset: 2 }));
        assert_eq!(parse_path(r#"{"k"#), Err(ParsePathError::UnexpectedEnd { offset: 3 }));
    }

    #[test]
    fn from_str_delegates() {
        let path: Path = ".a[*]".parse().unwrap();
        assert_eq!(path, Path::root().field("a").elements());
    }
}
