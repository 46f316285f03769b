//! Typed object keys.
//!
//! JSON object keys are always strings. `AtKey`/`AtKeys` steps let callers
//! address entries with other key types as long as the type renders to a key
//! string and, for [`FromJsonKey`], parses back from one.

/// A value usable as a JSON object key.
pub trait JsonKey {
    /// The key's text as it appears in a JSON object.
    fn to_json_key(&self) -> String;
}

/// A key type that can be recovered from its JSON key text.
pub trait FromJsonKey: Sized {
    /// Parses key text, or `None` when it is not this type's canonical form.
    fn from_json_key(key: &str) -> Option<Self>;
}

impl JsonKey for str {
    fn to_json_key(&self) -> String {
        self.to_string()
    }
}

impl JsonKey for String {
    fn to_json_key(&self) -> String {
        self.clone()
    }
}

impl FromJsonKey for String {
    fn from_json_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

impl<T: JsonKey + ?Sized> JsonKey for &T {
    fn to_json_key(&self) -> String {
        (**self).to_json_key()
    }
}

impl JsonKey for char {
    fn to_json_key(&self) -> String {
        self.to_string()
    }
}

impl FromJsonKey for char {
    fn from_json_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl JsonKey for bool {
    fn to_json_key(&self) -> String {
        self.to_string()
    }
}

impl FromJsonKey for bool {
    fn from_json_key(key: &str) -> Option<Self> {
        match key {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! integer_keys {
    ($($t:ty),*) => {
        $(
            impl JsonKey for $t {
                fn to_json_key(&self) -> String {
                    self.to_string()
                }
            }

            impl FromJsonKey for $t {
                fn from_json_key(key: &str) -> Option<Self> {
                    // Reject "+1" and "01" so that parsing inverts rendering.
                    let parsed: $t = key.parse().ok()?;
                    (parsed.to_string() == key).then_some(parsed)
                }
            }
        )*
    };
}

integer_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_round_trip() {
        assert_eq!(42u32.to_json_key(), "42");
        assert_eq!(u32::from_json_key("42"), Some(42));
        assert_eq!((-7i64).to_json_key(), "-7");
        assert_eq!(i64::from_json_key("-7"), Some(-7));
    }

    #[test]
    fn non_canonical_integers_are_rejected() {
        assert_eq!(u32::from_json_key("007"), None);
        assert_eq!(i32::from_json_key("+1"), None);
        assert_eq!(u8::from_json_key("256"), None);
    }

    #[test]
    fn chars_and_bools() {
        assert_eq!(char::from_json_key("x"), Some('x'));
        assert_eq!(char::from_json_key("xy"), None);
        assert_eq!(bool::from_json_key("true"), Some(true));
        assert_eq!(bool::from_json_key("yes"), None);
        assert_eq!(true.to_json_key(), "true");
    }

    #[test]
    fn strings_pass_through() {
        assert_eq!("a b".to_json_key(), "a b");
        assert_eq!(String::from_json_key("a b"), Some("a b".to_string()));
    }
}
