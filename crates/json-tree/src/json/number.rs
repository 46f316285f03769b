//! Arbitrary-precision JSON numbers.
//!
//! A [`JsonNumber`] keeps the number's text exactly as written. When the value
//! fits a 96-bit [`Decimal`] (up to 28 significant digits) it is also held in
//! decimal form, which gives fast comparison and exact arithmetic. Larger or
//! finer values stay text-only: they still compare exactly, through their
//! significant digits and decimal exponent, but reject arithmetic.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::JsonError;

#[derive(Clone)]
pub struct JsonNumber {
    text: String,
    decimal: Option<Decimal>,
}

impl JsonNumber {
    /// Parse a number from JSON number text.
    ///
    /// ```
    /// use json_tree::JsonNumber;
    ///
    /// let n = JsonNumber::parse("12.50").unwrap();
    /// assert_eq!(n.as_str(), "12.50");
    /// assert_eq!(n, JsonNumber::parse("1.25e1").unwrap());
    /// assert!(JsonNumber::parse("012").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, JsonError> {
        if !is_json_number(text) {
            return Err(JsonError::new(format!("invalid number literal {text:?}")));
        }
        Ok(Self {
            text: text.to_string(),
            decimal: exact_decimal(text),
        })
    }

    /// The number's text, exactly as constructed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The exact decimal value, or `None` when it exceeds decimal precision.
    pub fn as_decimal(&self) -> Option<Decimal> {
        self.decimal
    }

    /// Returns true if the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.decimal.is_some_and(|d| d.fract().is_zero())
    }

    /// The value as an `i32`, if it is an integer in range.
    pub fn as_i32(&self) -> Option<i32> {
        self.integral()?.to_i32()
    }

    /// The value as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        self.integral()?.to_i64()
    }

    /// The value as a `u64`, if it is a non-negative integer in range.
    pub fn as_u64(&self) -> Option<u64> {
        self.integral()?.to_u64()
    }

    /// The nearest `f64`. Values beyond `f64` range come back infinite.
    pub fn as_f64(&self) -> f64 {
        self.text.parse().unwrap_or(f64::NAN)
    }

    /// Exact sum, or `None` if either side or the result exceeds decimal
    /// precision.
    pub fn checked_add(&self, other: &JsonNumber) -> Option<JsonNumber> {
        let sum = self.decimal?.checked_add(other.decimal?)?;
        Some(JsonNumber::from(sum))
    }

    /// Exact difference `self - other`, under the same limits as
    /// [`checked_add`](Self::checked_add).
    pub fn checked_sub(&self, other: &JsonNumber) -> Option<JsonNumber> {
        let difference = self.decimal?.checked_sub(other.decimal?)?;
        Some(JsonNumber::from(difference))
    }

    fn integral(&self) -> Option<Decimal> {
        self.decimal.filter(|d| d.fract().is_zero())
    }

    fn scientific(&self) -> Scientific {
        Scientific::of(&self.text)
    }
}

// ── Construction ──────────────────────────────────────────────────────────

impl From<Decimal> for JsonNumber {
    fn from(d: Decimal) -> Self {
        Self {
            text: d.to_string(),
            decimal: Some(d),
        }
    }
}

macro_rules! integer_numbers {
    ($($t:ty),*) => {
        $(
            impl From<$t> for JsonNumber {
                fn from(n: $t) -> Self {
                    let text = n.to_string();
                    let decimal = Decimal::from_str_exact(&text).ok();
                    Self { text, decimal }
                }
            }
        )*
    };
}

integer_numbers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TryFrom<f64> for JsonNumber {
    type Error = JsonError;

    /// Finite floats only. The text is Rust's shortest round-trip form.
    fn try_from(f: f64) -> Result<Self, Self::Error> {
        if !f.is_finite() {
            return Err(JsonError::new(format!("{f} is not representable as a JSON number")));
        }
        JsonNumber::parse(&format!("{f}"))
    }
}

impl FromStr for JsonNumber {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonNumber::parse(s)
    }
}

// ── Equality and ordering ─────────────────────────────────────────────────

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for JsonNumber {}

impl Ord for JsonNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.decimal, other.decimal) {
            return a.cmp(&b);
        }
        self.scientific().cmp(&other.scientific())
    }
}

impl PartialOrd for JsonNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for JsonNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scientific().hash(state);
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonNumber({})", self.text)
    }
}

// ── Grammar ───────────────────────────────────────────────────────────────

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

/// A decimal value as `0.<digits> * 10^exponent`, with no leading or
/// trailing zeros in `digits`. Zero has no digits and is never negative.
#[derive(Debug, PartialEq, Eq, Hash)]
struct Scientific {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl Scientific {
    /// Reads text already accepted by [`is_json_number`].
    fn of(text: &str) -> Self {
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => (mantissa, parse_exponent(exponent)),
            None => (unsigned, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all = format!("{int}{frac}");
        let leading = all.len() - all.trim_start_matches('0').len();
        let digits = all.trim_matches('0').to_string();
        if digits.is_empty() {
            return Self {
                negative: false,
                digits,
                exponent: 0,
            };
        }
        let point = int.len() as i64 - leading as i64;
        Self {
            negative,
            digits,
            exponent: point.saturating_add(exponent),
        }
    }

    fn signum(&self) -> i8 {
        match (self.digits.is_empty(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }
}

impl Ord for Scientific {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = self
            .exponent
            .cmp(&other.exponent)
            .then_with(|| self.digits.cmp(&other.digits));
        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Scientific {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Exponents too long for `i64` saturate; no JSON text gets near them.
fn parse_exponent(text: &str) -> i64 {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = digits.trim_start_matches('0');
    let magnitude = if digits.len() > 18 {
        i64::MAX / 2
    } else {
        digits.parse().unwrap_or(0)
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// The decimal form of `text`, if `Decimal` holds it without rounding.
fn exact_decimal(text: &str) -> Option<Decimal> {
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text.replace('E', "e")).ok()?
    } else {
        Decimal::from_str_exact(text).ok()?
    };
    (Scientific::of(&parsed.to_string()) == Scientific::of(text)).then_some(parsed)
}
