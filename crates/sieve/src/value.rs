//! Runtime value types for field access and filter options.
//!
//! [`Value`] is what a [`Record`](crate::Record) hands out when the engine asks
//! for a field: a cheap, borrowed view of the data. [`FilterValue`] is the owned
//! counterpart that option groups and filter selections store.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Runtime value of a record field, borrowed from the record.
///
/// # Example
///
/// ```
/// use sieve::{Number, Value};
///
/// struct Book {
///     title: String,
///     pages: u32,
/// }
///
/// fn field<'a>(book: &'a Book, name: &str) -> Value<'a> {
///     match name {
///         "title" => Value::String(&book.title),
///         "pages" => Value::Number(Number::from(book.pages)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or not representable.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts to the owned form, or `None` for a missing field.
    pub fn to_owned_value(&self) -> Option<FilterValue> {
        match self {
            Value::String(s) => Some(FilterValue::Text((*s).to_string())),
            Value::Number(n) => Some(FilterValue::from(*n)),
            Value::Bool(b) => Some(FilterValue::Bool(*b)),
            Value::None => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::None => Ok(()),
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different numeric types go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Integers are compared with floats exactly, without rounding the
    /// integer to `f64`. Returns `None` only when a NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::I64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => {
                compare_int_float(i128::from(b), a).map(Ordering::reverse)
            }
            (Number::F64(a), Number::U64(b)) => {
                compare_int_float(i128::from(b), a).map(Ordering::reverse)
            }
        }
    }
}

fn compare_int_float(int: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    // i128::MIN and i128::MAX + 1 are both exact powers of two in f64.
    if float >= i128::MAX as f64 {
        return Some(Ordering::Less);
    }
    if float < i128::MIN as f64 {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    Some(match int.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        ordering => ordering,
    })
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Owned, hashable form of a field value.
///
/// This is what option groups list and what filter selections hold. Floats
/// compare by bit pattern (with `-0.0` folded into `0.0`) so the type can be
/// `Eq + Hash`. Unsigned integers that fit in `i64` are stored as
/// [`FilterValue::Integer`], so `Number::U64(3)` and `Number::I64(3)` map to
/// the same option.
///
/// Deserializes untagged: `true`, `3`, `2.5`, `"text"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    /// Returns `true` if `value` is the borrowed form of this option.
    ///
    /// Avoids allocating an owned value per record during matching.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (self, value) {
            (FilterValue::Text(a), Value::String(b)) => a == b,
            (FilterValue::Bool(a), Value::Bool(b)) => a == b,
            (_, Value::Number(n)) => *self == FilterValue::from(*n),
            _ => false,
        }
    }

    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a command-line style literal.
    ///
    /// `true`/`false` become booleans, integer and float literals become
    /// numbers, everything else is kept as text.
    pub fn parse_literal(s: &str) -> Self {
        match s {
            "true" => return FilterValue::Bool(true),
            "false" => return FilterValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = s.parse::<i64>() {
            return FilterValue::Integer(n);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return FilterValue::Float(f);
            }
        }
        FilterValue::Text(s.to_string())
    }

    fn float_bits(f: f64) -> u64 {
        if f == 0.0 {
            0.0f64.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FilterValue::Bool(a), FilterValue::Bool(b)) => a == b,
            (FilterValue::Integer(a), FilterValue::Integer(b)) => a == b,
            (FilterValue::Float(a), FilterValue::Float(b)) => {
                Self::float_bits(*a) == Self::float_bits(*b)
            }
            (FilterValue::Text(a), FilterValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FilterValue {}

impl Hash for FilterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FilterValue::Bool(b) => b.hash(state),
            FilterValue::Integer(n) => n.hash(state),
            FilterValue::Float(f) => Self::float_bits(*f).hash(state),
            FilterValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Integer(n) => write!(f, "{}", n),
            FilterValue::Float(n) => write!(f, "{}", n),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Number> for FilterValue {
    fn from(n: Number) -> Self {
        match n {
            Number::I64(n) => FilterValue::Integer(n),
            Number::U64(n) => match i64::try_from(n) {
                Ok(n) => FilterValue::Integer(n),
                Err(_) => FilterValue::Float(n as f64),
            },
            Number::F64(n) => FilterValue::Float(n),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

macro_rules! filter_value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(n: $t) -> Self {
                    FilterValue::from(Number::from(n))
                }
            }
        )*
    };
}

filter_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mixed_numbers_compare_exactly() {
        let big = 1i64 << 53;
        let float = Number::F64(big as f64);
        assert_eq!(Number::I64(big + 1).compare(float), Some(Ordering::Greater));
        assert_eq!(float.compare(Number::I64(big + 1)), Some(Ordering::Less));
        assert_eq!(Number::I64(big).compare(float), Some(Ordering::Equal));
        assert_eq!(
            Number::I64(-5).compare(Number::F64(-5.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(-1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::F64(f64::INFINITY)),
            Some(Ordering::Less)
        );
        assert_eq!(Number::I64(0).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::None.is_none());

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn owned_conversion() {
        assert_eq!(
            Value::String("a").to_owned_value(),
            Some(FilterValue::Text("a".into()))
        );
        assert_eq!(
            Value::Number(Number::U64(3)).to_owned_value(),
            Some(FilterValue::Integer(3))
        );
        assert_eq!(
            Value::Number(Number::U64(u64::MAX)).to_owned_value(),
            Some(FilterValue::Float(u64::MAX as f64))
        );
        assert_eq!(Value::None.to_owned_value(), None);
    }

    #[test]
    fn filter_value_matches_borrowed() {
        assert!(FilterValue::from("foo").matches(&Value::String("foo")));
        assert!(!FilterValue::from("foo").matches(&Value::String("Foo")));
        assert!(FilterValue::from(3u8).matches(&Value::Number(Number::I64(3))));
        assert!(FilterValue::from(true).matches(&Value::Bool(true)));
        assert!(!FilterValue::from("true").matches(&Value::Bool(true)));
        assert!(!FilterValue::from("x").matches(&Value::None));
    }

    #[test]
    fn float_zero_signs_are_one_option() {
        let mut set = HashSet::new();
        set.insert(FilterValue::Float(0.0));
        set.insert(FilterValue::Float(-0.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn integer_and_float_are_distinct() {
        assert_ne!(FilterValue::Integer(1), FilterValue::Float(1.0));
    }

    #[test]
    fn parse_literal_kinds() {
        assert_eq!(FilterValue::parse_literal("true"), FilterValue::Bool(true));
        assert_eq!(FilterValue::parse_literal("42"), FilterValue::Integer(42));
        assert_eq!(FilterValue::parse_literal("2.5"), FilterValue::Float(2.5));
        assert_eq!(
            FilterValue::parse_literal("inf"),
            FilterValue::Text("inf".into())
        );
        assert_eq!(
            FilterValue::parse_literal("foo"),
            FilterValue::Text("foo".into())
        );
    }

    #[test]
    fn deserialize_untagged() {
        let values: Vec<FilterValue> =
            serde_json::from_str(r#"[true, 3, 2.5, "foo"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FilterValue::Bool(true),
                FilterValue::Integer(3),
                FilterValue::Float(2.5),
                FilterValue::Text("foo".into()),
            ]
        );
    }
}
