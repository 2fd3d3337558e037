//! The [`Record`] trait: how the engine reads fields out of a collection item.

use std::collections::{BTreeMap, HashMap};

use crate::value::{Number, Value};

/// Trait for types the engine can filter, search and sort.
///
/// The engine only ever asks for field values by name; it never mutates a
/// record and never looks at its identity.
///
/// # Manual Implementation
///
/// ```
/// use sieve::{Number, Record, Value};
///
/// struct Book {
///     title: String,
///     genre: String,
///     pages: u32,
/// }
///
/// impl Record for Book {
///     fn field(&self, name: &str) -> Value<'_> {
///         match name {
///             "title" => Value::String(&self.title),
///             "genre" => Value::String(&self.genre),
///             "pages" => Value::Number(Number::from(self.pages)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the record has no
    /// such field.
    fn field(&self, name: &str) -> Value<'_>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Value<'_> {
        (**self).field(name)
    }
}

/// JSON objects are records keyed by their top-level members.
///
/// Arrays, objects and `null` members read as [`Value::None`], as does any
/// non-object JSON value.
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Value<'_> {
        match self.get(name) {
            Some(serde_json::Value::String(s)) => Value::String(s),
            Some(serde_json::Value::Bool(b)) => Value::Bool(*b),
            Some(serde_json::Value::Number(n)) => json_number(n),
            _ => Value::None,
        }
    }
}

fn json_number(n: &serde_json::Number) -> Value<'_> {
    if let Some(i) = n.as_i64() {
        Value::Number(Number::I64(i))
    } else if let Some(u) = n.as_u64() {
        Value::Number(Number::U64(u))
    } else if let Some(f) = n.as_f64() {
        Value::Number(Number::F64(f))
    } else {
        Value::None
    }
}

impl Record for HashMap<String, String> {
    fn field(&self, name: &str) -> Value<'_> {
        self.get(name)
            .map(|s| Value::String(s))
            .unwrap_or(Value::None)
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Value<'_> {
        self.get(name)
            .map(|s| Value::String(s))
            .unwrap_or(Value::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_fields() {
        let record = json!({
            "title": "foo",
            "count": 3,
            "ratio": 0.5,
            "big": u64::MAX,
            "done": true,
            "tags": ["a"],
            "none": null,
        });

        assert_eq!(record.field("title"), Value::String("foo"));
        assert_eq!(record.field("count"), Value::Number(Number::I64(3)));
        assert_eq!(record.field("ratio"), Value::Number(Number::F64(0.5)));
        assert_eq!(record.field("big"), Value::Number(Number::U64(u64::MAX)));
        assert_eq!(record.field("done"), Value::Bool(true));
        assert_eq!(record.field("tags"), Value::None);
        assert_eq!(record.field("none"), Value::None);
        assert_eq!(record.field("missing"), Value::None);
    }

    #[test]
    fn non_object_json_has_no_fields() {
        assert_eq!(json!("scalar").field("title"), Value::None);
    }

    #[test]
    fn string_maps() {
        let mut map = HashMap::new();
        map.insert("type".to_string(), "foo".to_string());
        assert_eq!(map.field("type"), Value::String("foo"));
        assert_eq!(map.field("title"), Value::None);

        let tree: BTreeMap<String, String> = map.into_iter().collect();
        assert_eq!(tree.field("type"), Value::String("foo"));
    }

    #[test]
    fn references_are_records() {
        let record = json!({"title": "foo"});
        let by_ref = &record;
        assert_eq!(by_ref.field("title"), Value::String("foo"));
    }
}
