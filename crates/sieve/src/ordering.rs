//! Field-based ordering helpers.
//!
//! Provides [`Dir`] for sort direction and [`compare_values`], the ordering
//! used by field sort descriptors.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::{Number, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares two field values.
///
/// Strings compare lexicographically, numbers numerically across integer and
/// float representations (NaN after every other number), booleans
/// `false < true`. Values of different kinds order by kind: booleans, then
/// numbers, then strings, with `None` after every present value. The result
/// is a total order.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(*a, *b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match a.compare(b) {
        Some(ordering) => ordering,
        None => a.to_f64().is_nan().cmp(&b.to_f64().is_nan()),
    }
}

fn kind_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::None => 3,
    }
}

/// Compares two records by one field in the given direction.
///
/// Missing fields stay last in both directions.
pub fn compare_field<R: Record>(a: &R, b: &R, field: &str, dir: Dir) -> Ordering {
    let (va, vb) = (a.field(field), b.field(field));
    match (va.is_none(), vb.is_none()) {
        (false, false) => dir.apply(compare_values(&va, &vb)),
        _ => compare_values(&va, &vb),
    }
}
