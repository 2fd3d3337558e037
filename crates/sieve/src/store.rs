//! Source collection and the option groups derived from it.
//!
//! The [`RecordStore`] owns the collection the engine was constructed with.
//! [`OptionGroups`] lists, for every filterable attribute, the distinct values
//! that attribute takes across the collection, in first-seen order.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, SieveError};
use crate::record::Record;
use crate::value::FilterValue;

/// Immutable source collection.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    records: Vec<R>,
}

impl<R> RecordStore<R> {
    /// Creates a store owning `records`.
    pub fn new(records: Vec<R>) -> Self {
        RecordStore { records }
    }

    /// Returns all records in source order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Returns the record at `index` in source order.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A filterable attribute and the distinct values it takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionGroup {
    /// Attribute (field) name.
    pub name: String,
    /// Distinct values in first-seen order.
    pub values: Vec<FilterValue>,
}

impl OptionGroup {
    /// Returns `true` if `value` occurs for this attribute.
    pub fn contains(&self, value: &FilterValue) -> bool {
        self.values.contains(value)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// All option groups, in the order the attributes were configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionGroups {
    groups: Vec<OptionGroup>,
}

impl OptionGroups {
    /// Collects the distinct values of each attribute across `records`.
    ///
    /// Records without a value for an attribute contribute nothing to that
    /// group. Fails if an attribute is listed twice.
    pub fn build<R, S>(records: &[R], attributes: &[S]) -> Result<Self>
    where
        R: Record,
        S: AsRef<str>,
    {
        let mut groups: Vec<OptionGroup> = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let name = attribute.as_ref();
            if groups.iter().any(|g| g.name == name) {
                return Err(SieveError::DuplicateGroup {
                    group: name.to_string(),
                });
            }

            let mut seen = HashSet::new();
            let mut values = Vec::new();
            for record in records {
                if let Some(value) = record.field(name).to_owned_value() {
                    if seen.insert(value.clone()) {
                        values.push(value);
                    }
                }
            }

            groups.push(OptionGroup {
                name: name.to_string(),
                values,
            });
        }
        Ok(OptionGroups { groups })
    }

    /// Looks up a group by attribute name.
    pub fn get(&self, name: &str) -> Option<&OptionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Returns the position of a group, used to keep selections in group order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    /// Looks up a group, failing with [`SieveError::UnknownGroup`].
    pub fn require(&self, name: &str) -> Result<&OptionGroup> {
        self.get(name).ok_or_else(|| SieveError::UnknownGroup {
            group: name.to_string(),
        })
    }

    /// Checks that `value` is an option of group `name`.
    pub fn require_value(&self, name: &str, value: &FilterValue) -> Result<&OptionGroup> {
        let group = self.require(name)?;
        if group.contains(value) {
            Ok(group)
        } else {
            Err(SieveError::UnknownValue {
                group: name.to_string(),
                value: value.clone(),
            })
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> IntoIterator for &'a OptionGroups {
    type Item = &'a OptionGroup;
    type IntoIter = std::slice::Iter<'a, OptionGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<serde_json::Value> {
        vec![
            json!({"title": "a", "type": "book", "year": 2001}),
            json!({"title": "b", "type": "film", "year": 1999}),
            json!({"title": "c", "type": "book"}),
            json!({"title": "d", "type": "album", "year": 2001}),
        ]
    }

    #[test]
    fn distinct_values_in_first_seen_order() {
        let groups = OptionGroups::build(&sample(), &["type", "year"]).unwrap();

        let types = groups.get("type").unwrap();
        assert_eq!(
            types.values,
            vec![
                FilterValue::from("book"),
                FilterValue::from("film"),
                FilterValue::from("album"),
            ]
        );

        let years = groups.get("year").unwrap();
        assert_eq!(
            years.values,
            vec![FilterValue::Integer(2001), FilterValue::Integer(1999)]
        );
    }

    #[test]
    fn groups_keep_configured_order() {
        let groups = OptionGroups::build(&sample(), &["year", "type"]).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["year", "type"]);
        assert_eq!(groups.position("type"), Some(1));
    }

    #[test]
    fn missing_attribute_yields_empty_group() {
        let groups = OptionGroups::build(&sample(), &["color"]).unwrap();
        assert!(groups.get("color").unwrap().is_empty());
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let err = OptionGroups::build(&sample(), &["type", "type"]).unwrap_err();
        assert_eq!(
            err,
            SieveError::DuplicateGroup {
                group: "type".into()
            }
        );
    }

    #[test]
    fn require_value_reports_unknowns() {
        let groups = OptionGroups::build(&sample(), &["type"]).unwrap();
        assert!(groups.require_value("type", &"film".into()).is_ok());
        assert_eq!(
            groups.require_value("type", &"poem".into()).unwrap_err(),
            SieveError::UnknownValue {
                group: "type".into(),
                value: "poem".into()
            }
        );
        assert_eq!(
            groups.require("genre").unwrap_err(),
            SieveError::UnknownGroup {
                group: "genre".into()
            }
        );
    }

    #[test]
    fn store_accessors() {
        let store = RecordStore::new(sample());
        assert_eq!(store.len(), 4);
        assert!(!store.is_empty());
        assert_eq!(store.get(2).unwrap()["title"], "c");
        assert!(store.get(9).is_none());
    }
}
