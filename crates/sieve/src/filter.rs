//! Filter selection state.
//!
//! A [`FilterSelection`] maps each filter group to the set of values currently
//! enabled for it. Matching combines the two levels with fixed logic:
//!
//! ```text
//! match = for every group with a non-empty selection:
//!             record[group] ∈ selection[group]      (union within a group)
//!         ∧ across all such groups                  (intersection across groups)
//! ```
//!
//! A group whose selection is empty, or contains every option of the group,
//! imposes no constraint. The second rule keeps "everything selected" and
//! "nothing selected" equivalent, including for records that lack the field.
//!
//! Every mutation is validated against [`OptionGroups`] before anything
//! changes, so a rejected call leaves the selection as it was.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::record::Record;
use crate::store::OptionGroups;
use crate::value::FilterValue;

/// Selected values of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupSelection {
    group: String,
    values: Vec<FilterValue>,
}

/// Mapping from group name to its selected values.
///
/// Groups are kept in option-group order; values keep insertion order, but
/// only membership is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    groups: Vec<GroupSelection>,
}

impl FilterSelection {
    /// Creates an empty selection (no restriction).
    pub fn new() -> Self {
        FilterSelection::default()
    }

    /// Builds a validated selection from `(group, values)` pairs.
    ///
    /// Duplicate values collapse; every group and value must exist in
    /// `groups`.
    pub fn from_initial<I, V>(groups: &OptionGroups, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = FilterValue>,
    {
        let mut selection = FilterSelection::new();
        for (group, values) in initial {
            groups.require(&group)?;
            for value in values {
                groups.require_value(&group, &value)?;
                let selected = selection.entry(groups, &group);
                if !selected.contains(&value) {
                    selected.push(value);
                }
            }
            // A group listed with no values still gets its (empty) set.
            selection.entry(groups, &group);
        }
        Ok(selection)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Adds `value` to the group's selection, or removes it if present.
    pub fn toggle(
        &mut self,
        groups: &OptionGroups,
        group: &str,
        value: FilterValue,
    ) -> Result<()> {
        groups.require_value(group, &value)?;
        let selected = self.entry(groups, group);
        match selected.iter().position(|v| *v == value) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(value),
        }
        Ok(())
    }

    /// Exclusive toggle.
    ///
    /// If the group's selection is exactly `{value}` it is cleared; otherwise
    /// it becomes exactly `{value}`, dropping any other selected values.
    pub fn toggle_only(
        &mut self,
        groups: &OptionGroups,
        group: &str,
        value: FilterValue,
    ) -> Result<()> {
        groups.require_value(group, &value)?;
        let selected = self.entry(groups, group);
        if selected.len() == 1 && selected[0] == value {
            selected.clear();
        } else {
            selected.clear();
            selected.push(value);
        }
        Ok(())
    }

    /// Empties one group's selection, leaving the others untouched.
    pub fn clear(&mut self, groups: &OptionGroups, group: &str) -> Result<()> {
        groups.require(group)?;
        if let Some(existing) = self.groups.iter_mut().find(|g| g.group == group) {
            existing.values.clear();
        }
        Ok(())
    }

    /// Empties every group's selection.
    pub fn clear_all(&mut self) {
        for group in &mut self.groups {
            group.values.clear();
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the selected values of a group (empty if none).
    pub fn selected(&self, group: &str) -> &[FilterValue] {
        self.groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.values.as_slice())
            .unwrap_or(&[])
    }

    /// Returns `true` if `value` is selected in `group`.
    pub fn is_selected(&self, group: &str, value: &FilterValue) -> bool {
        self.selected(group).contains(value)
    }

    /// Returns `true` if any group has a non-empty selection.
    pub fn is_active(&self) -> bool {
        self.groups.iter().any(|g| !g.values.is_empty())
    }

    /// Iterates over `(group, selected values)` in group order, including
    /// groups whose selection is currently empty.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.groups
            .iter()
            .map(|g| (g.group.as_str(), g.values.as_slice()))
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Returns the groups that actually restrict the view.
    ///
    /// Empty selections and selections covering every option are skipped.
    pub fn constraints<'a>(&'a self, groups: &'a OptionGroups) -> Vec<Constraint<'a>> {
        self.restricting(groups).collect()
    }

    /// Tests a single record against the selection.
    ///
    /// Walks the selection lazily without allocating. To test many records,
    /// build [`FilterSelection::constraints`] once and reuse it.
    pub fn matches<R: Record>(&self, record: &R, groups: &OptionGroups) -> bool {
        self.restricting(groups).all(|c| c.matches(record))
    }

    fn restricting<'a>(
        &'a self,
        groups: &'a OptionGroups,
    ) -> impl Iterator<Item = Constraint<'a>> + 'a {
        self.groups
            .iter()
            .filter(|g| !g.values.is_empty())
            .filter(move |g| {
                groups
                    .get(&g.group)
                    .map_or(true, |options| g.values.len() < options.len())
            })
            .map(|g| Constraint {
                field: &g.group,
                values: &g.values,
            })
    }

    fn entry(&mut self, groups: &OptionGroups, group: &str) -> &mut Vec<FilterValue> {
        let index = match self.groups.iter().position(|g| g.group == group) {
            Some(index) => index,
            None => {
                let rank = groups.position(group);
                let at = self
                    .groups
                    .iter()
                    .position(|g| groups.position(&g.group) > rank)
                    .unwrap_or(self.groups.len());
                self.groups.insert(
                    at,
                    GroupSelection {
                        group: group.to_string(),
                        values: Vec::new(),
                    },
                );
                at
            }
        };
        &mut self.groups[index].values
    }
}

/// One restricting group: the record's field must equal one of `values`.
#[derive(Debug, Clone, Copy)]
pub struct Constraint<'a> {
    pub field: &'a str,
    pub values: &'a [FilterValue],
}

impl Constraint<'_> {
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let value = record.field(self.field);
        self.values.iter().any(|v| v.matches(&value))
    }
}

impl Serialize for FilterSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.group, &group.values)?;
        }
        map.end()
    }
}
