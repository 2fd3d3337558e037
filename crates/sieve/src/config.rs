//! Engine configuration.
//!
//! [`EngineConfig`] is the programmatic builder; [`Settings`] is the
//! declarative, serde-backed form that can be loaded from JSON or YAML and
//! turned into a config once the records are known.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ordering::Dir;
use crate::record::Record;
use crate::sort::{SortDescriptor, SortSpec};
use crate::value::FilterValue;

/// Construction-time configuration for an [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sieve::{Engine, EngineConfig, SortDescriptor};
///
/// let config = EngineConfig::new(vec![
///     json!({"title": "Dune", "type": "book"}),
///     json!({"title": "Alien", "type": "film"}),
/// ])
/// .filterable(["type"])
/// .searchable(["title"])
/// .sort_item(SortDescriptor::asc("title", "title"))
/// .initial_sort("title");
///
/// let engine = Engine::new(config).unwrap();
/// assert_eq!(engine.collection()[0]["title"], "Alien");
/// ```
pub struct EngineConfig<R> {
    pub(crate) records: Vec<R>,
    pub(crate) filterable: Vec<String>,
    pub(crate) searchable: Vec<String>,
    pub(crate) sort_items: Vec<SortDescriptor<R>>,
    pub(crate) keyword: String,
    pub(crate) initial_filters: Vec<(String, Vec<FilterValue>)>,
    pub(crate) initial_sort: Option<SortSpec<R>>,
}

impl<R> EngineConfig<R> {
    /// Starts a config over `records` with nothing filterable or searchable.
    pub fn new(records: Vec<R>) -> Self {
        EngineConfig {
            records,
            filterable: Vec::new(),
            searchable: Vec::new(),
            sort_items: Vec::new(),
            keyword: String::new(),
            initial_filters: Vec::new(),
            initial_sort: None,
        }
    }

    /// Adds filterable attributes; each becomes an option group.
    pub fn filterable<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filterable
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Adds fields the keyword search looks at.
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Registers a sort descriptor.
    pub fn sort_item(mut self, item: SortDescriptor<R>) -> Self {
        self.sort_items.push(item);
        self
    }

    /// Registers several sort descriptors, in order.
    pub fn sort_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = SortDescriptor<R>>,
    {
        self.sort_items.extend(items);
        self
    }

    /// Initial keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Adds `value` to the initial selection of `group`.
    pub fn initial_filter(
        mut self,
        group: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        let group = group.into();
        let value = value.into();
        match self.initial_filters.iter_mut().find(|(g, _)| *g == group) {
            Some((_, values)) => values.push(value),
            None => self.initial_filters.push((group, vec![value])),
        }
        self
    }

    /// Initial active sort: a registered identifier or an ad-hoc comparator.
    pub fn initial_sort(mut self, sort: impl Into<SortSpec<R>>) -> Self {
        self.initial_sort = Some(sort.into());
        self
    }
}

/// Errors from loading [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Declarative engine settings.
///
/// ```yaml
/// filterable_attributes: [type, year]
/// searchable_fields: [title]
/// sort_items:
///   - { id: newest, label: Newest first, field: year, dir: desc }
/// keyword: ""
/// filters:
///   type: [book]
/// sort: newest
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub filterable_attributes: Vec<String>,
    pub searchable_fields: Vec<String>,
    pub sort_items: Vec<SortItemSettings>,
    pub keyword: String,
    pub filters: BTreeMap<String, Vec<FilterValue>>,
    pub sort: Option<String>,
}

/// A field sort descriptor in declarative form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortItemSettings {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub field: String,
    #[serde(default)]
    pub dir: Dir,
}

impl Settings {
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Builds an engine config over `records` from these settings.
    pub fn into_config<R: Record + 'static>(self, records: Vec<R>) -> EngineConfig<R> {
        let sort_items = self.sort_items.into_iter().map(|item| {
            let descriptor = SortDescriptor::by_field(item.id, item.field, item.dir);
            match item.label {
                Some(label) => descriptor.with_label(label),
                None => descriptor,
            }
        });

        let mut config = EngineConfig::new(records)
            .filterable(self.filterable_attributes)
            .searchable(self.searchable_fields)
            .sort_items(sort_items)
            .keyword(self.keyword);
        config.initial_filters = self.filters.into_iter().collect();
        config.initial_sort = self.sort.map(SortSpec::Id);
        config
    }
}
