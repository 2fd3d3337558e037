//! The engine facade.
//!
//! [`Engine`] owns the record store and the filter, search and sort states,
//! and keeps the derived view current. Its six mutating operations share one
//! contract:
//!
//! 1. validate and apply the state change (or fail with nothing changed),
//! 2. recompile the view from scratch,
//! 3. publish the new [`PublishedState`] to the subscribed observer.
//!
//! A call that changes nothing still recompiles and publishes.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::record::Record;
use crate::search::SearchState;
use crate::sort::{Comparator, SortRegistry, SortSpec, SortState};
use crate::store::{OptionGroups, RecordStore};
use crate::value::FilterValue;
use crate::view::{compile, compile_with, DerivedView};

/// Receives the engine state after every mutation.
///
/// Closures taking `&PublishedState<R>` implement this trait.
pub trait Observer<R> {
    fn state_changed(&mut self, state: &PublishedState<'_, R>);
}

impl<R, F> Observer<R> for F
where
    F: FnMut(&PublishedState<'_, R>),
{
    fn state_changed(&mut self, state: &PublishedState<'_, R>) {
        self(state)
    }
}

/// Snapshot of everything a consumer renders from.
pub struct PublishedState<'a, R> {
    /// The derived view.
    pub collection: Vec<&'a R>,
    pub option_groups: &'a OptionGroups,
    pub keyword: &'a str,
    pub applied_filters: &'a FilterSelection,
    pub sort_items: &'a SortRegistry<R>,
    /// The active comparator, if any.
    pub sort_fn: Option<&'a Comparator<R>>,
    /// Identifier of the active sort when it is a registered one.
    pub active_sort: Option<&'a str>,
}

impl<R: Serialize> PublishedState<'_, R> {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// `sort_fn` is not serializable; `active_sort` stands in for it.
impl<R: Serialize> Serialize for PublishedState<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PublishedState", 6)?;
        state.serialize_field("collection", &self.collection)?;
        state.serialize_field("option_groups", self.option_groups)?;
        state.serialize_field("keyword", self.keyword)?;
        state.serialize_field("applied_filters", self.applied_filters)?;
        state.serialize_field("sort_items", self.sort_items)?;
        state.serialize_field("active_sort", &self.active_sort)?;
        state.end()
    }
}

/// Stateful filtering, search and sorting over an owned collection.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sieve::{Engine, EngineConfig};
///
/// let mut engine = Engine::new(
///     EngineConfig::new(vec![
///         json!({"title": "foo", "type": "foo"}),
///         json!({"title": "bar", "type": "bar"}),
///     ])
///     .filterable(["type"]),
/// )
/// .unwrap();
///
/// engine.toggle_filter("type", "bar").unwrap();
/// assert_eq!(engine.collection(), vec![&json!({"title": "bar", "type": "bar"})]);
///
/// engine.clear_all_filters();
/// assert_eq!(engine.collection().len(), 2);
/// ```
pub struct Engine<R> {
    store: RecordStore<R>,
    groups: OptionGroups,
    filters: FilterSelection,
    search: SearchState,
    sort: SortState<R>,
    view: DerivedView,
    observer: Option<Box<dyn Observer<R>>>,
}

impl<R: Record> Engine<R> {
    /// Builds the engine and compiles the initial view.
    ///
    /// Fails on duplicate attributes or sort ids, initial filters naming
    /// unknown groups or values, and an unknown initial sort.
    pub fn new(config: EngineConfig<R>) -> Result<Self> {
        let EngineConfig {
            records,
            filterable,
            searchable,
            sort_items,
            keyword,
            initial_filters,
            initial_sort,
        } = config;

        let groups = OptionGroups::build(&records, &filterable)?;
        let filters = FilterSelection::from_initial(&groups, initial_filters)?;

        let mut search = SearchState::new(searchable);
        search.set_keyword(&keyword);

        let mut sort = SortState::new(SortRegistry::new(sort_items)?);
        if let Some(spec) = initial_sort {
            sort.apply(spec)?;
        }

        let mut engine = Engine {
            store: RecordStore::new(records),
            groups,
            filters,
            search,
            sort,
            view: DerivedView::default(),
            observer: None,
        };
        engine.recompute();

        debug!(
            records = engine.store.len(),
            groups = engine.groups.len(),
            sorts = engine.sort.registry().len(),
            visible = engine.view.len(),
            "engine constructed"
        );
        Ok(engine)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Adds `value` to the group's selection, or removes it if selected.
    pub fn toggle_filter(&mut self, group: &str, value: impl Into<FilterValue>) -> Result<()> {
        let value = value.into();
        debug!(group, value = %value, "toggle_filter");
        self.filters.toggle(&self.groups, group, value)?;
        self.commit();
        Ok(())
    }

    /// Makes `value` the group's only selection, or clears the group if it
    /// already was.
    pub fn toggle_only(&mut self, group: &str, value: impl Into<FilterValue>) -> Result<()> {
        let value = value.into();
        debug!(group, value = %value, "toggle_only");
        self.filters.toggle_only(&self.groups, group, value)?;
        self.commit();
        Ok(())
    }

    /// Removes every selected value of one group.
    pub fn clear_filters(&mut self, group: &str) -> Result<()> {
        debug!(group, "clear_filters");
        self.filters.clear(&self.groups, group)?;
        self.commit();
        Ok(())
    }

    /// Removes every selected value of every group.
    pub fn clear_all_filters(&mut self) {
        debug!("clear_all_filters");
        self.filters.clear_all();
        self.commit();
    }

    /// Sets the search keyword (trimmed; empty clears search).
    pub fn keyword_search(&mut self, keyword: &str) {
        debug!(keyword, "keyword_search");
        self.search.set_keyword(keyword);
        self.commit();
    }

    /// Activates a registered sort by id, an ad-hoc comparator, or
    /// [`SortSpec::Unsorted`].
    pub fn apply_sort(&mut self, sort: impl Into<SortSpec<R>>) -> Result<()> {
        let sort = sort.into();
        debug!(sort = ?sort, "apply_sort");
        let active = self.sort.resolve(sort)?;
        // The view is compiled before the sort is installed, so a comparator
        // that panics leaves the previous sort and view in place.
        let view = compile_with(
            &self.store,
            &self.groups,
            &self.filters,
            &self.search,
            self.sort.comparator_of(active.as_ref()),
        );
        self.sort.set_active(active);
        self.view = view;
        debug!(visible = self.view.len(), "view recompiled");
        self.publish();
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The derived view, resolved to records.
    pub fn collection(&self) -> Vec<&R> {
        self.view.iter(&self.store).collect()
    }

    /// The derived view as source positions.
    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    /// The full source collection, in original order.
    pub fn records(&self) -> &[R] {
        self.store.records()
    }

    pub fn option_groups(&self) -> &OptionGroups {
        &self.groups
    }

    pub fn keyword(&self) -> &str {
        self.search.keyword()
    }

    pub fn applied_filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn sort_items(&self) -> &SortRegistry<R> {
        self.sort.registry()
    }

    /// The active comparator, registered or ad-hoc.
    pub fn sort_fn(&self) -> Option<&Comparator<R>> {
        self.sort.comparator()
    }

    /// Identifier of the active sort, when it is a registered one.
    pub fn active_sort(&self) -> Option<&str> {
        self.sort.active_id()
    }

    /// Snapshot of the published state.
    pub fn state(&self) -> PublishedState<'_, R> {
        PublishedState {
            collection: self.collection(),
            option_groups: &self.groups,
            keyword: self.search.keyword(),
            applied_filters: &self.filters,
            sort_items: self.sort.registry(),
            sort_fn: self.sort.comparator(),
            active_sort: self.sort.active_id(),
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Subscribes the observer notified after every mutation.
    ///
    /// The engine has a single observer slot; subscribing again replaces it.
    pub fn subscribe(&mut self, observer: impl Observer<R> + 'static) {
        self.subscribe_boxed(Box::new(observer));
    }

    pub(crate) fn subscribe_boxed(&mut self, observer: Box<dyn Observer<R>>) {
        if self.observer.replace(observer).is_some() {
            warn!("engine observer replaced");
        }
    }

    /// Sends the current state to the observer, if any.
    pub(crate) fn publish(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.state_changed(&self.state());
            self.observer = Some(observer);
        }
    }

    fn recompute(&mut self) {
        self.view = compile(
            &self.store,
            &self.groups,
            &self.filters,
            &self.search,
            &self.sort,
        );
    }

    fn commit(&mut self) {
        self.recompute();
        debug!(visible = self.view.len(), "view recompiled");
        self.publish();
    }
}

impl<R> std::fmt::Debug for Engine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("records", &self.store.len())
            .field("groups", &self.groups)
            .field("filters", &self.filters)
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("view", &self.view)
            .field("subscribed", &self.observer.is_some())
            .finish()
    }
}
