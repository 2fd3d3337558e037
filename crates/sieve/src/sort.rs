//! Sort descriptors, the registry of available sorts, and the active sort.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{Result, SieveError};
use crate::ordering::{compare_field, Dir};
use crate::record::Record;

/// Two-argument ordering function over records.
///
/// It does not have to be a strict total order; the view is sorted with a
/// stable sort so records that compare equal keep their relative order.
pub type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// A named, registered ordering function.
pub struct SortDescriptor<R> {
    id: String,
    label: Option<String>,
    compare: Comparator<R>,
}

impl<R> SortDescriptor<R> {
    /// Creates a descriptor from an arbitrary comparator.
    pub fn new<F>(id: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        SortDescriptor {
            id: id.into(),
            label: None,
            compare: Arc::new(compare),
        }
    }

    /// Sets a human-readable label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the comparator handle.
    pub fn comparator(&self) -> &Comparator<R> {
        &self.compare
    }

    /// Compares two records.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        (self.compare)(a, b)
    }
}

impl<R: Record + 'static> SortDescriptor<R> {
    /// Sorts by one field in the given direction.
    ///
    /// See [`compare_values`](crate::compare_values) for how values order.
    pub fn by_field(id: impl Into<String>, field: impl Into<String>, dir: Dir) -> Self {
        let field = field.into();
        SortDescriptor::new(id, move |a: &R, b: &R| compare_field(a, b, &field, dir))
    }

    /// Ascending field sort.
    pub fn asc(id: impl Into<String>, field: impl Into<String>) -> Self {
        SortDescriptor::by_field(id, field, Dir::Asc)
    }

    /// Descending field sort.
    pub fn desc(id: impl Into<String>, field: impl Into<String>) -> Self {
        SortDescriptor::by_field(id, field, Dir::Desc)
    }
}

impl<R> Clone for SortDescriptor<R> {
    fn clone(&self) -> Self {
        SortDescriptor {
            id: self.id.clone(),
            label: self.label.clone(),
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<R> fmt::Debug for SortDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<R> Serialize for SortDescriptor<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SortDescriptor", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("label", &self.label)?;
        state.end()
    }
}

/// Ordered list of available sort descriptors with unique identifiers.
pub struct SortRegistry<R> {
    items: Vec<SortDescriptor<R>>,
}

impl<R> SortRegistry<R> {
    /// Creates a registry, rejecting duplicate identifiers.
    pub fn new(items: Vec<SortDescriptor<R>>) -> Result<Self> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|other| other.id == item.id) {
                return Err(SieveError::DuplicateSort {
                    id: item.id.clone(),
                });
            }
        }
        Ok(SortRegistry { items })
    }

    /// Looks up a descriptor by identifier.
    pub fn get(&self, id: &str) -> Option<&SortDescriptor<R>> {
        self.items.iter().find(|d| d.id == id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| SieveError::UnknownSort { id: id.to_string() })
    }

    pub fn items(&self) -> &[SortDescriptor<R>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<R> Default for SortRegistry<R> {
    fn default() -> Self {
        SortRegistry { items: Vec::new() }
    }
}

impl<R> fmt::Debug for SortRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<R> Serialize for SortRegistry<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

/// What [`apply_sort`](crate::Engine::apply_sort) should order by.
pub enum SortSpec<R> {
    /// A registered descriptor, by identifier.
    Id(String),
    /// An ad-hoc comparator that is not in the registry.
    Comparator(Comparator<R>),
    /// Back to source order.
    Unsorted,
}

impl<R> SortSpec<R> {
    /// Wraps a closure as an ad-hoc comparator.
    pub fn comparator<F>(compare: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        SortSpec::Comparator(Arc::new(compare))
    }
}

impl<R> From<&str> for SortSpec<R> {
    fn from(id: &str) -> Self {
        SortSpec::Id(id.to_string())
    }
}

impl<R> From<String> for SortSpec<R> {
    fn from(id: String) -> Self {
        SortSpec::Id(id)
    }
}

impl<R> From<Comparator<R>> for SortSpec<R> {
    fn from(compare: Comparator<R>) -> Self {
        SortSpec::Comparator(compare)
    }
}

impl<R> fmt::Debug for SortSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortSpec::Id(id) => f.debug_tuple("Id").field(id).finish(),
            SortSpec::Comparator(_) => f.write_str("Comparator(..)"),
            SortSpec::Unsorted => f.write_str("Unsorted"),
        }
    }
}

/// The currently selected ordering.
pub(crate) enum ActiveSort<R> {
    Registered(usize),
    Custom(Comparator<R>),
}

/// Registry plus the active sort (absent = source order).
pub struct SortState<R> {
    registry: SortRegistry<R>,
    active: Option<ActiveSort<R>>,
}

impl<R> SortState<R> {
    pub fn new(registry: SortRegistry<R>) -> Self {
        SortState {
            registry,
            active: None,
        }
    }

    /// Sets the active sort. Unknown identifiers fail without changing state.
    pub fn apply(&mut self, spec: SortSpec<R>) -> Result<()> {
        let active = self.resolve(spec)?;
        self.set_active(active);
        Ok(())
    }

    /// Checks `spec` against the registry without activating it.
    pub(crate) fn resolve(&self, spec: SortSpec<R>) -> Result<Option<ActiveSort<R>>> {
        Ok(match spec {
            SortSpec::Id(id) => Some(ActiveSort::Registered(self.registry.position(&id)?)),
            SortSpec::Comparator(compare) => Some(ActiveSort::Custom(compare)),
            SortSpec::Unsorted => None,
        })
    }

    pub(crate) fn set_active(&mut self, active: Option<ActiveSort<R>>) {
        self.active = active;
    }

    pub fn registry(&self) -> &SortRegistry<R> {
        &self.registry
    }

    /// Identifier of the active sort, if it is a registered one.
    pub fn active_id(&self) -> Option<&str> {
        match &self.active {
            Some(ActiveSort::Registered(index)) => Some(self.registry.items[*index].id()),
            _ => None,
        }
    }

    /// Returns `true` if any sort (registered or ad-hoc) is active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Resolves the active comparator.
    pub fn comparator(&self) -> Option<&Comparator<R>> {
        self.comparator_of(self.active.as_ref())
    }

    /// Resolves the comparator of a sort returned by [`SortState::resolve`].
    pub(crate) fn comparator_of<'a>(
        &'a self,
        active: Option<&'a ActiveSort<R>>,
    ) -> Option<&'a Comparator<R>> {
        match active {
            Some(ActiveSort::Registered(index)) => Some(self.registry.items[*index].comparator()),
            Some(ActiveSort::Custom(compare)) => Some(compare),
            None => None,
        }
    }
}

impl<R> fmt::Debug for SortState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = match &self.active {
            Some(ActiveSort::Registered(_)) => self.active_id().map(str::to_string),
            Some(ActiveSort::Custom(_)) => Some("<custom>".to_string()),
            None => None,
        };
        f.debug_struct("SortState")
            .field("registry", &self.registry)
            .field("active", &active)
            .finish()
    }
}
