//! The view compiler.
//!
//! [`compile`] is a pure function of the store and the three states. The
//! engine calls it after every mutation and replaces the previous view
//! wholesale; the view is never patched incrementally.
//!
//! ```text
//! source (original order)
//!   → filter predicate ∧ search predicate    O(n)
//!   → stable sort by active comparator        O(n log n), if any
//! ```
//!
//! Comparators supplied by callers need not be total orders. The merge sort
//! used here only ever asks whether the right element is strictly less than
//! the left one, so an inconsistent comparator yields some permutation of
//! the visible records instead of a panic.

use std::cmp::Ordering;

use crate::filter::FilterSelection;
use crate::record::Record;
use crate::search::SearchState;
use crate::sort::{Comparator, SortState};
use crate::store::{OptionGroups, RecordStore};

/// The visible, ordered subset of the source collection.
///
/// Stored as positions into the [`RecordStore`], so the view never aliases or
/// copies caller data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    view_to_source: Vec<usize>,
}

impl DerivedView {
    /// Source positions of the visible records, in view order.
    pub fn indices(&self) -> &[usize] {
        &self.view_to_source
    }

    /// Resolves the view against the store it was compiled from.
    pub fn iter<'a, R>(&'a self, store: &'a RecordStore<R>) -> impl Iterator<Item = &'a R> + 'a {
        self.view_to_source
            .iter()
            .filter_map(move |&index| store.get(index))
    }

    pub fn len(&self) -> usize {
        self.view_to_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view_to_source.is_empty()
    }
}

/// Computes the derived view.
///
/// A record is visible when it satisfies both the filter selection and the
/// search keyword. Visible records are then stably sorted by the active
/// comparator, so ties keep their source order.
pub fn compile<R: Record>(
    store: &RecordStore<R>,
    groups: &OptionGroups,
    filters: &FilterSelection,
    search: &SearchState,
    sort: &SortState<R>,
) -> DerivedView {
    compile_with(store, groups, filters, search, sort.comparator())
}

/// [`compile`] with an explicit comparator instead of the active sort.
pub(crate) fn compile_with<R: Record>(
    store: &RecordStore<R>,
    groups: &OptionGroups,
    filters: &FilterSelection,
    search: &SearchState,
    compare: Option<&Comparator<R>>,
) -> DerivedView {
    let records = store.records();
    let constraints = filters.constraints(groups);

    let mut view_to_source: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| constraints.iter().all(|c| c.matches(*record)))
        .filter(|(_, record)| search.matches(*record))
        .map(|(index, _)| index)
        .collect();

    if let Some(compare) = compare {
        merge_sort_by(&mut view_to_source, |a, b| compare(&records[a], &records[b]));
    }

    DerivedView { view_to_source }
}

/// Stable bottom-up merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order; this
/// never checks the comparator's consistency and always ends with a
/// permutation of `items`.
fn merge_sort_by<F>(items: &mut Vec<usize>, mut compare: F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }

    let mut src = std::mem::take(items);
    let mut dst = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        dst.clear();
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                // Ties take the left run first.
                if compare(src[right], src[left]) == Ordering::Less {
                    dst.push(src[right]);
                    right += 1;
                } else {
                    dst.push(src[left]);
                    left += 1;
                }
            }
            dst.extend_from_slice(&src[left..mid]);
            dst.extend_from_slice(&src[right..end]);
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    *items = src;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDescriptor, SortRegistry, SortSpec};
    use crate::value::FilterValue;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
    use std::sync::Arc;

    type Json = serde_json::Value;

    struct Fixture {
        store: RecordStore<Json>,
        groups: OptionGroups,
        filters: FilterSelection,
        search: SearchState,
        sort: SortState<Json>,
    }

    impl Fixture {
        fn new() -> Self {
            let records = vec![
                json!({"title": "Dune", "type": "book", "year": 1965}),
                json!({"title": "Alien", "type": "film", "year": 1979}),
                json!({"title": "Solaris", "type": "book", "year": 1961}),
                json!({"title": "Solaris", "type": "film", "year": 1972}),
                json!({"title": "Arrival", "type": "film", "year": 2016}),
            ];
            let groups = OptionGroups::build(&records, &["type"]).unwrap();
            let registry = SortRegistry::new(vec![
                SortDescriptor::asc("title", "title"),
                SortDescriptor::desc("year", "year"),
            ])
            .unwrap();
            Fixture {
                store: RecordStore::new(records),
                groups,
                filters: FilterSelection::new(),
                search: SearchState::new(["title"]),
                sort: SortState::new(registry),
            }
        }

        fn years(&self) -> Vec<i64> {
            compile(
                &self.store,
                &self.groups,
                &self.filters,
                &self.search,
                &self.sort,
            )
            .iter(&self.store)
            .map(|r| r["year"].as_i64().unwrap())
            .collect()
        }
    }

    #[test]
    fn no_state_is_source_order() {
        let fx = Fixture::new();
        assert_eq!(fx.years(), vec![1965, 1979, 1961, 1972, 2016]);
    }

    #[test]
    fn filter_and_search_are_conjunctive() {
        let mut fx = Fixture::new();
        fx.filters
            .toggle(&fx.groups, "type", FilterValue::from("film"))
            .unwrap();
        fx.search.set_keyword("a");
        // films whose title contains "a": Alien, Solaris, Arrival
        assert_eq!(fx.years(), vec![1979, 1972, 2016]);

        fx.search.set_keyword("sol");
        assert_eq!(fx.years(), vec![1972]);
    }

    #[test]
    fn sort_applies_after_filtering() {
        let mut fx = Fixture::new();
        fx.filters
            .toggle(&fx.groups, "type", FilterValue::from("book"))
            .unwrap();
        fx.sort.apply("year".into()).unwrap();
        assert_eq!(fx.years(), vec![1965, 1961]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut fx = Fixture::new();
        fx.sort.apply("title".into()).unwrap();
        // both "Solaris" records keep source order (1961 before 1972)
        assert_eq!(fx.years(), vec![1979, 2016, 1965, 1961, 1972]);
    }

    #[test]
    fn custom_comparator() {
        let mut fx = Fixture::new();
        fx.sort
            .apply(SortSpec::comparator(|a: &Json, b: &Json| {
                a["year"].as_i64().cmp(&b["year"].as_i64())
            }))
            .unwrap();
        assert_eq!(fx.years(), vec![1961, 1965, 1972, 1979, 2016]);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let mut fx = Fixture::new();
        fx.search.set_keyword("zzz");
        let view = compile(&fx.store, &fx.groups, &fx.filters, &fx.search, &fx.sort);
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }

    #[test]
    fn compile_is_deterministic() {
        let mut fx = Fixture::new();
        fx.sort.apply("title".into()).unwrap();
        let first = compile(&fx.store, &fx.groups, &fx.filters, &fx.search, &fx.sort);
        let second = compile(&fx.store, &fx.groups, &fx.filters, &fx.search, &fx.sort);
        assert_eq!(first, second);
        assert_eq!(first.indices(), &[1, 4, 0, 2, 3]);
    }

    #[test]
    fn comparator_without_ties_still_sorts() {
        let mut fx = Fixture::new();
        fx.sort
            .apply(SortSpec::comparator(|a: &Json, b: &Json| {
                if a["year"].as_i64() > b["year"].as_i64() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }))
            .unwrap();
        assert_eq!(fx.years(), vec![1961, 1965, 1972, 1979, 2016]);
    }

    #[test]
    fn inconsistent_comparator_yields_a_permutation() {
        let records: Vec<Json> = (0..500).map(|i| json!({ "id": i })).collect();
        let store = RecordStore::new(records);
        let counter = AtomicU64::new(0x2545_f491);
        let compare: Comparator<Json> = Arc::new(move |_: &Json, _: &Json| {
            let next = counter
                .fetch_add(0x9e37_79b9, AtomicOrdering::Relaxed)
                .wrapping_mul(6_364_136_223_846_793_005);
            match next >> 62 {
                0 => Ordering::Less,
                1 => Ordering::Equal,
                _ => Ordering::Greater,
            }
        });

        let view = compile_with(
            &store,
            &OptionGroups::default(),
            &FilterSelection::new(),
            &SearchState::new(Vec::<String>::new()),
            Some(&compare),
        );

        let mut indices = view.indices().to_vec();
        indices.sort_unstable();
        assert_eq!(indices, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn merge_sort_is_stable() {
        let keys = [3, 1, 2, 1, 3, 2, 1];
        let mut items: Vec<usize> = (0..keys.len()).collect();
        merge_sort_by(&mut items, |a, b| keys[a].cmp(&keys[b]));
        assert_eq!(items, vec![1, 3, 6, 2, 5, 0, 4]);
    }
}
