//! Sieve - stateful filtering, search and sorting for record collections.
//!
//! Sieve backs list-style UI components: given a collection of records, a set
//! of filterable attributes, the fields a keyword search looks at and a
//! registry of sorts, the [`Engine`] maintains the currently visible, ordered
//! subset of the collection and republishes it after every change.
//!
//! - Option groups: distinct values of each filterable attribute
//! - Filter toggles, exclusive ("radio") toggles, per-group and global clears
//! - Case-insensitive keyword search over configured fields
//! - Registered or ad-hoc sorts, applied with a stable sort
//! - A single observer notified after every mutation
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sieve::{Engine, EngineConfig, SortDescriptor};
//!
//! let records = vec![
//!     json!({"title": "Dune", "type": "book", "year": 1965}),
//!     json!({"title": "Alien", "type": "film", "year": 1979}),
//!     json!({"title": "Solaris", "type": "book", "year": 1961}),
//! ];
//!
//! let mut engine = Engine::new(
//!     EngineConfig::new(records)
//!         .filterable(["type"])
//!         .searchable(["title"])
//!         .sort_item(SortDescriptor::desc("newest", "year")),
//! )
//! .unwrap();
//!
//! engine.toggle_filter("type", "book").unwrap();
//! engine.apply_sort("newest").unwrap();
//!
//! let titles: Vec<&str> = engine
//!     .collection()
//!     .iter()
//!     .map(|r| r["title"].as_str().unwrap())
//!     .collect();
//! assert_eq!(titles, vec!["Dune", "Solaris"]);
//! ```
//!
//! # Filter Semantics
//!
//! ```text
//! visible = (for every group with a restricting selection:
//!               record[group] ∈ selection[group])
//!         ∧ (keyword empty, or some searchable field contains it)
//! ```
//!
//! Values selected within one group are alternatives; groups narrow each
//! other. A group with nothing selected, or with every option selected,
//! restricts nothing.
//!
//! # Records
//!
//! Anything implementing [`Record`] can be filtered. Implementations are
//! provided for `serde_json::Value` objects and string maps; your own structs
//! implement a single field accessor.

pub mod adapter;
mod config;
mod engine;
mod error;
mod filter;
mod ordering;
mod record;
mod search;
mod sort;
mod store;
mod value;
mod view;

// Re-export public API
pub use config::{EngineConfig, Settings, SettingsError, SortItemSettings};
pub use engine::{Engine, Observer, PublishedState};
pub use error::{Result, SieveError};
pub use filter::{Constraint, FilterSelection};
pub use ordering::{compare_field, compare_values, Dir};
pub use record::Record;
pub use search::SearchState;
pub use sort::{Comparator, SortDescriptor, SortRegistry, SortSpec, SortState};
pub use store::{OptionGroup, OptionGroups, RecordStore};
pub use value::{FilterValue, Number, Value};
pub use view::{compile, DerivedView};
