//! Error types for the sieve crate.

use thiserror::Error;

use crate::value::FilterValue;

/// Configuration errors raised by the engine.
///
/// Every variant points at a programming error upstream (a group, option or
/// sort that the engine was never configured with). Operations that fail
/// leave the engine state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SieveError {
    /// The attribute is not one of the configured filterable attributes.
    #[error("unknown filter group '{group}'")]
    UnknownGroup { group: String },

    /// The value never occurs for this attribute in the collection.
    #[error("value '{value}' is not an option of filter group '{group}'")]
    UnknownValue { group: String, value: FilterValue },

    /// No sort descriptor is registered under this identifier.
    #[error("unknown sort '{id}'")]
    UnknownSort { id: String },

    /// Two sort descriptors share an identifier.
    #[error("sort '{id}' is registered more than once")]
    DuplicateSort { id: String },

    /// An attribute is listed more than once as filterable.
    #[error("filter group '{group}' is configured more than once")]
    DuplicateGroup { group: String },

    /// The adapter was given zero or several consumers.
    #[error("engine must be mounted with exactly one consumer, found {found}")]
    ExactlyOneConsumer { found: usize },
}

/// Result type for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
