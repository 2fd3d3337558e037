//! Keyword search state.

use crate::record::Record;
use crate::value::Value;

/// The current keyword and the fields it is tested against.
///
/// A record matches when the keyword is empty, or when any searchable field
/// contains the keyword case-insensitively. Strings match on their text;
/// numbers and booleans on their display form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    keyword: String,
    needle: String,
    fields: Vec<String>,
}

impl SearchState {
    /// Creates a search over `fields` with an empty keyword.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchState {
            keyword: String::new(),
            needle: String::new(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Stores the trimmed keyword. An empty (or blank) keyword clears search.
    pub fn set_keyword(&mut self, keyword: &str) {
        self.keyword = keyword.trim().to_string();
        self.needle = self.keyword.to_lowercase();
    }

    /// The current (trimmed) keyword.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The configured searchable fields.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns `true` if a keyword is set.
    pub fn is_active(&self) -> bool {
        !self.keyword.is_empty()
    }

    /// Tests a single record against the keyword.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        self.fields
            .iter()
            .any(|field| self.value_matches(&record.field(field)))
    }

    fn value_matches(&self, value: &Value<'_>) -> bool {
        match value {
            Value::String(s) => s.to_lowercase().contains(&self.needle),
            Value::None => false,
            other => other.to_string().to_lowercase().contains(&self.needle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_keyword_matches_everything() {
        let search = SearchState::new(["title"]);
        assert!(!search.is_active());
        assert!(search.matches(&json!({})));
    }

    #[test]
    fn keyword_is_trimmed() {
        let mut search = SearchState::new(["title"]);
        search.set_keyword("  Foo  ");
        assert_eq!(search.keyword(), "Foo");

        search.set_keyword("   ");
        assert_eq!(search.keyword(), "");
        assert!(!search.is_active());
    }

    #[test]
    fn case_insensitive_substring() {
        let mut search = SearchState::new(["title"]);
        search.set_keyword("WAR");
        assert!(search.matches(&json!({"title": "Star Wars"})));
        assert!(!search.matches(&json!({"title": "Dune"})));
    }

    #[test]
    fn unicode_case_folding() {
        let mut search = SearchState::new(["title"]);
        search.set_keyword("ÉTÉ");
        assert!(search.matches(&json!({"title": "un été"})));
    }

    #[test]
    fn any_searchable_field_matches() {
        let mut search = SearchState::new(["title", "author"]);
        search.set_keyword("herbert");
        assert!(search.matches(&json!({"title": "Dune", "author": "Frank Herbert"})));
    }

    #[test]
    fn only_configured_fields_are_searched() {
        let mut search = SearchState::new(["title"]);
        search.set_keyword("herbert");
        assert!(!search.matches(&json!({"title": "Dune", "author": "Frank Herbert"})));
    }

    #[test]
    fn numbers_and_booleans_match_display_form() {
        let mut search = SearchState::new(["year", "done"]);
        search.set_keyword("196");
        assert!(search.matches(&json!({"year": 1965})));
        search.set_keyword("TRUE");
        assert!(search.matches(&json!({"done": true})));
    }

    #[test]
    fn missing_field_never_matches() {
        let mut search = SearchState::new(["title"]);
        search.set_keyword("a");
        assert!(!search.matches(&json!({"other": "a"})));
    }
}
