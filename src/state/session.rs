//! Persistent session state: the categorization mapping, the list of known
//! categories, and the current page.
//!
//! The state lives in memory and is flushed to a JSON sidecar inside the
//! images directory only at explicit save points (the Save control, or
//! advancing a page). Toggles between saves are held in memory only.

use crate::config::DEFAULT_CATEGORY;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The session document persisted to `categorised.json`.
///
/// `categorised` maps a category name to the ordered list of filenames
/// labeled with it. Membership is what matters; the toggle path keeps the
/// lists duplicate-free. A filename may appear under any number of
/// categories at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub categorised: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub page: usize,
}

fn default_categories() -> Vec<String> {
    vec![DEFAULT_CATEGORY.to_string()]
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            categorised: BTreeMap::new(),
            categories: default_categories(),
            page: 0,
        }
    }
}

impl SessionState {
    /// Load the session from `path`, or return the default state when no
    /// file exists yet. A file that exists but fails to parse is an error;
    /// there is no partial recovery.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }

    /// Serialize the full session to `path`, overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Parse a session document from JSON. Missing fields fall back to the
    /// defaults, matching documents written by older versions by hand.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the session as pretty-printed JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Toggle membership of `file` in `category`: remove it when present,
    /// append it otherwise. This is the only mutation entry point for the
    /// categorization mapping. Any category string is accepted, including
    /// ones not in `categories`.
    pub fn toggle(&mut self, file: &str, category: &str) {
        let members = self.categorised.entry(category.to_string()).or_default();
        if let Some(index) = members.iter().position(|f| f == file) {
            members.remove(index);
        } else {
            members.push(file.to_string());
        }
    }

    /// Whether `file` is currently labeled with `category`.
    pub fn is_member(&self, file: &str, category: &str) -> bool {
        self.categorised
            .get(category)
            .map(|members| members.iter().any(|f| f == file))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = SessionState::default();
        assert!(state.categorised.is_empty());
        assert_eq!(state.categories, vec![DEFAULT_CATEGORY.to_string()]);
        assert_eq!(state.page, 0);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut state = SessionState::default();

        state.toggle("a.jpg", "cat1");
        assert!(state.is_member("a.jpg", "cat1"));

        state.toggle("a.jpg", "cat1");
        assert!(!state.is_member("a.jpg", "cat1"));
    }

    #[test]
    fn test_toggle_twice_is_involution() {
        let mut state = SessionState::default();
        state.toggle("a.jpg", "cat1");
        state.toggle("b.jpg", "cat1");
        let before = state.clone();

        state.toggle("c.jpg", "cat1");
        state.toggle("c.jpg", "cat1");

        assert_eq!(state, before);
    }

    #[test]
    fn test_toggle_never_duplicates() {
        let mut state = SessionState::default();
        state.toggle("a.jpg", "cat1");
        state.toggle("a.jpg", "cat1");
        state.toggle("a.jpg", "cat1");

        assert_eq!(state.categorised["cat1"], vec!["a.jpg".to_string()]);
    }

    #[test]
    fn test_membership_is_independent_across_categories() {
        let mut state = SessionState::default();
        state.toggle("a.jpg", "cat1");
        state.toggle("a.jpg", "cat2");
        state.toggle("a.jpg", "exclude");

        state.toggle("a.jpg", "cat2");

        assert!(state.is_member("a.jpg", "cat1"));
        assert!(!state.is_member("a.jpg", "cat2"));
        assert!(state.is_member("a.jpg", "exclude"));
    }

    #[test]
    fn test_toggle_accepts_unknown_category() {
        let mut state = SessionState::default();
        state.toggle("a.jpg", "brand-new");

        assert!(state.is_member("a.jpg", "brand-new"));
        // The known-categories list is not touched by the toggle path.
        assert_eq!(state.categories, vec![DEFAULT_CATEGORY.to_string()]);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("categorised.json");

        let mut state = SessionState::default();
        state.toggle("a.jpg", "cat1");
        state.toggle("b.jpg", "cat1");
        state.toggle("b.jpg", "exclude");
        state.page = 3;
        state.save(&path).unwrap();

        let loaded = SessionState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = SessionState::load(&tmp.path().join("categorised.json")).unwrap();
        assert_eq!(loaded, SessionState::default());
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("categorised.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(SessionState::load(&path).is_err());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let state = SessionState::from_json("{}").unwrap();
        assert_eq!(state, SessionState::default());

        let state = SessionState::from_json(r#"{ "page": 2 }"#).unwrap();
        assert_eq!(state.page, 2);
        assert_eq!(state.categories, vec![DEFAULT_CATEGORY.to_string()]);
    }
}
