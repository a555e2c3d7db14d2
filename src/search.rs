use serde_json::json;

use crate::catalog::CatalogEntry;
use crate::config::{HISTORY_KEY, HISTORY_MAX_ENTRIES};
use crate::logging::{log_event, LogLevel};
use crate::store::KeyValueStore;

/// Recent search terms, most recent first, persisted as a JSON array.
pub struct SearchHistory<S> {
    store: S,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, HISTORY_KEY, HISTORY_MAX_ENTRIES)
    }

    pub fn with_key(store: S, key: &str, limit: usize) -> Self {
        Self {
            store,
            key: key.to_string(),
            limit,
        }
    }

    pub fn entries(&self) -> Vec<String> {
        let Some(raw) = self.store.get(&self.key) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => entries,
            Err(error) => {
                log_event(
                    LogLevel::Warn,
                    "search_history_corrupt",
                    json!({ "key": self.key, "error": error.to_string() }),
                );
                Vec::new()
            }
        }
    }

    fn write(&self, entries: &[String]) {
        match serde_json::to_string(entries) {
            Ok(encoded) => self.store.set(&self.key, &encoded),
            Err(error) => log_event(
                LogLevel::Error,
                "search_history_encode_failed",
                json!({ "error": error.to_string() }),
            ),
        }
    }

    /// Moves `query` to the front, keeping at most `limit` terms.
    pub fn save(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let mut entries = self.entries();
        entries.retain(|existing| existing != query);
        entries.insert(0, query.to_string());
        entries.truncate(self.limit);
        self.write(&entries);
    }

    pub fn remove(&self, query: &str) {
        let mut entries = self.entries();
        entries.retain(|existing| existing != query);
        self.write(&entries);
    }

    pub fn clear(&self) {
        self.store.remove(&self.key);
    }
}

/// Dropdown suggestions for `query`: matching titles first, then genres.
pub fn suggestions(entries: &[CatalogEntry], genres: &[String], query: &str) -> Vec<String> {
    let lowered = query.trim().to_lowercase();
    if lowered.is_empty() {
        return Vec::new();
    }

    let titles = entries
        .iter()
        .map(|entry| entry.title.as_str())
        .filter(|title| title.to_lowercase().contains(&lowered));
    let genres = genres
        .iter()
        .map(String::as_str)
        .filter(|genre| genre.to_lowercase().contains(&lowered));

    let mut unique: Vec<String> = Vec::new();
    for candidate in titles.chain(genres) {
        if !unique.iter().any(|seen| seen == candidate) {
            unique.push(candidate.to_string());
        }
    }
    unique
}
