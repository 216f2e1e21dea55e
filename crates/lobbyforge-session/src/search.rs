//! The search-result cache: the most recent discovery snapshot.
//!
//! Results are replaced wholesale on each successful discovery pass and
//! never mutated element-wise, so a reader always sees a complete,
//! consistent snapshot in the exact order the backend returned. On a failed
//! pass the previous snapshot stays put — stale results beat an empty list
//! in a server browser.

use lobbyforge_backend::SearchResult;

/// Ordered, index-addressable cache of the latest discovery results.
#[derive(Debug, Default)]
pub struct SearchResultCache {
    results: Vec<SearchResult>,
}

impl SearchResultCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a new result snapshot, discarding the old one. Order is
    /// preserved as given — the backend's order is the display order.
    pub fn replace(&mut self, results: Vec<SearchResult>) {
        tracing::debug!(count = results.len(), "search results replaced");
        self.results = results;
    }

    /// Bounds-checked access by display index.
    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.results.get(index)
    }

    /// The full snapshot, in backend order.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Drops the snapshot entirely. Used on backend teardown.
    pub fn clear(&mut self) {
        self.results.clear();
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lobbyforge_backend::SessionName;

    use super::*;

    fn result(name: &str, ping: u32) -> SearchResult {
        SearchResult {
            session_name: SessionName::from(name),
            owning_user_name: "host".into(),
            ping_ms: ping,
            open_public_connections: 4,
            num_public_connections: 4,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_replace_preserves_backend_order() {
        let mut cache = SearchResultCache::new();

        // Deliberately not sorted by ping: backend order is display order.
        cache.replace(vec![result("b", 90), result("a", 10), result("c", 50)]);

        let pings: Vec<u32> =
            cache.results().iter().map(|r| r.ping_ms).collect();
        assert_eq!(pings, vec![90, 10, 50]);
    }

    #[test]
    fn test_replace_discards_previous_snapshot_wholesale() {
        let mut cache = SearchResultCache::new();
        cache.replace(vec![result("a", 1), result("b", 2), result("c", 3)]);

        cache.replace(vec![result("d", 4)]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0).unwrap().session_name.as_str(), "d");
    }

    #[test]
    fn test_get_out_of_bounds_returns_none() {
        let mut cache = SearchResultCache::new();
        cache.replace(vec![result("a", 1), result("b", 2), result("c", 3)]);

        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_none());
        assert!(cache.get(5).is_none());
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = SearchResultCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn test_clear_drops_snapshot() {
        let mut cache = SearchResultCache::new();
        cache.replace(vec![result("a", 1)]);

        cache.clear();

        assert!(cache.is_empty());
    }
}
