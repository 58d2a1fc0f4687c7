//! Route table module
//!
//! Ordered `(pattern, method map)` entries. Lookup walks the entries in
//! registration order and the first hit wins.

use super::matcher::{match_pattern, Params};
use std::collections::HashMap;

struct RouteEntry<H> {
    pattern: String,
    methods: HashMap<String, H>,
}

/// Registered API routes, generic over the handler type
pub struct RouteTable<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` under `pattern`
    ///
    /// Registering an existing pattern merges into its method map and keeps
    /// the pattern's original position. Methods are stored lower-cased.
    pub fn register(&mut self, pattern: &str, method: &str, handler: H) {
        let method = method.to_ascii_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.pattern == pattern) {
            entry.methods.insert(method, handler);
            return;
        }

        let mut methods = HashMap::new();
        methods.insert(method, handler);
        self.entries.push(RouteEntry {
            pattern: pattern.to_string(),
            methods,
        });
    }

    /// Find the first pattern that has `method` and matches `path`
    pub fn lookup(&self, path: &str, method: &str) -> Option<(&H, Params)> {
        let method = method.to_ascii_lowercase();
        self.entries.iter().find_map(|entry| {
            let handler = entry.methods.get(&method)?;
            let params = match_pattern(&entry.pattern, path)?;
            Some((handler, params))
        })
    }

    /// Registered patterns in priority order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_method() {
        let mut table = RouteTable::new();
        table.register("/queues", "GET", "list");
        table.register("/queues/:name/pause", "put", "pause");

        let (handler, params) = table.lookup("/queues", "get").unwrap();
        assert_eq!(*handler, "list");
        assert!(params.is_empty());

        assert!(table.lookup("/queues", "post").is_none());
        let (handler, params) = table.lookup("/queues/mail/pause", "PUT").unwrap();
        assert_eq!(*handler, "pause");
        assert_eq!(params["name"], "mail");
    }

    #[test]
    fn test_first_registered_wins() {
        let mut table = RouteTable::new();
        table.register("/queues/:name", "get", "by-name");
        table.register("/queues/stats", "get", "stats");

        let (handler, params) = table.lookup("/queues/stats", "get").unwrap();
        assert_eq!(*handler, "by-name");
        assert_eq!(params["name"], "stats");
    }

    #[test]
    fn test_method_miss_falls_through_to_later_pattern() {
        let mut table = RouteTable::new();
        table.register("/queues/:name", "delete", "remove");
        table.register("/queues/stats", "get", "stats");

        let (handler, _) = table.lookup("/queues/stats", "get").unwrap();
        assert_eq!(*handler, "stats");
    }

    #[test]
    fn test_same_pattern_merges_methods() {
        let mut table = RouteTable::new();
        table.register("/queues/:name", "get", "read");
        table.register("/other", "get", "other");
        table.register("/queues/:name", "delete", "remove");

        assert_eq!(table.len(), 2);
        assert_eq!(table.patterns().collect::<Vec<_>>(), ["/queues/:name", "/other"]);
        assert_eq!(*table.lookup("/queues/a", "get").unwrap().0, "read");
        assert_eq!(*table.lookup("/queues/a", "delete").unwrap().0, "remove");
    }

    #[test]
    fn test_reregistering_method_replaces_handler() {
        let mut table = RouteTable::new();
        table.register("/queues", "get", "old");
        table.register("/queues", "get", "new");
        assert_eq!(*table.lookup("/queues", "get").unwrap().0, "new");
    }

    #[test]
    fn test_empty_table() {
        let table: RouteTable<()> = RouteTable::new();
        assert!(table.is_empty());
        assert!(table.lookup("/", "get").is_none());
    }
}
