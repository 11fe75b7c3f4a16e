//! Query registry
//!
//! Subscriptions are keyed by a caller-assigned id and pair a query with
//! the token of its change listener. The pairing is what makes teardown
//! safe: `remove` always detaches the token before the query is handed
//! back, so a discarded subscription can never leave a live listener
//! behind. Re-adding under an existing id removes the old subscription
//! first for the same reason.

use std::collections::HashMap;

use crate::engine::{ListenerToken, Query};
use crate::observability::Logger;

#[derive(Debug)]
struct Subscription {
    query: Query,
    token: ListenerToken,
}

/// Registry of live query subscriptions
#[derive(Debug, Default)]
pub struct QueryRegistry {
    subscriptions: HashMap<String, Subscription>,
}

impl QueryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a query under `id`, taking ownership of its listener
    /// token.
    ///
    /// An existing subscription under the same id is removed first, its
    /// token detached, so listeners are never orphaned by an overwrite.
    pub fn add(&mut self, id: &str, query: Query, token: ListenerToken) {
        if self.subscriptions.contains_key(id) {
            Logger::warn("QUERY_REPLACE", &[("id", id)]);
            self.remove(id);
        }
        self.subscriptions
            .insert(id.to_string(), Subscription { query, token });
        Logger::info("QUERY_ADD", &[("id", id)]);
    }

    /// Look up a query by id
    pub fn get(&self, id: &str) -> Option<&Query> {
        self.subscriptions.get(id).map(|sub| &sub.query)
    }

    /// Remove the subscription under `id`, detaching its listener token
    /// before the query is returned for any further teardown.
    ///
    /// Idempotent: a second call for the same id returns `None` and
    /// detaches nothing.
    pub fn remove(&mut self, id: &str) -> Option<Query> {
        let Subscription { mut query, token } = self.subscriptions.remove(id)?;
        query.remove_change_listener(token);
        Logger::info("QUERY_REMOVE", &[("id", id)]);
        Some(query)
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions are registered
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscription() -> (Query, ListenerToken) {
        let mut query = Query::new(json!({"select": "*"}));
        let token = query.add_change_listener(|_| {});
        (query, token)
    }

    #[test]
    fn test_add_then_get() {
        let mut registry = QueryRegistry::new();
        let (query, token) = subscription();
        registry.add("q1", query, token);

        assert!(registry.get("q1").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_detaches_token() {
        let mut registry = QueryRegistry::new();
        let (query, token) = subscription();
        registry.add("q1", query, token);

        let removed = registry.remove("q1").unwrap();
        assert_eq!(removed.active_listeners(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = QueryRegistry::new();
        let (query, token) = subscription();
        registry.add("q1", query, token);

        assert!(registry.remove("q1").is_some());
        assert!(registry.remove("q1").is_none());
    }

    #[test]
    fn test_overwrite_detaches_old_token() {
        let mut registry = QueryRegistry::new();
        let (first, first_token) = subscription();
        registry.add("q1", first, first_token);

        let (second, second_token) = subscription();
        registry.add("q1", second, second_token);
        assert_eq!(registry.len(), 1);

        // The surviving subscription is the second one, with exactly
        // its own listener attached
        let removed = registry.remove("q1").unwrap();
        assert_eq!(removed.active_listeners(), 0);
    }

    #[test]
    fn test_remove_unknown_id_is_none() {
        let mut registry = QueryRegistry::new();
        assert!(registry.remove("ghost").is_none());
    }
}
