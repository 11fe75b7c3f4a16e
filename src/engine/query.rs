//! Queries and change listeners
//!
//! The query definition is opaque to the session manager: a JSON value
//! handed through to the engine. What the manager does own is listener
//! lifetime: `add_change_listener` hands back a single-owner
//! `ListenerToken`, and `remove_change_listener` consumes it, so a token
//! can never be released twice.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::document::Document;

/// A change delivered to query listeners
#[derive(Debug, Clone)]
pub struct QueryChange {
    /// Result rows as of this change
    pub documents: Vec<Document>,
}

/// Opaque handle for an attached change listener.
///
/// Deliberately neither `Clone` nor `Copy`: ownership of the token is
/// ownership of the subscription.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken {
    id: u64,
}

type ChangeListener = Box<dyn FnMut(&QueryChange) + Send>;

/// A live query with attached change listeners
pub struct Query {
    definition: Value,
    next_listener_id: u64,
    listeners: HashMap<u64, ChangeListener>,
}

impl Query {
    /// Create a query from an opaque definition
    pub fn new(definition: Value) -> Self {
        Self {
            definition,
            next_listener_id: 0,
            listeners: HashMap::new(),
        }
    }

    /// Returns the query definition
    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Attach a change listener, returning its token
    pub fn add_change_listener<F>(&mut self, listener: F) -> ListenerToken
    where
        F: FnMut(&QueryChange) + Send + 'static,
    {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.insert(id, Box::new(listener));
        ListenerToken { id }
    }

    /// Detach the listener behind `token`, consuming the token.
    ///
    /// Returns whether a listener was actually removed. False only when
    /// the token belongs to a different query.
    pub fn remove_change_listener(&mut self, token: ListenerToken) -> bool {
        self.listeners.remove(&token.id).is_some()
    }

    /// Number of listeners currently attached
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a change to every attached listener.
    ///
    /// In production the engine's background activity drives this; tests
    /// drive it directly.
    pub fn notify(&mut self, change: &QueryChange) {
        for listener in self.listeners.values_mut() {
            listener(change);
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("definition", &self.definition)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
