//! Schema-less documents
//!
//! A document is an id plus a JSON object body. Ids are caller-supplied
//! or generated (UUIDv4) at construction, matching the store's contract
//! that every saved document has a stable id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A schema-less document: string keys mapped to JSON values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    body: Map<String, Value>,
}

impl Document {
    /// Create a document with a generated UUIDv4 id
    pub fn new(body: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            body,
        }
    }

    /// Create a document with a caller-supplied id
    pub fn with_id(id: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Returns the document id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document body
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consumes the document, returning the body
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Document::new(body(json!({"a": 1})));
        let b = Document::new(body(json!({"a": 1})));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_with_id_preserves_id() {
        let doc = Document::with_id("doc-1", body(json!({"n": true})));
        assert_eq!(doc.id(), "doc-1");
        assert_eq!(doc.body()["n"], json!(true));
    }
}
