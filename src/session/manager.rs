//! Session manager
//!
//! The facade the host application talks to. Document and index
//! operations target whatever database the registry currently designates
//! as default; replication operations drive the single controller. All
//! operations are `&mut self` — one logical owner per session, no
//! internal locking. Background engine activity (change notifications,
//! sync progress) arrives through listener callbacks, never by blocking
//! a session call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assets::AssetResolver;
use crate::engine::{Database, Document, Query, QueryChange, Replicator};
use crate::observability::{Logger, Severity};
use crate::registry::{DatabaseRegistry, QueryRegistry, StorageError, StorageResult};
use crate::replication::{ReplicationResult, ReplicatorController};

/// Construction-time session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Application-private storage root all stores live under
    pub root: PathBuf,
    /// Whether informational engine logging is emitted (warnings and
    /// errors are always emitted).
    ///
    /// The threshold is process-global: the last session constructed
    /// wins, and sessions sharing a process share it.
    pub enable_logging: bool,
}

impl SessionConfig {
    /// Create a configuration with logging enabled
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            enable_logging: true,
        }
    }
}

/// Result envelope for document reads.
///
/// Always carries the requested id; absence of the document is an empty
/// `doc` mapping, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    /// The requested document id
    pub id: String,
    /// The document body, empty when no such document exists
    pub doc: Map<String, Value>,
}

/// Top-level session facade
pub struct SessionManager {
    assets: Box<dyn AssetResolver>,
    databases: DatabaseRegistry,
    queries: QueryRegistry,
    replication: ReplicatorController,
}

impl SessionManager {
    /// Create a session with an injected asset resolver.
    ///
    /// The resolver is required at construction; there is no session
    /// without one.
    pub fn new(assets: Box<dyn AssetResolver>, config: SessionConfig) -> Self {
        if config.enable_logging {
            Logger::set_min_severity(Severity::Info);
        } else {
            Logger::set_min_severity(Severity::Warn);
        }
        Self {
            assets,
            databases: DatabaseRegistry::new(config.root),
            queries: QueryRegistry::new(),
            replication: ReplicatorController::new(),
        }
    }

    // ------------------------------------------------------------------
    // Databases
    // ------------------------------------------------------------------

    /// Open (or create) the database named `name` and select it as the
    /// default. Bootstraps from a bundled prebuilt store on first open.
    pub fn open_database(&mut self, name: &str) -> StorageResult<()> {
        self.databases.open_or_create(name, self.assets.as_ref())
    }

    /// Close the database named `name`. A no-op for unknown names; the
    /// default selection is not changed when a different name was
    /// default.
    pub fn close_database(&mut self, name: &str) {
        self.databases.close(name);
    }

    /// Delete the store named `name` from disk, registered or not
    pub fn delete_database(&mut self, name: &str) -> StorageResult<()> {
        self.databases.delete(name)
    }

    /// Build a full-text index over `properties` on the default database
    pub fn create_index(&mut self, name: &str, properties: &[String]) -> StorageResult<()> {
        self.databases.create_fulltext_index(name, properties)
    }

    /// Look up an open handle by name
    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    /// Returns the default database handle, if one is selected and open
    pub fn default_database(&self) -> Option<&Database> {
        self.databases.default_database()
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Save a document with a generated id into the default database,
    /// returning the id
    pub fn save_document(&mut self, body: Map<String, Value>) -> StorageResult<String> {
        self.save(Document::new(body))
    }

    /// Save a document under a caller-supplied id into the default
    /// database, returning the id
    pub fn save_document_with_id(
        &mut self,
        id: &str,
        body: Map<String, Value>,
    ) -> StorageResult<String> {
        self.save(Document::with_id(id, body))
    }

    fn save(&mut self, document: Document) -> StorageResult<String> {
        let database = self
            .databases
            .default_database_mut()
            .ok_or(StorageError::NoDefaultDatabase)?;
        let name = database.name().to_string();
        database
            .save_document(document)
            .map_err(|source| StorageError::Write { name, source })
    }

    /// Fetch a document from the default database.
    ///
    /// The envelope always carries the requested id; a missing document
    /// (or no default database) yields an empty body.
    pub fn get_document(&self, id: &str) -> DocumentEnvelope {
        let doc = self
            .databases
            .default_database()
            .and_then(|db| db.document_with_id(id))
            .map(Document::into_body)
            .unwrap_or_default();
        DocumentEnvelope {
            id: id.to_string(),
            doc,
        }
    }

    /// Number of documents in the default database
    pub fn document_count(&self) -> StorageResult<u64> {
        self.databases
            .default_database()
            .map(Database::count)
            .ok_or(StorageError::NoDefaultDatabase)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Register a live query under `id` from an opaque definition.
    ///
    /// A change listener is attached before registration and its token
    /// handed to the registry, so the subscription is torn down cleanly
    /// on removal. Re-using an id replaces the old subscription.
    pub fn add_query(&mut self, id: &str, definition: Value) {
        let mut query = Query::new(definition);
        let query_id = id.to_string();
        let token = query.add_change_listener(move |change: &QueryChange| {
            Logger::trace(
                "QUERY_CHANGE",
                &[
                    ("id", &query_id),
                    ("rows", &change.documents.len().to_string()),
                ],
            );
        });
        self.queries.add(id, query, token);
    }

    /// Look up a live query by id
    pub fn query(&self, id: &str) -> Option<&Query> {
        self.queries.get(id)
    }

    /// Remove the query under `id`, detaching its listener. Returns the
    /// query for any further caller-side teardown.
    pub fn remove_query(&mut self, id: &str) -> Option<Query> {
        self.queries.remove(id)
    }

    // ------------------------------------------------------------------
    // Replication
    // ------------------------------------------------------------------

    /// Start a fresh replicator configuration from the default database
    /// to `endpoint`. A no-op when no default database is selected.
    pub fn set_replicator_endpoint(&mut self, endpoint: &str) {
        let source = self.databases.default_name().map(str::to_string);
        self.replication.set_endpoint(endpoint, source.as_deref());
    }

    /// Set sync directionality; returns the canonical token, or the
    /// empty string when unconfigured
    pub fn set_replicator_type(&mut self, kind: &str) -> String {
        self.replication.set_direction(kind)
    }

    /// Install basic credentials on the pending configuration
    pub fn set_replicator_auth(&mut self, username: &str, password: &str) {
        self.replication.set_auth(username, password);
    }

    /// Install a session token on the pending configuration
    pub fn set_replicator_session_auth(&mut self, token: &str) {
        self.replication.set_session_auth(token);
    }

    /// Pin the transport certificate shipped under `asset_key`
    pub fn set_replicator_pinned_certificate(&mut self, asset_key: &str) -> ReplicationResult<()> {
        self.replication
            .set_pinned_certificate(asset_key, self.assets.as_ref())
    }

    /// Set the continuity flag on the pending configuration
    pub fn set_replicator_continuous(&mut self, continuous: bool) {
        self.replication.set_continuous(continuous);
    }

    /// Build a replicator from the pending configuration snapshot
    pub fn build_replicator(&mut self) {
        self.replication.build();
    }

    /// Begin sync activity on the built replicator
    pub fn start_replication(&mut self) {
        self.replication.start();
    }

    /// Halt sync activity on the built replicator
    pub fn stop_replication(&mut self) {
        self.replication.stop();
    }

    /// Returns the built replicator, if any
    pub fn replicator(&self) -> Option<&Replicator> {
        self.replication.current()
    }
}
