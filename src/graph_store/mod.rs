//! Graph store abstraction.
//!
//! The capability set the pipelines need from the graph side: indexed
//! get-or-create, plain node creation, labeling, relationship creation and a
//! full reset. The Neo4j backend lives in [`neo4j`]; [`memory`] is the
//! in-memory backend used by tests and `--dry-run`.

pub mod memory;
pub mod neo4j;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;

/// Properties attached to a node, in insertion order.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Opaque reference to a store node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(i64);

impl NodeRef {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Graph store operation failed: {0}")]
    Backend(#[from] neo4rs::Error),

    #[error("Graph store returned no node id for {operation}")]
    MissingId { operation: String },

    #[error("Unknown node reference {0}")]
    UnknownNode(NodeRef),
}

/// Mutating capability set of the target graph store.
///
/// `get_or_create_indexed_node` must be idempotent per (index, key, value)
/// triple: two calls with the same triple resolve to the same node, with the
/// initial properties applied only on creation. `create_relationship` has
/// merge semantics: an identical (from, type, to) edge is never duplicated.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn get_or_create_indexed_node(
        &self,
        index: &str,
        key: &str,
        value: &Value,
        properties: &PropertyMap,
    ) -> Result<NodeRef, StoreError>;

    async fn create_node(&self, properties: &PropertyMap) -> Result<NodeRef, StoreError>;

    async fn add_label(&self, node: NodeRef, label: &str) -> Result<(), StoreError>;

    async fn create_relationship(
        &self,
        from: NodeRef,
        rel_type: &str,
        to: NodeRef,
    ) -> Result<(), StoreError>;

    /// Full store reset. Issued once at the start of the build pipeline.
    async fn clear(&self) -> Result<(), StoreError>;
}
