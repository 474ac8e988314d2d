//! In-memory graph store.
//!
//! Backs `--dry-run` and the test suite. Indexed nodes are keyed by the
//! (index, key, value) triple; relationships are deduplicated on
//! (from, type, to), matching the merge semantics the Neo4j backend gets from
//! Cypher MERGE.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{GraphStore, NodeRef, PropertyMap, StoreError};

#[derive(Debug, Default, Clone)]
struct NodeData {
    properties: PropertyMap,
    labels: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<NodeData>,
    index: HashMap<(String, String, String), NodeRef>,
    relationships: BTreeSet<(NodeRef, String, NodeRef)>,
}

impl Inner {
    fn insert_node(&mut self, properties: PropertyMap) -> NodeRef {
        let node = NodeRef::new(self.nodes.len() as i64);
        self.nodes.push(NodeData {
            properties,
            labels: BTreeSet::new(),
        });
        node
    }

    fn node_mut(&mut self, node: NodeRef) -> Result<&mut NodeData, StoreError> {
        self.nodes
            .get_mut(node.id() as usize)
            .ok_or(StoreError::UnknownNode(node))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().unwrap().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.lock().unwrap().relationships.len()
    }

    pub fn node_properties(&self, node: NodeRef) -> Option<PropertyMap> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .get(node.id() as usize)
            .map(|n| n.properties.clone())
    }

    pub fn node_labels(&self, node: NodeRef) -> Option<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .get(node.id() as usize)
            .map(|n| n.labels.iter().cloned().collect())
    }

    pub fn nodes_with_label(&self, label: &str) -> Vec<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.labels.contains(label))
            .map(|(i, _)| NodeRef::new(i as i64))
            .collect()
    }

    pub fn relationships(&self) -> Vec<(NodeRef, String, NodeRef)> {
        let inner = self.inner.lock().unwrap();
        inner.relationships.iter().cloned().collect()
    }

    pub fn relationships_of_type(&self, rel_type: &str) -> Vec<(NodeRef, NodeRef)> {
        let inner = self.inner.lock().unwrap();
        inner
            .relationships
            .iter()
            .filter(|(_, t, _)| t == rel_type)
            .map(|(f, _, t2)| (*f, *t2))
            .collect()
    }

    pub fn indexed_node(&self, index: &str, key: &str, value: &Value) -> Option<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .index
            .get(&(index.to_string(), key.to_string(), index_value(value)))
            .copied()
    }
}

/// Index values compare by their JSON rendering, so the string "42" and the
/// number 42 stay distinct keys.
fn index_value(value: &Value) -> String {
    value.to_string()
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_or_create_indexed_node(
        &self,
        index: &str,
        key: &str,
        value: &Value,
        properties: &PropertyMap,
    ) -> Result<NodeRef, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let triple = (index.to_string(), key.to_string(), index_value(value));
        if let Some(node) = inner.index.get(&triple) {
            return Ok(*node);
        }
        let node = inner.insert_node(properties.clone());
        inner.index.insert(triple, node);
        Ok(node)
    }

    async fn create_node(&self, properties: &PropertyMap) -> Result<NodeRef, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.insert_node(properties.clone()))
    }

    async fn add_label(&self, node: NodeRef, label: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.node_mut(node)?.labels.insert(label.to_string());
        Ok(())
    }

    async fn create_relationship(
        &self,
        from: NodeRef,
        rel_type: &str,
        to: NodeRef,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.node_mut(from)?;
        inner.node_mut(to)?;
        inner.relationships.insert((from, rel_type.to_string(), to));
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::default();
        Ok(())
    }
}
