//! Neo4j-backed graph store over Bolt.
//!
//! Get-or-create and relationship creation both compile to Cypher MERGE, so
//! re-running a pipeline against the same store converges instead of
//! duplicating nodes and edges.

use async_trait::async_trait;
use neo4rs::{query, Graph, Query};
use serde_json::Value;
use url::Url;

use super::{GraphStore, NodeRef, PropertyMap, StoreError};
use crate::config::Neo4jConfig;

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect using the configured Bolt URI and credentials.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, StoreError> {
        let addr = match Url::parse(&config.uri) {
            Ok(url) => {
                let host = url.host_str().unwrap_or("localhost").to_string();
                let port = url.port().unwrap_or(7687);
                format!("{host}:{port}")
            }
            Err(_) => config.uri.clone(),
        };

        log::info!("Connecting to Neo4j at {addr}");
        let graph = Graph::new(&addr, &config.user, &config.password).await?;
        Ok(Self { graph })
    }

    async fn run_returning_id(&self, q: Query, operation: &str) -> Result<NodeRef, StoreError> {
        let mut stream = self.graph.execute(q).await?;
        let row = stream.next().await?.ok_or_else(|| StoreError::MissingId {
            operation: operation.to_string(),
        })?;
        let id: i64 = row.get("id").ok_or_else(|| StoreError::MissingId {
            operation: operation.to_string(),
        })?;
        Ok(NodeRef::new(id))
    }
}

/// Backtick-quote an identifier for interpolation into Cypher.
fn ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Bind a scalar JSON value as a Cypher parameter. Nulls never reach here:
/// property writers skip them, leaving the property absent, which is how
/// Neo4j models null anyway.
fn bind(q: Query, key: &str, value: &Value) -> Query {
    match value {
        Value::String(s) => q.param(key, s.clone()),
        Value::Bool(b) => q.param(key, *b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.param(key, i)
            } else {
                q.param(key, n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::Null => q.param(key, String::new()),
        other => q.param(key, other.to_string()),
    }
}

/// `n.`prop` = $p0, ...` fragments for every non-null property.
fn property_assignments(properties: &PropertyMap) -> (String, Vec<(String, &Value)>) {
    let mut fragments = Vec::new();
    let mut params = Vec::new();
    for (i, (name, value)) in properties
        .iter()
        .filter(|(_, v)| !v.is_null())
        .enumerate()
    {
        let param = format!("p{i}");
        fragments.push(format!("n.{} = ${}", ident(name), param));
        params.push((param, value));
    }
    (fragments.join(", "), params)
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn get_or_create_indexed_node(
        &self,
        index: &str,
        key: &str,
        value: &Value,
        properties: &PropertyMap,
    ) -> Result<NodeRef, StoreError> {
        let (assignments, params) = property_assignments(properties);
        let cypher = if assignments.is_empty() {
            format!(
                "MERGE (n:{} {{{}: $value}}) RETURN id(n) AS id",
                ident(index),
                ident(key)
            )
        } else {
            format!(
                "MERGE (n:{} {{{}: $value}}) ON CREATE SET {} RETURN id(n) AS id",
                ident(index),
                ident(key),
                assignments
            )
        };

        let mut q = bind(query(&cypher), "value", value);
        for (param, value) in params {
            q = bind(q, &param, value);
        }
        self.run_returning_id(q, "indexed merge").await
    }

    async fn create_node(&self, properties: &PropertyMap) -> Result<NodeRef, StoreError> {
        let (assignments, params) = property_assignments(properties);
        let cypher = if assignments.is_empty() {
            "CREATE (n) RETURN id(n) AS id".to_string()
        } else {
            format!("CREATE (n) SET {} RETURN id(n) AS id", assignments)
        };

        let mut q = query(&cypher);
        for (param, value) in params {
            q = bind(q, &param, value);
        }
        self.run_returning_id(q, "create node").await
    }

    async fn add_label(&self, node: NodeRef, label: &str) -> Result<(), StoreError> {
        // Labels cannot be parameterized in Cypher
        let cypher = format!("MATCH (n) WHERE id(n) = $id SET n:{}", ident(label));
        self.graph.run(query(&cypher).param("id", node.id())).await?;
        Ok(())
    }

    async fn create_relationship(
        &self,
        from: NodeRef,
        rel_type: &str,
        to: NodeRef,
    ) -> Result<(), StoreError> {
        let cypher = format!(
            "MATCH (a), (b) WHERE id(a) = $from_id AND id(b) = $to_id MERGE (a)-[:{}]->(b)",
            ident(rel_type)
        );
        self.graph
            .run(
                query(&cypher)
                    .param("from_id", from.id())
                    .param("to_id", to.id()),
            )
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.graph.run(query("MATCH (n) DETACH DELETE n")).await?;
        Ok(())
    }
}
