//! The recursive tree materializer.
//!
//! For each object type the walk resolves the bind parameter from the parent
//! record, substitutes it into the type's query template, executes the query,
//! and turns every returned row into a node with its element sub-nodes,
//! recursing into the declared child types. All store writes happen
//! immediately, in program order.

use std::future::Future;
use std::pin::Pin;

use super::taxonomy_link::link_to_taxonomy;
use super::{
    MaterializeError, ELEMENT_LABEL, ID_INDEX, ID_INDEX_KEY, REL_HAS_CHILD, REL_HAS_ELEMENT,
};
use crate::graph_store::{GraphStore, NodeRef};
use crate::schema_catalog::{ObjectSchema, SchemaCatalog};
use crate::source::{ObjectRecord, RelationalSource};

/// Counters reported at the end of a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub trees: u32,
    pub object_nodes: u32,
    pub element_nodes: u32,
    pub relationships: u32,
    pub queries_executed: u32,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} trees: {} object nodes, {} element nodes, {} relationships ({} queries)",
            self.trees,
            self.object_nodes,
            self.element_nodes,
            self.relationships,
            self.queries_executed
        )
    }
}

pub struct TreeMaterializer<'a> {
    catalog: &'a SchemaCatalog,
    source: &'a dyn RelationalSource,
    store: &'a dyn GraphStore,
    summary: RunSummary,
}

impl<'a> TreeMaterializer<'a> {
    pub fn new(
        catalog: &'a SchemaCatalog,
        source: &'a dyn RelationalSource,
        store: &'a dyn GraphStore,
    ) -> Self {
        Self {
            catalog,
            source,
            store,
            summary: RunSummary::default(),
        }
    }

    /// Expand the root object type against one virtual parent record.
    pub async fn expand_root(&mut self, parent: &ObjectRecord) -> Result<(), MaterializeError> {
        let root_id = self.catalog.root_id().to_string();
        for record in self.resolve_children(&root_id, parent).await? {
            self.materialize_tree(&root_id, record).await?;
            self.summary.trees += 1;
        }
        Ok(())
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Steps 1-2: bind parameter resolution, query substitution and
    /// execution. Returns one record per row.
    async fn resolve_children(
        &mut self,
        object_id: &str,
        parent: &ObjectRecord,
    ) -> Result<Vec<ObjectRecord>, MaterializeError> {
        let schema = self.object_schema(object_id)?;

        let value = parent.get(&schema.bind.name).ok_or_else(|| {
            MaterializeError::MissingBindParameter {
                object_id: object_id.to_string(),
                name: schema.bind.name.clone(),
            }
        })?;
        let literal =
            schema
                .bind
                .render_sql(value)
                .map_err(|source| MaterializeError::BindValue {
                    object_id: object_id.to_string(),
                    name: schema.bind.name.clone(),
                    source,
                })?;

        let sql = schema.query.replace('?', &literal);
        log::debug!("Query for object type `{object_id}`: {sql}");

        let result = self.source.execute(&sql).await?;
        self.summary.queries_executed += 1;
        Ok(result.records())
    }

    /// Steps 3-5 for one record: materialize the node and its elements, then
    /// recurse into the child types and wire "has child" edges.
    fn materialize_tree<'s>(
        &'s mut self,
        object_id: &'s str,
        record: ObjectRecord,
    ) -> Pin<Box<dyn Future<Output = Result<NodeRef, MaterializeError>> + Send + 's>> {
        Box::pin(async move {
            let schema = self.object_schema(object_id)?;
            let node = self.materialize_node(schema, &record).await?;

            for child_id in &schema.children {
                for child_record in self.resolve_children(child_id, &record).await? {
                    let child = self.materialize_tree(child_id, child_record).await?;
                    self.store
                        .create_relationship(node, REL_HAS_CHILD, child)
                        .await?;
                    self.summary.relationships += 1;
                }
            }

            Ok(node)
        })
    }

    /// Create (or resolve through the dedup index) the object node, label
    /// it, and attach its element sub-nodes.
    async fn materialize_node(
        &mut self,
        schema: &ObjectSchema,
        record: &ObjectRecord,
    ) -> Result<NodeRef, MaterializeError> {
        let indexed_value = schema
            .index_field
            .as_deref()
            .and_then(|field| record.get(field));

        let node = match indexed_value {
            Some(value) => {
                self.store
                    .get_or_create_indexed_node(ID_INDEX, ID_INDEX_KEY, value, record)
                    .await?
            }
            None => self.store.create_node(record).await?,
        };
        self.store.add_label(node, &schema.label).await?;
        self.summary.object_nodes += 1;

        for (field_name, value) in record {
            let Some(element) = self.catalog.element(&schema.id, field_name) else {
                continue;
            };

            let mut attributes = element.attributes.clone();
            attributes.insert(field_name.clone(), value.clone());

            let element_node = self.store.create_node(&attributes).await?;
            self.store.add_label(element_node, ELEMENT_LABEL).await?;
            self.store
                .create_relationship(node, REL_HAS_ELEMENT, element_node)
                .await?;
            self.summary.element_nodes += 1;
            self.summary.relationships += 1;

            link_to_taxonomy(self.store, element_node, element).await?;
            self.summary.relationships += 1;
        }

        Ok(node)
    }

    fn object_schema(&self, object_id: &str) -> Result<&'a ObjectSchema, MaterializeError> {
        self.catalog
            .object(object_id)
            .ok_or_else(|| MaterializeError::UnknownObjectType {
                object_id: object_id.to_string(),
            })
    }
}
