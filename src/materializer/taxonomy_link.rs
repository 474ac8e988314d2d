//! Linking element nodes to their SES taxonomy class.

use serde_json::Value;

use super::{MaterializeError, REL_BELONGS_TO};
use crate::graph_store::{GraphStore, NodeRef, PropertyMap};
use crate::schema_catalog::ElementSchema;
use crate::taxonomy::{SES_CLASS_KEY, SES_CLASS_LABEL, SES_INDEX};

/// Resolve the element's SES class node (creating it on first sight) and wire
/// the "belongs to" edge. An element without a class is a fatal input error.
pub async fn link_to_taxonomy(
    store: &dyn GraphStore,
    element_node: NodeRef,
    element: &ElementSchema,
) -> Result<NodeRef, MaterializeError> {
    let class = element.ses_class.trim();
    if class.is_empty() {
        return Err(MaterializeError::MissingTaxonomyClass {
            object_id: element.object_id.clone(),
            field_name: element.field_name.clone(),
        });
    }

    let mut properties = PropertyMap::new();
    properties.insert(
        SES_CLASS_KEY.to_string(),
        Value::String(class.to_string()),
    );

    let class_value = Value::String(class.to_string());
    let ses_node = store
        .get_or_create_indexed_node(SES_INDEX, SES_CLASS_KEY, &class_value, &properties)
        .await?;
    store.add_label(ses_node, SES_CLASS_LABEL).await?;
    store
        .create_relationship(element_node, REL_BELONGS_TO, ses_node)
        .await?;

    Ok(ses_node)
}
