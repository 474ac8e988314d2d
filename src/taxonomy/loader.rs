//! Taxonomy loader pipeline.
//!
//! Reads the flat taxonomy table and creates one class node per entry, wired
//! into a parent/child "subcategory of" chain. Independent of the schema
//! pipeline; idempotent given the store's merge semantics.

use serde_json::Value;
use thiserror::Error;

use super::{REL_SUBCATEGORY_OF, SES_CLASS_KEY, SES_CLASS_LABEL, SES_INDEX};
use crate::config::LoaderConfig;
use crate::graph_store::{GraphStore, PropertyMap, StoreError};
use crate::schema_catalog::{SchemaCatalogError, Table};

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error(transparent)]
    Catalog(#[from] SchemaCatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaxonomySummary {
    pub classes: u32,
    pub parent_links: u32,
}

impl std::fmt::Display for TaxonomySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} taxonomy classes, {} subcategory links",
            self.classes, self.parent_links
        )
    }
}

/// Load the taxonomy table into the store.
pub async fn run_taxonomy(
    config: &LoaderConfig,
    store: &dyn GraphStore,
) -> Result<TaxonomySummary, TaxonomyError> {
    let table = Table::from_path("taxonomy", &config.taxonomy_file, config.delimiter)?;
    table.require_columns(&config.taxonomy_columns.required())?;

    let mut summary = TaxonomySummary::default();

    // Every named class first, so a parent referenced before its own row
    // still ends up with that row's description
    for record in table.records() {
        let name = record[config.taxonomy_columns.name.as_str()];
        let description = record[config.taxonomy_columns.description.as_str()];

        let mut properties = PropertyMap::new();
        properties.insert(
            SES_CLASS_KEY.to_string(),
            Value::String(name.to_string()),
        );
        properties.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );

        let name_value = Value::String(name.to_string());
        let node = store
            .get_or_create_indexed_node(SES_INDEX, SES_CLASS_KEY, &name_value, &properties)
            .await?;
        store.add_label(node, SES_CLASS_LABEL).await?;
        summary.classes += 1;
    }

    // Then the subcategory chain; a parent that never has its own row is
    // created here with just its class name
    for record in table.records() {
        let name = record[config.taxonomy_columns.name.as_str()];
        let parent = record[config.taxonomy_columns.parent.as_str()];
        if parent.is_empty() {
            continue;
        }

        let name_value = Value::String(name.to_string());
        let node = store
            .get_or_create_indexed_node(SES_INDEX, SES_CLASS_KEY, &name_value, &PropertyMap::new())
            .await?;

        let parent_value = Value::String(parent.to_string());
        let mut parent_properties = PropertyMap::new();
        parent_properties.insert(SES_CLASS_KEY.to_string(), parent_value.clone());

        let parent_node = store
            .get_or_create_indexed_node(
                SES_INDEX,
                SES_CLASS_KEY,
                &parent_value,
                &parent_properties,
            )
            .await?;
        store
            .create_relationship(node, REL_SUBCATEGORY_OF, parent_node)
            .await?;
        summary.parent_links += 1;
    }

    Ok(summary)
}
