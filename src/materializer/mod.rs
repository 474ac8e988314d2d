//! Tree materialization: the recursive expansion of the object schema forest
//! into graph nodes and relationships.

pub mod taxonomy_link;
pub mod tree;

use thiserror::Error;

pub use tree::{RunSummary, TreeMaterializer};

use crate::config::LoaderConfig;
use crate::graph_store::{GraphStore, StoreError};
use crate::schema_catalog::object_schema::BindValueError;
use crate::schema_catalog::{SchemaCatalog, SchemaCatalogError, Table};
use crate::source::{RelationalSource, SourceError};

/// Index holding object nodes deduplicated by their configured index field.
pub const ID_INDEX: &str = "ID";
/// Key under which the dedup value is stored in [`ID_INDEX`].
pub const ID_INDEX_KEY: &str = "index_field";
/// Label attached to every element node.
pub const ELEMENT_LABEL: &str = "Element";

pub const REL_HAS_CHILD: &str = "has child";
pub const REL_HAS_ELEMENT: &str = "has element";
pub const REL_BELONGS_TO: &str = "belongs to";

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Parent record has no bind key `{name}` for object type `{object_id}`")]
    MissingBindParameter { object_id: String, name: String },

    #[error("Bind parameter `{name}` for object type `{object_id}` is unusable: {source}")]
    BindValue {
        object_id: String,
        name: String,
        source: BindValueError,
    },

    #[error("Unknown object type `{object_id}`")]
    UnknownObjectType { object_id: String },

    #[error("Element ({object_id}, {field_name}) has no SES class")]
    MissingTaxonomyClass {
        object_id: String,
        field_name: String,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build pipeline failure: catalog construction or materialization.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Catalog(#[from] SchemaCatalogError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The schema-loader pipeline: read the object and element tables, build the
/// catalog, reset the store, run the root query, and expand a tree for every
/// record the root query returns.
pub async fn run_build(
    config: &LoaderConfig,
    source: &dyn RelationalSource,
    store: &dyn GraphStore,
    keep_store: bool,
) -> Result<RunSummary, BuildError> {
    let objects_table = Table::from_path("objects", &config.objects_file, config.delimiter)?;
    let elements_table = Table::from_path("elements", &config.elements_file, config.delimiter)?;
    let catalog = SchemaCatalog::build(
        &objects_table,
        &elements_table,
        &config.object_columns,
        &config.element_columns,
    )?;
    log::info!(
        "Schema catalog: {} object types, {} element definitions, root type `{}`",
        catalog.object_count(),
        catalog.element_count(),
        catalog.root_id()
    );

    if !keep_store {
        log::info!("Clearing target graph store");
        store.clear().await?;
    }

    log::debug!("Executing root query: {}", config.root_query);
    let seed = source.execute(&config.root_query).await?;
    log::info!("Root query returned {} virtual parent records", seed.rows.len());

    let mut materializer = TreeMaterializer::new(&catalog, source, store);
    for parent in seed.records() {
        materializer.expand_root(&parent).await?;
    }

    Ok(materializer.into_summary())
}
