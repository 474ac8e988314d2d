//! Error types for schema table loading and catalog construction.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaCatalogError {
    #[error("Failed to read table `{path}`: {error}")]
    TableRead { path: String, error: String },

    #[error("Table `{table}` is missing required column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("No root object type: every object row names a parent")]
    NoRootType,

    #[error("Multiple root object types {roots:?}: only one top-level object type is supported")]
    MultipleRootTypes { roots: Vec<String> },

    #[error("Object type `{object_id}` references undefined parent `{parent_id}`")]
    UnknownParent {
        object_id: String,
        parent_id: String,
    },

    #[error("Object parent chain forms a cycle through `{object_id}`")]
    ParentCycle { object_id: String },

    #[error("Object type `{object_id}` has an unusable parameter spec `{spec}`")]
    InvalidParameterSpec { object_id: String, spec: String },

    #[error("Duplicate object id `{object_id}` in object schema table")]
    DuplicateObjectId { object_id: String },
}
