pub mod errors;
pub mod object_schema;
pub mod tables;

pub use errors::SchemaCatalogError;
pub use object_schema::{
    BindParameter, BindType, BindValueError, ElementSchema, ObjectSchema, SchemaCatalog,
};
pub use tables::Table;
