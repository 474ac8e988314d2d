//! The SES taxonomy: a shared classification hierarchy that element nodes
//! attach to.

pub mod loader;

pub use loader::{run_taxonomy, TaxonomyError, TaxonomySummary};

/// Index holding taxonomy nodes, keyed by class name.
pub const SES_INDEX: &str = "SES";
/// Index key and property name carrying the class name.
pub const SES_CLASS_KEY: &str = "ses_class";
/// Label attached to taxonomy class nodes.
pub const SES_CLASS_LABEL: &str = "ses_class";

pub const REL_SUBCATEGORY_OF: &str = "subcategory of";
