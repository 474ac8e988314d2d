//! Graphloom - relational-to-graph tree materialization
//!
//! This crate migrates hierarchical relational data into a labeled property
//! graph through:
//! - CSV-described object and element schemas
//! - Parameterized query execution against ClickHouse
//! - Recursive materialization of query rows as node/relationship trees
//! - A shared SES taxonomy that element nodes attach to

pub mod config;
pub mod graph_store;
pub mod materializer;
pub mod schema_catalog;
pub mod source;
pub mod taxonomy;
