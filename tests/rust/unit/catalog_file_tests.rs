//! Unit tests for loading schema tables from files.
//!
//! The inline module tests cover parsing and catalog construction from
//! in-memory readers; these go through the file-path entry points.

use std::io::Write;

use graphloom::config::{ElementColumns, ObjectColumns};
use graphloom::schema_catalog::{SchemaCatalog, SchemaCatalogError, Table};
use tempfile::NamedTempFile;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn test_table_from_path() {
    let file = write_file("Name,Parent,Description\nHue,,color family\n");
    let table = Table::from_path("taxonomy", file.path(), b',').unwrap();
    assert_eq!(table.header, vec!["Name", "Parent", "Description"]);
    assert_eq!(table.rows, vec![vec!["Hue", "", "color family"]]);
}

#[test]
fn test_table_from_missing_path() {
    let err = Table::from_path("taxonomy", "/definitely/not/here.csv", b',').unwrap_err();
    assert!(matches!(err, SchemaCatalogError::TableRead { .. }));
}

#[test]
fn test_catalog_from_files() {
    let objects = write_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,\"SELECT * FROM sites WHERE country = ?\",,country:text,Site,site_id\n\
         plot,\"SELECT * FROM plots WHERE site_id = ?\",site,site_id:int,Plot,\n",
    );
    let elements = write_file(
        "Object ID,Field Name,SES Class\n\
         plot,slope,Terrain\n",
    );

    let objects_table = Table::from_path("objects", objects.path(), b',').unwrap();
    let elements_table = Table::from_path("elements", elements.path(), b',').unwrap();
    let catalog = SchemaCatalog::build(
        &objects_table,
        &elements_table,
        &ObjectColumns::default(),
        &ElementColumns::default(),
    )
    .unwrap();

    assert_eq!(catalog.root_id(), "site");
    assert_eq!(catalog.root().children, vec!["plot"]);
    assert!(catalog.element("plot", "slope").is_some());
}

#[test]
fn test_quoted_query_survives_round_trip() {
    let objects = write_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,\"SELECT id, name FROM sites WHERE country = ?\",,country:text,Site,\n",
    );
    let table = Table::from_path("objects", objects.path(), b',').unwrap();
    assert_eq!(
        table.rows[0][1],
        "SELECT id, name FROM sites WHERE country = ?"
    );
}
