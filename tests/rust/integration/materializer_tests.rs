//! End-to-end build pipeline tests against the in-memory store and a
//! scripted relational source.

use graphloom::graph_store::{GraphStore, MemoryStore, PropertyMap};
use graphloom::materializer::{run_build, BuildError, MaterializeError};
use graphloom::schema_catalog::SchemaCatalogError;
use serde_json::json;

use crate::support::{build_config, table_file, ScriptedSource};

const EMPTY_ELEMENTS: &str = "Object ID,Field Name,SES Class\n";

#[tokio::test]
async fn test_missing_required_column_fails_before_any_query() {
    // No Index column
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI\n\
         site,SELECT 1,,id:int,Site\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new();
    let store = MemoryStore::new();

    let err = run_build(&config, &source, &store, false).await.unwrap_err();
    assert!(matches!(
        err,
        BuildError::Catalog(SchemaCatalogError::MissingColumn { ref table, ref column })
            if table == "objects" && column == "Index"
    ));
    assert!(source.executed().is_empty());
    assert_eq!(store.node_count(), 0);
}

#[tokio::test]
async fn test_multiple_root_types_rejected() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         a,SELECT 1,,id:int,A,\n\
         b,SELECT 2,,id:int,B,\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new();
    let store = MemoryStore::new();

    let err = run_build(&config, &source, &store, false).await.unwrap_err();
    assert!(matches!(
        err,
        BuildError::Catalog(SchemaCatalogError::MultipleRootTypes { .. })
    ));
    assert!(source.executed().is_empty());
}

#[tokio::test]
async fn test_tree_shape_elements_and_taxonomy_links() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,site_id\n\
         plot,SELECT * FROM plots WHERE site_id = ?,site,site_id:int,Plot,\n",
    );
    let elements = table_file(
        "Object ID,Field Name,SES Class\n\
         site,color,Hue\n",
    );
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
        .on(
            "SELECT * FROM sites WHERE country = 'US'",
            &["site_id", "color"],
            vec![vec![json!(1), json!("red")]],
        )
        .on(
            "SELECT * FROM plots WHERE site_id = 1",
            &["plot_id"],
            vec![vec![json!(10)], vec![json!(11)]],
        );
    let store = MemoryStore::new();

    let summary = run_build(&config, &source, &store, false).await.unwrap();
    assert_eq!(summary.trees, 1);
    assert_eq!(summary.object_nodes, 3);
    assert_eq!(summary.element_nodes, 1);
    assert_eq!(summary.relationships, 4);
    assert_eq!(summary.queries_executed, 2);

    // One Site, two Plots, the element, the taxonomy class
    let sites = store.nodes_with_label("Site");
    let plots = store.nodes_with_label("Plot");
    assert_eq!(sites.len(), 1);
    assert_eq!(plots.len(), 2);
    let site = sites[0];

    let site_props = store.node_properties(site).unwrap();
    assert_eq!(site_props["site_id"], json!(1));
    assert_eq!(site_props["color"], json!("red"));

    let has_child = store.relationships_of_type("has child");
    assert_eq!(has_child.len(), 2);
    assert!(has_child.iter().all(|(from, to)| *from == site && plots.contains(to)));

    // The element node carries its schema attributes plus the record value
    let element_nodes = store.nodes_with_label("Element");
    assert_eq!(element_nodes.len(), 1);
    let element = element_nodes[0];
    let element_props = store.node_properties(element).unwrap();
    assert_eq!(element_props["color"], json!("red"));
    assert_eq!(element_props["SES Class"], json!("Hue"));

    let has_element = store.relationships_of_type("has element");
    assert_eq!(has_element, vec![(site, element)]);

    let belongs_to = store.relationships_of_type("belongs to");
    assert_eq!(belongs_to.len(), 1);
    let (from, ses) = belongs_to[0];
    assert_eq!(from, element);
    let ses_props = store.node_properties(ses).unwrap();
    assert_eq!(ses_props["ses_class"], json!("Hue"));
    assert!(store
        .node_labels(ses)
        .unwrap()
        .contains(&"ses_class".to_string()));
    assert_eq!(store.indexed_node("SES", "ses_class", &json!("Hue")), Some(ses));
}

#[tokio::test]
async fn test_dedup_index_resolves_equal_values_to_one_node() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,site_id\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
        .on(
            "SELECT * FROM sites WHERE country = 'US'",
            &["site_id"],
            vec![vec![json!(1)], vec![json!(1)]],
        );
    let store = MemoryStore::new();

    run_build(&config, &source, &store, false).await.unwrap();
    assert_eq!(store.nodes_with_label("Site").len(), 1);
}

#[tokio::test]
async fn test_dedup_index_keeps_differing_values_apart() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,site_id\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
        .on(
            "SELECT * FROM sites WHERE country = 'US'",
            &["site_id"],
            vec![vec![json!(1)], vec![json!(2)]],
        );
    let store = MemoryStore::new();

    run_build(&config, &source, &store, false).await.unwrap();
    assert_eq!(store.nodes_with_label("Site").len(), 2);
}

#[tokio::test]
async fn test_unindexed_records_are_always_distinct() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
        .on(
            "SELECT * FROM sites WHERE country = 'US'",
            &["name"],
            vec![vec![json!("same")], vec![json!("same")]],
        );
    let store = MemoryStore::new();

    run_build(&config, &source, &store, false).await.unwrap();
    assert_eq!(store.nodes_with_label("Site").len(), 2);
}

#[tokio::test]
async fn test_typed_bind_substitution_renders_bare_integer() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         b,SELECT * FROM b WHERE a_id = ?,,id:int,B,\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    // The seed record carries the id as a string; the int spec renders it bare
    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["id"], vec![vec![json!("42")]])
        .on("SELECT * FROM b WHERE a_id = 42", &["x"], vec![]);
    let store = MemoryStore::new();

    run_build(&config, &source, &store, false).await.unwrap();
    assert_eq!(
        source.executed(),
        vec![
            "SELECT * FROM OVERSITE".to_string(),
            "SELECT * FROM b WHERE a_id = 42".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_missing_bind_key_is_fatal() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         b,SELECT * FROM b WHERE a_id = ?,,id:int,B,\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new().on(
        "SELECT * FROM OVERSITE",
        &["something_else"],
        vec![vec![json!(7)]],
    );
    let store = MemoryStore::new();

    let err = run_build(&config, &source, &store, false).await.unwrap_err();
    assert!(matches!(
        err,
        BuildError::Materialize(MaterializeError::MissingBindParameter { ref name, .. })
            if name == "id"
    ));
}

#[tokio::test]
async fn test_empty_taxonomy_class_is_fatal() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,\n",
    );
    let elements = table_file(
        "Object ID,Field Name,SES Class\n\
         site,color,\n",
    );
    let config = build_config(&objects, &elements);

    let source = ScriptedSource::new()
        .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
        .on(
            "SELECT * FROM sites WHERE country = 'US'",
            &["color"],
            vec![vec![json!("red")]],
        );
    let store = MemoryStore::new();

    let err = run_build(&config, &source, &store, false).await.unwrap_err();
    assert!(matches!(
        err,
        BuildError::Materialize(MaterializeError::MissingTaxonomyClass { ref field_name, .. })
            if field_name == "color"
    ));
}

#[tokio::test]
async fn test_store_reset_and_keep_store() {
    let objects = table_file(
        "ObjectId,Query,ParentId,Parameter1,URI,Index\n\
         site,SELECT * FROM sites WHERE country = ?,,country:text,Site,\n",
    );
    let elements = table_file(EMPTY_ELEMENTS);
    let config = build_config(&objects, &elements);

    let script = || {
        ScriptedSource::new()
            .on("SELECT * FROM OVERSITE", &["country"], vec![vec![json!("US")]])
            .on(
                "SELECT * FROM sites WHERE country = 'US'",
                &["name"],
                vec![vec![json!("a")]],
            )
    };

    // Default behavior wipes pre-existing state
    let store = MemoryStore::new();
    store.create_node(&PropertyMap::new()).await.unwrap();
    run_build(&config, &script(), &store, false).await.unwrap();
    assert_eq!(store.node_count(), 1);

    // --keep-store preserves it
    let store = MemoryStore::new();
    store.create_node(&PropertyMap::new()).await.unwrap();
    run_build(&config, &script(), &store, true).await.unwrap();
    assert_eq!(store.node_count(), 2);
}
