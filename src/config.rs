use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Column names expected in the object schema table.
///
/// The defaults match the canonical input files; all of them can be remapped
/// when the source tables use different headers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ObjectColumns {
    pub id: String,
    pub query: String,
    pub parent_id: String,
    pub parameter: String,
    pub label: String,
    pub index: String,
}

impl Default for ObjectColumns {
    fn default() -> Self {
        Self {
            id: "ObjectId".to_string(),
            query: "Query".to_string(),
            parent_id: "ParentId".to_string(),
            parameter: "Parameter1".to_string(),
            label: "URI".to_string(),
            index: "Index".to_string(),
        }
    }
}

impl ObjectColumns {
    /// All required header names, in reporting order.
    pub fn required(&self) -> Vec<&str> {
        vec![
            &self.id,
            &self.query,
            &self.parent_id,
            &self.parameter,
            &self.label,
            &self.index,
        ]
    }
}

/// Column names expected in the element schema table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ElementColumns {
    pub object_id: String,
    pub field_name: String,
    pub ses_class: String,
}

impl Default for ElementColumns {
    fn default() -> Self {
        Self {
            object_id: "Object ID".to_string(),
            field_name: "Field Name".to_string(),
            ses_class: "SES Class".to_string(),
        }
    }
}

impl ElementColumns {
    pub fn required(&self) -> Vec<&str> {
        vec![&self.object_id, &self.field_name, &self.ses_class]
    }
}

/// Column names expected in the taxonomy table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaxonomyColumns {
    pub name: String,
    pub parent: String,
    pub description: String,
}

impl Default for TaxonomyColumns {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            parent: "Parent".to_string(),
            description: "Description".to_string(),
        }
    }
}

impl TaxonomyColumns {
    pub fn required(&self) -> Vec<&str> {
        vec![&self.name, &self.parent, &self.description]
    }
}

/// ClickHouse connection parameters
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    #[validate(length(min = 1, message = "ClickHouse URL cannot be empty"))]
    pub url: String,

    #[validate(length(min = 1, message = "ClickHouse user cannot be empty"))]
    pub user: String,

    /// May legitimately be empty for local instances
    pub password: String,

    #[validate(length(min = 1, message = "ClickHouse database cannot be empty"))]
    pub database: String,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
        }
    }
}

/// Neo4j connection parameters
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct Neo4jConfig {
    #[validate(length(min = 1, message = "Neo4j URI cannot be empty"))]
    pub uri: String,

    #[validate(length(min = 1, message = "Neo4j user cannot be empty"))]
    pub user: String,

    pub password: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
        }
    }
}

/// Loader configuration with validation.
///
/// Every knob the pipelines recognize lives here: input file paths, the CSV
/// delimiter, column-name mappings, the root query and both connections.
/// Built once in `main` and passed down by reference; components hold no
/// ambient state.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Object schema table path
    #[validate(length(min = 1, message = "Objects file path cannot be empty"))]
    pub objects_file: String,

    /// Element schema table path
    #[validate(length(min = 1, message = "Elements file path cannot be empty"))]
    pub elements_file: String,

    /// Taxonomy table path
    #[validate(length(min = 1, message = "Taxonomy file path cannot be empty"))]
    pub taxonomy_file: String,

    /// Field delimiter for all three tables
    pub delimiter: u8,

    /// Query that returns the virtual parent records seeding the traversal
    #[validate(length(min = 1, message = "Root query cannot be empty"))]
    pub root_query: String,

    pub object_columns: ObjectColumns,
    pub element_columns: ElementColumns,
    pub taxonomy_columns: TaxonomyColumns,

    #[validate(nested)]
    pub clickhouse: ClickHouseConfig,

    #[validate(nested)]
    pub neo4j: Neo4jConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            objects_file: "Objects.csv".to_string(),
            elements_file: "Elements.csv".to_string(),
            taxonomy_file: "ses_class.csv".to_string(),
            delimiter: b',',
            root_query: "SELECT * FROM OVERSITE".to_string(),
            object_columns: ObjectColumns::default(),
            element_columns: ElementColumns::default(),
            taxonomy_columns: TaxonomyColumns::default(),
            clickhouse: ClickHouseConfig::default(),
            neo4j: Neo4jConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let delimiter = read_env_var("GRAPHLOOM_DELIMITER").unwrap_or_else(|| ",".to_string());
        let delimiter = parse_delimiter(&delimiter)?;

        let config = Self {
            objects_file: read_env_var("GRAPHLOOM_OBJECTS_FILE")
                .unwrap_or(defaults.objects_file),
            elements_file: read_env_var("GRAPHLOOM_ELEMENTS_FILE")
                .unwrap_or(defaults.elements_file),
            taxonomy_file: read_env_var("GRAPHLOOM_TAXONOMY_FILE")
                .unwrap_or(defaults.taxonomy_file),
            delimiter,
            root_query: read_env_var("GRAPHLOOM_ROOT_QUERY").unwrap_or(defaults.root_query),
            object_columns: ObjectColumns::default(),
            element_columns: ElementColumns::default(),
            taxonomy_columns: TaxonomyColumns::default(),
            clickhouse: ClickHouseConfig {
                url: read_env_var("CLICKHOUSE_URL").unwrap_or(defaults.clickhouse.url),
                user: read_env_var("CLICKHOUSE_USER").unwrap_or(defaults.clickhouse.user),
                password: read_env_var("CLICKHOUSE_PASSWORD")
                    .unwrap_or(defaults.clickhouse.password),
                database: read_env_var("CLICKHOUSE_DATABASE")
                    .unwrap_or(defaults.clickhouse.database),
            },
            neo4j: Neo4jConfig {
                uri: read_env_var("NEO4J_URI").unwrap_or(defaults.neo4j.uri),
                user: read_env_var("NEO4J_USER").unwrap_or(defaults.neo4j.user),
                password: read_env_var("NEO4J_PASSWORD").unwrap_or(defaults.neo4j.password),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn read_env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// A delimiter must be exactly one byte (`,`, `;`, tab, ...)
fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    let unescaped = match value {
        "\\t" => "\t",
        other => other,
    };
    match unescaped.as_bytes() {
        [b] => Ok(*b),
        _ => Err(ConfigError::Parse {
            field: "GRAPHLOOM_DELIMITER".to_string(),
            value: value.to_string(),
            source: "delimiter must be a single byte".into(),
        }),
    }
}
