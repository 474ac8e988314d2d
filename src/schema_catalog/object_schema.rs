//! Object and element schema maps built from the configuration tables.
//!
//! The catalog is constructed once at startup and immutable afterwards:
//! parent→children adjacency is computed during the build pass and stored on
//! the `ObjectSchema` values, never derived by mutating parsed input.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;

use super::errors::SchemaCatalogError;
use super::tables::Table;
use crate::config::{ElementColumns, ObjectColumns};

/// Declared type of a bind parameter, from the `name:type` spec suffix.
///
/// The type picks how the bound value is rendered into the child query:
/// numeric types render bare, everything else renders as a quoted SQL string
/// with embedded quotes doubled. A spec without a suffix binds as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    Int,
    Float,
    Text,
}

/// Errors from rendering a bind value into SQL.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindValueError {
    #[error("value is null")]
    Null,

    #[error("value `{0}` is not numeric")]
    NonNumeric(String),
}

/// A parsed `name:type` parameter spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindParameter {
    pub name: String,
    pub dtype: BindType,
}

impl BindParameter {
    /// Parse a `name:type` spec. The name part is required; the type part is
    /// optional and defaults to text binding.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.splitn(2, ':');
        let name = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            return None;
        }
        let dtype = match parts
            .next()
            .map(|t| t.trim().to_lowercase())
            .as_deref()
            .unwrap_or("")
        {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "uint" => BindType::Int,
            "float" | "double" | "real" | "decimal" | "numeric" => BindType::Float,
            _ => BindType::Text,
        };
        Some(Self {
            name: name.to_string(),
            dtype,
        })
    }

    /// Render a record value as a SQL literal according to the declared type.
    pub fn render_sql(&self, value: &Value) -> Result<String, BindValueError> {
        match self.dtype {
            BindType::Int | BindType::Float => match value {
                Value::Number(n) => Ok(n.to_string()),
                Value::String(s) if is_numeric_literal(s) => Ok(s.trim().to_string()),
                Value::Null => Err(BindValueError::Null),
                other => Err(BindValueError::NonNumeric(stringify(other))),
            },
            BindType::Text => match value {
                Value::Null => Err(BindValueError::Null),
                other => Ok(format!("'{}'", stringify(other).replace('\'', "''"))),
            },
        }
    }
}

fn is_numeric_literal(s: &str) -> bool {
    let s = s.trim();
    s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One object type: a node archetype defined by a query template and its
/// position in the hierarchical schema.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub id: String,
    /// Query template containing a single positional `?` placeholder
    pub query: String,
    /// None marks the root type
    pub parent_id: Option<String>,
    pub bind: BindParameter,
    /// Graph label attached to every materialized node of this type
    pub label: String,
    /// Record field used for indexed get-or-create, when declared
    pub index_field: Option<String>,
    /// Child type ids, in object table input order
    pub children: Vec<String>,
}

/// One element definition: a sub-attribute of an object type that becomes its
/// own node with a taxonomy linkage.
#[derive(Debug, Clone)]
pub struct ElementSchema {
    pub object_id: String,
    pub field_name: String,
    /// Taxonomy class name; may be empty, which fails at link time
    pub ses_class: String,
    /// The full element row, carried through as node properties
    pub attributes: serde_json::Map<String, Value>,
}

/// The immutable schema forest plus element map.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    objects: HashMap<String, ObjectSchema>,
    elements: HashMap<(String, String), ElementSchema>,
    root_id: String,
}

impl SchemaCatalog {
    /// Build the catalog from the raw object and element tables.
    ///
    /// Validates required columns on both tables, derives the
    /// parent→children forest, and rejects schemas with zero or multiple
    /// roots, dangling parent references, or parent-pointer cycles.
    pub fn build(
        objects_table: &Table,
        elements_table: &Table,
        object_columns: &ObjectColumns,
        element_columns: &ElementColumns,
    ) -> Result<Self, SchemaCatalogError> {
        objects_table.require_columns(&object_columns.required())?;
        elements_table.require_columns(&element_columns.required())?;

        let mut objects: HashMap<String, ObjectSchema> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for record in objects_table.records() {
            let id = record[object_columns.id.as_str()].to_string();
            if objects.contains_key(&id) {
                return Err(SchemaCatalogError::DuplicateObjectId { object_id: id });
            }

            let parent_cell = record[object_columns.parent_id.as_str()].trim();
            let parent_id = if parent_cell.is_empty() {
                None
            } else {
                Some(parent_cell.to_string())
            };

            let spec = record[object_columns.parameter.as_str()];
            let bind =
                BindParameter::parse(spec).ok_or_else(|| SchemaCatalogError::InvalidParameterSpec {
                    object_id: id.clone(),
                    spec: spec.to_string(),
                })?;

            let index_cell = record[object_columns.index.as_str()].trim();
            let index_field = if index_cell.is_empty() {
                None
            } else {
                Some(index_cell.to_string())
            };

            let schema = ObjectSchema {
                id: id.clone(),
                query: record[object_columns.query.as_str()].to_string(),
                parent_id,
                bind,
                label: record[object_columns.label.as_str()].to_string(),
                index_field,
                children: Vec::new(),
            };
            order.push(id.clone());
            objects.insert(id, schema);
        }

        // Dangling parent references before anything walks the forest
        for id in &order {
            if let Some(parent_id) = objects[id].parent_id.clone() {
                if !objects.contains_key(&parent_id) {
                    return Err(SchemaCatalogError::UnknownParent {
                        object_id: id.clone(),
                        parent_id,
                    });
                }
            }
        }

        // A parent chain that revisits a type would recurse forever at
        // materialization time; reject it here instead.
        for id in &order {
            let mut seen: HashSet<&str> = HashSet::new();
            let mut current = id.as_str();
            while let Some(parent_id) = objects[current].parent_id.as_deref() {
                if !seen.insert(current) {
                    return Err(SchemaCatalogError::ParentCycle {
                        object_id: current.to_string(),
                    });
                }
                current = parent_id;
            }
        }

        let roots: Vec<String> = order
            .iter()
            .filter(|id| objects[*id].parent_id.is_none())
            .cloned()
            .collect();
        let root_id = match roots.as_slice() {
            [] => return Err(SchemaCatalogError::NoRootType),
            [root] => root.clone(),
            _ => return Err(SchemaCatalogError::MultipleRootTypes { roots }),
        };

        // Children in object table input order
        for id in &order {
            if let Some(parent_id) = objects[id].parent_id.clone() {
                objects
                    .get_mut(&parent_id)
                    .expect("parent existence checked above")
                    .children
                    .push(id.clone());
            }
        }

        let mut elements = HashMap::new();
        for row in &elements_table.rows {
            let mut attributes = serde_json::Map::new();
            for (column, cell) in elements_table.header.iter().zip(row) {
                attributes.insert(column.clone(), Value::String(cell.clone()));
            }

            let cell = |name: &str| {
                attributes
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            let object_id = cell(&element_columns.object_id);
            // Rows with no object id are unassociated; skip them
            if object_id.trim().is_empty() {
                continue;
            }
            let field_name = cell(&element_columns.field_name);
            let ses_class = cell(&element_columns.ses_class);

            elements.insert(
                (object_id.clone(), field_name.clone()),
                ElementSchema {
                    object_id,
                    field_name,
                    ses_class,
                    attributes,
                },
            );
        }

        Ok(Self {
            objects,
            elements,
            root_id,
        })
    }

    pub fn object(&self, id: &str) -> Option<&ObjectSchema> {
        self.objects.get(id)
    }

    pub fn root(&self) -> &ObjectSchema {
        &self.objects[&self.root_id]
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn element(&self, object_id: &str, field_name: &str) -> Option<&ElementSchema> {
        self.elements
            .get(&(object_id.to_string(), field_name.to_string()))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
