//! Delimited table input.
//!
//! All three configuration inputs (objects, elements, taxonomy) are
//! delimiter-separated, double-quoted, UTF-8 tables with a header row.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::errors::SchemaCatalogError;

/// A fully loaded table: one header row plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    /// Logical table name, used in error reports
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a table from a file path.
    pub fn from_path<P: AsRef<Path>>(
        name: &str,
        path: P,
        delimiter: u8,
    ) -> Result<Self, SchemaCatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SchemaCatalogError::TableRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_reader(name, path.display().to_string(), file, delimiter)
    }

    /// Parse a table from any reader.
    pub fn from_reader<R: Read>(
        name: &str,
        path: String,
        reader: R,
        delimiter: u8,
    ) -> Result<Self, SchemaCatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let read_err = |e: csv::Error| SchemaCatalogError::TableRead {
            path: path.clone(),
            error: e.to_string(),
        };

        let header: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Table {
            name: name.to_string(),
            header,
            rows,
        })
    }

    /// Verify the header contains every required column name.
    ///
    /// Reported per missing column so a broken input names the first offender.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), SchemaCatalogError> {
        for column in required {
            if !self.header.iter().any(|h| h == column) {
                return Err(SchemaCatalogError::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Each data row as a column-name → cell mapping.
    pub fn records(&self) -> impl Iterator<Item = HashMap<&str, &str>> {
        self.rows.iter().map(move |row| {
            self.header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }
}
