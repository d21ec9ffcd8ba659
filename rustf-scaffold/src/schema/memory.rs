//! Schema snapshot held in memory, loadable from JSON

use super::{ColumnMetadata, SchemaInspector};
use crate::{Result, ScaffoldError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Inspector backed by a fixed set of tables.
///
/// Snapshot files look like:
///
/// ```json
/// { "tables": { "blog_post": [ { "name": "id", "sql_type": "int(11)", "nullable": false } ] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInspector {
    #[serde(default)]
    tables: BTreeMap<String, Vec<ColumnMetadata>>,
}

impl MemoryInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        self.tables.insert(name.into(), columns);
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ScaffoldError::schema_query(format!("Invalid schema snapshot: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
        log::debug!("Loaded schema snapshot from {}", path.display());
        Self::from_json_str(&content)
    }
}

#[async_trait]
impl SchemaInspector for MemoryInspector {
    async fn list_tables(&self) -> Result<BTreeSet<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| ScaffoldError::TableNotFound(table.to_string()))
    }
}
