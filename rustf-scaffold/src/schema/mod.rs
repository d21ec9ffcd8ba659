//! Table introspection
//!
//! The pipeline only ever sees [`ColumnMetadata`]; where it comes from is up to
//! the [`SchemaInspector`] implementation.

mod memory;
#[cfg(feature = "mysql")]
mod mysql;

pub use memory::MemoryInspector;
#[cfg(feature = "mysql")]
pub use mysql::MySqlInspector;

use crate::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One column as reported by the schema source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Raw SQL type, e.g. `varchar(100)` or `int(11) unsigned`
    pub sql_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub comment: String,
    /// Everything the source reported about the column, in source order
    #[serde(default)]
    pub raw: IndexMap<String, String>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable,
            comment: String::new(),
            raw: IndexMap::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Source of table names and column metadata.
///
/// Implementations must not cache: every call reflects the live schema.
#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// All table names, deduplicated and ascending
    async fn list_tables(&self) -> Result<BTreeSet<String>>;

    /// Columns of `table` in ordinal order.
    ///
    /// Fails with `TableNotFound` when `table` is not in [`list_tables`](Self::list_tables).
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>>;
}
