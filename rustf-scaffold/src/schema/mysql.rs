//! MySQL introspection through `information_schema`

use super::{ColumnMetadata, SchemaInspector};
use crate::{Result, ScaffoldError};
use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{MySql, Pool, Row};
use std::collections::BTreeSet;

pub struct MySqlInspector {
    pool: Pool<MySql>,
}

impl MySqlInspector {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| ScaffoldError::schema_query(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }
}

#[async_trait]
impl SchemaInspector for MySqlInspector {
    async fn list_tables(&self) -> Result<BTreeSet<String>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(TABLE_NAME AS CHAR) as table_name
            FROM information_schema.tables
            WHERE TABLE_SCHEMA = DATABASE()
            ORDER BY TABLE_NAME
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tables = BTreeSet::new();
        for row in rows {
            tables.insert(row.try_get::<String, _>("table_name")?);
        }

        Ok(tables)
    }

    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        if !self.list_tables().await?.contains(table) {
            return Err(ScaffoldError::TableNotFound(table.to_string()));
        }

        let rows = sqlx::query(
            r#"
            SELECT
                CAST(c.COLUMN_NAME AS CHAR) as field,
                CAST(c.COLUMN_TYPE AS CHAR) as column_type,
                CAST(c.IS_NULLABLE AS CHAR) as is_nullable,
                CAST(c.COLUMN_KEY AS CHAR) as column_key,
                CAST(c.COLUMN_DEFAULT AS CHAR) as column_default,
                CAST(c.EXTRA AS CHAR) as extra,
                CAST(c.COLUMN_COMMENT AS CHAR) as column_comment
            FROM information_schema.columns c
            WHERE c.TABLE_SCHEMA = DATABASE() AND c.TABLE_NAME = ?
            ORDER BY c.ORDINAL_POSITION
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("field")?;
            let sql_type: String = row.try_get("column_type")?;
            let null_flag: String = row.try_get("is_nullable")?;
            let key: String = row.try_get("column_key").unwrap_or_default();
            let default: Option<String> = row.try_get("column_default").ok().flatten();
            let extra: String = row.try_get("extra").unwrap_or_default();
            let comment: String = row.try_get("column_comment").unwrap_or_default();

            // Same shape as SHOW FULL COLUMNS
            let mut raw = IndexMap::new();
            raw.insert("Field".to_string(), name.clone());
            raw.insert("Type".to_string(), sql_type.clone());
            raw.insert("Null".to_string(), null_flag.clone());
            raw.insert("Key".to_string(), key);
            raw.insert("Default".to_string(), default.unwrap_or_else(|| "NULL".to_string()));
            raw.insert("Extra".to_string(), extra);
            raw.insert("Comment".to_string(), comment.clone());

            columns.push(ColumnMetadata {
                name,
                sql_type,
                nullable: null_flag == "YES",
                comment,
                raw,
            });
        }

        log::debug!("Described {} columns of '{}'", columns.len(), table);
        Ok(columns)
    }
}
