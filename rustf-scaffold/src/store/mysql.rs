//! MySQL-backed record stores

use super::{AuthStore, MenuStore};
use crate::config::DatabaseConfig;
use crate::menu::{MenuRecord, MenuStatus};
use crate::naming::is_plain_name;
use crate::permission::PermissionRecord;
use crate::{Result, ScaffoldError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, Pool, Row};

pub struct MySqlStore {
    pool: Pool<MySql>,
    auth_table: String,
    menu_table: String,
}

impl MySqlStore {
    /// Table names are interpolated into the SQL, so only plain identifiers are accepted
    pub fn new(pool: Pool<MySql>, config: &DatabaseConfig) -> Result<Self> {
        for table in [&config.auth_table, &config.menu_table] {
            if !is_plain_name(table) {
                return Err(ScaffoldError::Config(format!(
                    "Invalid table name '{}'",
                    table
                )));
            }
        }

        Ok(Self {
            pool,
            auth_table: config.auth_table.clone(),
            menu_table: config.menu_table.clone(),
        })
    }
}

#[async_trait]
impl AuthStore for MySqlStore {
    async fn save(&self, record: &PermissionRecord) -> Result<()> {
        let now = Utc::now().timestamp();
        let sql = format!(
            "INSERT INTO `{}` (name, type, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            self.auth_table
        );

        sqlx::query(&sql)
            .bind(&record.name)
            .bind(record.item_type.code())
            .bind(&record.description)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                ScaffoldError::persistence(format!("Failed to save permission '{}': {}", record.name, e))
            })?;

        Ok(())
    }
}

#[async_trait]
impl MenuStore for MySqlStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<MenuRecord>> {
        let sql = format!(
            "SELECT CAST(menu_name AS CHAR) as menu_name, CAST(pid AS SIGNED) as pid, \
             CAST(icons AS CHAR) as icons, CAST(url AS CHAR) as url, \
             CAST(status AS SIGNED) as status FROM `{}` WHERE menu_name = ? LIMIT 1",
            self.menu_table
        );

        let row = sqlx::query(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ScaffoldError::persistence(format!("Menu lookup failed: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let decode = |e: sqlx::Error| ScaffoldError::persistence(format!("Menu decode failed: {}", e));
        let status: i64 = row.try_get("status").map_err(decode)?;

        Ok(Some(MenuRecord {
            title: row.try_get("menu_name").map_err(decode)?,
            parent_id: row.try_get("pid").map_err(decode)?,
            icon: row.try_get("icons").map_err(decode)?,
            url: row.try_get("url").map_err(decode)?,
            status: if status == 0 {
                MenuStatus::Disabled
            } else {
                MenuStatus::Enabled
            },
        }))
    }

    async fn save(&self, record: &MenuRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO `{}` (menu_name, pid, icons, url, status) VALUES (?, ?, ?, ?, ?)",
            self.menu_table
        );

        sqlx::query(&sql)
            .bind(&record.title)
            .bind(record.parent_id)
            .bind(&record.icon)
            .bind(&record.url)
            .bind(record.status.code())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                ScaffoldError::persistence(format!("Failed to save menu '{}': {}", record.title, e))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_checked() {
        assert!(is_plain_name("auth_item"));
        assert!(is_plain_name("menu2"));
        assert!(!is_plain_name("menu`; DROP"));
        assert!(!is_plain_name(""));
    }
}
