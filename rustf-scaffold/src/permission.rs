//! Authorization permission records for a generated module

use crate::config::{default_action_labels, ScaffoldConfig};
use crate::store::AuthStore;
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Actions every generated module gets a permission for
pub const ACTIONS: [&str; 6] = ["index", "search", "create", "update", "delete", "export"];

/// RBAC item type, stored as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthItemType {
    Role,
    Permission,
}

impl AuthItemType {
    pub fn code(&self) -> i32 {
        match self {
            AuthItemType::Role => 1,
            AuthItemType::Permission => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// `<prefix>/<action>`
    pub name: String,
    pub item_type: AuthItemType,
    pub description: String,
}

pub struct PermissionGenerator {
    labels: IndexMap<String, String>,
}

impl PermissionGenerator {
    pub fn new() -> Self {
        Self {
            labels: default_action_labels(),
        }
    }

    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self {
            labels: config.permissions.labels.clone(),
        }
    }

    /// One record per action; no duplicate detection
    pub fn generate(&self, prefix: &str, title: &str) -> Vec<PermissionRecord> {
        let prefix = prefix.trim_matches('/');

        ACTIONS
            .iter()
            .map(|&action| {
                let label = self.labels.get(action).map(String::as_str).unwrap_or(action);
                PermissionRecord {
                    name: format!("{}/{}", prefix, action),
                    item_type: AuthItemType::Permission,
                    description: format!("{}{}", label, title),
                }
            })
            .collect()
    }

    /// Save each record through the store, one call per record
    pub async fn persist(&self, store: &dyn AuthStore, records: &[PermissionRecord]) -> Result<()> {
        for record in records {
            store.save(record).await?;
            log::debug!("Saved permission '{}'", record.name);
        }
        log::info!("Saved {} permissions", records.len());
        Ok(())
    }
}

impl Default for PermissionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_six_records() {
        let records = PermissionGenerator::new().generate("blog-post", "文章");

        assert_eq!(records.len(), 6);
        assert_eq!(records[0].name, "blog-post/index");
        assert_eq!(records[0].description, "显示文章");
        assert_eq!(records[5].name, "blog-post/export");
        assert_eq!(records[5].description, "导出文章");
        assert!(records.iter().all(|r| r.item_type == AuthItemType::Permission));
    }

    #[test]
    fn test_prefix_slashes_trimmed() {
        let records = PermissionGenerator::new().generate("/admin/user/", "Users");
        assert_eq!(records[1].name, "admin/user/search");
    }

    #[tokio::test]
    async fn test_repeated_persist_duplicates() {
        let store = MemoryStore::new();
        let generator = PermissionGenerator::new();
        let records = generator.generate("user", "Users");

        generator.persist(&store, &records).await.unwrap();
        generator.persist(&store, &records).await.unwrap();

        assert_eq!(store.permissions().await.len(), 12);
    }
}
