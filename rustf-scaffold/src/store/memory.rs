use super::{AuthStore, MenuStore};
use crate::menu::MenuRecord;
use crate::permission::PermissionRecord;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process store, used when no database is configured and in tests
#[derive(Default, Clone)]
pub struct MemoryStore {
    permissions: Arc<RwLock<Vec<PermissionRecord>>>,
    menus: Arc<RwLock<Vec<MenuRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn permissions(&self) -> Vec<PermissionRecord> {
        self.permissions.read().await.clone()
    }

    pub async fn menus(&self) -> Vec<MenuRecord> {
        self.menus.read().await.clone()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn save(&self, record: &PermissionRecord) -> Result<()> {
        self.permissions.write().await.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<MenuRecord>> {
        Ok(self
            .menus
            .read()
            .await
            .iter()
            .find(|menu| menu.title == title)
            .cloned())
    }

    async fn save(&self, record: &MenuRecord) -> Result<()> {
        self.menus.write().await.push(record.clone());
        Ok(())
    }
}
