//! Persistence seams for permission and menu records

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;

pub use memory::MemoryStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlStore;

use crate::menu::MenuRecord;
use crate::permission::PermissionRecord;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Insert one permission record. Existing names are not checked.
    async fn save(&self, record: &PermissionRecord) -> Result<()>;
}

#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<MenuRecord>>;

    async fn save(&self, record: &MenuRecord) -> Result<()>;
}
