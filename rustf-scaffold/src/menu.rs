//! Navigation menu entry for a generated module

use crate::config::ScaffoldConfig;
use crate::store::MenuStore;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    Disabled,
    Enabled,
}

impl MenuStatus {
    pub fn code(&self) -> i32 {
        match self {
            MenuStatus::Disabled => 0,
            MenuStatus::Enabled => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub title: String,
    /// 0 for top-level entries
    pub parent_id: i64,
    pub icon: String,
    pub url: String,
    pub status: MenuStatus,
}

pub struct NavigationGenerator {
    icon: String,
}

impl NavigationGenerator {
    pub fn new(icon: impl Into<String>) -> Self {
        Self { icon: icon.into() }
    }

    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self::new(config.menu.icon.clone())
    }

    /// Save a top-level entry unless one with the same title exists.
    ///
    /// Returns the new record, or `None` when nothing was written.
    pub async fn generate(
        &self,
        store: &dyn MenuStore,
        name: &str,
        title: &str,
    ) -> Result<Option<MenuRecord>> {
        if store.find_by_title(title).await?.is_some() {
            log::info!("Menu '{}' already exists, skipping", title);
            return Ok(None);
        }

        let record = MenuRecord {
            title: title.to_string(),
            parent_id: 0,
            icon: self.icon.clone(),
            url: format!("{}/index", name),
            status: MenuStatus::Enabled,
        };
        store.save(&record).await?;

        log::info!("Created menu '{}' -> {}", record.title, record.url);
        Ok(Some(record))
    }
}
