use crate::{Result, ScaffoldError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// How the configured table prefix is removed from a table name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrefixStrip {
    /// Remove the prefix only when the table name starts with it
    #[default]
    Literal,
    /// Trim every leading and trailing character that appears in the prefix.
    /// Kept for projects generated with the legacy behavior; it can eat into
    /// the table name itself (`yii_yield` with prefix `yii_` becomes `eld`).
    Charset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Project root that generated paths are relative to
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    #[serde(default)]
    pub table_prefix: String,

    #[serde(default)]
    pub prefix_strip: PrefixStrip,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub views: ViewTargetConfig,

    #[serde(default)]
    pub controllers: ControllerTargetConfig,

    #[serde(default)]
    pub permissions: PermissionConfig,

    #[serde(default)]
    pub menu: MenuConfig,

    /// Directory holding `view.html.hbs` / `controller.rs.hbs` overrides
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_auth_table")]
    pub auth_table: String,

    #[serde(default = "default_menu_table")]
    pub menu_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTargetConfig {
    #[serde(default = "default_views_dir")]
    pub directory: String,

    #[serde(default = "default_view_extension")]
    pub extension: String,

    #[serde(default = "default_view_name")]
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerTargetConfig {
    #[serde(default = "default_controllers_dir")]
    pub directory: String,

    #[serde(default = "default_controller_extension")]
    pub extension: String,

    #[serde(default = "default_controller_suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Action name -> label prepended to the title in the description
    #[serde(default = "default_action_labels")]
    pub labels: IndexMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_menu_icon")]
    pub icon: String,
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}
fn default_max_connections() -> u32 {
    5
}
fn default_auth_table() -> String {
    "auth_item".to_string()
}
fn default_menu_table() -> String {
    "menu".to_string()
}
fn default_views_dir() -> String {
    "views".to_string()
}
fn default_view_extension() -> String {
    "html".to_string()
}
fn default_view_name() -> String {
    "index".to_string()
}
fn default_controllers_dir() -> String {
    "src/controllers".to_string()
}
fn default_controller_extension() -> String {
    "rs".to_string()
}
fn default_controller_suffix() -> String {
    "Controller".to_string()
}
fn default_menu_icon() -> String {
    "icon-cog".to_string()
}

pub(crate) fn default_action_labels() -> IndexMap<String, String> {
    [
        ("index", "显示"),
        ("search", "搜索"),
        ("create", "创建"),
        ("update", "修改"),
        ("delete", "删除"),
        ("export", "导出"),
    ]
    .into_iter()
    .map(|(action, label)| (action.to_string(), label.to_string()))
    .collect()
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            table_prefix: String::new(),
            prefix_strip: PrefixStrip::default(),
            database: DatabaseConfig::default(),
            views: ViewTargetConfig::default(),
            controllers: ControllerTargetConfig::default(),
            permissions: PermissionConfig::default(),
            menu: MenuConfig::default(),
            templates_dir: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            auth_table: default_auth_table(),
            menu_table: default_menu_table(),
        }
    }
}

impl Default for ViewTargetConfig {
    fn default() -> Self {
        Self {
            directory: default_views_dir(),
            extension: default_view_extension(),
            default_name: default_view_name(),
        }
    }
}

impl Default for ControllerTargetConfig {
    fn default() -> Self {
        Self {
            directory: default_controllers_dir(),
            extension: default_controller_extension(),
            suffix: default_controller_suffix(),
        }
    }
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            labels: default_action_labels(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            icon: default_menu_icon(),
        }
    }
}

impl ScaffoldConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative `base_path` or `templates_dir` is resolved against the
    /// directory containing the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|e| {
            ScaffoldError::Config(format!(
                "Failed to read config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|e| {
            ScaffoldError::Config(format!("'{}': {}", path_ref.display(), e))
        })?;

        if let Some(parent_dir) = path_ref.parent() {
            config.resolve_relative_paths(parent_dir);
        }

        log::debug!("Loaded scaffold configuration from: {}", path_ref.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScaffoldConfig = toml::from_str(content)
            .map_err(|e| ScaffoldError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `DATABASE_URL`, `SCAFFOLD_TABLE_PREFIX` and `SCAFFOLD_BASE_PATH`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = Some(url);
            }
        }
        if let Ok(prefix) = env::var("SCAFFOLD_TABLE_PREFIX") {
            self.table_prefix = prefix;
        }
        if let Ok(base) = env::var("SCAFFOLD_BASE_PATH") {
            if !base.is_empty() {
                self.base_path = PathBuf::from(base);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for action in crate::permission::ACTIONS {
            if !self.permissions.labels.contains_key(action) {
                return Err(ScaffoldError::Config(format!(
                    "permissions.labels is missing the '{}' action",
                    action
                )));
            }
        }
        if self.views.extension.is_empty() || self.controllers.extension.is_empty() {
            return Err(ScaffoldError::Config(
                "file extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve_relative_paths(&mut self, config_dir: &Path) {
        if self.base_path.is_relative() {
            self.base_path = config_dir.join(&self.base_path);
        }
        if let Some(dir) = &self.templates_dir {
            if dir.is_relative() {
                self.templates_dir = Some(config_dir.join(dir));
            }
        }
    }

    /// Directory receiving views for a table base name
    pub fn view_dir(&self, base_name: &str) -> PathBuf {
        self.base_path
            .join(&self.views.directory)
            .join(crate::naming::to_kebab_case(base_name))
    }

    pub fn controller_dir(&self) -> PathBuf {
        self.base_path.join(&self.controllers.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ScaffoldConfig::default();
        assert_eq!(config.prefix_strip, PrefixStrip::Literal);
        assert_eq!(config.views.default_name, "index");
        assert_eq!(config.controllers.extension, "rs");
        assert_eq!(config.menu.icon, "icon-cog");
        assert_eq!(config.permissions.labels.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScaffoldConfig::from_toml_str(
            r#"
table_prefix = "yii_"
prefix_strip = "charset"

[views]
directory = "app/views"
"#,
        )
        .unwrap();

        assert_eq!(config.table_prefix, "yii_");
        assert_eq!(config.prefix_strip, PrefixStrip::Charset);
        assert_eq!(config.views.directory, "app/views");
        assert_eq!(config.views.extension, "html");
        assert_eq!(config.database.auth_table, "auth_item");
    }

    #[test]
    fn test_missing_action_label_rejected() {
        let result = ScaffoldConfig::from_toml_str(
            r#"
[permissions.labels]
index = "Show "
"#,
        );
        assert!(matches!(result, Err(ScaffoldError::Config(_))));
    }

    #[test]
    fn test_from_file_resolves_base_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("scaffold.toml");
        fs::write(&file, "base_path = \"app\"\n").unwrap();

        let config = ScaffoldConfig::from_file(&file).unwrap();
        assert_eq!(config.base_path, dir.path().join("app"));
        assert_eq!(
            config.view_dir("blog_post"),
            dir.path().join("app").join("views").join("blog-post")
        );
    }
}
