//! Subcommands and the shared pipeline setup

pub mod create;
pub mod produce;
pub mod request;
pub mod tables;
pub mod update;

use anyhow::{Context, Result};
use rustf_scaffold::{
    MemoryInspector, MemoryStore, MySqlInspector, MySqlStore, Pipeline, ScaffoldConfig,
    WirePayload,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG_FILE: &str = "scaffold.toml";

/// Options shared by every subcommand
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub database_url: Option<String>,
    pub schema_file: Option<PathBuf>,
}

/// Explicit file, then ./scaffold.toml, then defaults; environment applied last
pub fn load_config(args: &GlobalArgs) -> Result<ScaffoldConfig> {
    let file = match &args.config {
        Some(path) => Some(path.as_path()),
        None => Some(Path::new(DEFAULT_CONFIG_FILE)).filter(|path| path.is_file()),
    };

    let mut config = match file {
        Some(path) => {
            let mut config = ScaffoldConfig::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => ScaffoldConfig::from_env()?,
    };

    if let Some(url) = &args.database_url {
        config.database.url = Some(url.clone());
    }
    config.validate()?;

    Ok(config)
}

/// Permission and menu records only reach a store that outlives the run when
/// a database is used
pub fn persists_records(args: &GlobalArgs) -> bool {
    args.schema_file.is_none()
}

/// Pipeline over the schema snapshot when one is given, the database otherwise
pub async fn build_pipeline(args: &GlobalArgs) -> Result<Pipeline> {
    let config = load_config(args)?;

    if let Some(schema_file) = &args.schema_file {
        let inspector = MemoryInspector::from_json_file(schema_file)?;
        let store = Arc::new(MemoryStore::new());
        log::debug!("Using schema snapshot {}", schema_file.display());
        log::warn!("No database configured: permission and menu records will not be persisted");
        return Ok(Pipeline::new(config, Arc::new(inspector), store.clone(), store)?);
    }

    let Some(url) = config.database.url.clone() else {
        anyhow::bail!("No schema source: pass --schema-file or set DATABASE_URL");
    };

    if !url.starts_with("mysql://") {
        anyhow::bail!("Unsupported database type. Supported: MySQL");
    }

    let inspector = MySqlInspector::new(&url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(MySqlStore::new(inspector.pool().clone(), &config.database)?);

    Ok(Pipeline::new(config, Arc::new(inspector), store.clone(), store)?)
}

pub fn read_payload(path: &Path) -> Result<WirePayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid descriptor payload {}", path.display()))
}
