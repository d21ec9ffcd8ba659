//! RustF Scaffold - CRUD view and controller generation from table schemas
//!
//! This crate turns a database table into a working listing view and a
//! controller bound to the table's model. Generation runs in three stages:
//!
//! - **Create** - introspect the table and build one field descriptor per column
//! - **Update** - decode the (client edited) descriptors and render a dry-run preview
//! - **Produce** - write the view and controller, optionally with permission
//!   and navigation menu records
//!
//! # Example
//!
//! ```rust,no_run
//! use rustf_scaffold::{CreateRequest, MemoryInspector, MemoryStore, Pipeline, ScaffoldConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> rustf_scaffold::Result<()> {
//! let inspector = MemoryInspector::from_json_file("schema.json")?;
//! let store = Arc::new(MemoryStore::new());
//! let pipeline = Pipeline::new(
//!     ScaffoldConfig::default(),
//!     Arc::new(inspector),
//!     store.clone(),
//!     store,
//! )?;
//!
//! let created = pipeline
//!     .create(CreateRequest {
//!         title: "Posts".to_string(),
//!         table: "blog_post".to_string(),
//!     })
//!     .await?;
//! println!("{} fields", created.fields.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod form;
pub mod guard;
pub mod menu;
pub mod naming;
pub mod permission;
pub mod pipeline;
pub mod schema;
pub mod store;

pub use codec::{FormConfigCodec, WireField, WireOptions, WirePayload};
pub use config::{PrefixStrip, ScaffoldConfig};
pub use descriptor::{
    DefaultPolicy, DescriptorPolicy, FieldDescriptor, FieldDescriptorBuilder, InputType,
    ValidationOptions,
};
pub use emit::{ArtifactKind, ControllerEmitter, GeneratedArtifact, ViewEmitter, WhereClause};
pub use form::FormConfig;
pub use guard::{ArtifactGuard, TargetLocks};
pub use menu::{MenuRecord, MenuStatus, NavigationGenerator};
pub use permission::{AuthItemType, PermissionGenerator, PermissionRecord};
pub use pipeline::{
    ArtifactStatus, CreateRequest, CreateResponse, ErrorBody, Pipeline, ProduceRequest,
    ProduceResponse, Response, UpdateRequest, UpdateResponse,
};
pub use schema::{ColumnMetadata, MemoryInspector, SchemaInspector};
pub use store::{AuthStore, MemoryStore, MenuStore};

#[cfg(feature = "mysql")]
pub use schema::MySqlInspector;
#[cfg(feature = "mysql")]
pub use store::MySqlStore;

/// Scaffolding errors
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Schema query error: {0}")]
    SchemaQuery(String),

    #[error("Validation error: {message}")]
    Validation {
        key: Option<String>,
        message: String,
    },

    #[error("Artifact already exists: {}", join_paths(.paths))]
    ArtifactExists { paths: Vec<PathBuf> },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Produce failed at step '{step}': {source}")]
    Produce {
        step: ProduceStep,
        completed: Vec<ProduceStep>,
        #[source]
        source: Box<ScaffoldError>,
    },
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;

impl ScaffoldError {
    /// Validation failure not tied to a single field
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            key: None,
            message: msg.into(),
        }
    }

    /// Validation failure naming the offending field key
    pub fn invalid_field(key: impl Into<String>, msg: impl fmt::Display) -> Self {
        let key = key.into();
        Self::Validation {
            message: format!("field '{}': {}", key, msg),
            key: Some(key),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn schema_query(msg: impl Into<String>) -> Self {
        Self::SchemaQuery(msg.into())
    }

    /// Taxonomy name reported at the boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableNotFound(_) => ErrorKind::TableNotFound,
            Self::SchemaQuery(_) => ErrorKind::SchemaQuery,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ArtifactExists { .. } => ErrorKind::ArtifactExists,
            Self::Io { .. } => ErrorKind::Io,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Template(_) => ErrorKind::Template,
            Self::Config(_) => ErrorKind::Config,
            Self::Produce { source, .. } => source.kind(),
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for ScaffoldError {
    fn from(err: sqlx::Error) -> Self {
        Self::SchemaQuery(err.to_string())
    }
}

impl From<handlebars::RenderError> for ScaffoldError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error taxonomy exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "TableNotFoundError")]
    TableNotFound,
    #[serde(rename = "SchemaQueryError")]
    SchemaQuery,
    #[serde(rename = "ValidationError")]
    Validation,
    #[serde(rename = "ArtifactExistsError")]
    ArtifactExists,
    #[serde(rename = "IOError")]
    Io,
    #[serde(rename = "PersistenceError")]
    Persistence,
    #[serde(rename = "TemplateError")]
    Template,
    #[serde(rename = "ConfigError")]
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TableNotFound => "TableNotFoundError",
            Self::SchemaQuery => "SchemaQueryError",
            Self::Validation => "ValidationError",
            Self::ArtifactExists => "ArtifactExistsError",
            Self::Io => "IOError",
            Self::Persistence => "PersistenceError",
            Self::Template => "TemplateError",
            Self::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

/// Steps of the Produce stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProduceStep {
    View,
    Controller,
    Permissions,
    Menu,
}

impl fmt::Display for ProduceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::View => "view",
            Self::Controller => "controller",
            Self::Permissions => "permissions",
            Self::Menu => "menu",
        };
        f.write_str(name)
    }
}
