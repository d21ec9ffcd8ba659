//! The Create → Update → Produce boundary operations
//!
//! Each operation takes a `serde` request and returns a typed response or a
//! [`ScaffoldError`]. [`Response`] wraps either outcome in the JSON envelope
//! handed back to the editing client.

use crate::codec::{FormConfigCodec, WireField};
use crate::config::ScaffoldConfig;
use crate::descriptor::FieldDescriptorBuilder;
use crate::emit::{ControllerEmitter, GeneratedArtifact, ViewEmitter, WhereClause};
use crate::guard::{ArtifactGuard, TargetLocks};
use crate::menu::{MenuRecord, NavigationGenerator};
use crate::naming::{
    is_plain_name, is_type_name, strip_table_prefix, to_camel_case, to_kebab_case, with_extension,
};
use crate::permission::{PermissionGenerator, PermissionRecord};
use crate::schema::SchemaInspector;
use crate::store::{AuthStore, MenuStore};
use crate::{ErrorKind, ProduceStep, Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub title: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub title: String,
    pub table: String,
    #[serde(default)]
    pub fields: Vec<WireField>,
}

/// Target file name and whether it is already on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub name: String,
    pub path: PathBuf,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub preview: String,
    pub where_clause: WhereClause,
    pub view: ArtifactStatus,
    pub controller: ArtifactStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceRequest {
    pub title: String,
    pub table: String,
    #[serde(default)]
    pub fields: Vec<WireField>,
    /// Defaults to the configured view name
    #[serde(default)]
    pub view_file_name: Option<String>,
    /// Defaults to `<Model>Controller`
    #[serde(default)]
    pub controller_file_name: Option<String>,
    #[serde(default)]
    pub generate_auth: bool,
    #[serde(default)]
    pub generate_menu: bool,
    #[serde(default)]
    pub allow_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProduceResponse {
    /// `<base name>/index`
    pub route: String,
    pub artifacts: Vec<GeneratedArtifact>,
    pub permissions: Vec<PermissionRecord>,
    pub menu: Option<MenuRecord>,
}

/// Error half of the response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<PathBuf>>,
    /// Produce step that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<ProduceStep>,
    /// Produce steps that finished before the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<Vec<ProduceStep>>,
}

impl From<&ScaffoldError> for ErrorBody {
    fn from(err: &ScaffoldError) -> Self {
        let (inner, stage, completed) = match err {
            ScaffoldError::Produce {
                step,
                completed,
                source,
            } => (source.as_ref(), Some(*step), Some(completed.clone())),
            other => (other, None, None),
        };

        let key = match inner {
            ScaffoldError::Validation { key, .. } => key.clone(),
            _ => None,
        };
        let paths = match inner {
            ScaffoldError::ArtifactExists { paths } => Some(paths.clone()),
            _ => None,
        };

        Self {
            kind: err.kind(),
            message: err.to_string(),
            key,
            paths,
            stage,
            completed,
        }
    }
}

/// `{"ok": true, "data": ..}` or `{"ok": false, "error": ..}`
#[derive(Debug, Clone, Serialize)]
pub struct Response<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Response<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(err: &ScaffoldError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }
}

impl<T> From<Result<T>> for Response<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::error(&err),
        }
    }
}

/// Resolved output locations for one table
#[derive(Debug)]
struct Targets {
    base_name: String,
    route_name: String,
    view_name: String,
    view_path: PathBuf,
    controller_name: String,
    controller_path: PathBuf,
}

pub struct Pipeline {
    config: ScaffoldConfig,
    inspector: Arc<dyn SchemaInspector>,
    auth_store: Arc<dyn AuthStore>,
    menu_store: Arc<dyn MenuStore>,
    builder: FieldDescriptorBuilder,
    view_emitter: ViewEmitter,
    controller_emitter: ControllerEmitter,
    permissions: PermissionGenerator,
    navigation: NavigationGenerator,
    locks: TargetLocks,
}

impl Pipeline {
    pub fn new(
        config: ScaffoldConfig,
        inspector: Arc<dyn SchemaInspector>,
        auth_store: Arc<dyn AuthStore>,
        menu_store: Arc<dyn MenuStore>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            builder: FieldDescriptorBuilder::new(),
            view_emitter: ViewEmitter::from_config(&config)?,
            controller_emitter: ControllerEmitter::from_config(&config)?,
            permissions: PermissionGenerator::from_config(&config),
            navigation: NavigationGenerator::from_config(&config),
            locks: TargetLocks::new(),
            config,
            inspector,
            auth_store,
            menu_store,
        })
    }

    /// Replace the descriptor builder, e.g. one with a custom policy
    pub fn with_builder(mut self, builder: FieldDescriptorBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    pub async fn list_tables(&self) -> Result<BTreeSet<String>> {
        self.inspector.list_tables().await
    }

    /// Create stage: one descriptor per column, in column order
    pub async fn create(&self, request: CreateRequest) -> Result<CreateResponse> {
        require("title", &request.title)?;
        require("table", &request.table)?;

        let columns = self.inspector.describe_columns(&request.table).await?;
        let fields = self
            .builder
            .build_all(&columns)
            .iter()
            .map(FormConfigCodec::encode_field)
            .collect::<Vec<_>>();

        log::info!(
            "Create: built {} field descriptors for '{}'",
            fields.len(),
            request.table
        );
        Ok(CreateResponse { fields })
    }

    /// Update stage: render a preview and report target status. Touches nothing.
    pub async fn update(&self, request: UpdateRequest) -> Result<UpdateResponse> {
        require("title", &request.title)?;
        require("table", &request.table)?;
        require_fields(&request.fields)?;

        let form = FormConfigCodec::decode_fields(&request.table, &request.title, &request.fields)?;
        let targets = self.resolve_targets(&request.table, None, None)?;
        let preview = self.view_emitter.render_preview(&form)?;

        let view = ArtifactStatus {
            exists: path_exists(&targets.view_path).await?,
            name: targets.view_name,
            path: targets.view_path,
        };
        let controller = ArtifactStatus {
            exists: path_exists(&targets.controller_path).await?,
            name: targets.controller_name,
            path: targets.controller_path,
        };

        log::info!(
            "Update: rendered preview for '{}' ({} search conditions)",
            request.table,
            preview.where_clause.conditions().len()
        );
        Ok(UpdateResponse {
            preview: preview.source,
            where_clause: preview.where_clause,
            view,
            controller,
        })
    }

    /// Produce stage: write the view and controller, then the optional records.
    ///
    /// Steps run in order and completed steps are not rolled back. A failing
    /// step is reported as [`ScaffoldError::Produce`].
    pub async fn produce(&self, request: ProduceRequest) -> Result<ProduceResponse> {
        require("title", &request.title)?;
        require("table", &request.table)?;
        require_fields(&request.fields)?;

        let form = FormConfigCodec::decode_fields(&request.table, &request.title, &request.fields)?;
        let targets = self.resolve_targets(
            &request.table,
            request.view_file_name.as_deref(),
            request.controller_file_name.as_deref(),
        )?;

        let _guard = self
            .locks
            .acquire(&[targets.view_path.as_path(), targets.controller_path.as_path()])
            .await;

        let view_exists = path_exists(&targets.view_path).await?;
        let controller_exists = path_exists(&targets.controller_path).await?;

        if !ArtifactGuard::may_write(view_exists, controller_exists, request.allow_overwrite) {
            let paths = [
                (view_exists, &targets.view_path),
                (controller_exists, &targets.controller_path),
            ]
            .into_iter()
            .filter(|(exists, _)| *exists)
            .map(|(_, path)| path.clone())
            .collect();

            log::warn!("Produce: refusing to overwrite artifacts for '{}'", request.table);
            return Err(ScaffoldError::ArtifactExists { paths });
        }

        let mut completed = Vec::new();
        let mut artifacts = Vec::with_capacity(2);

        let view = self
            .view_emitter
            .commit(&form, &targets.view_path)
            .await
            .map_err(|e| step_failed(ProduceStep::View, &completed, e))?;
        artifacts.push(view);
        completed.push(ProduceStep::View);

        let where_clause = WhereClause::derive(&form);
        let controller = self
            .controller_emitter
            .commit(
                &targets.base_name,
                &request.title,
                &targets.controller_path,
                &where_clause,
            )
            .await
            .map_err(|e| step_failed(ProduceStep::Controller, &completed, e))?;
        artifacts.push(controller);
        completed.push(ProduceStep::Controller);

        let mut permissions = Vec::new();
        if request.generate_auth {
            let records = self.permissions.generate(&targets.route_name, &request.title);
            self.permissions
                .persist(self.auth_store.as_ref(), &records)
                .await
                .map_err(|e| step_failed(ProduceStep::Permissions, &completed, e))?;
            permissions = records;
            completed.push(ProduceStep::Permissions);
        }

        let mut menu = None;
        if request.generate_menu {
            menu = self
                .navigation
                .generate(self.menu_store.as_ref(), &targets.route_name, &request.title)
                .await
                .map_err(|e| step_failed(ProduceStep::Menu, &completed, e))?;
            completed.push(ProduceStep::Menu);
        }

        let route = format!("{}/index", targets.base_name);
        log::info!("Produce: generated '{}' ({:?})", route, completed);

        Ok(ProduceResponse {
            route,
            artifacts,
            permissions,
            menu,
        })
    }

    fn resolve_targets(
        &self,
        table: &str,
        view_file: Option<&str>,
        controller_file: Option<&str>,
    ) -> Result<Targets> {
        let base_name = strip_table_prefix(table, &self.config.table_prefix, self.config.prefix_strip);
        if base_name.is_empty() {
            return Err(ScaffoldError::invalid_field(
                "table",
                format!("'{}' is empty once the table prefix is removed", table),
            ));
        }
        if !is_plain_name(&base_name) {
            return Err(ScaffoldError::invalid_field(
                "table",
                format!("'{}' is not a plain table name", table),
            ));
        }

        let view_name = with_extension(
            &file_name_or("viewFileName", view_file, || self.config.views.default_name.clone())?,
            &self.config.views.extension,
        );
        let controller_name = with_extension(
            &file_name_or("controllerFileName", controller_file, || {
                format!("{}{}", to_camel_case(&base_name), self.config.controllers.suffix)
            })?,
            &self.config.controllers.extension,
        );
        let controller_type = Path::new(&controller_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        if !is_type_name(controller_type) {
            return Err(ScaffoldError::invalid_field(
                "controllerFileName",
                format!("'{}' does not name a valid controller type", controller_name),
            ));
        }

        Ok(Targets {
            route_name: to_kebab_case(&base_name),
            view_path: self.config.view_dir(&base_name).join(&view_name),
            controller_path: self.config.controller_dir().join(&controller_name),
            base_name,
            view_name,
            controller_name,
        })
    }
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScaffoldError::invalid_field(key, "must not be empty"));
    }
    Ok(())
}

fn require_fields(fields: &[WireField]) -> Result<()> {
    if fields.is_empty() {
        return Err(ScaffoldError::invalid_field("fields", "at least one field is required"));
    }
    Ok(())
}

/// A plain file name, or the default when none was given
fn file_name_or(
    key: &str,
    name: Option<&str>,
    default: impl FnOnce() -> String,
) -> Result<String> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => Ok(default()),
        Some(name) if name.contains(|c| c == '/' || c == '\\') || name == "." || name == ".." => Err(
            ScaffoldError::invalid_field(key, format!("'{}' is not a plain file name", name)),
        ),
        Some(name) => Ok(name.to_string()),
    }
}

fn step_failed(step: ProduceStep, completed: &[ProduceStep], source: ScaffoldError) -> ScaffoldError {
    log::error!("Produce: step '{}' failed: {}", step, source);
    ScaffoldError::Produce {
        step,
        completed: completed.to_vec(),
        source: Box::new(source),
    }
}

async fn path_exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| ScaffoldError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnMetadata, MemoryInspector};
    use crate::store::MemoryStore;
    use crate::PrefixStrip;

    fn pipeline(config: ScaffoldConfig) -> Pipeline {
        let inspector = MemoryInspector::new()
            .with_table("yii_user", vec![ColumnMetadata::new("id", "int(11)", false)]);
        let store = Arc::new(MemoryStore::new());
        Pipeline::new(config, Arc::new(inspector), store.clone(), store).unwrap()
    }

    #[test]
    fn test_resolve_default_targets() {
        let config = ScaffoldConfig {
            base_path: PathBuf::from("/app"),
            table_prefix: "yii_".to_string(),
            ..Default::default()
        };
        let targets = pipeline(config).resolve_targets("yii_user_log", None, None).unwrap();

        assert_eq!(targets.base_name, "user_log");
        assert_eq!(targets.route_name, "user-log");
        assert_eq!(targets.view_path, PathBuf::from("/app/views/user-log/index.html"));
        assert_eq!(
            targets.controller_path,
            PathBuf::from("/app/src/controllers/UserLogController.rs")
        );
    }

    #[test]
    fn test_resolve_appends_missing_extensions() {
        let targets = pipeline(ScaffoldConfig::default())
            .resolve_targets("post", Some("list"), Some("PostsController.rs"))
            .unwrap();
        assert_eq!(targets.view_name, "list.html");
        assert_eq!(targets.controller_name, "PostsController.rs");
    }

    #[test]
    fn test_resolve_rejects_paths_in_file_names() {
        let err = pipeline(ScaffoldConfig::default())
            .resolve_targets("post", Some("../secret"), None)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation { key: Some(k), .. } if k == "viewFileName"));
    }

    #[test]
    fn test_resolve_rejects_paths_in_table_names() {
        let config = ScaffoldConfig {
            base_path: PathBuf::from("/app"),
            ..Default::default()
        };
        let pipeline = pipeline(config);

        for table in ["../../../escaped", "views/../x", "/etc/cron", "blog-post", ".."] {
            let err = pipeline.resolve_targets(table, None, None).unwrap_err();
            assert!(
                matches!(err, ScaffoldError::Validation { key: Some(ref k), .. } if k == "table"),
                "accepted table name {table:?}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_invalid_controller_type_name() {
        let err = pipeline(ScaffoldConfig::default())
            .resolve_targets("post", None, Some("posts-controller"))
            .unwrap_err();
        assert!(
            matches!(err, ScaffoldError::Validation { key: Some(ref k), .. } if k == "controllerFileName")
        );
    }

    #[test]
    fn test_empty_base_name_rejected() {
        let config = ScaffoldConfig {
            table_prefix: "yii_".to_string(),
            prefix_strip: PrefixStrip::Charset,
            ..Default::default()
        };
        let err = pipeline(config).resolve_targets("yii_", None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_envelope_for_produce_failure() {
        let err = ScaffoldError::Produce {
            step: ProduceStep::Menu,
            completed: vec![ProduceStep::View, ProduceStep::Controller],
            source: Box::new(ScaffoldError::persistence("menu table missing")),
        };
        let value = serde_json::to_value(Response::<()>::error(&err)).unwrap();

        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["kind"], "PersistenceError");
        assert_eq!(value["error"]["stage"], "menu");
        assert_eq!(
            value["error"]["completed"],
            serde_json::json!(["view", "controller"])
        );
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_error_envelope_lists_existing_paths() {
        let err = ScaffoldError::ArtifactExists {
            paths: vec![PathBuf::from("views/post/index.html")],
        };
        let value = serde_json::to_value(Response::<()>::error(&err)).unwrap();
        assert_eq!(value["error"]["kind"], "ArtifactExistsError");
        assert_eq!(value["error"]["paths"][0], "views/post/index.html");
    }

    #[test]
    fn test_produce_request_wire_names() {
        let request: ProduceRequest = serde_json::from_value(serde_json::json!({
            "title": "Users",
            "table": "yii_user",
            "fields": [{"key": "id", "title": "ID"}],
            "viewFileName": "index",
            "generateAuth": true,
            "allowOverwrite": true
        }))
        .unwrap();

        assert_eq!(request.view_file_name.as_deref(), Some("index"));
        assert!(request.generate_auth);
        assert!(!request.generate_menu);
        assert!(request.allow_overwrite);
        assert!(request.controller_file_name.is_none());
    }
}
