//! Source emission for the generated view and controller
//!
//! Both emitters render through handlebars with HTML escaping turned off: the
//! output is source code, and titles are interpolated exactly as given.

pub mod controller;
pub mod view;

pub use controller::ControllerEmitter;
pub use view::{ViewEmitter, ViewPreview};

use crate::form::FormConfig;
use crate::{Result, ScaffoldError};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Embedded default templates
pub const VIEW_TEMPLATE: &str = include_str!("templates/view.html.hbs");
pub const CONTROLLER_TEMPLATE: &str = include_str!("templates/controller.rs.hbs");

/// Only comparison the generated controllers use
pub const EQUALITY: &str = "=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    View,
    Controller,
}

/// A file written by the Produce stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Whether a file already existed at `path` before this write
    pub existed: bool,
}

impl GeneratedArtifact {
    pub fn content_str(&self) -> &str {
        std::str::from_utf8(&self.content).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub key: String,
    pub operator: &'static str,
}

/// Search conditions derived from the searchable fields, in form order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct WhereClause(Vec<Condition>);

impl WhereClause {
    pub fn derive(form: &FormConfig) -> Self {
        Self(
            form.fields()
                .filter(|field| field.search_enabled)
                .map(|field| Condition {
                    key: field.key.clone(),
                    operator: EQUALITY,
                })
                .collect(),
        )
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Single-template handlebars registry
pub(crate) struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    name: &'static str,
}

impl TemplateRenderer {
    /// Use `<dir>/<file_name>` when present, the embedded template otherwise
    pub(crate) fn load(
        name: &'static str,
        file_name: &str,
        embedded: &str,
        override_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        let custom = override_dir.map(|dir| dir.join(file_name)).filter(|p| p.is_file());
        let source = match &custom {
            Some(path) => {
                log::debug!("Using {} template override: {}", name, path.display());
                std::fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?
            }
            None => embedded.to_string(),
        };

        handlebars
            .register_template_string(name, source)
            .map_err(|e| ScaffoldError::Template(format!("{} template: {}", name, e)))?;

        Ok(Self { handlebars, name })
    }

    pub(crate) fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(self.handlebars.render(self.name, data)?)
    }
}

/// Create the parent directories (idempotent) and write the file
pub(crate) async fn write_artifact(
    kind: ArtifactKind,
    path: &Path,
    content: String,
) -> Result<GeneratedArtifact> {
    let existed = fs::try_exists(path)
        .await
        .map_err(|e| ScaffoldError::io(path, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ScaffoldError::io(parent, e))?;
    }

    fs::write(path, content.as_bytes())
        .await
        .map_err(|e| ScaffoldError::io(path, e))?;

    if existed {
        log::warn!("Overwrote existing {:?} at {}", kind, path.display());
    } else {
        log::info!("Created {:?} at {}", kind, path.display());
    }

    Ok(GeneratedArtifact {
        kind,
        path: path.to_path_buf(),
        content: content.into_bytes(),
        existed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    #[test]
    fn test_where_clause_keeps_form_order() {
        let fields = ["status", "id", "name", "email"].into_iter().map(|key| {
            let mut field = FieldDescriptor::new(key, key);
            field.search_enabled = key != "id";
            field
        });
        let form = FormConfig::from_fields("user", "Users", fields).unwrap();

        let clause = WhereClause::derive(&form);
        assert_eq!(clause.keys().collect::<Vec<_>>(), vec!["status", "name", "email"]);
        assert!(clause.conditions().iter().all(|c| c.operator == "="));
    }

    #[test]
    fn test_where_clause_empty_without_search() {
        let form =
            FormConfig::from_fields("user", "Users", [FieldDescriptor::new("id", "ID")]).unwrap();
        assert!(WhereClause::derive(&form).is_empty());
    }

    #[tokio::test]
    async fn test_write_artifact_creates_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("views").join("blog-post").join("index.html");

        let first = write_artifact(ArtifactKind::View, &path, "one".to_string())
            .await
            .unwrap();
        assert!(!first.existed);

        let second = write_artifact(ArtifactKind::View, &path, "two".to_string())
            .await
            .unwrap();
        assert!(second.existed);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }
}
