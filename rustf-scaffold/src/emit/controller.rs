use super::{write_artifact, ArtifactKind, Condition, GeneratedArtifact, TemplateRenderer, WhereClause};
use crate::config::ScaffoldConfig;
use crate::naming::{is_type_name, to_camel_case, to_kebab_case};
use crate::Result;
use chrono::Local;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ControllerContext<'a> {
    title: &'a str,
    controller_name: String,
    model_name: String,
    model_module: &'a str,
    route: String,
    view_name: &'a str,
    generated_at: String,
    conditions: &'a [Condition],
}

pub struct ControllerEmitter {
    renderer: TemplateRenderer,
    view_name: String,
}

impl ControllerEmitter {
    pub fn new() -> Result<Self> {
        Self::from_config(&ScaffoldConfig::default())
    }

    pub fn from_config(config: &ScaffoldConfig) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::load(
                "controller",
                "controller.rs.hbs",
                super::CONTROLLER_TEMPLATE,
                config.templates_dir.as_deref(),
            )?,
            view_name: config.views.default_name.clone(),
        })
    }

    /// Render the controller source. The type name is the target file stem,
    /// or `<Model>Controller` when the stem is not a valid type name.
    pub fn render(
        &self,
        table_base_name: &str,
        title: &str,
        target: &Path,
        where_clause: &WhereClause,
    ) -> Result<String> {
        let model_name = to_camel_case(table_base_name);
        let controller_name = target
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| is_type_name(stem))
            .unwrap_or_else(|| format!("{}Controller", model_name));

        self.renderer.render(&ControllerContext {
            title,
            controller_name,
            model_name,
            model_module: table_base_name,
            route: to_kebab_case(table_base_name),
            view_name: &self.view_name,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            conditions: where_clause.conditions(),
        })
    }

    pub async fn commit(
        &self,
        table_base_name: &str,
        title: &str,
        target: &Path,
        where_clause: &WhereClause,
    ) -> Result<GeneratedArtifact> {
        let source = self.render(table_base_name, title, target, where_clause)?;
        write_artifact(ArtifactKind::Controller, target, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::form::FormConfig;

    fn clause(keys: &[(&str, bool)]) -> WhereClause {
        let fields = keys.iter().map(|(key, search)| {
            let mut field = FieldDescriptor::new(*key, *key);
            field.search_enabled = *search;
            field
        });
        WhereClause::derive(&FormConfig::from_fields("t", "T", fields).unwrap())
    }

    #[test]
    fn test_render_binds_model_and_conditions() {
        let emitter = ControllerEmitter::new().unwrap();
        let source = emitter
            .render(
                "yii_user_log",
                "User Logs",
                Path::new("src/controllers/YiiUserLogController.rs"),
                &clause(&[("id", true), ("message", false), ("level", true)]),
            )
            .unwrap();

        assert!(source.contains("pub struct YiiUserLogController;"));
        assert!(source.contains("use crate::models::yii_user_log::YiiUserLog;"));
        assert!(source.contains("pub const MODEL: &'static str = \"YiiUserLog\";"));
        assert!(source.contains("GET \"/yii-user-log/index\" => index"));
        assert!(source.contains("(\"id\", \"=\"),"));
        assert!(source.contains("(\"level\", \"=\"),"));
        assert!(!source.contains("(\"message\""));
        assert!(source.find("(\"id\"").unwrap() < source.find("(\"level\"").unwrap());
    }

    #[test]
    fn test_empty_conditions_render_empty_list() {
        let emitter = ControllerEmitter::new().unwrap();
        let source = emitter
            .render(
                "user",
                "Users",
                Path::new("UserController.rs"),
                &WhereClause::default(),
            )
            .unwrap();

        assert!(source.contains("pub fn where_conditions()"));
        assert!(!source.contains("\"=\""));
    }

    #[test]
    fn test_invalid_file_stem_falls_back_to_model_name() {
        let emitter = ControllerEmitter::new().unwrap();
        let source = emitter
            .render(
                "blog_post",
                "Posts",
                Path::new("src/controllers/posts-controller.rs"),
                &WhereClause::default(),
            )
            .unwrap();

        assert!(source.contains("pub struct BlogPostController;"));
        assert!(!source.contains("posts-controller"));
    }

    #[tokio::test]
    async fn test_commit_creates_controller_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("src/controllers/BlogPostController.rs");
        let emitter = ControllerEmitter::new().unwrap();

        let artifact = emitter
            .commit("blog_post", "Posts", &target, &clause(&[("title", true)]))
            .await
            .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Controller);
        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(written, artifact.content_str());
        assert!(written.contains("pub struct BlogPostController;"));
    }
}
