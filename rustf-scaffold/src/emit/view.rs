use super::{write_artifact, ArtifactKind, GeneratedArtifact, TemplateRenderer, WhereClause};
use crate::config::ScaffoldConfig;
use crate::descriptor::FieldDescriptor;
use crate::form::FormConfig;
use crate::Result;
use serde::Serialize;
use std::path::Path;

const COLUMN_INDENT: &str = "                ";

/// Dry-run output of the view emitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPreview {
    pub source: String,
    pub where_clause: WhereClause,
}

#[derive(Serialize)]
struct ViewContext<'a> {
    title: &'a str,
    table: &'a str,
    columns: String,
}

pub struct ViewEmitter {
    renderer: TemplateRenderer,
}

impl ViewEmitter {
    /// Emitter using the embedded view template
    pub fn new() -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::load("view", "view.html.hbs", super::VIEW_TEMPLATE, None)?,
        })
    }

    pub fn from_config(config: &ScaffoldConfig) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::load(
                "view",
                "view.html.hbs",
                super::VIEW_TEMPLATE,
                config.templates_dir.as_deref(),
            )?,
        })
    }

    /// Render the view source and derive the search conditions; no side effects
    pub fn render_preview(&self, form: &FormConfig) -> Result<ViewPreview> {
        let columns = form
            .fields()
            .map(|field| format!("{}{}", COLUMN_INDENT, column_literal(field)))
            .collect::<Vec<_>>()
            .join(",\n");

        let source = self.renderer.render(&ViewContext {
            title: &form.title,
            table: &form.table,
            columns,
        })?;

        Ok(ViewPreview {
            source,
            where_clause: WhereClause::derive(form),
        })
    }

    pub async fn commit(&self, form: &FormConfig, target: &Path) -> Result<GeneratedArtifact> {
        let preview = self.render_preview(form)?;
        write_artifact(ArtifactKind::View, target, preview.source).await
    }
}

/// One `aoColumns` entry. The title goes in verbatim.
fn column_literal(field: &FieldDescriptor) -> String {
    let mut parts = vec![
        format!("\"title\": \"{}\"", field.title),
        format!("\"data\": \"{}\"", field.key),
        format!("\"sName\": \"{}\"", field.key),
    ];

    if field.edit_enabled {
        let mut edit = vec![format!("\"type\": \"{}\"", field.input_type)];
        if field.validation.required {
            edit.push("\"required\": true".to_string());
        }
        if field.validation.numeric {
            edit.push("\"number\": true".to_string());
        }
        if let Some((min, max)) = field.validation.length_range {
            edit.push(format!("\"rangelength\": [{}, {}]", min, max));
        }
        parts.push(format!("\"edit\": {{{}}}", edit.join(", ")));
    }

    if field.search_enabled {
        parts.push("\"search\": {\"type\": \"text\"}".to_string());
    }

    if !field.sortable {
        parts.push("\"bSortable\": false".to_string());
    }

    if let Some(callback) = &field.created_cell_callback {
        parts.push(format!("\"createdCell\": {}", callback));
    }

    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{InputType, ValidationOptions};

    fn sample_form() -> FormConfig {
        let mut id = FieldDescriptor::new("id", "ID");
        id.validation = ValidationOptions {
            required: true,
            numeric: true,
            length_range: None,
        };
        id.search_enabled = true;

        let mut title = FieldDescriptor::new("title", "Post Title");
        title.validation.length_range = Some((2, 100));
        title.input_type = InputType::Textarea;
        title.search_enabled = true;

        let mut created_at = FieldDescriptor::new("created_at", "Created");
        created_at.edit_enabled = false;
        created_at.sortable = false;
        created_at.created_cell_callback = Some("meTables.dateTimeString".to_string());

        FormConfig::from_fields("blog_post", "Blog Posts", [id, title, created_at]).unwrap()
    }

    #[test]
    fn test_column_blocks() {
        let form = sample_form();
        let columns: Vec<String> = form.fields().map(column_literal).collect();

        assert_eq!(
            columns[0],
            r#"{"title": "ID", "data": "id", "sName": "id", "edit": {"type": "text", "required": true, "number": true}, "search": {"type": "text"}}"#
        );
        assert_eq!(
            columns[1],
            r#"{"title": "Post Title", "data": "title", "sName": "title", "edit": {"type": "textarea", "rangelength": [2, 100]}, "search": {"type": "text"}}"#
        );
        assert_eq!(
            columns[2],
            r#"{"title": "Created", "data": "created_at", "sName": "created_at", "bSortable": false, "createdCell": meTables.dateTimeString}"#
        );
    }

    #[test]
    fn test_preview_embeds_columns_in_order() {
        let emitter = ViewEmitter::new().unwrap();
        let preview = emitter.render_preview(&sample_form()).unwrap();

        assert!(preview.source.contains("title: \"Blog Posts\""));
        let id_pos = preview.source.find("\"data\": \"id\"").unwrap();
        let title_pos = preview.source.find("\"data\": \"title\"").unwrap();
        let created_pos = preview.source.find("\"data\": \"created_at\"").unwrap();
        assert!(id_pos < title_pos && title_pos < created_pos);
        assert_eq!(preview.where_clause.keys().collect::<Vec<_>>(), vec!["id", "title"]);
    }

    #[test]
    fn test_title_is_not_escaped() {
        let form = FormConfig::from_fields(
            "t",
            "Tom & Jerry <b>",
            [FieldDescriptor::new("id", "A & B")],
        )
        .unwrap();
        let preview = ViewEmitter::new().unwrap().render_preview(&form).unwrap();

        assert!(preview.source.contains("Tom & Jerry <b>"));
        assert!(preview.source.contains("\"title\": \"A & B\""));
    }

    #[tokio::test]
    async fn test_commit_writes_preview() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("views/blog-post/index.html");
        let emitter = ViewEmitter::new().unwrap();
        let form = sample_form();

        let artifact = emitter.commit(&form, &target).await.unwrap();

        assert_eq!(artifact.kind, ArtifactKind::View);
        assert!(!artifact.existed);
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            emitter.render_preview(&form).unwrap().source
        );
    }

    #[test]
    fn test_template_override() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("view.html.hbs"), "<h1>{{title}}</h1>\n{{columns}}").unwrap();

        let config = ScaffoldConfig {
            templates_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let emitter = ViewEmitter::from_config(&config).unwrap();
        let form =
            FormConfig::from_fields("t", "Custom", [FieldDescriptor::new("id", "ID")]).unwrap();

        let preview = emitter.render_preview(&form).unwrap();
        assert!(preview.source.starts_with("<h1>Custom</h1>"));
    }
}
