use super::{build_pipeline, persists_records, read_payload, GlobalArgs};
use anyhow::Result;
use rustf_scaffold::ProduceRequest;
use std::path::Path;

pub struct ProduceOptions {
    pub view_file: Option<String>,
    pub controller_file: Option<String>,
    pub generate_auth: bool,
    pub generate_menu: bool,
    pub allow_overwrite: bool,
}

pub async fn run(args: &GlobalArgs, payload: &Path, options: ProduceOptions) -> Result<()> {
    let pipeline = build_pipeline(args).await?;
    let payload = read_payload(payload)?;

    let produced = pipeline
        .produce(ProduceRequest {
            title: payload.title,
            table: payload.table,
            fields: payload.fields,
            view_file_name: options.view_file,
            controller_file_name: options.controller_file,
            generate_auth: options.generate_auth,
            generate_menu: options.generate_menu,
            allow_overwrite: options.allow_overwrite,
        })
        .await?;

    for artifact in &produced.artifacts {
        let verb = if artifact.existed { "Overwrote" } else { "Created" };
        println!("✅ {} {:?}: {}", verb, artifact.kind, artifact.path.display());
    }
    if persists_records(args) {
        if !produced.permissions.is_empty() {
            println!("🔐 Saved {} permissions", produced.permissions.len());
        }
        if let Some(menu) = &produced.menu {
            println!("🧭 Added menu '{}' -> {}", menu.title, menu.url);
        }
    } else {
        if !produced.permissions.is_empty() {
            println!(
                "⚠️  Generated {} permissions (not persisted: no database)",
                produced.permissions.len()
            );
        }
        if let Some(menu) = &produced.menu {
            println!(
                "⚠️  Generated menu '{}' -> {} (not persisted: no database)",
                menu.title, menu.url
            );
        }
    }
    println!("🚀 Route: {}", produced.route);

    Ok(())
}
