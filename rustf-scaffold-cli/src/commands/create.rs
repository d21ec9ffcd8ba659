use super::{build_pipeline, GlobalArgs};
use anyhow::{Context, Result};
use rustf_scaffold::{CreateRequest, WirePayload};
use std::path::PathBuf;

pub async fn run(
    args: &GlobalArgs,
    table: String,
    title: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = build_pipeline(args).await?;
    let created = pipeline
        .create(CreateRequest {
            title: title.clone(),
            table: table.clone(),
        })
        .await?;

    let payload = WirePayload {
        table,
        title,
        fields: created.fields,
    };
    let json = serde_json::to_string_pretty(&payload)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✅ Wrote {} field descriptors to {}",
                payload.fields.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
