use super::{build_pipeline, read_payload, GlobalArgs};
use anyhow::Result;
use rustf_scaffold::{ArtifactStatus, UpdateRequest};

pub async fn run(args: &GlobalArgs, payload: &std::path::Path) -> Result<()> {
    let pipeline = build_pipeline(args).await?;
    let payload = read_payload(payload)?;

    let updated = pipeline
        .update(UpdateRequest {
            title: payload.title,
            table: payload.table,
            fields: payload.fields,
        })
        .await?;

    println!("{}", updated.preview);
    println!("📝 Search conditions: {}", updated.where_clause.keys().collect::<Vec<_>>().join(", "));
    print_status("View", &updated.view);
    print_status("Controller", &updated.controller);

    Ok(())
}

fn print_status(label: &str, status: &ArtifactStatus) {
    let state = if status.exists { "exists, produce needs --force" } else { "new" };
    println!("📄 {}: {} ({})", label, status.path.display(), state);
}
