use super::{build_pipeline, GlobalArgs};
use anyhow::Result;

pub async fn run(args: &GlobalArgs, format: &str) -> Result<()> {
    let pipeline = build_pipeline(args).await?;
    let tables = pipeline.list_tables().await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&tables)?),
        _ => {
            if tables.is_empty() {
                println!("No tables found.");
                return Ok(());
            }
            println!("📋 Tables ({}):\n", tables.len());
            for table in &tables {
                println!("  - {}", table);
            }
        }
    }

    Ok(())
}
