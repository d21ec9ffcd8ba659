//! JSON in, JSON envelope out

use super::{build_pipeline, GlobalArgs};
use anyhow::{Context, Result};
use clap::ValueEnum;
use rustf_scaffold::{CreateRequest, ProduceRequest, Response, UpdateRequest};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Operation {
    Create,
    Update,
    Produce,
}

pub async fn run(args: &GlobalArgs, operation: Operation, input: Option<&Path>) -> Result<()> {
    let body = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            body
        }
    };

    let pipeline = build_pipeline(args).await?;

    let ok = match operation {
        Operation::Create => {
            let request: CreateRequest = serde_json::from_str(&body).context("Invalid create request")?;
            emit(Response::from(pipeline.create(request).await))?
        }
        Operation::Update => {
            let request: UpdateRequest = serde_json::from_str(&body).context("Invalid update request")?;
            emit(Response::from(pipeline.update(request).await))?
        }
        Operation::Produce => {
            let request: ProduceRequest =
                serde_json::from_str(&body).context("Invalid produce request")?;
            emit(Response::from(pipeline.produce(request).await))?
        }
    };

    if !ok {
        anyhow::bail!("{:?} request failed", operation);
    }
    Ok(())
}

fn emit<T: Serialize>(response: Response<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.ok)
}
