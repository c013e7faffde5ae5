//! # Submit Job Demo
//!
//! Launches a Dataflow template job, prints its state, and drains or cancels
//! it on Ctrl+C.
//!
//! ## Requirements
//!
//! Set the following environment variables:
//! - `GOOGLE_PROJECT` (or `GOOGLE_CLOUD_PROJECT`): The project to run the job in.
//! - `GOOGLE_OAUTH_ACCESS_TOKEN`: e.g. the output of `gcloud auth print-access-token`.
//! - `TEMPLATE_PATH`: The template, e.g. `gs://dataflow-templates/latest/Word_Count`.
//! - `TEMP_LOCATION`: A bucket path for temporary files.
//! - `ON_DELETE` (optional): `cancel` or `drain` (default).
//!
//! Template parameters are passed as `key=value` arguments.
//!
//! ## Usage
//!
//! ```sh
//! cargo run --example submit_job --features rest -- inputFile=gs://in/*.txt output=gs://out/
//! ```

use dataflow_job::prelude::*;

use anyhow::{Context, bail};
use serde_json::{Map, Value};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Config
    let provider = ProviderConfig::from_env();
    let template = env::var("TEMPLATE_PATH").context("TEMPLATE_PATH env var required")?;
    let temp_location = env::var("TEMP_LOCATION").context("TEMP_LOCATION env var required")?;

    let mut parameters = Map::new();
    for arg in env::args().skip(1) {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("Expected key=value, got '{arg}'");
        };
        parameters.insert(key.to_string(), Value::String(value.to_string()));
    }

    let mut raw = Map::new();
    raw.insert("name".into(), format!("dfjob-demo-{}", std::process::id()).into());
    raw.insert("gcs_path".into(), template.into());
    raw.insert("temp_location".into(), temp_location.into());
    raw.insert("parameters".into(), Value::Object(parameters));
    if let Ok(policy) = env::var("ON_DELETE") {
        raw.insert("on_delete".into(), policy.into());
    }

    let spec = DesiredJobSpec::from_config(&raw)?;

    // Service
    let reconciler = JobReconciler::new(DataflowClient::new(DataflowConfig::from_env()));

    // Create
    let record = reconciler.materialize(&provider, &spec).await?;
    println!("Created job {} ({})", record.remote_id, record.current_state);

    println!("Press Ctrl+C to {} the job", spec.on_delete);
    tokio::signal::ctrl_c().await?;

    match reconciler.observe(&record.project, &record.remote_id).await? {
        Observation::Present(current) => println!("Job is {}", current.current_state),
        Observation::NotFound => {
            println!("Job {} is gone", record.remote_id);
            return Ok(());
        }
    }

    // Terminate
    reconciler
        .terminate(&record.project, &record.remote_id, spec.on_delete.as_str())
        .await?;
    println!("Requested {} for job {}", spec.on_delete.requested_state(), record.remote_id);

    Ok(())
}
