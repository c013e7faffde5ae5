//! # Local Lifecycle Demo
//!
//! Walks a job through create, observe and drain against the in-memory service.
//! No credentials needed.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=debug cargo run --example local_lifecycle --features mock
//! ```

use dataflow_job::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let service = InMemoryJobService::new().with_ids(["job-123"]);
    let reconciler = JobReconciler::new(service.clone());
    let provider = ProviderConfig::new("local-project");

    let spec = DesiredJobSpec::new("dfjob-test-1", "gs://foobar", "gs://tmp")
        .with_parameter("inputFile", "gs://in/*.txt");

    let record = reconciler.materialize(&provider, &spec).await?;
    println!("Created {} ({})", record.remote_id, record.current_state);

    service.set_state(&record.project, &record.remote_id, "JOB_STATE_RUNNING");
    if let Observation::Present(current) = reconciler.observe(&record.project, &record.remote_id).await? {
        println!("Observed {} ({})", current.remote_id, current.current_state);
    }

    // Changing anything means a new job.
    let changed = spec.clone().with_max_workers(4);
    println!("Fields forcing replacement: {:?}", replacement_fields(&spec, &changed));

    reconciler
        .terminate(&record.project, &record.remote_id, spec.on_delete.as_str())
        .await?;

    for update in service.updates() {
        println!("Sent update for {}: {:?}", update.job_id, update.job.requested_state);
    }

    Ok(())
}
