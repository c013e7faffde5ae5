//! # Dataflow Job
//!
//! Declarative lifecycle management for Dataflow template jobs.
//!
//! Given a [`DesiredJobSpec`](dataflow_core::schema::DesiredJobSpec), the
//! [`JobReconciler`](dataflow_core::reconciler::JobReconciler) launches the job
//! from its template, reports the job's status on request, and when the
//! declaration goes away asks the job to **cancel** or **drain** instead of
//! pretending it can be deleted.
//!
//! This crate serves as an entry point, re-exporting the core logic and
//! optionally including service backends via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`rest`** | Backend for the Dataflow `v1b3` REST API (`dataflow_rest`). |
//! | **`mock`** | In-memory backend for tests and local development (`dataflow_mock`). |
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! dataflow_job = { version = "0.3", features = ["mock"] }
//! ```
//!
//! ```rust,no_run
//! use dataflow_job::prelude::*;
//! use dataflow_mock::InMemoryJobService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), JobError> {
//!     let reconciler = JobReconciler::new(InMemoryJobService::new());
//!     let config = ProviderConfig::new("my-project");
//!     let spec = DesiredJobSpec::new("dfjob-test-1", "gs://foobar", "gs://tmp");
//!
//!     // Create
//!     let record = reconciler.materialize(&config, &spec).await?;
//!
//!     // Observe
//!     reconciler.observe(&record.project, &record.remote_id).await?;
//!
//!     // Drain
//!     reconciler
//!         .terminate(&record.project, &record.remote_id, spec.on_delete.as_str())
//!         .await
//! }
//! ```

pub use dataflow_core::*;

#[cfg(feature = "rest")]
pub mod rest {
    pub use dataflow_rest::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use dataflow_mock::*;
}

pub mod prelude {
    pub use dataflow_core::prelude::*;

    #[cfg(feature = "rest")]
    pub use dataflow_rest::{DataflowClient, DataflowConfig};

    #[cfg(feature = "mock")]
    pub use dataflow_mock::InMemoryJobService;
}
