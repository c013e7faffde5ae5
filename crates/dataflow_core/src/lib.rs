//! # Dataflow Core
//!
//! Types, traits and the lifecycle reconciler for Dataflow template jobs.
//!
//! A running Dataflow job can't simply be deleted. The reconciler creates a job
//! from a declarative spec, reports its status, and on removal asks the job to
//! cancel or drain.
//!
//! - **[`DesiredJobSpec`](schema::DesiredJobSpec)**: The validated, immutable configuration of a job.
//! - **[`JobService`](traits::JobService)**: Trait for implementing the remote job service (e.g. REST, in-memory).
//! - **[`JobLifecycle`](traits::JobLifecycle)**: The materialize / observe / terminate operations.
//! - **[`JobReconciler`](reconciler::JobReconciler)**: The [`JobLifecycle`](traits::JobLifecycle) implementation on top of any [`JobService`](traits::JobService).

pub mod config;
pub mod error;
pub mod job;
pub mod params;
pub mod policy;
pub mod reconciler;
pub mod schema;
pub mod traits;

pub mod prelude {
    pub use super::config::*;
    pub use super::error::*;
    pub use super::job::*;
    pub use super::params::*;
    pub use super::policy::*;
    pub use super::reconciler::*;
    pub use super::schema::{DesiredJobSpec, replacement_fields};
    pub use super::traits::*;
}
