use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reported when the service returns a job without a `currentState`.
pub const JOB_STATE_UNKNOWN: &str = "JOB_STATE_UNKNOWN";

/// Terminal state a job can be asked to transition into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestedState {
    /// Stop immediately, discarding in-flight work.
    #[serde(rename = "JOB_STATE_CANCELLED")]
    Cancelled,
    /// Stop ingesting and let in-flight work finish.
    #[serde(rename = "JOB_STATE_DRAINING")]
    Draining,
}

impl RequestedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestedState::Cancelled => "JOB_STATE_CANCELLED",
            RequestedState::Draining => "JOB_STATE_DRAINING",
        }
    }
}

impl std::fmt::Display for RequestedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime environment of a template job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEnvironment {
    /// Cloud Storage path for temporary and staged files.
    pub temp_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub max_workers: i64,
}

/// Body of a `projects.templates.create` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobFromTemplateRequest {
    pub job_name: String,
    /// Cloud Storage path of the template file.
    pub gcs_path: String,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    pub environment: RuntimeEnvironment,
}

/// A Dataflow job as exchanged with the service.
///
/// Only the fields the lifecycle needs are modelled, everything else the
/// service returns is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_state: Option<String>,
}

impl Job {
    /// A job update that only asks for a state transition.
    pub fn with_requested_state(state: RequestedState) -> Self {
        Self {
            requested_state: Some(state.as_str().to_string()),
            ..Default::default()
        }
    }
}

/// Locally held state of a materialized job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedJobRecord {
    /// Identity assigned by the service at creation. Never recomputed.
    pub remote_id: String,
    /// Project the job was created in.
    pub project: String,
    /// Last status reported by the service, e.g. `JOB_STATE_RUNNING`.
    pub current_state: String,
}

/// Outcome of observing a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Present(ObservedJobRecord),
    /// The service no longer knows the job. The caller should treat the
    /// entity as gone.
    NotFound,
}

impl Observation {
    pub fn record(&self) -> Option<&ObservedJobRecord> {
        match self {
            Observation::Present(record) => Some(record),
            Observation::NotFound => None,
        }
    }
}
