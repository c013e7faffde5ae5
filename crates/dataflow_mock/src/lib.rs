//! # Dataflow Mock
//!
//! An in-memory job service for development and testing.
//!
//! Jobs are kept in a map and never actually run: a created job stays in its
//! initial state until [`InMemoryJobService::set_state`] changes it, and a
//! requested state transition is recorded but never carried out. Every call is
//! recorded so tests can assert on exactly what was sent.
//!
//! **DO NOT use this in production!!!**
//!
//! ## Usage
//!
//! ```rust
//! # use dataflow_mock::InMemoryJobService;
//! # fn main() {
//! let service = InMemoryJobService::new()
//!     .with_ids(["job-123"])
//!     .with_initial_state("JOB_STATE_RUNNING");
//! # }
//! ```

use dataflow_core::prelude::*;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_INITIAL_STATE: &str = "JOB_STATE_RUNNING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub project: String,
    pub request: CreateJobFromTemplateRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCall {
    pub project: String,
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub project: String,
    pub job_id: String,
    pub job: Job,
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by `(project, job id)`.
    jobs: HashMap<(String, String), Job>,
    ids: VecDeque<String>,
    creates: Vec<CreateCall>,
    gets: Vec<GetCall>,
    updates: Vec<UpdateCall>,
    fail_create: Option<ServiceError>,
    fail_get: Option<ServiceError>,
    fail_update: Option<ServiceError>,
}

#[derive(Clone, Debug)]
pub struct InMemoryJobService {
    state: Arc<Mutex<State>>,
    initial_state: String,
}

impl Default for InMemoryJobService {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            initial_state: DEFAULT_INITIAL_STATE.to_string(),
        }
    }
}

impl InMemoryJobService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out these ids to created jobs, in order. Random ids are used
    /// once they run out.
    pub fn with_ids<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.lock().ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// The `currentState` new jobs report.
    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = state.into();
        self
    }

    /// Simulates the job moving to `state` on its own.
    pub fn set_state(&self, project: &str, job_id: &str, state: impl Into<String>) -> bool {
        match self.lock().jobs.get_mut(&key(project, job_id)) {
            Some(job) => {
                job.current_state = Some(state.into());
                true
            }
            None => false,
        }
    }

    /// Simulates the job disappearing from the service.
    pub fn remove_job(&self, project: &str, job_id: &str) -> Option<Job> {
        self.lock().jobs.remove(&key(project, job_id))
    }

    pub fn job(&self, project: &str, job_id: &str) -> Option<Job> {
        self.lock().jobs.get(&key(project, job_id)).cloned()
    }

    /// Makes the next create call fail with `error`.
    pub fn fail_next_create(&self, error: ServiceError) {
        self.lock().fail_create = Some(error);
    }

    /// Makes the next get call fail with `error`.
    pub fn fail_next_get(&self, error: ServiceError) {
        self.lock().fail_get = Some(error);
    }

    /// Makes the next update call fail with `error`.
    pub fn fail_next_update(&self, error: ServiceError) {
        self.lock().fail_update = Some(error);
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.lock().creates.clone()
    }

    pub fn gets(&self) -> Vec<GetCall> {
        self.lock().gets.clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.lock().updates.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Poisoning is ignored so recorded calls stay readable after a panic.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn key(project: &str, job_id: &str) -> (String, String) {
    (project.to_string(), job_id.to_string())
}

impl JobService for InMemoryJobService {
    async fn create_job_from_template(
        &self,
        project: &str,
        request: &CreateJobFromTemplateRequest,
    ) -> Result<Job, ServiceError> {
        let mut state = self.lock();
        state.creates.push(CreateCall {
            project: project.to_string(),
            request: request.clone(),
        });

        if let Some(err) = state.fail_create.take() {
            return Err(err);
        }

        let id = state
            .ids
            .pop_front()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let job = Job {
            id: Some(id.clone()),
            name: Some(request.job_name.clone()),
            project_id: Some(project.to_string()),
            current_state: Some(self.initial_state.clone()),
            requested_state: None,
        };

        tracing::debug!("Mock created job {} in project {}", id, project);
        state.jobs.insert(key(project, &id), job.clone());
        Ok(job)
    }

    async fn get_job(&self, project: &str, job_id: &str) -> Result<Job, ServiceError> {
        let mut state = self.lock();
        state.gets.push(GetCall {
            project: project.to_string(),
            job_id: job_id.to_string(),
        });

        if let Some(err) = state.fail_get.take() {
            return Err(err);
        }

        state
            .jobs
            .get(&key(project, job_id))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(job_id.to_string()))
    }

    async fn update_job(&self, project: &str, job_id: &str, job: &Job) -> Result<Job, ServiceError> {
        let mut state = self.lock();
        state.updates.push(UpdateCall {
            project: project.to_string(),
            job_id: job_id.to_string(),
            job: job.clone(),
        });

        if let Some(err) = state.fail_update.take() {
            return Err(err);
        }

        let stored = state
            .jobs
            .get_mut(&key(project, job_id))
            .ok_or_else(|| ServiceError::NotFound(job_id.to_string()))?;

        // The transition itself happens later, on the service's schedule.
        if let Some(requested) = &job.requested_state {
            stored.requested_state = Some(requested.clone());
        }

        Ok(stored.clone())
    }
}
