use crate::config::ProviderConfig;
use crate::error::*;
use crate::job::*;
use crate::schema::DesiredJobSpec;

/// A trait for injecting the remote job service into the reconciler.
pub trait JobService: Send + Sync + 'static + Clone {
    /// Launches a job from a template stored in Cloud Storage.
    fn create_job_from_template(
        &self,
        project: &str,
        request: &CreateJobFromTemplateRequest,
    ) -> impl Future<Output = Result<Job, ServiceError>> + Send;

    /// Fetches a job. Returns [`ServiceError::NotFound`] if the service doesn't know it.
    fn get_job(
        &self,
        project: &str,
        job_id: &str,
    ) -> impl Future<Output = Result<Job, ServiceError>> + Send;

    /// Updates a job. Only `requested_state` is ever set by the reconciler.
    fn update_job(
        &self,
        project: &str,
        job_id: &str,
        job: &Job,
    ) -> impl Future<Output = Result<Job, ServiceError>> + Send;
}

/// The lifecycle operations an orchestration layer drives a job through.
///
/// `Absent` → [`materialize`](Self::materialize) → `Active` →
/// [`terminate`](Self::terminate) → `TerminationRequested`.
/// [`observe`](Self::observe) may be called any number of times while `Active`.
///
/// Each call makes exactly one request to the service and never retries.
/// Calls for the same job must be serialized by the caller.
pub trait JobLifecycle: Send + Sync {
    /// Creates the remote job. The job starts running asynchronously.
    fn materialize(
        &self,
        config: &ProviderConfig,
        spec: &DesiredJobSpec,
    ) -> impl Future<Output = Result<ObservedJobRecord, JobError>> + Send;

    /// Refreshes the observed state of a job.
    fn observe(
        &self,
        project: &str,
        remote_id: &str,
    ) -> impl Future<Output = Result<Observation, JobError>> + Send;

    /// Asks the job to stop according to `policy` (`cancel` or `drain`).
    ///
    /// Returns once the request is accepted, not when the job has stopped.
    /// Must only be called for a job created by a successful
    /// [`materialize`](Self::materialize).
    fn terminate(
        &self,
        project: &str,
        remote_id: &str,
        policy: &str,
    ) -> impl Future<Output = Result<(), JobError>> + Send;
}
