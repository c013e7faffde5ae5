use crate::config::ProviderConfig;
use crate::error::*;
use crate::job::*;
use crate::policy::map_termination_policy;
use crate::schema::{DesiredJobSpec, fields};
use crate::traits::{JobLifecycle, JobService};

use tracing::{debug, info, warn};

/// Drives Dataflow template jobs through their lifecycle against a [`JobService`].
///
/// Holds nothing but the service handle, so one reconciler can serve any
/// number of jobs.
#[derive(Clone, Debug)]
pub struct JobReconciler<S> {
    service: S,
}

impl<S: JobService> JobReconciler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

/// Translates a spec into the template launch request.
pub fn build_create_request(spec: &DesiredJobSpec) -> Result<CreateJobFromTemplateRequest, ValidationError> {
    if spec.max_workers < 1 {
        return Err(ValidationError::OutOfRange {
            key: fields::MAX_WORKERS,
            message: format!("must be at least 1, got {}", spec.max_workers),
        });
    }

    Ok(CreateJobFromTemplateRequest {
        job_name: spec.name.clone(),
        gcs_path: spec.template_location.clone(),
        parameters: spec.parameters.clone(),
        environment: RuntimeEnvironment {
            temp_location: spec.staging_location.clone(),
            zone: spec.zone.clone(),
            max_workers: spec.max_workers,
        },
    })
}

fn state_of(job: Job) -> String {
    job.current_state
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| JOB_STATE_UNKNOWN.to_string())
}

impl<S: JobService> JobLifecycle for JobReconciler<S> {
    async fn materialize(
        &self,
        config: &ProviderConfig,
        spec: &DesiredJobSpec,
    ) -> Result<ObservedJobRecord, JobError> {
        let project = config
            .resolve_project(spec.project.as_deref())
            .ok_or(JobError::ProjectResolution)?
            .to_string();

        let request = build_create_request(spec)?;

        info!(
            "Creating Dataflow job '{}' from {} in project {}",
            spec.name, spec.template_location, project
        );

        let job = self
            .service
            .create_job_from_template(&project, &request)
            .await
            .map_err(JobError::CreationFailed)?;

        let remote_id = job.id.clone().filter(|id| !id.is_empty()).ok_or_else(|| {
            JobError::CreationFailed(ServiceError::InvalidResponse(
                "created job has no id".to_string(),
            ))
        })?;
        let current_state = state_of(job);

        info!("Created Dataflow job {} ({})", remote_id, current_state);

        Ok(ObservedJobRecord {
            remote_id,
            project,
            current_state,
        })
    }

    async fn observe(&self, project: &str, remote_id: &str) -> Result<Observation, JobError> {
        match self.service.get_job(project, remote_id).await {
            Ok(job) => {
                let current_state = state_of(job);
                debug!("Dataflow job {} is {}", remote_id, current_state);

                Ok(Observation::Present(ObservedJobRecord {
                    remote_id: remote_id.to_string(),
                    project: project.to_string(),
                    current_state,
                }))
            }
            Err(ServiceError::NotFound(_)) => {
                warn!("Dataflow job {} not found in project {}", remote_id, project);
                Ok(Observation::NotFound)
            }
            Err(e) => Err(JobError::ObservationFailed(e)),
        }
    }

    async fn terminate(&self, project: &str, remote_id: &str, policy: &str) -> Result<(), JobError> {
        let requested = map_termination_policy(policy)?;

        info!(
            "Requesting {} for Dataflow job {} (on_delete = {})",
            requested, remote_id, policy
        );

        self.service
            .update_job(project, remote_id, &Job::with_requested_state(requested))
            .await
            .map_err(JobError::TerminationFailed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TerminationPolicy;

    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct ScriptedService {
        calls: Arc<Mutex<Vec<&'static str>>>,
        create: Result<Job, ServiceError>,
        get: Result<Job, ServiceError>,
        update: Result<Job, ServiceError>,
    }

    impl Default for ScriptedService {
        fn default() -> Self {
            let running = Job {
                id: Some("job-1".into()),
                current_state: Some("JOB_STATE_RUNNING".into()),
                ..Default::default()
            };
            Self {
                calls: Arc::default(),
                create: Ok(running.clone()),
                get: Ok(running.clone()),
                update: Ok(running),
            }
        }
    }

    impl ScriptedService {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl JobService for ScriptedService {
        async fn create_job_from_template(
            &self,
            _project: &str,
            _request: &CreateJobFromTemplateRequest,
        ) -> Result<Job, ServiceError> {
            self.calls.lock().unwrap().push("create");
            self.create.clone()
        }

        async fn get_job(&self, _project: &str, _job_id: &str) -> Result<Job, ServiceError> {
            self.calls.lock().unwrap().push("get");
            self.get.clone()
        }

        async fn update_job(&self, _project: &str, _job_id: &str, _job: &Job) -> Result<Job, ServiceError> {
            self.calls.lock().unwrap().push("update");
            self.update.clone()
        }
    }

    fn spec() -> DesiredJobSpec {
        DesiredJobSpec::new("job", "gs://template", "gs://tmp")
    }

    #[test]
    fn test_create_request_carries_environment() {
        let spec = spec()
            .with_zone("europe-west1-b")
            .with_max_workers(7)
            .with_parameter("b", "2")
            .with_parameter("a", "1");

        let request = build_create_request(&spec).unwrap();

        assert_eq!(request.job_name, "job");
        assert_eq!(request.gcs_path, "gs://template");
        assert_eq!(
            request.environment,
            RuntimeEnvironment {
                temp_location: "gs://tmp".into(),
                zone: Some("europe-west1-b".into()),
                max_workers: 7,
            }
        );
        assert_eq!(request.parameters.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_materialize_without_project_makes_no_call() {
        let service = ScriptedService::default();
        let reconciler = JobReconciler::new(service.clone());

        let err = reconciler
            .materialize(&ProviderConfig::default(), &spec())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::ProjectResolution));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_materialize_prefers_spec_project() {
        let service = ScriptedService::default();
        let reconciler = JobReconciler::new(service);

        let record = reconciler
            .materialize(&ProviderConfig::new("default"), &spec().with_project("own"))
            .await
            .unwrap();

        assert_eq!(record.project, "own");
        assert_eq!(record.remote_id, "job-1");
    }

    #[tokio::test]
    async fn test_materialize_rejects_zero_workers_before_calling() {
        let service = ScriptedService::default();
        let reconciler = JobReconciler::new(service.clone());

        let err = reconciler
            .materialize(&ProviderConfig::new("p"), &spec().with_max_workers(0))
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Validation(ValidationError::OutOfRange { .. })));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_creation_failure_is_wrapped() {
        let service = ScriptedService {
            create: Err(ServiceError::Remote {
                status: 429,
                message: "Quota exceeded".into(),
            }),
            ..Default::default()
        };
        let reconciler = JobReconciler::new(service.clone());

        let err = reconciler
            .materialize(&ProviderConfig::new("p"), &spec())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error creating Dataflow job: Service returned error 429: Quota exceeded"
        );
        assert_eq!(service.calls(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_created_job_without_id_is_a_failure() {
        let service = ScriptedService {
            create: Ok(Job::default()),
            ..Default::default()
        };
        let reconciler = JobReconciler::new(service);

        let err = reconciler
            .materialize(&ProviderConfig::new("p"), &spec())
            .await
            .unwrap_err();

        assert!(matches!(
            err.service_error(),
            Some(ServiceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_state_is_unknown() {
        let service = ScriptedService {
            get: Ok(Job::default()),
            ..Default::default()
        };
        let reconciler = JobReconciler::new(service);

        let observation = reconciler.observe("p", "job-1").await.unwrap();
        assert_eq!(
            observation.record().map(|r| r.current_state.as_str()),
            Some(JOB_STATE_UNKNOWN)
        );
    }

    #[tokio::test]
    async fn test_observe_failure_is_not_not_found() {
        let service = ScriptedService {
            get: Err(ServiceError::Transport("connection reset".into())),
            ..Default::default()
        };
        let reconciler = JobReconciler::new(service);

        let err = reconciler.observe("p", "job-1").await.unwrap_err();
        assert!(matches!(err, JobError::ObservationFailed(ServiceError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invalid_policy_makes_no_call() {
        let service = ScriptedService::default();
        let reconciler = JobReconciler::new(service.clone());

        let err = reconciler.terminate("p", "job-1", "delete").await.unwrap_err();

        assert!(matches!(err, JobError::Validation(ValidationError::InvalidPolicy(ref p)) if p == "delete"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_termination_failure_is_wrapped() {
        let service = ScriptedService {
            update: Err(ServiceError::NotFound("job-1".into())),
            ..Default::default()
        };
        let reconciler = JobReconciler::new(service.clone());

        let err = reconciler
            .terminate("p", "job-1", TerminationPolicy::Cancel.as_str())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::TerminationFailed(ServiceError::NotFound(_))));
        assert_eq!(service.calls(), vec!["update"]);
    }
}
