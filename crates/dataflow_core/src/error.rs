use thiserror::Error;

/// Malformed input. Always raised before any remote call is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The termination policy is not one of `cancel` or `drain`.
    #[error("Invalid `on_delete` policy: {0}")]
    InvalidPolicy(String),

    /// A value was not of the type its field declares.
    #[error("{key:?}: expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A string field holds a value outside its allowed set.
    #[error("{key:?} must contain a valid string value should in array {allowed:?}, got {value:?}")]
    NotAllowed {
        key: String,
        allowed: &'static [&'static str],
        value: String,
    },

    #[error("{0:?}: required field is not set")]
    MissingField(&'static str),

    #[error("{0:?}: unknown field")]
    UnknownField(String),

    /// Computed fields are owned by the reconciler and can't be configured.
    #[error("{0:?}: field is computed and cannot be set")]
    ComputedField(&'static str),

    #[error("{key:?}: {message}")]
    OutOfRange { key: &'static str, message: String },
}

/// Errors reported by a [`JobService`](crate::traits::JobService) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The job does not exist in the given project.
    /// Maps to **HTTP 404 Not Found**.
    #[error("Job {0} not found")]
    NotFound(String),

    /// Credentials were rejected.
    /// Maps to **HTTP 401/403**.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success answer from the service (validation, quota, ...).
    #[error("Service returned error {status}: {message}")]
    Remote { status: u16, message: String },

    /// The request never got an answer (DNS, TLS, connection reset, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with something that could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

/// Errors returned by the lifecycle operations of a
/// [`JobLifecycle`](crate::traits::JobLifecycle).
///
/// An operation either fully succeeds or fails with one of these and leaves
/// the observed record where it was.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Neither the job spec nor the provider configuration names a project.
    #[error("project: required field is not set")]
    ProjectResolution,

    #[error("Error creating Dataflow job: {0}")]
    CreationFailed(#[source] ServiceError),

    #[error("Error reading Dataflow job: {0}")]
    ObservationFailed(#[source] ServiceError),

    #[error("Error terminating Dataflow job: {0}")]
    TerminationFailed(#[source] ServiceError),
}

impl JobError {
    /// The remote error wrapped by this error, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            JobError::CreationFailed(e)
            | JobError::ObservationFailed(e)
            | JobError::TerminationFailed(e) => Some(e),
            _ => None,
        }
    }
}
