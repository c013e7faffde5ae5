//! # Dataflow REST
//!
//! A [`JobService`] talking to the Dataflow `v1b3` REST API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create from template | `POST /v1b3/projects/{project}/templates` |
//! | get job | `GET /v1b3/projects/{project}/jobs/{id}` |
//! | update job | `PUT /v1b3/projects/{project}/jobs/{id}` |
//!
//! The client never retries and sets no timeouts of its own. Inject a
//! configured [`reqwest::Client`] with [`DataflowClient::with_http_client`]
//! to control those.
//!
//! ## Example
//!
//! ```no_run
//! use dataflow_core::prelude::*;
//! use dataflow_rest::{DataflowClient, DataflowConfig};
//!
//! async fn run() -> Result<(), JobError> {
//!     let reconciler = JobReconciler::new(DataflowClient::new(DataflowConfig::from_env()));
//!     let spec = DesiredJobSpec::new(
//!         "wordcount",
//!         "gs://dataflow-templates/latest/Word_Count",
//!         "gs://my-bucket/tmp",
//!     )
//!     .with_parameter("inputFile", "gs://dataflow-samples/shakespeare/kinglear.txt")
//!     .with_parameter("output", "gs://my-bucket/out");
//!
//!     let record = reconciler.materialize(&ProviderConfig::from_env(), &spec).await?;
//!     println!("{} is {}", record.remote_id, record.current_state);
//!     Ok(())
//! }
//! ```

use dataflow_core::prelude::*;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://dataflow.googleapis.com";

pub const ENDPOINT_ENV_VAR: &str = "DATAFLOW_ENDPOINT";
pub const ACCESS_TOKEN_ENV_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataflowConfig {
    /// Base URL of the API, without the `/v1b3` suffix.
    pub endpoint: String,
    /// OAuth2 access token sent as a bearer token.
    pub access_token: Option<String>,
}

impl Default for DataflowConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

impl DataflowConfig {
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            endpoint: non_empty(ENDPOINT_ENV_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            access_token: non_empty(ACCESS_TOKEN_ENV_VAR),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DataflowClient {
    config: DataflowConfig,
    client: Client,
}

/// Google API error envelope: `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl DataflowClient {
    pub fn new(config: DataflowConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Uses `client` for all requests, e.g. one with a request timeout.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &DataflowConfig {
        &self.config
    }

    fn auth_request(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.config.access_token {
            builder.bearer_auth(token)
        } else {
            builder
        }
    }

    /// `{endpoint}/v1b3/projects/{project}/{segments..}`, each segment percent-encoded.
    fn url(&self, project: &str, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| {
            ServiceError::Transport(format!("Invalid endpoint {}: {e}", self.config.endpoint))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::Transport(format!("Invalid endpoint {}", self.config.endpoint))
            })?
            .pop_if_empty()
            .extend(["v1b3", "projects", project])
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        self.auth_request(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

/// Decodes a job from a successful response, or maps the failure.
///
/// A 404 is only reported as [`ServiceError::NotFound`] when the request
/// addressed a specific job.
async fn read_job(response: Response, job_id: Option<&str>) -> Result<Job, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Job>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("Failed to parse job: {e}")));
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);

    Err(match (status, job_id) {
        (StatusCode::NOT_FOUND, Some(id)) => ServiceError::NotFound(id.to_string()),
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => ServiceError::Unauthorized(message),
        _ => ServiceError::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

fn error_message(status: StatusCode, text: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => envelope.error.message,
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

impl JobService for DataflowClient {
    async fn create_job_from_template(
        &self,
        project: &str,
        request: &CreateJobFromTemplateRequest,
    ) -> Result<Job, ServiceError> {
        let url = self.url(project, &["templates"])?;
        debug!("POST {}", url);

        let response = self.send(self.client.post(url).json(request)).await?;
        read_job(response, None).await
    }

    async fn get_job(&self, project: &str, job_id: &str) -> Result<Job, ServiceError> {
        let url = self.url(project, &["jobs", job_id])?;
        debug!("GET {}", url);

        let response = self.send(self.client.get(url)).await?;
        read_job(response, Some(job_id)).await
    }

    async fn update_job(&self, project: &str, job_id: &str, job: &Job) -> Result<Job, ServiceError> {
        let url = self.url(project, &["jobs", job_id])?;
        debug!("PUT {}", url);

        let response = self.send(self.client.put(url).json(job)).await?;
        read_job(response, Some(job_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_from_segments() {
        let client = DataflowClient::new(DataflowConfig::new("http://localhost:8080/", None));

        assert_eq!(
            client.url("my-project", &["jobs", "2017-01-01_00_00_00-1"]).unwrap().as_str(),
            "http://localhost:8080/v1b3/projects/my-project/jobs/2017-01-01_00_00_00-1"
        );
        assert_eq!(
            client.url("p", &["jobs", "a/b"]).unwrap().as_str(),
            "http://localhost:8080/v1b3/projects/p/jobs/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let client = DataflowClient::new(DataflowConfig::new("not a url", None));
        assert!(matches!(
            client.url("p", &["templates"]),
            Err(ServiceError::Transport(_))
        ));
    }

    #[test]
    fn test_config_from_lookup() {
        let config = DataflowConfig::from_lookup(|key| match key {
            ACCESS_TOKEN_ENV_VAR => Some("ya29.token".to_string()),
            ENDPOINT_ENV_VAR => Some("".to_string()),
            _ => None,
        });

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"error": {"code": 400, "message": "Invalid template", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, body), "Invalid template");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, " upstream died "), "upstream died");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }
}
