/// Environment variables consulted for the default project, in order.
pub const PROJECT_ENV_VARS: &[&str] = &[
    "GOOGLE_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "GCLOUD_PROJECT",
    "CLOUDSDK_CORE_PROJECT",
];

/// Provider-wide settings handed to every lifecycle operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Project used for jobs that don't name one.
    pub project: Option<String>,
}

impl ProviderConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
        }
    }

    /// Reads the default project from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the default project through `lookup`, taking the first non-empty
    /// value of [`PROJECT_ENV_VARS`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let project = PROJECT_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());

        Self { project }
    }

    /// The project a job lives in: its own if set, the provider default otherwise.
    pub fn resolve_project<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|p| !p.is_empty())
            .or(self.project.as_deref())
            .filter(|p| !p.is_empty())
    }
}
