use crate::error::ValidationError;
use crate::job::RequestedState;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What happens to the remote job when its declaration is removed.
///
/// A running job can't be deleted, only asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationPolicy {
    /// Stop immediately.
    Cancel,
    /// Let in-flight work finish before stopping.
    #[default]
    Drain,
}

impl TerminationPolicy {
    pub const ALLOWED: &'static [&'static str] = &["cancel", "drain"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationPolicy::Cancel => "cancel",
            TerminationPolicy::Drain => "drain",
        }
    }

    pub fn requested_state(&self) -> RequestedState {
        match self {
            TerminationPolicy::Cancel => RequestedState::Cancelled,
            TerminationPolicy::Drain => RequestedState::Draining,
        }
    }
}

impl FromStr for TerminationPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(TerminationPolicy::Cancel),
            "drain" => Ok(TerminationPolicy::Drain),
            other => Err(ValidationError::InvalidPolicy(other.to_string())),
        }
    }
}

impl std::fmt::Display for TerminationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a symbolic `on_delete` policy to the state the job is asked to enter.
///
/// Configuration validation already restricts the policy to
/// [`TerminationPolicy::ALLOWED`], so an error here means that check was
/// bypassed.
pub fn map_termination_policy(policy: &str) -> Result<RequestedState, ValidationError> {
    policy.parse::<TerminationPolicy>().map(|p| p.requested_state())
}
