//! Unified error hierarchy for FitWell
//!
//! Scoring never fails; only plan lifecycle operations produce these errors.
//! The configuration layer and the CLI report through `anyhow`.

use std::fmt;
use thiserror::Error;

use crate::models::PlanKind;

/// Top-level error type for all plan lifecycle operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A generation request hit an already active plan without `force`
    #[error("An active {kind} plan already exists{}", plan_suffix(.plan_id))]
    ActivePlanExists {
        kind: PlanKind,
        plan_id: Option<String>,
    },

    /// Toggle on an item identity that is not part of the plan
    #[error("Item {item} not found in plan {plan_id}")]
    NotFound { plan_id: String, item: u32 },

    /// Operation not admitted by the current lifecycle state
    #[error("Cannot {operation} for the {kind} plan in state '{state}'")]
    InvalidState {
        kind: PlanKind,
        state: String,
        operation: &'static str,
    },

    /// Backend failure on generate/track/complete calls
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

fn plan_suffix(plan_id: &Option<String>) -> String {
    plan_id
        .as_ref()
        .map(|id| format!(" ({})", id))
        .unwrap_or_default()
}

/// The external endpoint a remote call was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GeneratePlan,
    TrackItem,
    CompletePlan,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::GeneratePlan => write!(f, "generate-plan"),
            Endpoint::TrackItem => write!(f, "track-item"),
            Endpoint::CompletePlan => write!(f, "complete-plan"),
        }
    }
}

/// Backend call failures
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Backend could not be reached
    #[error("{endpoint} unavailable: {reason}")]
    Unavailable { endpoint: Endpoint, reason: String },

    /// Backend answered with an error status
    #[error("{endpoint} rejected the request with status {status}: {message}")]
    Rejected {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    /// Backend answered with a body we could not interpret
    #[error("{endpoint} returned a malformed response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },
}

impl RemoteError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            RemoteError::Unavailable { endpoint, .. }
            | RemoteError::Rejected { endpoint, .. }
            | RemoteError::Malformed { endpoint, .. } => *endpoint,
        }
    }
}

/// Result type alias for FitWell operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Check if the caller may reasonably retry the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Remote(RemoteError::Unavailable { .. }))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Validation(_) => ErrorSeverity::Warning,
            EngineError::ActivePlanExists { .. } => ErrorSeverity::Info,
            EngineError::NotFound { .. } => ErrorSeverity::Warning,
            EngineError::InvalidState { .. } => ErrorSeverity::Warning,
            EngineError::Remote(RemoteError::Malformed { .. }) => ErrorSeverity::Critical,
            EngineError::Remote(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::ActivePlanExists { kind, .. } => format!(
                "You already have an active {} plan. Confirm to replace it and discard its progress.",
                kind
            ),
            EngineError::Remote(RemoteError::Unavailable { .. }) => {
                "Unable to reach the server. Please check your connection and try again.".to_string()
            }
            EngineError::Remote(RemoteError::Rejected { endpoint: Endpoint::CompletePlan, .. }) => {
                "Your feedback could not be saved. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Unexpected backend contract violation
    Critical,
    /// Error that prevents the operation
    Error,
    /// Rejected input the user can correct
    Warning,
    /// Informational, usually needs a confirmation
    Info,
}
