use thiserror::Error;

use crate::drafting::GatewayError;

#[derive(Debug, Error)]
pub enum OffboardError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Ticket id prefix {prefix} is ambiguous ({count} tickets match)")]
    AmbiguousTicket { prefix: String, count: usize },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Draft generation failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Rejections from the transition engine. The ticket passed in is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Malformed ticket-creation input or template.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The action targets a step that is not the current in-progress step.
    #[error("Invalid step {step_id}: {reason}")]
    InvalidStep { step_id: String, reason: String },

    /// A step that requires input is being completed without it.
    #[error("Step {step_id} requires input ({label}); provide input first")]
    MissingInput { step_id: String, label: String },
}

impl WorkflowError {
    pub(crate) fn invalid_step(step_id: &str, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidStep {
            step_id: step_id.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_step_display() {
        let err = WorkflowError::invalid_step("md-approval", "step is pending");
        assert_eq!(err.to_string(), "Invalid step md-approval: step is pending");
    }

    #[test]
    fn missing_input_display() {
        let err = WorkflowError::MissingInput {
            step_id: "b".into(),
            label: "Replacement".into(),
        };
        assert_eq!(
            err.to_string(),
            "Step b requires input (Replacement); provide input first"
        );
    }

    #[test]
    fn workflow_error_is_transparent_at_top_level() {
        let err: OffboardError = WorkflowError::Validation("due date precedes creation".into()).into();
        assert_eq!(err.to_string(), "Validation error: due date precedes creation");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OffboardError>();
    }
}
