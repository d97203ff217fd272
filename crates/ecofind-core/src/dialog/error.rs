//! Errors raised by the scripted dialog engine

use thiserror::Error;

/// Result type alias for dialog operations
pub type DialogResult<T> = Result<T, DialogError>;

/// Rejected user actions and malformed scripts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// The conversation reached a terminal state
    #[error("Conversation has ended; restart to begin again")]
    Terminal,

    /// A lead submission is in flight
    #[error("A submission is already in progress")]
    Busy,

    /// No submission is waiting for an outcome
    #[error("No submission is pending")]
    NotSubmitting,

    /// An option was selected while the current step expects input
    #[error("Step '{step}' does not offer options")]
    NotAnOptionStep {
        /// Current step id
        step: String,
    },

    /// Details were submitted while the current step expects an option
    #[error("Step '{step}' does not accept details")]
    NotAnInputStep {
        /// Current step id
        step: String,
    },

    /// The selected value is not offered by the current step
    #[error("'{value}' is not an option on step '{step}'")]
    UnknownOption {
        /// Current step id
        step: String,
        /// Rejected option value
        value: String,
    },

    /// A required field was missing or blank
    #[error("{label} is required")]
    MissingField {
        /// Field name
        field: String,
        /// Human-readable field label
        label: String,
    },

    /// The step script violates a structural rule
    #[error("Invalid dialog script: {0}")]
    InvalidScript(String),
}
