//! Round outcome and termination types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of the most recent execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome<R> {
    /// No execution has finished yet
    Pending,
    /// The artifact was applied successfully
    Success(R),
    /// Expected failure class (non-zero exit, timeout, wrong answer)
    RecoverableFailure(String),
    /// Environment or precondition failure - ends the loop
    FatalError(String),
}

impl<R> Outcome<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Outcome::RecoverableFailure(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::FatalError(_))
    }

    /// Failure detail, if this outcome is a failure
    pub fn detail(&self) -> Option<&str> {
        match self {
            Outcome::RecoverableFailure(detail) | Outcome::FatalError(detail) => Some(detail),
            _ => None,
        }
    }

    /// Success payload, if any
    pub fn output(&self) -> Option<&R> {
        match self {
            Outcome::Success(output) => Some(output),
            _ => None,
        }
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Success(_) => "success",
            Outcome::RecoverableFailure(_) => "recoverable_failure",
            Outcome::FatalError(_) => "fatal_error",
        }
    }
}

/// Why a loop stopped. Exactly one applies to any finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Success,
    FatalError,
    MaxRoundsExceeded,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Success => "success",
            Termination::FatalError => "fatal_error",
            Termination::MaxRoundsExceeded => "max_rounds_exceeded",
        };
        write!(f, "{}", s)
    }
}
