use crate::error::TransitionError;
use serde::{Deserialize, Serialize};

/// Progress of the current submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    /// Whether a remote exchange is in flight
    #[inline]
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Whether the phase ends an attempt
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Screen the client is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    /// Ingredient picker and plate
    #[default]
    Build,
    /// Local totals plus remote summary or error
    Results,
}

/// Validates a submission phase change.
///
/// Reset may abandon an in-flight attempt, so `Submitting -> Idle` is legal;
/// a late completion for that attempt is then rejected here.
pub fn validate_transition(
    from: SubmissionPhase,
    to: SubmissionPhase,
) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

pub fn allowed_transitions(from: SubmissionPhase) -> Vec<SubmissionPhase> {
    use SubmissionPhase::*;
    match from {
        Idle => vec![Submitting],
        Submitting => vec![Succeeded, Failed, Idle],
        Succeeded => vec![Submitting, Idle],
        Failed => vec![Submitting, Idle],
    }
}

fn allowed(from: SubmissionPhase, to: SubmissionPhase) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
