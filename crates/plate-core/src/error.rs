//! Error types for Climate Plate
//!
//! Provides tagged errors for:
//! - Catalog construction and loading
//! - Configuration loading
//! - Submission phase transitions
//! - Submission failures (validation, transport, status, decoding)

use std::fmt;

/// Catalog construction errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two entries share the same string id
    #[error("duplicate ingredient id: {0}")]
    DuplicateId(String),

    /// Two entries share the same remote id
    #[error("duplicate remote id {remote_id} (ingredients {first} and {second})")]
    DuplicateRemoteId {
        remote_id: u32,
        first: String,
        second: String,
    },

    /// Entry has an empty id
    #[error("ingredient id must not be empty")]
    EmptyId,

    /// Plate coordinate outside 0..=100
    #[error("ingredient {id}: plate coordinate {axis}={value} outside 0..=100")]
    CoordinateOutOfRange {
        id: String,
        axis: &'static str,
        value: f32,
    },

    /// Base size must be positive
    #[error("ingredient {id}: base size must be positive, got {value}")]
    InvalidBaseSize { id: String, value: f32 },

    /// Catalog file could not be read
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be parsed
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed config is inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Illegal submission phase change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal submission transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Phase before the attempted change
    pub from: crate::state_machine::SubmissionPhase,
    /// Requested phase
    pub to: crate::state_machine::SubmissionPhase,
}

/// Remote exchange step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `POST /session/start`
    StartSession,
    /// `POST /plate/add`
    AddIngredient,
    /// `POST /plate/remove`
    RemoveIngredient,
    /// `GET /plate`
    FetchPlate,
    /// `GET /impact/summary`
    FetchSummary,
    /// `GET /ingredients/`
    ListIngredients,
    /// `GET /health`
    Health,
}

impl Stage {
    /// Short label used in messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StartSession => "session start",
            Self::AddIngredient => "add ingredient",
            Self::RemoveIngredient => "remove ingredient",
            Self::FetchPlate => "plate lookup",
            Self::FetchSummary => "impact summary",
            Self::ListIngredients => "ingredient listing",
            Self::Health => "health check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure talking to the impact service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Request never produced a response (connect, DNS, timeout, ...)
    #[error("{stage} request failed: {message}")]
    Transport { stage: Stage, message: String },

    /// Response carried a non-success status
    #[error("{stage} returned HTTP {status}")]
    Status { stage: Stage, status: u16 },

    /// Response body did not match the expected shape
    #[error("could not decode {stage} response: {message}")]
    Decode { stage: Stage, message: String },
}

impl ServiceError {
    /// Stage that failed
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Transport { stage, .. } | Self::Status { stage, .. } | Self::Decode { stage, .. } => {
                *stage
            }
        }
    }

    /// Whether resubmitting could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode { .. } => false,
        }
    }
}

/// Submission failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Nothing selected with a positive quantity
    #[error("select at least one ingredient before calculating impact")]
    EmptyPlate,

    /// A remote step failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Submission requested from a phase that does not allow it
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl SubmitError {
    /// Check if error was raised locally before any network call
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyPlate)
    }

    /// Check if error came from the impact service
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Service(_))
    }
}
