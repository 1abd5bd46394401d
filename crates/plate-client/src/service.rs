//! Impact service seam
//!
//! [`ImpactService`] is the boundary between the client and the remote
//! impact-calculation service. The HTTP implementation lives in
//! [`crate::http`]; tests substitute fakes or mocks.

use async_trait::async_trait;
use plate_core::{
    HealthStatus, ImpactSummary, PayloadItem, RemoteIngredient, RemotePlate, ServiceError,
    SessionStarted,
};

/// Outcome of a single `POST /plate/add`
///
/// A non-success status is reported here rather than as an error: the
/// exchange only aborts on transport failures during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Service accepted the ingredient
    Accepted,
    /// Service answered with a non-success status
    Rejected { status: u16 },
}

impl Registration {
    /// Check if the service accepted the ingredient
    #[inline]
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Remote impact-calculation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImpactService: Send + Sync {
    /// `POST /session/start`
    async fn start_session(&self) -> Result<SessionStarted, ServiceError>;

    /// `POST /plate/add`
    async fn add_to_plate(
        &self,
        session_id: &str,
        item: PayloadItem,
    ) -> Result<Registration, ServiceError>;

    /// `POST /plate/remove`
    async fn remove_from_plate(
        &self,
        session_id: &str,
        remote_id: u32,
    ) -> Result<RemotePlate, ServiceError>;

    /// `GET /plate`
    async fn fetch_plate(&self, session_id: &str) -> Result<RemotePlate, ServiceError>;

    /// `GET /impact/summary`
    async fn fetch_summary(&self, session_id: &str) -> Result<ImpactSummary, ServiceError>;

    /// `GET /ingredients/`
    async fn list_ingredients(&self) -> Result<Vec<RemoteIngredient>, ServiceError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, ServiceError>;
}
