//! Remote exchange orchestration
//!
//! Runs one submission against the impact service:
//! 1. Start a fresh session
//! 2. Register every payload item concurrently and wait for all of them
//! 3. Fetch the impact summary for the session
//!
//! Any failure in steps 1 or 3, or a transport failure in step 2, aborts the
//! exchange. There is no retry; the caller resubmits.

use crate::service::{ImpactService, Registration};
use futures::future::join_all;
use plate_core::{ImpactSummary, PayloadItem, SubmitError};
use tracing::{debug, info, warn};

/// Payload item the service answered with a non-success status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedItem {
    pub item: PayloadItem,
    pub status: u16,
}

/// Result of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeReport {
    /// Session created for this submission
    pub session_id: String,
    /// Remote metrics
    pub summary: ImpactSummary,
    /// Items the service accepted
    pub registered: usize,
    /// Items the service refused; the summary does not include them
    pub rejected: Vec<RejectedItem>,
}

impl ExchangeReport {
    /// Whether every submitted item reached the session
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Drives the three-step exchange over an [`ImpactService`]
#[derive(Debug)]
pub struct RemoteExchange<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: ImpactService + ?Sized> RemoteExchange<'a, S> {
    /// Create exchange over `service`
    #[inline]
    #[must_use]
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Submit `payload` and collect the impact summary
    ///
    /// # Errors
    /// - `SubmitError::EmptyPlate` without any network call if `payload` is empty
    /// - `SubmitError::Service` for the first failing step
    pub async fn run(&self, payload: &[PayloadItem]) -> Result<ExchangeReport, SubmitError> {
        if payload.is_empty() {
            return Err(SubmitError::EmptyPlate);
        }
        info!("Submitting plate with {} ingredients", payload.len());

        // 1. Fresh session per submission
        let session = self.service.start_session().await?;
        let session_id = session.session_id;
        debug!("Started session {}", session_id);

        // 2. Fan out registrations, join all before continuing
        let outcomes = join_all(
            payload
                .iter()
                .map(|item| self.service.add_to_plate(&session_id, *item)),
        )
        .await;

        let mut rejected = Vec::new();
        for (item, outcome) in payload.iter().zip(outcomes) {
            match outcome? {
                Registration::Accepted => {}
                Registration::Rejected { status } => {
                    warn!(
                        "Service rejected ingredient {} ({} g) with HTTP {}",
                        item.remote_id, item.grams, status
                    );
                    rejected.push(RejectedItem {
                        item: *item,
                        status,
                    });
                }
            }
        }
        let registered = payload.len() - rejected.len();
        debug!("Registered {} of {} ingredients", registered, payload.len());

        // 3. Summary for the session
        let summary = self.service.fetch_summary(&session_id).await?;
        info!(
            "Impact summary for {}: {:.3} kg CO2, score {:.1}",
            session_id, summary.total_co2_kg, summary.impact_score_1_to_10
        );

        Ok(ExchangeReport {
            session_id,
            summary,
            registered,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockImpactService;
    use mockall::Sequence;
    use async_trait::async_trait;
    use plate_core::{
        HealthStatus, RemoteIngredient, RemotePlate, ServiceError, SessionStarted, Stage,
    };
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn summary(session_id: &str) -> ImpactSummary {
        ImpactSummary {
            session_id: session_id.to_string(),
            total_co2_kg: 1.485,
            total_freshwater_l: 54.9,
            total_land_m2: 1.85,
            impact_score_1_to_10: 9.5,
            items: vec![],
        }
    }

    fn started(session_id: &str) -> Result<SessionStarted, ServiceError> {
        Ok(SessionStarted {
            session_id: session_id.to_string(),
        })
    }

    #[tokio::test]
    async fn runs_steps_in_order() {
        let mut mock = MockImpactService::new();
        let mut seq = Sequence::new();

        mock.expect_start_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| started("s-1"));
        mock.expect_add_to_plate()
            .withf(|session_id, item| session_id == "s-1" && *item == PayloadItem::new(13, 150))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Registration::Accepted));
        mock.expect_fetch_summary()
            .withf(|session_id| session_id == "s-1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(summary(id)));

        let report = RemoteExchange::new(&mock)
            .run(&[PayloadItem::new(13, 150)])
            .await
            .unwrap();

        assert_eq!(report.session_id, "s-1");
        assert_eq!(report.registered, 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn empty_payload_makes_no_calls() {
        let mock = MockImpactService::new();
        let result = RemoteExchange::new(&mock).run(&[]).await;
        assert_eq!(result.unwrap_err(), SubmitError::EmptyPlate);
    }

    #[tokio::test]
    async fn start_failure_aborts() {
        let mut mock = MockImpactService::new();
        mock.expect_start_session().times(1).returning(|| {
            Err(ServiceError::Status {
                stage: Stage::StartSession,
                status: 500,
            })
        });
        mock.expect_add_to_plate().never();
        mock.expect_fetch_summary().never();

        let err = RemoteExchange::new(&mock)
            .run(&[PayloadItem::new(1, 50)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Service(ServiceError::Status { stage: Stage::StartSession, status: 500 })
        ));
    }

    #[tokio::test]
    async fn rejected_registration_is_reported_not_fatal() {
        let mut mock = MockImpactService::new();
        mock.expect_start_session().returning(|| started("s-2"));
        mock.expect_add_to_plate()
            .times(2)
            .returning(|_, item| {
                if item.remote_id == 99 {
                    Ok(Registration::Rejected { status: 400 })
                } else {
                    Ok(Registration::Accepted)
                }
            });
        mock.expect_fetch_summary().times(1).returning(|id| Ok(summary(id)));

        let report = RemoteExchange::new(&mock)
            .run(&[PayloadItem::new(1, 100), PayloadItem::new(99, 60)])
            .await
            .unwrap();

        assert_eq!(report.registered, 1);
        assert_eq!(
            report.rejected,
            vec![RejectedItem { item: PayloadItem::new(99, 60), status: 400 }]
        );
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn transport_failure_during_registration_aborts_before_summary() {
        let mut mock = MockImpactService::new();
        mock.expect_start_session().returning(|| started("s-3"));
        mock.expect_add_to_plate().times(2).returning(|_, item| {
            if item.remote_id == 4 {
                Err(ServiceError::Transport {
                    stage: Stage::AddIngredient,
                    message: "connection reset".into(),
                })
            } else {
                Ok(Registration::Accepted)
            }
        });
        mock.expect_fetch_summary().never();

        let err = RemoteExchange::new(&mock)
            .run(&[PayloadItem::new(4, 100), PayloadItem::new(5, 80)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Service(ServiceError::Transport { stage: Stage::AddIngredient, .. })
        ));
    }

    #[tokio::test]
    async fn summary_failure_aborts() {
        let mut mock = MockImpactService::new();
        mock.expect_start_session().returning(|| started("s-4"));
        mock.expect_add_to_plate().returning(|_, _| Ok(Registration::Accepted));
        mock.expect_fetch_summary().returning(|_| {
            Err(ServiceError::Decode {
                stage: Stage::FetchSummary,
                message: "missing field `items`".into(),
            })
        });

        let err = RemoteExchange::new(&mock)
            .run(&[PayloadItem::new(3, 120)])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Service(ServiceError::Decode { .. })));
    }

    /// Registrations only complete once all of them are in flight together
    struct GatedService {
        gate: Barrier,
    }

    #[async_trait]
    impl ImpactService for GatedService {
        async fn start_session(&self) -> Result<SessionStarted, ServiceError> {
            started("gated")
        }

        async fn add_to_plate(
            &self,
            _session_id: &str,
            _item: PayloadItem,
        ) -> Result<Registration, ServiceError> {
            self.gate.wait().await;
            Ok(Registration::Accepted)
        }

        async fn remove_from_plate(
            &self,
            session_id: &str,
            _remote_id: u32,
        ) -> Result<RemotePlate, ServiceError> {
            Ok(RemotePlate {
                session_id: session_id.to_string(),
                items: vec![],
            })
        }

        async fn fetch_plate(&self, session_id: &str) -> Result<RemotePlate, ServiceError> {
            self.remove_from_plate(session_id, 0).await
        }

        async fn fetch_summary(&self, session_id: &str) -> Result<ImpactSummary, ServiceError> {
            Ok(summary(session_id))
        }

        async fn list_ingredients(&self) -> Result<Vec<RemoteIngredient>, ServiceError> {
            Ok(vec![])
        }

        async fn health(&self) -> Result<HealthStatus, ServiceError> {
            Ok(HealthStatus {
                status: "ok".into(),
            })
        }
    }

    #[tokio::test]
    async fn registrations_are_in_flight_together() {
        let payload = [
            PayloadItem::new(1, 100),
            PayloadItem::new(5, 80),
            PayloadItem::new(13, 150),
        ];
        let service = GatedService {
            gate: Barrier::new(payload.len()),
        };

        // Sequential dispatch would park on the barrier forever.
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            RemoteExchange::new(&service).run(&payload),
        )
        .await
        .expect("registrations were not dispatched concurrently")
        .unwrap();

        assert_eq!(report.registered, 3);
        assert_eq!(report.session_id, "gated");
    }
}
