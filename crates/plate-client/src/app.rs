//! Application controller
//!
//! [`PlateApp`] owns the selection store and everything the builder and
//! results screens display. Submission is split in two halves so a UI can
//! keep handling input while the exchange is in flight:
//!
//! ```rust,ignore
//! let submission = app.begin_submission()?;          // local, synchronous
//! let result = RemoteExchange::new(&service).run(submission.payload()).await;
//! app.complete_submission(&submission, result);      // local, synchronous
//! ```
//!
//! [`PlateApp::submit`] does both halves in one call.

use crate::orchestrator::{ExchangeReport, RejectedItem, RemoteExchange};
use crate::service::ImpactService;
use plate_core::state_machine::validate_transition;
use plate_core::{
    Catalog, ImpactSummary, LocalSummary, PayloadItem, PlateConfig, SelectionAction,
    SelectionStore, Sprite, SubmissionPhase, SubmitError, View, ViewProjector,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle for one in-flight submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    attempt: u64,
    payload: Vec<PayloadItem>,
}

impl Submission {
    /// Attempt counter this submission belongs to
    #[inline]
    #[must_use]
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Payload captured when the submission began
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[PayloadItem] {
        &self.payload
    }
}

/// Climate Plate client state
#[derive(Debug, Clone)]
pub struct PlateApp {
    catalog: Arc<Catalog>,
    config: PlateConfig,
    store: SelectionStore,
    view: View,
    phase: SubmissionPhase,
    attempt: u64,
    notice: Option<String>,
    local_summary: Option<LocalSummary>,
    remote_summary: Option<ImpactSummary>,
    error: Option<SubmitError>,
    rejected: Vec<RejectedItem>,
}

impl PlateApp {
    /// Create app over `catalog`
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: PlateConfig) -> Self {
        Self {
            catalog,
            store: SelectionStore::new(config.selection.default_grams),
            config,
            view: View::Build,
            phase: SubmissionPhase::Idle,
            attempt: 0,
            notice: None,
            local_summary: None,
            remote_summary: None,
            error: None,
            rejected: Vec::new(),
        }
    }

    fn projector(&self) -> ViewProjector<'_> {
        ViewProjector::from_config(&self.catalog, &self.config)
    }

    // ------------------------------------------------------------------
    // Builder input
    // ------------------------------------------------------------------

    /// Checkbox changed
    pub fn toggle(&mut self, id: &str, checked: bool) {
        self.store = self.store.toggle(id, checked);
    }

    /// Slider moved
    pub fn set_grams(&mut self, id: &str, raw: &str) {
        self.store = self.store.set_grams(id, raw);
    }

    /// Apply a selection reducer action
    ///
    /// `SelectionAction::Reset` only clears selections; use [`PlateApp::reset`]
    /// to also clear results.
    pub fn dispatch(&mut self, action: &SelectionAction) {
        self.store = self.store.apply(action);
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Sprites for the plate canvas
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        self.projector().sprites(&self.store)
    }

    /// Payload the next submission would send
    #[must_use]
    pub fn payload(&self) -> Vec<PayloadItem> {
        self.projector().payload(&self.store)
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate the selection and enter `Submitting`
    ///
    /// On an empty payload the notice is set and nothing else changes.
    ///
    /// # Errors
    /// - `SubmitError::EmptyPlate` when nothing is selected with a positive quantity
    /// - `SubmitError::Transition` while another submission is in flight
    pub fn begin_submission(&mut self) -> Result<Submission, SubmitError> {
        let payload = self.payload();
        if payload.is_empty() {
            let err = SubmitError::EmptyPlate;
            info!("Submission refused: {}", err);
            self.notice = Some(err.to_string());
            return Err(err);
        }
        validate_transition(self.phase, SubmissionPhase::Submitting)?;

        self.phase = SubmissionPhase::Submitting;
        self.attempt += 1;
        self.notice = None;
        self.error = None;
        self.remote_summary = None;
        self.rejected.clear();
        self.local_summary = Some(self.projector().local_summary(&self.store));

        debug!("Submission {} started with {} items", self.attempt, payload.len());
        Ok(Submission {
            attempt: self.attempt,
            payload,
        })
    }

    /// Record the outcome of `submission` and move to the results view
    ///
    /// Returns `false` and leaves state untouched when the submission is
    /// stale, i.e. the app was reset or resubmitted since it began.
    pub fn complete_submission(
        &mut self,
        submission: &Submission,
        result: Result<ExchangeReport, SubmitError>,
    ) -> bool {
        let target = if result.is_ok() {
            SubmissionPhase::Succeeded
        } else {
            SubmissionPhase::Failed
        };
        if submission.attempt != self.attempt || validate_transition(self.phase, target).is_err() {
            debug!(
                "Discarding stale result for submission {} (current {}, {:?})",
                submission.attempt, self.attempt, self.phase
            );
            return false;
        }

        match result {
            Ok(report) => {
                self.remote_summary = Some(report.summary);
                self.rejected = report.rejected;
            }
            Err(err) => {
                warn!("Submission {} failed: {}", submission.attempt, err);
                self.error = Some(err);
            }
        }
        self.phase = target;
        self.view = View::Results;
        true
    }

    /// Run a whole submission against `service`
    ///
    /// An empty plate makes no network call and leaves the builder view in
    /// place. Remote failures still move to the results view.
    ///
    /// # Errors
    /// The validation or remote error, after state has been updated.
    pub async fn submit<S: ImpactService + ?Sized>(&mut self, service: &S) -> Result<(), SubmitError> {
        let submission = self.begin_submission()?;
        let result = RemoteExchange::new(service).run(submission.payload()).await;
        let outcome = result.as_ref().map(|_| ()).map_err(SubmitError::clone);
        self.complete_submission(&submission, result);
        outcome
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Return to the builder keeping selections and last results
    pub fn back_to_builder(&mut self) {
        self.view = View::Build;
        self.notice = None;
    }

    /// Clear selections and results, back to an idle builder
    pub fn reset(&mut self) {
        self.store = self.store.reset();
        self.view = View::Build;
        self.phase = SubmissionPhase::Idle;
        self.notice = None;
        self.local_summary = None;
        self.remote_summary = None;
        self.error = None;
        self.rejected.clear();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PlateConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Whether the submit action should show its loading indicator
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase.is_in_flight()
    }

    /// User-facing notice from a refused submission
    #[inline]
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn local_summary(&self) -> Option<&LocalSummary> {
        self.local_summary.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn remote_summary(&self) -> Option<&ImpactSummary> {
        self.remote_summary.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&SubmitError> {
        self.error.as_ref()
    }

    /// Display string for the last remote failure
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Items the service refused in the last successful exchange
    #[inline]
    #[must_use]
    pub fn rejected(&self) -> &[RejectedItem] {
        &self.rejected
    }
}

impl Default for PlateApp {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::builtin()), PlateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MockImpactService, Registration};
    use plate_core::{ServiceError, SessionStarted, Stage};

    fn summary(session_id: &str) -> ImpactSummary {
        ImpactSummary {
            session_id: session_id.to_string(),
            total_co2_kg: 0.75,
            total_freshwater_l: 20.0,
            total_land_m2: 0.5,
            impact_score_1_to_10: 9.7,
            items: vec![],
        }
    }

    fn report(session_id: &str) -> ExchangeReport {
        ExchangeReport {
            session_id: session_id.to_string(),
            summary: summary(session_id),
            registered: 1,
            rejected: vec![],
        }
    }

    #[test]
    fn new_app_is_idle_builder() {
        let app = PlateApp::default();
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.phase(), SubmissionPhase::Idle);
        assert!(app.sprites().is_empty());
        assert!(app.store().is_empty());
    }

    #[test]
    fn empty_plate_sets_notice_only() {
        let mut app = PlateApp::default();
        app.set_grams("bread", "100");

        let err = app.begin_submission().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.phase(), SubmissionPhase::Idle);
        assert!(app.notice().is_some());
        assert!(app.local_summary().is_none());
    }

    #[test]
    fn begin_captures_payload_and_local_summary() {
        let mut app = PlateApp::default();
        app.toggle("chicken", true);
        app.set_grams("chicken", "150");

        let submission = app.begin_submission().unwrap();
        assert_eq!(submission.payload(), &[PayloadItem::new(13, 150)]);
        assert!(app.is_loading());
        assert_eq!(app.local_summary().map(|s| s.total_grams), Some(150));

        // Input stays live while in flight
        app.toggle("bread", true);
        assert_eq!(app.payload().len(), 2);
        assert_eq!(submission.payload().len(), 1);
    }

    #[test]
    fn second_begin_while_in_flight_is_rejected() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        app.begin_submission().unwrap();

        let err = app.begin_submission().unwrap_err();
        assert!(matches!(err, SubmitError::Transition(_)));
    }

    #[test]
    fn complete_success_moves_to_results() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let submission = app.begin_submission().unwrap();

        assert!(app.complete_submission(&submission, Ok(report("s-1"))));
        assert_eq!(app.view(), View::Results);
        assert_eq!(app.phase(), SubmissionPhase::Succeeded);
        assert_eq!(app.remote_summary().map(|s| s.session_id.as_str()), Some("s-1"));
        assert!(app.error().is_none());
    }

    #[test]
    fn complete_failure_keeps_local_summary() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let submission = app.begin_submission().unwrap();

        let err = SubmitError::Service(ServiceError::Status {
            stage: Stage::StartSession,
            status: 500,
        });
        assert!(app.complete_submission(&submission, Err(err)));
        assert_eq!(app.view(), View::Results);
        assert_eq!(app.phase(), SubmissionPhase::Failed);
        assert!(app.remote_summary().is_none());
        assert!(app.local_summary().is_some());
        assert_eq!(
            app.error_message().as_deref(),
            Some("session start returned HTTP 500")
        );
    }

    #[test]
    fn stale_completion_after_reset_is_discarded() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let submission = app.begin_submission().unwrap();
        app.reset();

        assert!(!app.complete_submission(&submission, Ok(report("s-1"))));
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.phase(), SubmissionPhase::Idle);
        assert!(app.remote_summary().is_none());
    }

    #[test]
    fn stale_completion_after_resubmit_is_discarded() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let first = app.begin_submission().unwrap();
        app.reset();
        app.toggle("peas", true);
        let second = app.begin_submission().unwrap();

        assert!(!app.complete_submission(&first, Ok(report("old"))));
        assert!(app.complete_submission(&second, Ok(report("new"))));
        assert_eq!(app.remote_summary().map(|s| s.session_id.as_str()), Some("new"));
    }

    #[test]
    fn back_to_builder_keeps_selection() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let submission = app.begin_submission().unwrap();
        app.complete_submission(&submission, Ok(report("s-1")));

        app.back_to_builder();
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.store().active_count(), 1);

        // Resubmission starts a new attempt from a terminal phase
        let again = app.begin_submission().unwrap();
        assert_eq!(again.attempt(), 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut app = PlateApp::default();
        app.toggle("rice", true);
        let submission = app.begin_submission().unwrap();
        app.complete_submission(&submission, Ok(report("s-1")));

        app.reset();
        assert!(app.store().is_empty());
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.phase(), SubmissionPhase::Idle);
        assert!(app.local_summary().is_none());
        assert!(app.remote_summary().is_none());
    }

    #[tokio::test]
    async fn submit_with_mock_service() {
        let mut mock = MockImpactService::new();
        mock.expect_start_session().times(1).returning(|| {
            Ok(SessionStarted {
                session_id: "s-9".into(),
            })
        });
        mock.expect_add_to_plate()
            .times(1)
            .returning(|_, _| Ok(Registration::Accepted));
        mock.expect_fetch_summary()
            .times(1)
            .returning(|id| Ok(summary(id)));

        let mut app = PlateApp::default();
        app.toggle("chicken", true);
        app.set_grams("chicken", "150");
        app.submit(&mock).await.unwrap();

        assert_eq!(app.view(), View::Results);
        assert_eq!(app.remote_summary().map(|s| s.session_id.as_str()), Some("s-9"));
    }

    #[tokio::test]
    async fn submit_empty_makes_no_calls() {
        let mock = MockImpactService::new();
        let mut app = PlateApp::default();

        let err = app.submit(&mock).await.unwrap_err();
        assert_eq!(err, SubmitError::EmptyPlate);
        assert_eq!(app.view(), View::Build);
    }
}
