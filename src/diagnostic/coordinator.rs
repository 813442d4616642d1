//! DiagnosticSubmissionCoordinator — posts the answers once, applies the
//! returned result optimistically, then reconciles with a fresh status fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::api::CoachApi;
use crate::error::SubmissionError;
use crate::flow::{FlowLifetime, ResponseMap};
use crate::session::SessionController;

use super::model::{DiagnosticResult, DiagnosticStatus, ResultOrigin};

/// Result of a `submit` call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend accepted the answers. `result` is the best known result:
    /// the confirmed one if reconciliation succeeded, the provisional one
    /// otherwise.
    Accepted {
        result: DiagnosticResult,
        reconciliation: Reconciliation,
    },
    /// Another submission was in flight; nothing was sent.
    AlreadySubmitting,
}

/// How the post-submit status fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// The backend reported a completed diagnostic; it replaced the
    /// provisional result.
    Confirmed(DiagnosticResult),
    /// Status not completed yet, or no payload attached.
    Pending,
    /// The fetch failed. The provisional result stays.
    Failed(String),
    /// The flow was torn down or the session changed before the fetch landed.
    Cancelled,
}

/// Clears the in-flight flag when dropped, including on cancellation.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DiagnosticSubmissionCoordinator {
    api: Arc<dyn CoachApi>,
    session: Arc<SessionController>,
    in_flight: AtomicBool,
    lifetime: FlowLifetime,
}

impl DiagnosticSubmissionCoordinator {
    /// `lifetime` is the owning flow's; reconciliation stops when it ends.
    pub fn new(api: Arc<dyn CoachApi>, session: Arc<SessionController>, lifetime: FlowLifetime) -> Self {
        Self {
            api,
            session,
            in_flight: AtomicBool::new(false),
            lifetime,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Post `responses`, record the returned result as provisional, then
    /// reconcile. A call made while another is in flight sends nothing.
    pub async fn submit(&self, responses: &ResponseMap) -> Result<SubmitOutcome, SubmissionError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Diagnostic submission already in flight");
            return Ok(SubmitOutcome::AlreadySubmitting);
        };

        let epoch = self.session.epoch();
        info!(answers = responses.len(), "Submitting diagnostic");

        let provisional = match self.api.submit_diagnostic(responses).await {
            Ok(result) => result,
            Err(e) if e.is_auth_expired() => {
                self.session.handle_api_error(&e);
                return Err(SubmissionError::AuthExpired);
            }
            Err(e) => {
                warn!(error = %e, "Diagnostic submission failed");
                return Err(SubmissionError::Failed {
                    reason: e.user_message(),
                });
            }
        };

        self.session
            .record_diagnostic(epoch, provisional.clone(), ResultOrigin::Provisional);
        info!(result_id = ?provisional.id, "Diagnostic accepted");

        let reconciliation = self.reconcile(epoch).await;
        let result = match reconciliation {
            Reconciliation::Confirmed(ref confirmed) => confirmed.clone(),
            _ => provisional,
        };
        Ok(SubmitOutcome::Accepted {
            result,
            reconciliation,
        })
    }

    /// Fetch the authoritative status and let it overwrite the provisional
    /// result. Never reverts what the session already shows.
    pub async fn reconcile(&self, epoch: u64) -> Reconciliation {
        let fetched = tokio::select! {
            biased;
            _ = self.lifetime.ended() => {
                debug!("Flow closed before reconciliation finished");
                return Reconciliation::Cancelled;
            }
            fetched = self.api.diagnostic_status() => fetched,
        };

        match fetched {
            Ok(response) if DiagnosticStatus::from_wire(&response.status) == DiagnosticStatus::Completed => {
                let Some(result) = response.diagnostic else {
                    return Reconciliation::Pending;
                };
                if self
                    .session
                    .record_diagnostic(epoch, result.clone(), ResultOrigin::Authoritative)
                {
                    debug!(result_id = ?result.id, "Diagnostic reconciled");
                    Reconciliation::Confirmed(result)
                } else {
                    Reconciliation::Cancelled
                }
            }
            Ok(response) => {
                debug!(status = %response.status, "Diagnostic not completed yet");
                Reconciliation::Pending
            }
            Err(e) => {
                warn!(error = %e, "Diagnostic reconciliation failed; keeping provisional result");
                if e.is_auth_expired() && self.session.epoch() == epoch {
                    self.session.handle_api_error(&e);
                }
                Reconciliation::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::fake::{ScriptedApi, completed, result_with, user};
    use crate::api::model::{DiagnosticStatusResponse, Role};
    use crate::error::ApiError;
    use crate::session::MemoryTokenStore;

    fn answers() -> ResponseMap {
        [("q1", "a"), ("q2", "b")].into_iter().collect()
    }

    fn seller_api() -> ScriptedApi {
        ScriptedApi::new().with_identity(Ok(user(Role::Seller)))
    }

    async fn setup(api: ScriptedApi) -> (Arc<ScriptedApi>, Arc<SessionController>, DiagnosticSubmissionCoordinator) {
        let api = Arc::new(api);
        let tokens = Arc::new(MemoryTokenStore::with_token("tok"));
        let session = Arc::new(SessionController::new(api.clone(), tokens));
        session.check_auth().await;
        let coordinator = DiagnosticSubmissionCoordinator::new(api.clone(), session.clone(), FlowLifetime::new());
        (api, session, coordinator)
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            path: "/api/diagnostic/me".into(),
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_double_submit_sends_once() {
        let (api, _session, coordinator) = setup(
            seller_api()
                .with_submission(Ok(result_with("provisional", 3.0)))
                .with_submit_latency(Duration::from_millis(500)),
        )
        .await;
        let responses = answers();

        let (first, second) = tokio::join!(coordinator.submit(&responses), coordinator.submit(&responses));

        assert!(matches!(first, Ok(SubmitOutcome::Accepted { .. })));
        assert_eq!(second, Ok(SubmitOutcome::AlreadySubmitting));
        assert_eq!(api.submissions(), 1);
        assert!(!coordinator.is_submitting());
    }

    #[tokio::test]
    async fn confirmed_result_overwrites_provisional() {
        let (api, session, coordinator) =
            setup(seller_api().with_submission(Ok(result_with("provisional", 3.0)))).await;
        api.set_status(Ok(completed(result_with("server", 4.0))));

        let outcome = coordinator.submit(&answers()).await.unwrap();

        let SubmitOutcome::Accepted { result, reconciliation } = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(result.recommendation, "server");
        assert!(matches!(reconciliation, Reconciliation::Confirmed(_)));

        let held = session.snapshot().diagnostic.unwrap();
        assert_eq!(held.origin, ResultOrigin::Authoritative);
        assert_eq!(held.result.recommendation, "server");
        assert_eq!(api.submitted.lock().unwrap()[0], answers());
    }

    #[tokio::test]
    async fn reconciliation_failure_keeps_optimistic_result() {
        let (_api, session, coordinator) = setup(
            seller_api()
                .with_submission(Ok(result_with("provisional", 3.0)))
                .with_status(Err(server_error())),
        )
        .await;

        let outcome = coordinator.submit(&answers()).await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Accepted {
                reconciliation: Reconciliation::Failed(_),
                ..
            }
        ));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.diagnostic_status, DiagnosticStatus::Completed);
        let held = snapshot.diagnostic.unwrap();
        assert_eq!(held.origin, ResultOrigin::Provisional);
        assert_eq!(held.result, result_with("provisional", 3.0));
    }

    #[tokio::test]
    async fn incomplete_status_is_pending() {
        let (api, session, coordinator) =
            setup(seller_api().with_submission(Ok(result_with("provisional", 3.0)))).await;
        api.set_status(Ok(DiagnosticStatusResponse {
            status: "processing".into(),
            diagnostic: None,
        }));

        let outcome = coordinator.submit(&answers()).await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Accepted {
                reconciliation: Reconciliation::Pending,
                ..
            }
        ));
        assert_eq!(
            session.snapshot().diagnostic.unwrap().origin,
            ResultOrigin::Provisional
        );
    }

    #[tokio::test]
    async fn failed_submission_is_retryable_and_releases_gate() {
        let (api, session, coordinator) = setup(seller_api()).await;

        let err = coordinator.submit(&answers()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!coordinator.is_submitting());
        assert!(session.snapshot().diagnostic.is_none());

        api.set_submission(Ok(result_with("second try", 2.0)));
        let outcome = coordinator.submit(&answers()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
        assert_eq!(api.submissions(), 2);
    }

    #[tokio::test]
    async fn expired_session_during_submit_logs_out() {
        let (_api, session, coordinator) =
            setup(seller_api().with_submission(Err(ApiError::AuthExpired))).await;

        let err = coordinator.submit(&answers()).await.unwrap_err();

        assert_eq!(err, SubmissionError::AuthExpired);
        assert!(!err.is_retryable());
        assert!(!session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn teardown_cancels_reconciliation() {
        let api = Arc::new(seller_api());
        let tokens = Arc::new(MemoryTokenStore::with_token("tok"));
        let session = Arc::new(SessionController::new(api.clone(), tokens));
        session.check_auth().await;
        let lifetime = FlowLifetime::new();
        let coordinator = DiagnosticSubmissionCoordinator::new(api.clone(), session.clone(), lifetime.clone());

        let epoch = session.epoch();
        assert!(session.record_diagnostic(epoch, result_with("provisional", 3.0), ResultOrigin::Provisional));
        api.set_status(Ok(completed(result_with("server", 4.0))));
        lifetime.end();

        assert_eq!(coordinator.reconcile(epoch).await, Reconciliation::Cancelled);
        assert_eq!(
            session.snapshot().diagnostic.unwrap().result.recommendation,
            "provisional"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_releases_gate() {
        let (_api, _session, coordinator) = setup(
            seller_api()
                .with_submission(Ok(result_with("slow", 3.0)))
                .with_submit_latency(Duration::from_secs(10)),
        )
        .await;

        let timed_out = tokio::time::timeout(Duration::from_millis(100), coordinator.submit(&answers())).await;

        assert!(timed_out.is_err());
        assert!(!coordinator.is_submitting());
    }
}
