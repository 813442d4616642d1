//! The diagnostic questionnaire: a step flow over the question bank whose
//! final step hands the answers to the submission coordinator.

use std::sync::Arc;

use tracing::info;

use crate::api::CoachApi;
use crate::error::{FlowError, SubmissionError};
use crate::flow::{Ignored, Navigation, StepFlowEngine, TransitionTimer};
use crate::session::SessionController;

use super::bank::diagnostic_questions;
use super::coordinator::{DiagnosticSubmissionCoordinator, Reconciliation, SubmitOutcome};
use super::model::{DiagnosticResult, ResultOrigin};
use super::preview::preview_result;

/// What an `advance` on the questionnaire did.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticAdvance {
    /// Regular step navigation (moved or ignored).
    Navigated(Navigation),
    /// The answers were accepted by the backend.
    Submitted {
        result: DiagnosticResult,
        reconciliation: Reconciliation,
    },
    /// The answers were not accepted. They are kept and the flow stays on the
    /// last step.
    SubmissionFailed(SubmissionError),
}

pub struct DiagnosticFlow {
    engine: StepFlowEngine,
    coordinator: DiagnosticSubmissionCoordinator,
    session: Arc<SessionController>,
}

impl DiagnosticFlow {
    pub fn new(
        api: Arc<dyn CoachApi>,
        session: Arc<SessionController>,
        timer: TransitionTimer,
    ) -> Result<Self, FlowError> {
        let engine = StepFlowEngine::new(diagnostic_questions(), timer)?;
        let coordinator =
            DiagnosticSubmissionCoordinator::new(api, session.clone(), engine.lifetime().clone());
        info!(flow_id = %engine.id(), questions = engine.total(), "Diagnostic started");
        Ok(Self {
            engine,
            coordinator,
            session,
        })
    }

    pub fn engine(&self) -> &StepFlowEngine {
        &self.engine
    }

    pub fn record_answer(&self, step_id: &str, value: impl Into<String>) -> Result<(), Ignored> {
        self.engine.record_answer(step_id, value)
    }

    /// Advance one question, or submit on the last one.
    pub async fn advance(&self) -> DiagnosticAdvance {
        let responses = match self.engine.advance().await {
            Navigation::Finished(responses) => responses,
            other => return DiagnosticAdvance::Navigated(other),
        };

        match self.coordinator.submit(&responses).await {
            Ok(SubmitOutcome::Accepted {
                result,
                reconciliation,
            }) => {
                self.engine.finish_submission(true);
                DiagnosticAdvance::Submitted {
                    result,
                    reconciliation,
                }
            }
            Ok(SubmitOutcome::AlreadySubmitting) => {
                self.engine.finish_submission(false);
                DiagnosticAdvance::Navigated(Navigation::Ignored(Ignored::Busy))
            }
            Err(e) => {
                self.engine.finish_submission(false);
                if e == SubmissionError::AuthExpired {
                    self.engine.close();
                }
                DiagnosticAdvance::SubmissionFailed(e)
            }
        }
    }

    pub async fn retreat(&self) -> Navigation {
        self.engine.retreat().await
    }

    /// Score the current answers locally and offer the result to the
    /// session as a preview. Server results are never replaced by it.
    pub fn preview(&self) -> DiagnosticResult {
        let result = preview_result(self.engine.steps(), &self.engine.responses());
        self.session
            .record_diagnostic(self.session.epoch(), result.clone(), ResultOrigin::Preview);
        result
    }

    /// Leave the questionnaire. Pending transitions and reconciliation stop.
    pub fn exit(&self) {
        self.engine.close();
    }
}
