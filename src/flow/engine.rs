//! StepFlowEngine — navigation, validation and progress over a fixed step
//! sequence.
//!
//! All methods take `&self` so that several UI events can race on one
//! instance. The `is_transitioning` / `is_submitting` gates are what serialize
//! them: while either is closed every navigation and answer is ignored. State
//! lives behind a std mutex that is never held across an await.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::FlowError;

use super::responses::ResponseMap;
use super::state::{FlowState, Ignored, Navigation, Reachability};
use super::step::{Step, StepKind};
use super::timing::{FlowLifetime, TransitionTimer};

struct Inner {
    state: FlowState,
    responses: ResponseMap,
    /// Bumped on reset so that a pending transition cannot land on new state.
    revision: u64,
}

/// Generic controller for one run over an ordered step sequence.
pub struct StepFlowEngine {
    id: Uuid,
    steps: Vec<Step>,
    reachability: Reachability,
    timer: TransitionTimer,
    lifetime: FlowLifetime,
    inner: Mutex<Inner>,
}

impl StepFlowEngine {
    /// Create an engine over `steps`. Fails on an empty list or duplicate ids.
    pub fn new(steps: Vec<Step>, timer: TransitionTimer) -> Result<Self, FlowError> {
        validate_steps(&steps)?;
        Ok(Self {
            id: Uuid::new_v4(),
            steps,
            reachability: Reachability::default(),
            timer,
            lifetime: FlowLifetime::new(),
            inner: Mutex::new(Inner {
                state: FlowState::default(),
                responses: ResponseMap::new(),
                revision: 0,
            }),
        })
    }

    pub fn with_reachability(mut self, reachability: Reachability) -> Self {
        self.reachability = reachability;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn lifetime(&self) -> &FlowLifetime {
        &self.lifetime
    }

    /// Snapshot of the flow state.
    pub fn state(&self) -> FlowState {
        self.lock().state.clone()
    }

    /// Snapshot of the collected answers.
    pub fn responses(&self) -> ResponseMap {
        self.lock().responses.clone()
    }

    pub fn current_index(&self) -> usize {
        self.lock().state.current_index
    }

    pub fn current_step(&self) -> &Step {
        let index = self.current_index();
        &self.steps[index]
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index() + 1 == self.steps.len()
    }

    /// `(current_index + 1) / total`, always in `(0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        (self.current_index() + 1) as f64 / self.steps.len() as f64
    }

    /// Whether the current step is satisfied.
    pub fn can_advance(&self) -> bool {
        let inner = self.lock();
        self.step_satisfied(&inner, inner.state.current_index)
    }

    /// Record an answer for `step_id`, replacing any previous one.
    pub fn record_answer(&self, step_id: &str, value: impl Into<String>) -> Result<(), Ignored> {
        let mut inner = self.lock();
        if let Err(reason) = self.check_gates(&inner.state) {
            return Err(self.reject("record_answer", reason));
        }

        let Some(step) = self.steps.iter().find(|s| s.id == step_id) else {
            return Err(self.reject("record_answer", Ignored::UnknownStep));
        };
        if !step.kind.requires_answer() {
            return Err(self.reject("record_answer", Ignored::NotAnswerable));
        }

        let value = value.into();
        if step.kind == StepKind::Choice && step.option_rank(&value).is_none() {
            return Err(self.reject("record_answer", Ignored::InvalidChoice));
        }

        inner.responses.upsert(step_id, value);
        Ok(())
    }

    /// Move to the next step after the debounce, or finish on the last step.
    ///
    /// On the last step this closes the submission gate and returns
    /// `Navigation::Finished` with the answers. The caller must then call
    /// `finish_submission`.
    pub async fn advance(&self) -> Navigation {
        let (from, revision) = {
            let mut inner = self.lock();
            if let Err(reason) = self.check_gates(&inner.state) {
                return self.ignore("advance", reason);
            }

            let from = inner.state.current_index;
            if !self.step_satisfied(&inner, from) {
                return self.ignore("advance", Ignored::AnswerMissing);
            }

            if from + 1 == self.steps.len() {
                inner.state.is_submitting = true;
                inner.state.completed_indices.insert(from);
                info!(flow_id = %self.id, steps = self.steps.len(), "Flow reached its final step");
                return Navigation::Finished(inner.responses.clone());
            }

            inner.state.is_transitioning = true;
            (from, inner.revision)
        };

        self.transition(from, from + 1, revision, true).await
    }

    /// Move back one step after the debounce.
    pub async fn retreat(&self) -> Navigation {
        let (from, revision) = {
            let mut inner = self.lock();
            if let Err(reason) = self.check_gates(&inner.state) {
                return self.ignore("retreat", reason);
            }

            let from = inner.state.current_index;
            if from == 0 {
                return self.ignore("retreat", Ignored::AtStart);
            }

            inner.state.is_transitioning = true;
            (from, inner.revision)
        };

        self.transition(from, from - 1, revision, false).await
    }

    /// Jump straight to `index` (progress control).
    ///
    /// The target must be reachable, and a forward jump must not skip a step
    /// that still needs an answer.
    pub fn go_to(&self, index: usize) -> Navigation {
        let mut inner = self.lock();
        if let Err(reason) = self.check_gates(&inner.state) {
            return self.ignore("go_to", reason);
        }
        if index >= self.steps.len() {
            return self.ignore("go_to", Ignored::OutOfRange);
        }

        let from = inner.state.current_index;
        if index == from {
            return self.ignore("go_to", Ignored::Unchanged);
        }
        if !inner.state.can_reach(index, self.reachability) {
            return self.ignore("go_to", Ignored::Unreachable);
        }
        if index > from && !(from..index).all(|i| self.step_satisfied(&inner, i)) {
            return self.ignore("go_to", Ignored::AnswerMissing);
        }

        inner.state.current_index = index;
        inner.state.visited.insert(index);
        debug!(flow_id = %self.id, from, to = index, "Jumped to step");
        Navigation::Moved { from, to: index }
    }

    /// Unlock `index` for `go_to`. Out-of-range indices are ignored.
    pub fn mark_reachable(&self, index: usize) {
        if index < self.steps.len() {
            self.lock().state.reachable.insert(index);
        }
    }

    /// Release the submission gate taken by a final `advance`.
    ///
    /// Success finishes the flow. Failure keeps the answers and the last step
    /// so the user can try again.
    pub fn finish_submission(&self, succeeded: bool) {
        let mut inner = self.lock();
        if !inner.state.is_submitting {
            return;
        }
        inner.state.is_submitting = false;
        if succeeded {
            inner.state.is_finished = true;
            info!(flow_id = %self.id, answers = inner.responses.len(), "Flow finished");
        } else {
            debug!(flow_id = %self.id, "Submission gate released after failure");
        }
    }

    /// Clear all answers and return to the first step.
    ///
    /// Refused while a submission is in flight.
    pub fn reset(&self) -> Result<(), Ignored> {
        let mut inner = self.lock();
        if self.lifetime.is_ended() {
            return Err(self.reject("reset", Ignored::Closed));
        }
        if inner.state.is_submitting {
            return Err(self.reject("reset", Ignored::Busy));
        }
        inner.revision += 1;
        inner.state = FlowState::default();
        inner.responses.clear();
        debug!(flow_id = %self.id, "Flow reset");
        Ok(())
    }

    /// Tear the flow down. Pending transitions and reconciliations are dropped.
    pub fn close(&self) {
        if !self.lifetime.is_ended() {
            debug!(flow_id = %self.id, "Flow closed");
        }
        self.lifetime.end();
    }

    async fn transition(&self, from: usize, to: usize, revision: u64, forward: bool) -> Navigation {
        let pending = PendingTransition {
            engine: self,
            revision,
        };
        let held = self.timer.hold(&self.lifetime).await;
        pending.land();

        let mut inner = self.lock();
        if inner.revision != revision {
            return self.ignore("transition", Ignored::Superseded);
        }
        inner.state.is_transitioning = false;
        if !held {
            return self.ignore("transition", Ignored::Closed);
        }

        inner.state.current_index = to;
        inner.state.visited.insert(to);
        if forward {
            inner.state.completed_indices.insert(from);
        }
        debug!(flow_id = %self.id, from, to, "Moved to step");
        Navigation::Moved { from, to }
    }

    fn step_satisfied(&self, inner: &Inner, index: usize) -> bool {
        let step = &self.steps[index];
        !step.kind.requires_answer() || inner.responses.has_answer(&step.id)
    }

    fn check_gates(&self, state: &FlowState) -> Result<(), Ignored> {
        if self.lifetime.is_ended() || state.is_finished {
            Err(Ignored::Closed)
        } else if state.is_busy() {
            Err(Ignored::Busy)
        } else {
            Ok(())
        }
    }

    fn ignore(&self, op: &'static str, reason: Ignored) -> Navigation {
        Navigation::Ignored(self.reject(op, reason))
    }

    fn reject(&self, op: &'static str, reason: Ignored) -> Ignored {
        debug!(flow_id = %self.id, op, %reason, "Ignored flow input");
        reason
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Reopens the transition gate if the navigation future is dropped mid-debounce.
struct PendingTransition<'a> {
    engine: &'a StepFlowEngine,
    revision: u64,
}

impl PendingTransition<'_> {
    /// The debounce ran to completion; the caller settles the gate itself.
    fn land(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingTransition<'_> {
    fn drop(&mut self) {
        let mut inner = self.engine.lock();
        if inner.revision == self.revision && inner.state.is_transitioning {
            inner.state.is_transitioning = false;
            debug!(flow_id = %self.engine.id, "Abandoned transition released");
        }
    }
}

impl Drop for StepFlowEngine {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}

fn validate_steps(steps: &[Step]) -> Result<(), FlowError> {
    if steps.is_empty() {
        return Err(FlowError::Empty);
    }
    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(step.id.as_str()) {
            return Err(FlowError::DuplicateStepId {
                id: step.id.clone(),
            });
        }
    }
    Ok(())
}
