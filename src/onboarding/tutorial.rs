//! The onboarding tutorial: a step flow over generated panels with a
//! progress control limited to visited steps.

use tracing::info;

use crate::api::model::Role;
use crate::error::FlowError;
use crate::flow::{Navigation, Reachability, Step, StepFlowEngine, TransitionTimer};

use super::content::build_steps;
use super::mode::KpiMode;

pub struct OnboardingTutorial {
    engine: StepFlowEngine,
    role: Role,
    mode: KpiMode,
}

impl OnboardingTutorial {
    pub fn new(role: Role, mode: KpiMode, timer: TransitionTimer) -> Result<Self, FlowError> {
        let engine = StepFlowEngine::new(build_steps(role, mode), timer)?
            .with_reachability(Reachability::Visited);
        info!(flow_id = %engine.id(), %role, %mode, steps = engine.total(), "Onboarding started");
        Ok(Self { engine, role, mode })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn mode(&self) -> KpiMode {
        self.mode
    }

    pub fn engine(&self) -> &StepFlowEngine {
        &self.engine
    }

    pub fn current_step(&self) -> &Step {
        self.engine.current_step()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.engine.progress_fraction()
    }

    /// Next panel, or complete the tutorial from the last one.
    pub async fn advance(&self) -> Navigation {
        let navigation = self.engine.advance().await;
        if matches!(navigation, Navigation::Finished(_)) {
            self.engine.finish_submission(true);
            info!(flow_id = %self.engine.id(), "Onboarding completed");
        }
        navigation
    }

    pub async fn back(&self) -> Navigation {
        self.engine.retreat().await
    }

    /// Progress-dot navigation. Only already visited panels are reachable.
    pub fn go_to(&self, index: usize) -> Navigation {
        self.engine.go_to(index)
    }

    /// Leave the tutorial without completing it.
    pub fn skip(&self) {
        info!(flow_id = %self.engine.id(), index = self.engine.current_index(), "Onboarding skipped");
        self.engine.close();
    }

    pub fn is_complete(&self) -> bool {
        self.engine.state().is_finished
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::flow::Ignored;

    fn tutorial(role: Role) -> OnboardingTutorial {
        OnboardingTutorial::new(role, KpiMode::default(), TransitionTimer::new(Duration::from_millis(300)))
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn go_to_unvisited_step_is_rejected() {
        let tour = tutorial(Role::Manager);

        assert_eq!(tour.go_to(5), Navigation::Ignored(Ignored::Unreachable));
        assert_eq!(tour.engine().current_index(), 0);

        tour.advance().await;
        tour.advance().await;
        tour.back().await;
        assert_eq!(tour.engine().current_index(), 1);

        assert_eq!(tour.go_to(2), Navigation::Moved { from: 1, to: 2 });
        assert_eq!(tour.go_to(0), Navigation::Moved { from: 2, to: 0 });
        assert_eq!(tour.go_to(5), Navigation::Ignored(Ignored::Unreachable));
    }

    #[tokio::test(start_paused = true)]
    async fn walking_every_panel_completes() {
        let tour = tutorial(Role::ItAdmin);
        let total = tour.engine().total();

        for i in 1..total {
            assert_eq!(tour.advance().await, Navigation::Moved { from: i - 1, to: i });
        }
        assert_eq!(tour.progress_fraction(), 1.0);
        assert!(matches!(tour.advance().await, Navigation::Finished(ref r) if r.is_empty()));

        assert!(tour.is_complete());
        assert!(tour.advance().await.is_ignored());
    }

    #[tokio::test(start_paused = true)]
    async fn skip_closes_the_tour() {
        let tour = tutorial(Role::Seller);
        tour.skip();

        assert_eq!(tour.advance().await, Navigation::Ignored(Ignored::Closed));
        assert!(!tour.is_complete());
    }
}
