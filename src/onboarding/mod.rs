//! Onboarding tutorial: role- and mode-dependent panels run through the step
//! flow engine.
//!
//! Content is derived synchronously from `(role, mode)` so the tour renders
//! without a loading state.

pub mod content;
pub mod mode;
pub mod tutorial;

pub use content::{KPI_STEP_ID, build_steps, build_steps_for_code};
pub use mode::KpiMode;
pub use tutorial::OnboardingTutorial;
