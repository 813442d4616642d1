//! Generic multi-step flow engine.
//!
//! Both the diagnostic questionnaire and the onboarding tutorial are runs of a
//! `StepFlowEngine` over a fixed sequence of `Step`s. The engine owns
//! navigation, per-step validation, progress and transition timing. Finishing
//! the last step is delegated back to the owner of the flow.

pub mod engine;
pub mod responses;
pub mod state;
pub mod step;
pub mod timing;

pub use engine::StepFlowEngine;
pub use responses::ResponseMap;
pub use state::{FlowState, Ignored, Navigation, Reachability};
pub use step::{Step, StepKind};
pub use timing::{FlowLifetime, TransitionTimer};
