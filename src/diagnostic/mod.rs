//! Seller diagnostic: question bank, local preview, submission and
//! reconciliation.

pub mod bank;
pub mod coordinator;
pub mod flow;
pub mod model;
pub mod preview;

pub use bank::{QUESTION_COUNT, diagnostic_questions};
pub use coordinator::{DiagnosticSubmissionCoordinator, Reconciliation, SubmitOutcome};
pub use flow::{DiagnosticAdvance, DiagnosticFlow};
pub use model::{Competency, DiagnosticResult, DiagnosticStatus, HeldDiagnostic, ResultOrigin};
pub use preview::preview_result;
