//! Coach client — session, diagnostic and onboarding core of the retail
//! coaching platform.

pub mod api;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod flow;
pub mod onboarding;
pub mod redirect;
pub mod session;
