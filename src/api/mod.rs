//! Coaching REST API port.
//!
//! The core talks to the backend only through `CoachApi`. `HttpCoachApi` is the
//! reqwest adapter; tests substitute a scripted fake.

#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod model;

pub use http::HttpCoachApi;
pub use model::{
    AuthResponse, Credentials, DiagnosticStatusResponse, Registration, Role, User,
};

use async_trait::async_trait;

use crate::diagnostic::model::DiagnosticResult;
use crate::error::ApiError;
use crate::flow::ResponseMap;

/// REST operations consumed by the client core.
///
/// Authenticated operations attach the currently stored token; login and
/// registration do not.
#[async_trait]
pub trait CoachApi: Send + Sync {
    /// `POST /api/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// `POST /api/auth/register` or `/api/auth/register-with-invite`
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;

    /// `GET /api/auth/me`
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `GET /api/diagnostic/me`
    async fn diagnostic_status(&self) -> Result<DiagnosticStatusResponse, ApiError>;

    /// `POST /api/diagnostic`. Not idempotent server-side.
    async fn submit_diagnostic(&self, responses: &ResponseMap) -> Result<DiagnosticResult, ApiError>;
}
