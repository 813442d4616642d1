//! Scripted `CoachApi` for unit tests.
//!
//! Each endpoint replays a configured result, counts its calls, and can be
//! held behind a `Notify` gate so a test can observe state while the call is
//! still pending.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::diagnostic::model::DiagnosticResult;
use crate::error::ApiError;
use crate::flow::ResponseMap;

use super::CoachApi;
use super::model::{AuthResponse, Credentials, DiagnosticStatusResponse, Registration, Role, User};

pub(crate) fn user(role: Role) -> User {
    User {
        id: format!("{role}-1"),
        email: format!("{role}@store.example"),
        name: Some(format!("Test {role}")),
        role,
        store_id: Some("store-1".into()),
    }
}

pub(crate) fn result_with(recommendation: &str, welcome: f64) -> DiagnosticResult {
    DiagnosticResult {
        id: Some(format!("diag-{recommendation}")),
        scores: [("welcome".to_string(), welcome)].into_iter().collect(),
        profile: Some("Communicator".into()),
        recommendation: recommendation.to_string(),
        created_at: None,
    }
}

pub(crate) fn completed(result: DiagnosticResult) -> DiagnosticStatusResponse {
    DiagnosticStatusResponse {
        status: "completed".into(),
        diagnostic: Some(result),
    }
}

#[derive(Default)]
pub(crate) struct Calls {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub current_user: AtomicUsize,
    pub diagnostic_status: AtomicUsize,
    pub submit: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedApi {
    pub calls: Calls,
    pub submitted: Mutex<Vec<ResponseMap>>,
    identity: Mutex<Result<User, ApiError>>,
    status: Mutex<Result<DiagnosticStatusResponse, ApiError>>,
    submission: Mutex<Result<DiagnosticResult, ApiError>>,
    auth: Mutex<Result<AuthResponse, ApiError>>,
    identity_gate: Option<Arc<Notify>>,
    status_gate: Option<Arc<Notify>>,
    submit_latency: Duration,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            calls: Calls::default(),
            submitted: Mutex::new(Vec::new()),
            identity: Mutex::new(Err(ApiError::AuthExpired)),
            status: Mutex::new(Err(ApiError::NotFound {
                path: "/api/diagnostic/me".into(),
            })),
            submission: Mutex::new(Err(ApiError::Transport {
                path: "/api/diagnostic".into(),
                reason: "unscripted".into(),
            })),
            auth: Mutex::new(Err(ApiError::Status {
                path: "/api/auth/login".into(),
                status: 401,
                message: "Invalid credentials".into(),
            })),
            identity_gate: None,
            status_gate: None,
            submit_latency: Duration::ZERO,
        }
    }

    pub fn with_identity(self, identity: Result<User, ApiError>) -> Self {
        *self.identity.lock().unwrap() = identity;
        self
    }

    pub fn with_status(self, status: Result<DiagnosticStatusResponse, ApiError>) -> Self {
        self.set_status(status);
        self
    }

    pub fn with_submission(self, submission: Result<DiagnosticResult, ApiError>) -> Self {
        self.set_submission(submission);
        self
    }

    pub fn with_auth(self, auth: Result<AuthResponse, ApiError>) -> Self {
        *self.auth.lock().unwrap() = auth;
        self
    }

    pub fn with_identity_gate(mut self, gate: Arc<Notify>) -> Self {
        self.identity_gate = Some(gate);
        self
    }

    pub fn with_status_gate(mut self, gate: Arc<Notify>) -> Self {
        self.status_gate = Some(gate);
        self
    }

    pub fn with_submit_latency(mut self, latency: Duration) -> Self {
        self.submit_latency = latency;
        self
    }

    pub fn set_status(&self, status: Result<DiagnosticStatusResponse, ApiError>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_submission(&self, submission: Result<DiagnosticResult, ApiError>) {
        *self.submission.lock().unwrap() = submission;
    }

    pub fn submissions(&self) -> usize {
        Calls::get(&self.calls.submit)
    }

    pub fn status_fetches(&self) -> usize {
        Calls::get(&self.calls.diagnostic_status)
    }
}

#[async_trait]
impl CoachApi for ScriptedApi {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.auth.lock().unwrap().clone()
    }

    async fn register(&self, _registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.calls.register.fetch_add(1, Ordering::SeqCst);
        self.auth.lock().unwrap().clone()
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.calls.current_user.fetch_add(1, Ordering::SeqCst);
        if let Some(ref gate) = self.identity_gate {
            gate.notified().await;
        }
        self.identity.lock().unwrap().clone()
    }

    async fn diagnostic_status(&self) -> Result<DiagnosticStatusResponse, ApiError> {
        self.calls.diagnostic_status.fetch_add(1, Ordering::SeqCst);
        if let Some(ref gate) = self.status_gate {
            gate.notified().await;
        }
        self.status.lock().unwrap().clone()
    }

    async fn submit_diagnostic(&self, responses: &ResponseMap) -> Result<DiagnosticResult, ApiError> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(responses.clone());
        if !self.submit_latency.is_zero() {
            tokio::time::sleep(self.submit_latency).await;
        }
        self.submission.lock().unwrap().clone()
    }
}
