//! SessionController — authentication check, dependent diagnostic lookup,
//! login and logout.
//!
//! Every identity change (auth check, login, logout, forced expiry, failed
//! sign-in) bumps a session epoch. Every async resolution captures the epoch it started under
//! and only applies its result if the epoch is unchanged, so a logout that
//! lands while a fetch is in flight always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::api::CoachApi;
use crate::api::model::{Credentials, Registration, Role, User};
use crate::diagnostic::model::{DiagnosticResult, DiagnosticStatus, HeldDiagnostic, ResultOrigin};
use crate::error::{ApiError, Error, TokenError};

use super::model::{LogoutReason, Session, SessionEvent, SessionPhase};
use super::token::TokenStore;

/// Owns all session state and is the only writer of the session token.
pub struct SessionController {
    api: Arc<dyn CoachApi>,
    tokens: Arc<dyn TokenStore>,
    session: Mutex<Session>,
    epoch: AtomicU64,
}

impl SessionController {
    pub fn new(api: Arc<dyn CoachApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            session: Mutex::new(Session::default()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Copy of the current session for rendering.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase.clone()
    }

    /// Identity epoch; changes whenever the signed-in identity may have changed.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Resolve the stored token into a session.
    ///
    /// `loading` stays true until identity and, for sellers, the diagnostic
    /// status have both settled. A later check or identity change supersedes
    /// this one.
    pub async fn check_auth(&self) -> SessionPhase {
        let epoch = self.replace_session(Session::default());

        if self.tokens.load().is_none() {
            self.apply(epoch, |s| *s = Session::anonymous());
            debug!("No stored token; session is anonymous");
            return self.phase();
        }

        match self.api.current_user().await {
            Ok(user) => self.resolve_user(epoch, user).await,
            Err(e) => {
                warn!(error = %e, "Identity check failed; discarding stored token");
                self.apply(epoch, |s| {
                    self.discard_token();
                    *s = Session::anonymous();
                });
            }
        }

        self.phase()
    }

    /// Adopt an identity obtained elsewhere (login or registration response).
    ///
    /// Persists the token, runs the seller diagnostic lookup, then asks for a
    /// full reload into the dashboard. A token that cannot be persisted leaves
    /// the session in the error phase.
    pub async fn login(&self, user: User, token: &str) -> Result<SessionEvent, TokenError> {
        if let Err(e) = self.tokens.save(token) {
            warn!(user_id = %user.id, error = %e, "Failed to persist session token");
            self.enter_error("Could not save your session. Please try again.".into());
            return Err(e);
        }
        let epoch = self.replace_session(Session::default());
        info!(user_id = %user.id, role = %user.role, "Signed in");

        self.resolve_user(epoch, user).await;

        if self.lock().user.is_some() {
            Ok(SessionEvent::ReloadDashboard)
        } else {
            Ok(SessionEvent::ShowLogin {
                reason: LogoutReason::SessionExpired,
            })
        }
    }

    /// `POST /api/auth/login`, then `login`.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SessionEvent, Error> {
        match self.api.login(credentials).await {
            Ok(auth) => Ok(self.login(auth.user, &auth.token).await?),
            Err(e) => {
                warn!(email = %credentials.email, error = %e, "Sign-in failed");
                self.enter_error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Create an account, then `login` with it.
    pub async fn register(&self, registration: &Registration) -> Result<SessionEvent, Error> {
        match self.api.register(registration).await {
            Ok(auth) => Ok(self.login(auth.user, &auth.token).await?),
            Err(e) => {
                warn!(email = %registration.email, error = %e, "Registration failed");
                self.enter_error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Clear token, user and diagnostic state. Never touches the network.
    pub fn logout(&self) -> SessionEvent {
        self.end_session(LogoutReason::UserRequested)
    }

    /// Route an error from any authenticated call.
    ///
    /// An expired or missing token forces a logout and returns the login
    /// event; every other error is left to the caller.
    pub fn handle_api_error(&self, error: &ApiError) -> Option<SessionEvent> {
        error
            .is_auth_expired()
            .then(|| self.end_session(LogoutReason::SessionExpired))
    }

    /// Store a diagnostic result obtained under `epoch`.
    ///
    /// Dropped if the identity changed since, or if a preview would replace a
    /// server result. Returns whether the session was updated.
    pub fn record_diagnostic(&self, epoch: u64, result: DiagnosticResult, origin: ResultOrigin) -> bool {
        let mut session = self.lock();
        if self.epoch() != epoch || session.user.is_none() {
            debug!(%origin, "Discarding diagnostic for a stale session");
            return false;
        }
        if origin == ResultOrigin::Preview
            && session
                .diagnostic
                .as_ref()
                .is_some_and(|held| held.origin != ResultOrigin::Preview)
        {
            return false;
        }

        if origin != ResultOrigin::Preview {
            session.diagnostic_status = DiagnosticStatus::Completed;
        }
        session.diagnostic = Some(HeldDiagnostic { result, origin });
        debug!(%origin, "Diagnostic recorded");
        true
    }

    async fn resolve_user(&self, epoch: u64, user: User) {
        let role = user.role;
        if role != Role::Seller {
            self.apply(epoch, |s| {
                s.user = Some(user);
                s.diagnostic_status = DiagnosticStatus::Unknown;
                s.diagnostic = None;
                s.phase = SessionPhase::AuthenticatedReady;
                s.loading = false;
            });
            info!(%role, "Session resolved");
            return;
        }

        let pending = self.apply(epoch, |s| {
            s.user = Some(user);
            s.phase = SessionPhase::AuthenticatedSellerPendingDiagnostic;
            s.loading = true;
        });
        if !pending {
            return;
        }

        let (status, held) = match self.api.diagnostic_status().await {
            Ok(response) => {
                let status = DiagnosticStatus::from_wire(&response.status);
                let held = match (status, response.diagnostic) {
                    (DiagnosticStatus::Completed, Some(result)) => Some(HeldDiagnostic {
                        result,
                        origin: ResultOrigin::Authoritative,
                    }),
                    _ => None,
                };
                (status, held)
            }
            Err(e) if e.is_auth_expired() => {
                if self.epoch() == epoch {
                    self.end_session(LogoutReason::SessionExpired);
                }
                return;
            }
            Err(e) => {
                warn!(error = %e, "Diagnostic status unavailable; continuing without one");
                (DiagnosticStatus::None, None)
            }
        };

        self.apply(epoch, |s| {
            s.diagnostic_status = status;
            s.diagnostic = held;
            s.phase = SessionPhase::AuthenticatedReady;
            s.loading = false;
        });
        info!(%role, diagnostic = ?status, "Session resolved");
    }

    fn end_session(&self, reason: LogoutReason) -> SessionEvent {
        {
            let mut session = self.lock();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            self.discard_token();
            *session = Session::anonymous();
        }
        info!(?reason, "Signed out");
        SessionEvent::ShowLogin { reason }
    }

    fn enter_error(&self, message: String) {
        self.replace_session(Session {
            phase: SessionPhase::Error { message },
            ..Session::anonymous()
        });
    }

    /// Swap in a new session under a fresh epoch.
    fn replace_session(&self, next: Session) -> u64 {
        let mut session = self.lock();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *session = next;
        epoch
    }

    /// Apply `update` only if no identity change happened since `epoch`.
    fn apply(&self, epoch: u64, update: impl FnOnce(&mut Session)) -> bool {
        let mut session = self.lock();
        if self.epoch() != epoch {
            debug!(epoch, current = self.epoch(), "Discarding stale session update");
            return false;
        }
        update(&mut session);
        true
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}
