//! Session state and the events handed to the view layer.

use serde::{Deserialize, Serialize};

use crate::api::model::{Role, User};
use crate::diagnostic::model::{DiagnosticStatus, HeldDiagnostic};

/// Position in the session state machine.
///
/// Resolving → (Unauthenticated | AuthenticatedSellerPendingDiagnostic |
/// AuthenticatedReady), AuthenticatedSellerPendingDiagnostic →
/// AuthenticatedReady. Error is entered only by a failed sign-in or
/// registration and is left by the next attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    Resolving,
    AuthenticatedSellerPendingDiagnostic,
    AuthenticatedReady,
    Error { message: String },
}

impl SessionPhase {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            Self::AuthenticatedSellerPendingDiagnostic | Self::AuthenticatedReady
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Resolving => write!(f, "resolving"),
            Self::AuthenticatedSellerPendingDiagnostic => {
                write!(f, "authenticated_seller_pending_diagnostic")
            }
            Self::AuthenticatedReady => write!(f, "authenticated_ready"),
            Self::Error { .. } => write!(f, "error"),
        }
    }
}

/// Everything the view layer renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub diagnostic_status: DiagnosticStatus,
    pub diagnostic: Option<HeldDiagnostic>,
    /// True until identity and, for sellers, diagnostic status have settled.
    pub loading: bool,
}

impl Default for Session {
    /// The application-start session: nothing resolved yet.
    fn default() -> Self {
        Self {
            phase: SessionPhase::Resolving,
            user: None,
            diagnostic_status: DiagnosticStatus::Unknown,
            diagnostic: None,
            loading: true,
        }
    }
}

impl Session {
    /// A fully resolved, signed-out session.
    pub fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            loading: false,
            ..Self::default()
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.phase.is_authenticated()
    }

    /// A resolved seller who has not taken the diagnostic yet.
    pub fn requires_diagnostic(&self) -> bool {
        !self.loading
            && self.role() == Some(Role::Seller)
            && self.diagnostic_status == DiagnosticStatus::None
    }
}

/// Why the login view is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    UserRequested,
    SessionExpired,
}

/// Navigation the composing layer must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Full reload into the dashboard so every view starts from clean state.
    ReloadDashboard,
    ShowLogin { reason: LogoutReason },
}
