//! Wire types for the coaching REST API.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::diagnostic::model::DiagnosticResult;
use crate::flow::ResponseMap;

/// Platform role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Seller,
    Manager,
    SuperAdmin,
    ItAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seller => write!(f, "seller"),
            Self::Manager => write!(f, "manager"),
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::ItAdmin => write!(f, "it_admin"),
        }
    }
}

/// User record returned by `/api/auth/me` and the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Body of `GET /api/diagnostic/me`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticStatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub diagnostic: Option<DiagnosticResult>,
}

/// Body of `POST /api/diagnostic`.
#[derive(Debug, Serialize)]
pub struct SubmitDiagnosticRequest<'a> {
    pub responses: &'a ResponseMap,
}

/// Email/password pair. The password is only exposed while the request body
/// is being built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Profile fields for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub workspace_name: Option<String>,
    /// When set, registration goes through the invitation endpoint.
    pub invitation_token: Option<String>,
}
