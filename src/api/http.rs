//! HTTP adapter for the coaching API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::diagnostic::model::DiagnosticResult;
use crate::error::ApiError;
use crate::flow::ResponseMap;
use crate::session::token::TokenSource;

use super::CoachApi;
use super::model::{
    AuthResponse, Credentials, DiagnosticStatusResponse, Registration, SubmitDiagnosticRequest,
    User,
};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const REGISTER_INVITE_PATH: &str = "/api/auth/register-with-invite";
const ME_PATH: &str = "/api/auth/me";
const DIAGNOSTIC_ME_PATH: &str = "/api/diagnostic/me";
const DIAGNOSTIC_PATH: &str = "/api/diagnostic";

/// `CoachApi` over JSON/HTTPS with bearer-token auth.
pub struct HttpCoachApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpCoachApi {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                path: config.api_base_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the token as stored right now.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.tokens.load().ok_or(ApiError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED && authenticated {
            return Err(ApiError::AuthExpired);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::InvalidResponse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CoachApi for HttpCoachApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        let request = self.client.post(self.url(LOGIN_PATH)).json(&body);
        self.send(LOGIN_PATH, request, false).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let mut body = serde_json::json!({
            "name": registration.name,
            "email": registration.email,
            "password": registration.password.expose_secret(),
        });
        if let Some(ref workspace) = registration.workspace_name {
            body["workspace_name"] = serde_json::Value::from(workspace.as_str());
        }

        let path = match registration.invitation_token {
            Some(ref invite) => {
                body["invitation_token"] = serde_json::Value::from(invite.as_str());
                REGISTER_INVITE_PATH
            }
            None => REGISTER_PATH,
        };

        let request = self.client.post(self.url(path)).json(&body);
        self.send(path, request, false).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.authorized(self.client.get(self.url(ME_PATH)))?;
        self.send(ME_PATH, request, true).await
    }

    async fn diagnostic_status(&self) -> Result<DiagnosticStatusResponse, ApiError> {
        let request = self.authorized(self.client.get(self.url(DIAGNOSTIC_ME_PATH)))?;
        self.send(DIAGNOSTIC_ME_PATH, request, true).await
    }

    async fn submit_diagnostic(&self, responses: &ResponseMap) -> Result<DiagnosticResult, ApiError> {
        let request = self
            .authorized(self.client.post(self.url(DIAGNOSTIC_PATH)))?
            .json(&SubmitDiagnosticRequest { responses });
        self.send(DIAGNOSTIC_PATH, request, true).await
    }
}

/// Pull a readable message out of an error body.
///
/// Accepts `{"detail": ...}`, `{"message": ...}` or `{"error": ...}`, and
/// falls back to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.trim().chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::MemoryTokenStore;

    #[test]
    fn error_detail_prefers_known_fields() {
        assert_eq!(error_detail(r#"{"detail": "Email already used"}"#), "Email already used");
        assert_eq!(error_detail(r#"{"message": "Bad input"}"#), "Bad input");
        assert_eq!(error_detail(r#"{"error": "nope"}"#), "nope");
        assert_eq!(error_detail("  Gateway Timeout \n"), "Gateway Timeout");
        assert_eq!(error_detail(r#"{"detail": [{"loc": "email"}]}"#), r#"{"detail": [{"loc": "email"}]}"#);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = ClientConfig {
            api_base_url: "https://api.example.com/".to_string(),
            ..ClientConfig::default()
        };
        let api = HttpCoachApi::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();
        assert_eq!(api.url(ME_PATH), "https://api.example.com/api/auth/me");
    }

    #[tokio::test]
    async fn authenticated_call_without_token_is_missing_token() {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..ClientConfig::default()
        };
        let api = HttpCoachApi::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();

        let err = api.current_user().await.unwrap_err();
        assert_eq!(err, ApiError::MissingToken);
        assert!(err.is_auth_expired());
    }
}
