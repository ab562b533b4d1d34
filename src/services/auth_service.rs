use crate::api::{endpoints, ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::session::{AuthResponse, LogoutReason, Session};
use crate::validation;
use serde_json::json;
use tracing::info;

/// Outcome of re-entering the password before a profile edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Verified,
    /// Account was created through Google and has no password to check
    ExternalAccount,
}

/// Login, registration, Google sign-in and logout
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        validation::login(email, password)?;

        let request = ApiRequest::post(endpoints::LOGIN).json(json!({
            "email": email.trim(),
            "password": password,
        }));
        self.start_session(request).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<Session> {
        validation::registration(name, email, password)?;

        let request = ApiRequest::post(endpoints::REGISTER).json(json!({
            "name": name.trim(),
            "email": email.trim(),
            "password": password,
        }));
        self.start_session(request).await
    }

    /// Sign in with a Google ID-token credential
    pub async fn google(&self, credential: &str) -> ApiResult<Session> {
        validation::require("Google credential", credential)?;

        let request = ApiRequest::post(endpoints::GOOGLE).json(json!({
            "credential": credential.trim(),
        }));
        self.start_session(request).await
    }

    pub fn logout(&self) {
        self.client.session().clear(LogoutReason::UserRequested);
    }

    /// Re-authenticate before a sensitive edit
    pub async fn verify_password(&self, password: &str) -> ApiResult<PasswordCheck> {
        let request =
            ApiRequest::post(endpoints::VERIFY_PASSWORD).json(json!({ "password": password }));

        match self.client.execute(request).await {
            Ok(_) => Ok(PasswordCheck::Verified),
            Err(e) if e.server_message().map_or(false, |m| m.contains("Google")) => {
                Ok(PasswordCheck::ExternalAccount)
            }
            Err(ApiError::Status { status, .. }) if status == 400 || status == 403 => {
                Err(ApiError::validation("Incorrect password"))
            }
            Err(e) => Err(e),
        }
    }

    async fn start_session(&self, request: ApiRequest) -> ApiResult<Session> {
        let response: AuthResponse = self.client.fetch(request).await?;
        let session = Session::new(response.user, response.access_token);

        info!(target: "auth", "Signed in as {}", session.email());
        self.client.session().start(session.clone());
        Ok(session)
    }
}
