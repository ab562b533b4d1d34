//! ApiClient - every authenticated call goes through here.
//!
//! Outgoing requests get the session's access token as a bearer credential
//! (public auth endpoints excepted). A 401 triggers at most one silent refresh
//! per request, after which the original request is resent once. A failed
//! refresh ends the session.

use super::endpoints;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::{ApiError, ApiResult};
use crate::session::model::RefreshResponse;
use crate::session::{LogoutReason, SessionContext};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Attach the current access token unless the endpoint is public
    pub fn attach_auth(&self, request: ApiRequest) -> ApiRequest {
        if endpoints::is_public(&request.path) {
            return request.with_bearer(None);
        }

        match self.session.access_token() {
            Some(token) => request.with_bearer(Some(token)),
            None => request,
        }
    }

    /// Send a request, recovering once from an expired access token.
    ///
    /// Non-success statuses come back as `ApiError`; the caller sees the same
    /// result whether or not a refresh happened in between.
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut refreshed = false;

        loop {
            let outgoing = self.attach_auth(request.clone());
            let sent = self.transport.send(&outgoing).await;

            // The refresh call failing in any way means the refresh credential is gone
            if endpoints::is_refresh(&request.path) {
                return match sent {
                    Ok(response) if response.is_success() => Ok(response),
                    Ok(response) => self.expire(&response.status.to_string()),
                    Err(e) => self.expire(&e.to_string()),
                };
            }

            let response = sent?;
            if response.is_success() {
                return Ok(response);
            }

            if response.status != 401 {
                return Err(response.into_error());
            }

            if refreshed || endpoints::is_public(&request.path) {
                return Err(response.into_error());
            }

            refreshed = true;
            debug!(target: "auth", "401 from {}, attempting token refresh", request.path);

            if let Err(e) = self.refresh().await {
                return self.expire(&e.to_string());
            }

            debug!(target: "auth", "Resending {} {}", request.method, request.path);
        }
    }

    fn expire<T>(&self, cause: &str) -> ApiResult<T> {
        warn!(target: "auth", "Token refresh failed: {}", cause);
        self.session.clear(LogoutReason::RefreshFailed);
        Err(ApiError::SessionExpired)
    }

    /// Exchange the refresh cookie for a new access token and store it
    pub async fn refresh(&self) -> ApiResult<String> {
        let request = ApiRequest::post(endpoints::REFRESH_TOKEN);
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            return Err(response.into_error());
        }

        let RefreshResponse { access_token } = response.decode()?;
        self.session.set_access_token(&access_token);
        info!(target: "auth", "Access token refreshed");
        Ok(access_token)
    }

    /// `execute` and decode the JSON body
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        self.execute(request).await?.decode()
    }
}
