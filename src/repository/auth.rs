//! Signup, login and logout

use reqwest::Method;
use validator::Validate;

use crate::client::{decode, ApiClient};
use crate::error::ApiResult;
use crate::models::user::{LoginRequest, LoginResponse, SignupRequest};
use crate::session::Session;

#[derive(Clone)]
pub struct AuthRepository {
    client: ApiClient,
}

impl AuthRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Register a new account. The payload is validated locally before any
    /// network traffic.
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<()> {
        request.validate()?;
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::ApiError::Decode(e.to_string()))?;
        self.client
            .request(Method::POST, "/auth/signup", Some(&body))
            .await?;
        Ok(())
    }

    /// Authenticate and persist the resulting session.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| crate::error::ApiError::Decode(e.to_string()))?;
        let response: LoginResponse = decode(
            self.client
                .request(Method::POST, "/auth/login", Some(&body))
                .await?,
        )?;

        let session = Session {
            token: response.access_token,
            username: response.username,
            user_id: response.user_id,
            role: response.role,
        };
        self.client.session().set(session.clone());
        tracing::info!("Logged in as {} ({})", session.username, session.role);
        Ok(session)
    }

    /// Drop the persisted session. No network call.
    pub fn logout(&self) {
        self.client.session().clear();
        tracing::info!("Logged out");
    }

    /// Currently persisted session, if any
    pub fn current_session(&self) -> Option<Session> {
        self.client.session().get()
    }
}
