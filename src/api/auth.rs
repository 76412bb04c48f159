use chrono::{Duration, Utc};
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{Error, Result},
    session::{AuthUser, Session},
};

use super::ApiClient;

/// Client of the hosted auth service (`/auth/v1`).
#[derive(Debug, Clone)]
pub struct AuthClient {
    inner: ApiClient,
}

#[derive(Deserialize, Debug, Clone)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(token.expires_in));
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }
}

impl AuthClient {
    pub fn new(inner: ApiClient) -> Self {
        Self { inner }
    }

    async fn token(&self, grant_type: &str, payload: serde_json::Value) -> Result<Session> {
        let url = self
            .inner
            .endpoint(&format!("auth/v1/token?grant_type={}", grant_type));
        let (status, body) = self
            .inner
            .send(None, |client| client.post(&url).json(&payload))
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        let token: TokenResponse = serde_json::from_slice(&body)?;
        Ok(token.into())
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        debug!("Signing in as {}", email);
        self.token("password", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        debug!("Refreshing session");
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    /// Ask the auth service who the token belongs to.
    pub async fn user(&self, access_token: &str) -> Result<AuthUser> {
        let url = self.inner.endpoint("auth/v1/user");
        let (status, body) = self
            .inner
            .send(Some(access_token), |client| client.get(&url))
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn logout(&self, access_token: &str) -> Result<()> {
        let url = self.inner.endpoint("auth/v1/logout");
        let (status, body) = self
            .inner
            .send(Some(access_token), |client| client.post(&url))
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(())
    }
}
