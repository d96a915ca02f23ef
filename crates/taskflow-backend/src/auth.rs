use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_core::{Session, StoreError};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::client::{BackendClient, decode, send};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("{0}")]
    Rejected(String),

    #[error("check your inbox to confirm {0} before signing in")]
    ConfirmationRequired(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn from_store(err: StoreError) -> AuthError {
    match err {
        StoreError::Rejected { status: 400 | 401 | 422, message } => AuthError::Rejected(message),
        other => AuthError::Store(other),
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

/// Sign-up answers with a session when e-mail confirmation is off and with
/// the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

fn session_from_token(token: TokenResponse, fallback_email: &str, now: DateTime<Utc>) -> Session {
    let expires_at = token
        .expires_at
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .or_else(|| token.expires_in.map(|secs| now + Duration::seconds(secs)));
    Session {
        user_id: token.user.id,
        email: token.user.email.unwrap_or_else(|| fallback_email.to_string()),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
    }
}

fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

/// Email/password sessions against the backend's auth API.
#[derive(Clone)]
pub struct AuthClient {
    client: BackendClient,
}

impl AuthClient {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        check_credentials(email, password)?;
        let request = self
            .client
            .request(Method::POST, "auth/v1/token?grant_type=password", None)
            .json(&json!({ "email": email.trim(), "password": password }));
        let text = send(request).await.map_err(from_store)?;
        let token: TokenResponse = decode(&text)?;
        let session = session_from_token(token, email.trim(), Utc::now());
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        check_credentials(email, password)?;
        let request = self
            .client
            .request(Method::POST, "auth/v1/signup", None)
            .json(&json!({ "email": email.trim(), "password": password }));
        let text = send(request).await.map_err(from_store)?;
        match decode::<SignUpResponse>(&text)? {
            SignUpResponse::Session(token) => {
                let session = session_from_token(token, email.trim(), Utc::now());
                info!(user_id = %session.user_id, "signed up");
                Ok(session)
            }
            SignUpResponse::User(user) => {
                info!(user_id = %user.id, "sign-up awaiting email confirmation");
                Err(AuthError::ConfirmationRequired(
                    user.email.unwrap_or_else(|| email.trim().to_string()),
                ))
            }
        }
    }

    /// Trades the refresh token for a new session.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Err(AuthError::Store(StoreError::NotAuthenticated));
        };
        let request = self
            .client
            .request(Method::POST, "auth/v1/token?grant_type=refresh_token", None)
            .json(&json!({ "refresh_token": refresh_token }));
        let text = send(request).await.map_err(from_store)?;
        let token: TokenResponse = decode(&text)?;
        Ok(session_from_token(token, &session.email, Utc::now()))
    }

    /// Revokes the session server-side. The caller drops its copy either
    /// way.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let request = self
            .client
            .request(Method::POST, "auth/v1/logout", Some(&session.access_token));
        match send(request).await {
            Ok(_) => {
                info!("signed out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "sign-out request failed");
                Err(from_store(err))
            }
        }
    }
}
