//! Password-based auth operations against the backend's GoTrue API.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Backend;
use crate::error::{ApiError, BackendError};
use crate::models::{AuthData, AuthOutcome, AuthUser, NewProfile, Session, UserData};
use crate::profiles;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Register a new account and, when the backend reports a created user,
/// insert its `user_profiles` row.
///
/// The error contract is deliberately two-channel and callers rely on it:
/// rejections of the account creation itself come back inside the outcome
/// (`AuthOutcome::error`), while a failed profile insert is raised as
/// [`BackendError::Profile`]. Registration is not rolled back in that case;
/// the account then exists without a profile row.
pub async fn sign_up(
    backend: &Backend,
    email: &str,
    password: &str,
    user_data: &UserData,
) -> Result<AuthOutcome, BackendError> {
    debug!(email, "registering account");

    let response = backend
        .http()
        .post(backend.auth_url("signup"))
        .header("apikey", backend.anon_key())
        .json(&Credentials { email, password })
        .send()
        .await?;

    let outcome = read_auth_response(response).await?;

    if outcome.error.is_none() {
        if let Some(user) = &outcome.data.user {
            let row = NewProfile::from_registration(&user.id, user_data);
            // Row-level security sees the authenticated role when the signup
            // already produced a session; otherwise the anon key is all we have.
            let token = outcome
                .data
                .session
                .as_ref()
                .map(|session| session.access_token.as_str());
            profiles::insert_profile(backend, token, &row).await?;
        }
    }

    Ok(outcome)
}

/// Authenticate an existing account with email and password.
///
/// Pure pass-through: whatever the token endpoint answers is handed back
/// unmodified in the outcome; only transport failures are raised.
pub async fn sign_in(
    backend: &Backend,
    email: &str,
    password: &str,
) -> Result<AuthOutcome, BackendError> {
    debug!(email, "authenticating");

    let response = backend
        .http()
        .post(backend.auth_url("token"))
        .query(&[("grant_type", "password")])
        .header("apikey", backend.anon_key())
        .json(&Credentials { email, password })
        .send()
        .await?;

    read_auth_response(response).await
}

/// Resolve the account behind an access token.
pub async fn get_user(backend: &Backend, access_token: &str) -> Result<AuthUser, BackendError> {
    let response = backend
        .http()
        .get(backend.auth_url("user"))
        .header("apikey", backend.anon_key())
        .bearer_auth(access_token)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(format!("user payload: {e}")))
    } else {
        Err(BackendError::Auth(ApiError::from_body(status.as_u16(), &body)))
    }
}

/// Revoke the session behind an access token.
pub async fn sign_out(backend: &Backend, access_token: &str) -> Result<(), BackendError> {
    let response = backend
        .http()
        .post(backend.auth_url("logout"))
        .header("apikey", backend.anon_key())
        .bearer_auth(access_token)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await?;
        Err(BackendError::Auth(ApiError::from_body(status.as_u16(), &body)))
    }
}

// ─── Response handling ──────────────────────────────────────────────────────

/// Fold an auth endpoint's HTTP response into the `{ data, error }` pair.
async fn read_auth_response(response: reqwest::Response) -> Result<AuthOutcome, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(AuthOutcome {
            data: parse_auth_data(&body)?,
            error: None,
        })
    } else {
        Ok(AuthOutcome {
            data: AuthData::default(),
            error: Some(ApiError::from_body(status.as_u16(), &body)),
        })
    }
}

/// GoTrue success bodies come in two shapes: a session envelope with the
/// user embedded, or a bare user object while confirmation is pending.
fn parse_auth_data(body: &str) -> Result<AuthData, BackendError> {
    #[derive(Deserialize)]
    struct SessionEnvelope {
        access_token: String,
        token_type: String,
        expires_in: i64,
        refresh_token: String,
        user: AuthUser,
    }

    if let Ok(envelope) = serde_json::from_str::<SessionEnvelope>(body) {
        return Ok(AuthData {
            user: Some(envelope.user),
            session: Some(Session {
                access_token: envelope.access_token,
                token_type: envelope.token_type,
                expires_in: envelope.expires_in,
                refresh_token: envelope.refresh_token,
            }),
        });
    }

    match serde_json::from_str::<AuthUser>(body) {
        Ok(user) => Ok(AuthData {
            user: Some(user),
            session: None,
        }),
        Err(e) => Err(BackendError::Decode(format!("auth payload: {e}"))),
    }
}
