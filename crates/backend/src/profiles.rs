//! Single-row operations on the backend's `user_profiles` table.
//!
//! Every call is one PostgREST request keyed by account id; the backend
//! owns the rows, this module never caches them.

use tracing::debug;

use crate::client::Backend;
use crate::error::{ApiError, BackendError};
use crate::models::{NewProfile, ProfileChanges, UserProfile};

const TABLE: &str = "user_profiles";

/// Insert one profile row.
///
/// Sent with the session's access token when one is available so row-level
/// security sees the authenticated role, and with the anon key otherwise.
pub async fn insert_profile(
    backend: &Backend,
    access_token: Option<&str>,
    profile: &NewProfile,
) -> Result<(), BackendError> {
    debug!(user_id = %profile.id, "inserting profile row");

    let response = backend
        .http()
        .post(backend.rest_url(TABLE))
        .header("apikey", backend.anon_key())
        .bearer_auth(access_token.unwrap_or(backend.anon_key()))
        .header("Prefer", "return=minimal")
        .json(&[profile])
        .send()
        .await?;

    check_write(response).await
}

/// Fetch the profile row for an account id, `None` when absent.
pub async fn fetch_profile(
    backend: &Backend,
    access_token: &str,
    user_id: &str,
) -> Result<Option<UserProfile>, BackendError> {
    let response = backend
        .http()
        .get(backend.rest_url(TABLE))
        .query(&[("id", format!("eq.{user_id}")), ("select", "*".to_string())])
        .header("apikey", backend.anon_key())
        .bearer_auth(access_token)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(BackendError::Profile(ApiError::from_body(
            status.as_u16(),
            &body,
        )));
    }

    let mut rows: Vec<UserProfile> = serde_json::from_str(&body)
        .map_err(|e| BackendError::Decode(format!("profile rows: {e}")))?;

    Ok(if rows.is_empty() {
        None
    } else {
        Some(rows.remove(0))
    })
}

/// Apply a partial update to an account's profile row.
pub async fn update_profile(
    backend: &Backend,
    access_token: &str,
    user_id: &str,
    changes: &ProfileChanges,
) -> Result<(), BackendError> {
    debug!(user_id, "updating profile row");

    let response = backend
        .http()
        .patch(backend.rest_url(TABLE))
        .query(&[("id", format!("eq.{user_id}"))])
        .header("apikey", backend.anon_key())
        .bearer_auth(access_token)
        .header("Prefer", "return=minimal")
        .json(changes)
        .send()
        .await?;

    check_write(response).await
}

async fn check_write(response: reqwest::Response) -> Result<(), BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await?;
    Err(BackendError::Profile(ApiError::from_body(
        status.as_u16(),
        &body,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::create_client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_profile_returns_the_matching_row() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .and(query_param("id", "eq.user-1"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "user-1",
                "full_name": "Ada Lovelace",
                "skills": ["Rust"],
                "onboarding_completed": true
            }])))
            .mount(&server)
            .await;

        let backend = create_client(&server.uri(), "anon-key").unwrap();
        let profile = fetch_profile(&backend, "jwt-1", "user-1")
            .await
            .unwrap()
            .expect("row should be present");

        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.skills.as_deref(), Some(["Rust".to_string()].as_slice()));
        assert_eq!(profile.onboarding_completed, Some(true));
    }

    #[tokio::test]
    async fn fetch_profile_returns_none_for_an_empty_result_set() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let backend = create_client(&server.uri(), "anon-key").unwrap();
        let profile = fetch_profile(&backend, "jwt-1", "user-9").await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn update_profile_patches_the_row_with_the_partial_body() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/user_profiles"))
            .and(query_param("id", "eq.user-1"))
            .and(body_partial_json(json!({ "bio": "Systems programmer" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = create_client(&server.uri(), "anon-key").unwrap();
        let changes = ProfileChanges {
            bio: Some("Systems programmer".into()),
            ..ProfileChanges::default()
        };

        update_profile(&backend, "jwt-1", "user-1", &changes)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn storage_rejections_surface_as_profile_errors() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/user_profiles"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table user_profiles"
            })))
            .mount(&server)
            .await;

        let backend = create_client(&server.uri(), "anon-key").unwrap();
        let result =
            update_profile(&backend, "jwt-1", "user-1", &ProfileChanges::default()).await;

        match result {
            Err(BackendError::Profile(error)) => {
                assert_eq!(error.status, 403);
                assert_eq!(error.code.as_deref(), Some("42501"));
            }
            other => panic!("expected a profile error, got {other:?}"),
        }
    }
}
