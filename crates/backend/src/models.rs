use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

// ─── Auth ───────────────────────────────────────────────────────────────────

/// An account as reported by the backend's auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
}

/// The `data` half of an auth exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthData {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// Result of an auth exchange: the backend's `{ data, error }` pair.
///
/// Rejections the backend reports at the HTTP level land in `error` with an
/// empty `data`; transport failures never reach this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub data: AuthData,
    pub error: Option<ApiError>,
}

// ─── Registration ───────────────────────────────────────────────────────────

/// Caller-supplied registration fields.
///
/// `full_name` is the only required field; everything else rides along in
/// `extra` and is merged into the profile row verbatim. The flattened map is
/// the declared stand-in for the web client's open-ended field spread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    pub full_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Insert-ready profile row (no server-assigned timestamps).
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub full_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewProfile {
    /// Build the profile row for a freshly created account.
    pub fn from_registration(user_id: &str, user_data: &UserData) -> Self {
        Self {
            id: user_id.to_string(),
            full_name: user_data.full_name.clone(),
            extra: user_data.extra.clone(),
        }
    }
}

// ─── Profile ────────────────────────────────────────────────────────────────

/// A row in the backend's `user_profiles` table.
///
/// List and bool columns are nullable in the hosted schema, so they decode
/// as `Option` here; readers decide what an absent value means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub career_stage: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub primary_goals: Option<Vec<String>>,
    #[serde(default)]
    pub industry_interests: Option<Vec<String>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub onboarding_completed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update; only the fields that are present are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_profile_flattens_extra_fields_alongside_the_named_ones() {
        let mut user_data = UserData {
            full_name: "Ada Lovelace".into(),
            extra: Map::new(),
        };
        user_data.extra.insert("user_type".into(), json!("professional"));
        user_data.extra.insert("skills".into(), json!(["Rust", "SQL"]));

        let row = NewProfile::from_registration("user-1", &user_data);
        let body = serde_json::to_value(&row).unwrap();

        assert_eq!(
            body,
            json!({
                "id": "user-1",
                "full_name": "Ada Lovelace",
                "user_type": "professional",
                "skills": ["Rust", "SQL"],
            })
        );
    }

    #[test]
    fn user_data_collects_unknown_fields_into_extra() {
        let parsed: UserData = serde_json::from_str(
            r#"{"full_name":"Ada Lovelace","location":"London","onboarding_completed":false}"#,
        )
        .unwrap();

        assert_eq!(parsed.full_name, "Ada Lovelace");
        assert_eq!(parsed.extra.get("location"), Some(&json!("London")));
        assert_eq!(parsed.extra.get("onboarding_completed"), Some(&json!(false)));
    }

    #[test]
    fn profile_changes_serialises_only_present_fields() {
        let changes = ProfileChanges {
            bio: Some("Systems programmer".into()),
            onboarding_completed: Some(true),
            ..ProfileChanges::default()
        };

        let body = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            body,
            json!({ "bio": "Systems programmer", "onboarding_completed": true })
        );
    }

    #[test]
    fn user_profile_tolerates_null_list_columns() {
        let row: UserProfile = serde_json::from_str(
            r#"{"id":"user-1","full_name":"Ada Lovelace","skills":null,"onboarding_completed":null}"#,
        )
        .unwrap();

        assert_eq!(row.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(row.skills.is_none());
        assert!(row.onboarding_completed.is_none());
    }
}
