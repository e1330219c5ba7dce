//! CareerWise Auth API. Fronts the hosted Supabase backend for the web client.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use careerwise_backend::{
    self as backend, AuthUser, Backend, BackendError, ProfileChanges, UserData, UserProfile,
};
use careerwise_core::{Settings, telemetry};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};

/// Shared application state.
struct AppState {
    backend: Backend,
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env().expect("Failed to load settings");
    let _sentry = telemetry::init(&settings);

    tracing::info!("Starting CareerWise Auth API");

    let backend = backend::create_client(&settings.supabase_url, &settings.supabase_anon_key)
        .expect("Failed to build backend client");

    let state = Arc::new(AppState { backend });

    let app = Router::new()
        .route("/api/v1/auth/signup", post(sign_up))
        .route("/api/v1/auth/signin", post(sign_in))
        .route("/api/v1/auth/signout", post(sign_out))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/auth/profile", put(update_profile))
        .route("/health", get(health))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.api_port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

// ─── Request Types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SignUpRequest {
    email: String,
    password: String,
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct SignInRequest {
    email: String,
    password: String,
}

// ─── Response Types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct AuthResponse {
    access_token: String,
    token_type: String,
    user: UserSummary,
}

#[derive(Serialize)]
struct UserSummary {
    id: String,
    email: Option<String>,
    full_name: String,
    onboarding_completed: bool,
}

/// The authenticated user's profile as served by `/me` and `/profile`.
#[derive(Serialize)]
struct ProfileView {
    id: String,
    email: Option<String>,
    full_name: String,
    user_type: Option<String>,
    career_stage: Option<String>,
    experience_level: Option<String>,
    primary_goals: Vec<String>,
    industry_interests: Vec<String>,
    skills: Vec<String>,
    location: Option<String>,
    bio: Option<String>,
    linkedin_url: Option<String>,
    portfolio_url: Option<String>,
    onboarding_completed: bool,
}

impl ProfileView {
    fn assemble(user: AuthUser, profile: Option<UserProfile>) -> Self {
        let mut view = Self {
            id: user.id,
            email: user.email,
            full_name: String::new(),
            user_type: None,
            career_stage: None,
            experience_level: None,
            primary_goals: Vec::new(),
            industry_interests: Vec::new(),
            skills: Vec::new(),
            location: None,
            bio: None,
            linkedin_url: None,
            portfolio_url: None,
            onboarding_completed: false,
        };

        if let Some(profile) = profile {
            view.full_name = profile.full_name.unwrap_or_default();
            view.user_type = profile.user_type;
            view.career_stage = profile.career_stage;
            view.experience_level = profile.experience_level;
            view.primary_goals = profile.primary_goals.unwrap_or_default();
            view.industry_interests = profile.industry_interests.unwrap_or_default();
            view.skills = profile.skills.unwrap_or_default();
            view.location = profile.location;
            view.bio = profile.bio;
            view.linkedin_url = profile.linkedin_url;
            view.portfolio_url = profile.portfolio_url;
            view.onboarding_completed = profile.onboarding_completed.unwrap_or(false);
        }

        view
    }
}

type ErrorResponse = (StatusCode, Json<ApiResponse<String>>);

fn json_ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

fn json_err(status: StatusCode, msg: &str) -> ErrorResponse {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: msg.to_string(),
        }),
    )
}

/// Report an unexpected backend failure and turn it into a 5xx.
fn report_failure(operation: &'static str, error: &BackendError) -> ErrorResponse {
    tracing::error!(operation, error = %error, "backend call failed");
    telemetry::capture_error(error, Some(serde_json::json!({ "operation": operation })));

    let status = match error {
        BackendError::Transport(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_err(status, "Backend request failed")
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller from the `Authorization` bearer header.
async fn authenticate<'h>(
    state: &AppState,
    headers: &'h HeaderMap,
) -> Result<(&'h str, AuthUser), ErrorResponse> {
    let token = bearer_token(headers)
        .ok_or_else(|| json_err(StatusCode::UNAUTHORIZED, "Authorization header missing"))?;

    match backend::auth::get_user(&state.backend, token).await {
        Ok(user) => Ok((token, user)),
        Err(BackendError::Auth(_)) => Err(json_err(
            StatusCode::UNAUTHORIZED,
            "Invalid authentication credentials",
        )),
        Err(e) => Err(report_failure("authenticate", &e)),
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

/// POST /api/v1/auth/signup: register an account and its profile row.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let user_data = UserData {
        full_name: request.full_name.clone(),
        ..UserData::default()
    };

    let outcome =
        backend::auth::sign_up(&state.backend, &request.email, &request.password, &user_data)
            .await
            .map_err(|e| report_failure("signup", &e))?;

    if let Some(error) = outcome.error {
        return Err(json_err(StatusCode::BAD_REQUEST, &error.message));
    }

    let Some(user) = outcome.data.user else {
        return Err(json_err(
            StatusCode::BAD_REQUEST,
            "Failed to create user account",
        ));
    };

    // No session means the account still awaits email confirmation; the
    // client treats an empty token as "confirm first, then sign in".
    let access_token = outcome
        .data
        .session
        .map(|session| session.access_token)
        .unwrap_or_default();

    Ok(json_ok(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserSummary {
            id: user.id,
            email: user.email,
            full_name: request.full_name,
            onboarding_completed: false,
        },
    }))
}

/// POST /api/v1/auth/signin: password authentication.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcome = backend::auth::sign_in(&state.backend, &request.email, &request.password)
        .await
        .map_err(|e| report_failure("signin", &e))?;

    if outcome.error.is_some() {
        return Err(json_err(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    let (Some(user), Some(session)) = (outcome.data.user, outcome.data.session) else {
        return Err(json_err(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    };

    // Profile lookup is best effort; a missing row degrades to empty fields.
    let profile = backend::profiles::fetch_profile(&state.backend, &session.access_token, &user.id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "profile lookup failed during sign-in");
            None
        });

    let full_name = profile
        .as_ref()
        .and_then(|p| p.full_name.clone())
        .unwrap_or_default();
    let onboarding_completed = profile
        .as_ref()
        .and_then(|p| p.onboarding_completed)
        .unwrap_or(false);

    Ok(json_ok(AuthResponse {
        access_token: session.access_token,
        token_type: "bearer".to_string(),
        user: UserSummary {
            id: user.id,
            email: user.email,
            full_name,
            onboarding_completed,
        },
    }))
}

/// POST /api/v1/auth/signout: best effort; local sign-out never fails.
async fn sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = bearer_token(&headers) {
        if let Err(e) = backend::auth::sign_out(&state.backend, token).await {
            tracing::warn!(error = %e, "server-side sign-out failed");
        }
    }
    json_ok("Successfully signed out".to_string())
}

/// GET /api/v1/auth/me: the authenticated user profile.
async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ErrorResponse> {
    let (token, user) = authenticate(&state, &headers).await?;

    let profile = backend::profiles::fetch_profile(&state.backend, token, &user.id)
        .await
        .map_err(|e| report_failure("me", &e))?;

    Ok(json_ok(ProfileView::assemble(user, profile)))
}

/// PUT /api/v1/auth/profile: partial update of the caller profile row.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(changes): Json<ProfileChanges>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let (token, user) = authenticate(&state, &headers).await?;

    backend::profiles::update_profile(&state.backend, token, &user.id, &changes)
        .await
        .map_err(|e| report_failure("profile update", &e))?;

    let profile = backend::profiles::fetch_profile(&state.backend, token, &user.id)
        .await
        .map_err(|e| report_failure("profile update", &e))?;

    Ok(json_ok(ProfileView::assemble(user, profile)))
}
