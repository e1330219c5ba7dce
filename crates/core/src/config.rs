use serde::Deserialize;

use crate::error::AppError;

/// Global application settings loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Supabase project base URL.
    pub supabase_url: String,

    /// Supabase anon (publishable) API key, sent on every backend request.
    pub supabase_anon_key: String,

    /// Sentry DSN; error reporting is disabled when unset.
    pub sentry_dsn: Option<String>,

    /// Fraction of captured errors forwarded to Sentry (0.0 to 1.0).
    pub sentry_error_sample_rate: f32,

    /// Fraction of transactions traced for performance monitoring (0.0 to 1.0).
    pub sentry_traces_sample_rate: f32,

    /// Port for the API server.
    pub api_port: u16,
}

impl Settings {
    /// Load settings from environment variables (with optional `.env` file).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            supabase_url: std::env::var("SUPABASE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY")
                .map_err(|_| AppError::Config("SUPABASE_ANON_KEY must be set".into()))?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty()),
            sentry_error_sample_rate: sample_rate("SENTRY_ERROR_SAMPLE_RATE")?,
            sentry_traces_sample_rate: sample_rate("SENTRY_TRACES_SAMPLE_RATE")?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()
                .map_err(|_| AppError::Config("API_PORT must be a port number".into()))?,
        })
    }
}

/// Read a sampling rate variable, defaulting to 1.0 when unset.
fn sample_rate(var: &str) -> Result<f32, AppError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{var} must be a number between 0 and 1"))),
        Err(_) => Ok(1.0),
    }
}
