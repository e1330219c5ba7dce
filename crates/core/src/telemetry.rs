use sentry::ClientInitGuard;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Settings;

/// Initialise the global tracing subscriber and, when a DSN is configured,
/// the Sentry error-reporting client.
///
/// Respects `RUST_LOG` env var; defaults to `info` level. Safe to call more
/// than once: a second subscriber install is ignored. The returned guard
/// owns the Sentry client and must be held for the lifetime of the process;
/// dropping it flushes pending events and stops reporting.
pub fn init(settings: &Settings) -> Option<ClientInitGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();

    settings.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                sample_rate: settings.sentry_error_sample_rate,
                traces_sample_rate: settings.sentry_traces_sample_rate,
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    })
}

/// Forward an error to Sentry together with optional free-form context.
///
/// Best effort: a no-op when no client is bound, and failures to transmit
/// are the SDK's concern. Never fails.
pub fn capture_error(error: &dyn std::error::Error, context: Option<serde_json::Value>) {
    sentry::with_scope(
        |scope| {
            if let Some(extra) = context {
                scope.set_extra("context", extra);
            }
        },
        || {
            sentry::capture_error(error);
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dsn: Option<&str>) -> Settings {
        Settings {
            supabase_url: "http://localhost:54321".into(),
            supabase_anon_key: "anon-key".into(),
            sentry_dsn: dsn.map(str::to_string),
            sentry_error_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            api_port: 8000,
        }
    }

    #[test]
    fn init_is_repeatable() {
        let first = init(&settings(None));
        let second = init(&settings(None));
        assert!(first.is_none());
        assert!(second.is_none());
    }

    #[test]
    fn capture_error_never_fails() {
        let error = std::io::Error::other("profile insert rejected");
        capture_error(&error, None);
        capture_error(&error, Some(serde_json::json!({ "operation": "signup" })));
        capture_error(&error, Some(serde_json::Value::Null));
    }
}
