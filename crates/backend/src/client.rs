use crate::error::BackendError;

/// Shared handle for the hosted Supabase backend (GoTrue auth plus
/// PostgREST storage).
///
/// Exactly one handle is created per process and shared by all callers.
/// It is read-only after construction, and `reqwest::Client` is reference
/// counted internally, so sharing is cheap.
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl Backend {
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The project's anon API key, sent as `apikey` on every request.
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// URL of a GoTrue auth endpoint, e.g. `auth_url("signup")`.
    pub(crate) fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    /// URL of a PostgREST table endpoint, e.g. `rest_url("user_profiles")`.
    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// Create the shared backend client handle from a project base URL and
/// anon key.
///
/// The values are not validated here; malformed ones are rejected by the
/// backend once the first request goes out. No request timeout is set at
/// this layer, the transport's own limits apply.
pub fn create_client(base_url: &str, anon_key: &str) -> Result<Backend, BackendError> {
    let http = reqwest::Client::builder().build()?;

    Ok(Backend {
        http,
        base_url: base_url.trim_end_matches('/').to_string(),
        anon_key: anon_key.to_string(),
    })
}
