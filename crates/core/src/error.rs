use thiserror::Error;

/// Shared error type used across all CareerWise crates.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] eyre::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("SUPABASE_ANON_KEY must be set".into());
        assert!(e.to_string().contains("SUPABASE_ANON_KEY"));
        assert!(e.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn auth_error_display() {
        let e = AppError::Auth("token expired".into());
        assert!(e.to_string().contains("token expired"));
    }

    #[test]
    fn eyre_report_converts() {
        let e: AppError = eyre::eyre!("backend unreachable").into();
        assert!(e.to_string().contains("backend unreachable"));
        let _: &dyn Error = &e;
    }
}
