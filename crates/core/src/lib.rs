//! Shared plumbing for the CareerWise crates: settings, the common error
//! type, and the logging/error-reporting bootstrap.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::Settings;
pub use error::AppError;
