pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod profiles;

pub use client::{Backend, create_client};
pub use error::{ApiError, BackendError};
pub use models::{
    AuthData, AuthOutcome, AuthUser, NewProfile, ProfileChanges, Session, UserData, UserProfile,
};
