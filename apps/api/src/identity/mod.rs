//! Identity provider boundary.
//!
//! Account creation, credential checks and session lookup all go through
//! `IdentityStore`. Production uses `GoTrueClient`; tests use the in-memory
//! fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, AccountMetadata, Session};

pub mod gotrue;
#[cfg(test)]
pub mod memory;

pub use gotrue::GoTrueClient;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Identity provider rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            IdentityError::Unavailable(err.to_string())
        } else {
            IdentityError::Http(err)
        }
    }
}

impl IdentityError {
    /// Transport-level failures, as opposed to the provider saying no.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            IdentityError::Http(_) | IdentityError::Decode(_) | IdentityError::Unavailable(_)
        )
    }
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<Account, IdentityError>;

    async fn verify_credentials(&self, email: &str, password: &str)
        -> Result<Session, IdentityError>;

    /// Looks up the session behind an access token. `None` when the token is
    /// unknown or expired.
    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError>;
}
