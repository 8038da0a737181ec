//! Profile and enrollment persistence.
//!
//! The resolver and the signup flow only see the traits below; `AppState`
//! carries `Arc<dyn ProfileStore>` / `Arc<dyn EnrollmentStore>` so the
//! Postgres backends can be swapped for in-memory fakes in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Enrollment, EnrollmentTable, NewProfile, Profile, ProfileUpdate};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Inserts the common profile row and its role extension.
    /// Fails with `Conflict` if the account already has a profile.
    async fn insert_profile(&self, account_id: Uuid, profile: &NewProfile)
        -> Result<Uuid, StoreError>;

    async fn get_profile_by_account_id(&self, account_id: Uuid)
        -> Result<Option<Profile>, StoreError>;

    /// Applies the name/phone columns of `update`. The role column is never
    /// written here.
    async fn update_profile(&self, account_id: Uuid, update: &ProfileUpdate)
        -> Result<(), StoreError>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn get_enrollment(
        &self,
        table: EnrollmentTable,
        profile_id: Uuid,
    ) -> Result<Option<Enrollment>, StoreError>;
}
