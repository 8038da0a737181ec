use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::account::Role;

/// Raw `user_profiles` row. `role` is free text in storage.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub auth_user_id: Uuid,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application-level record extending an account with role and contact data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: String,
    /// `None` when the stored value is missing or unrecognised.
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            account_id: row.auth_user_id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            email: row.email,
            role: row.role.as_deref().and_then(Role::parse_loose),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Role-specific columns persisted in the extension tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum ProfileExtension {
    Student {
        degree: String,
        graduation_year: i32,
    },
    #[serde(rename = "HR")]
    Hr {
        company_name: String,
        location: String,
        company_type: String,
        domain: String,
    },
}

impl ProfileExtension {
    pub fn role(&self) -> Role {
        match self {
            ProfileExtension::Student { .. } => Role::Student,
            ProfileExtension::Hr { .. } => Role::Hr,
        }
    }
}

/// Everything needed to insert a profile for a freshly created account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub extension: ProfileExtension,
}

impl NewProfile {
    pub fn role(&self) -> Role {
        self.extension.role()
    }
}

/// Partial update of the common profile columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    /// Accepted only when equal to the stored role.
    pub role: Option<Role>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone_number.is_none()
    }
}
