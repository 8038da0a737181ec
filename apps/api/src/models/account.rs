use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The two roles a SkillForge user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    #[serde(rename = "HR")]
    Hr,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Hr => "HR",
        }
    }

    /// Accepts both the canonical spelling ("Student", "HR") and the
    /// lowercase `user_type` tags written by older signup forms.
    pub fn parse_loose(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "hr" => Some(Role::Hr),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to an account at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMetadata {
    pub role: Role,
    pub full_name: String,
}

impl AccountMetadata {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "role": self.role.as_str(),
            "full_name": self.full_name,
        })
    }
}

/// An authentication identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub metadata_role: Option<Role>,
    pub metadata_full_name: Option<String>,
}

impl Account {
    /// Builds an account from the provider's free-form `user_metadata` map.
    /// `role`/`full_name` win over the legacy `user_type`/`name` keys.
    pub fn from_metadata(id: Uuid, email: String, metadata: &Map<String, Value>) -> Self {
        let text = |key: &str| metadata.get(key).and_then(Value::as_str);

        let metadata_role = text("role")
            .and_then(Role::parse_loose)
            .or_else(|| text("user_type").and_then(Role::parse_loose));
        let metadata_full_name = text("full_name")
            .or_else(|| text("name"))
            .map(str::to_string);

        Self {
            id,
            email,
            metadata_role,
            metadata_full_name,
        }
    }
}

/// A verified session issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub account: Account,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
