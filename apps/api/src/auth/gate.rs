use serde::Serialize;

use crate::auth::effects::UiEffect;
use crate::models::{Role, UserContext};

/// Public entry point every rejected visitor is sent back to.
pub const PUBLIC_ENTRY: &str = "/";

/// Authentication state of one client. Rebuilt on every session change.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    Authenticated(UserContext),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Redirect {
        target: String,
        notice: Option<UiEffect>,
    },
}

/// Guard for a role-restricted area.
#[derive(Debug, Clone)]
pub struct RoleGate {
    required: Role,
    area: String,
}

impl RoleGate {
    pub fn new(required: Role, area: impl Into<String>) -> Self {
        Self {
            required,
            area: area.into(),
        }
    }

    pub fn hiredeck() -> Self {
        Self::new(Role::Hr, "HireDeck")
    }

    pub fn check(&self, state: &AuthState) -> GateDecision {
        match state {
            AuthState::Anonymous => GateDecision::Redirect {
                target: PUBLIC_ENTRY.to_string(),
                notice: None,
            },
            AuthState::Authenticated(ctx) if ctx.role != self.required => GateDecision::Redirect {
                target: PUBLIC_ENTRY.to_string(),
                notice: Some(UiEffect::warning(format!(
                    "Please sign in as {} to access {}",
                    self.required, self.area
                ))),
            },
            AuthState::Authenticated(_) => GateDecision::Allow,
        }
    }
}
