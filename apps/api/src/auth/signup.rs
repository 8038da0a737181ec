//! Signup orchestration: validate, create the account, then create the
//! profile.
//!
//! The profile insert is only attempted after account creation has
//! returned successfully, so the only possible partial state is an account
//! without a profile. That state is reported as
//! `SignupError::ProfileCreationFailed` with the account id so the caller
//! can repair it through `complete_profile`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::effects::{Effects, UiEffect, HIREDECK_OPEN_DELAY_MS};
use crate::auth::resolver::SessionResolver;
use crate::auth::validation::{normalize_email, FieldError, SignupForm, ValidSignup};
use crate::identity::{IdentityError, IdentityStore};
use crate::models::{Account, Role, UserContext};
use crate::store::{ProfileStore, StoreError};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("Signup input failed validation")]
    Validation(Vec<FieldError>),

    #[error("Account creation failed: {0}")]
    IdentityCreationFailed(#[source] IdentityError),

    #[error("Profile creation failed for account {account_id}: {source}")]
    ProfileCreationFailed {
        account_id: Uuid,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("Profile input failed validation")]
    Validation(Vec<FieldError>),

    #[error("Form email does not match the signed-in account")]
    EmailMismatch,

    #[error("Account was registered as {registered}, not {requested}")]
    RoleMismatch { registered: Role, requested: Role },

    #[error("Account {0} already has a profile")]
    AlreadyExists(Uuid),

    #[error(transparent)]
    Store(StoreError),
}

fn success_message(role: Role) -> &'static str {
    match role {
        Role::Student => "Student account created successfully!",
        Role::Hr => "HR account created successfully! Redirecting to HireDeck...",
    }
}

#[derive(Clone)]
pub struct SignupOrchestrator {
    identity: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    resolver: SessionResolver,
    hiredeck_path: String,
}

impl SignupOrchestrator {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        resolver: SessionResolver,
        hiredeck_path: String,
    ) -> Self {
        Self {
            identity,
            profiles,
            resolver,
            hiredeck_path,
        }
    }

    pub async fn signup(
        &self,
        form: &SignupForm,
        effects: &Effects,
    ) -> Result<UserContext, SignupError> {
        let valid = form.validate().map_err(SignupError::Validation)?;
        let role = valid.role();

        let account = self
            .identity
            .create_account(&valid.email, &valid.password, &valid.metadata)
            .await
            .map_err(|e| {
                warn!("{role} signup for {} rejected by identity provider: {e}", valid.email);
                SignupError::IdentityCreationFailed(e)
            })?;

        info!("Created {role} account {} for {}", account.id, valid.email);

        if let Err(source) = self.profiles.insert_profile(account.id, &valid.profile).await {
            error!(
                "Account {} exists but its profile could not be created: {source}",
                account.id
            );
            return Err(SignupError::ProfileCreationFailed {
                account_id: account.id,
                source,
            });
        }

        let context = self.resolver.resolve(&account).await;
        self.emit_success(role, effects);
        Ok(context)
    }

    /// Creates the missing profile for an account whose signup stopped after
    /// account creation.
    pub async fn complete_profile(
        &self,
        account: &Account,
        form: &SignupForm,
    ) -> Result<UserContext, RepairError> {
        let ValidSignup { email, profile, .. } =
            form.validate_profile_fields().map_err(RepairError::Validation)?;

        if email != normalize_email(&account.email) {
            return Err(RepairError::EmailMismatch);
        }
        if let Some(registered) = account.metadata_role {
            if registered != profile.role() {
                return Err(RepairError::RoleMismatch {
                    registered,
                    requested: profile.role(),
                });
            }
        }

        match self.profiles.insert_profile(account.id, &profile).await {
            Ok(profile_id) => {
                info!("Repaired account {}: profile {profile_id} created", account.id);
            }
            Err(StoreError::Conflict(_)) => return Err(RepairError::AlreadyExists(account.id)),
            Err(e) => return Err(RepairError::Store(e)),
        }

        Ok(self.resolver.resolve(account).await)
    }

    fn emit_success(&self, role: Role, effects: &Effects) {
        effects.emit(UiEffect::success(success_message(role)));
        if role == Role::Hr {
            effects.emit(UiEffect::open_window(
                self.hiredeck_path.clone(),
                HIREDECK_OPEN_DELAY_MS,
            ));
        }
    }
}
