use std::sync::Arc;

use tracing::info;

use crate::auth::effects::{Effects, UiEffect};
use crate::auth::gate::{AuthState, GateDecision, RoleGate};
use crate::auth::resolver::SessionResolver;
use crate::auth::session::{AuthEvent, AuthSession};
use crate::auth::signup::{SignupError, SignupOrchestrator};
use crate::auth::validation::{self, SignupForm};
use crate::errors::AppError;
use crate::identity::IdentityStore;
use crate::models::{Account, ProfileUpdate, Role, Session, UserContext};
use crate::store::{EnrollmentStore, ProfileStore};

/// Entry point for every auth operation the HTTP layer exposes.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    resolver: SessionResolver,
    orchestrator: SignupOrchestrator,
    hiredeck_path: String,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        hiredeck_path: String,
    ) -> Self {
        let resolver = SessionResolver::new(profiles.clone(), enrollments);
        let orchestrator = SignupOrchestrator::new(
            identity.clone(),
            profiles.clone(),
            resolver.clone(),
            hiredeck_path.clone(),
        );
        Self {
            identity,
            profiles,
            resolver,
            orchestrator,
            hiredeck_path,
        }
    }

    pub async fn signup(
        &self,
        form: &SignupForm,
        effects: &Effects,
    ) -> Result<UserContext, SignupError> {
        self.orchestrator.signup(form, effects).await
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        effects: &Effects,
    ) -> Result<(Session, UserContext), AppError> {
        let email = validation::validate_sign_in(email, password).map_err(AppError::Validation)?;

        let session = self.identity.verify_credentials(&email, password).await?;
        let context = self.resolver.resolve(&session.account).await;
        info!("{} signed in as {}", session.account.id, context.role);

        if context.role == Role::Hr {
            effects.emit(UiEffect::open_window(self.hiredeck_path.clone(), 0));
        }
        Ok((session, context))
    }

    /// Maps an optional bearer token to an auth state. A missing, unknown or
    /// expired token is simply anonymous.
    pub async fn authenticate(&self, access_token: Option<&str>) -> Result<AuthState, AppError> {
        let auth = self.open_session(access_token).await?;
        let state = auth.state();
        Ok(state.as_ref().clone())
    }

    pub async fn require_account(&self, access_token: Option<&str>) -> Result<Account, AppError> {
        self.lookup_session(access_token)
            .await?
            .filter(|s| !s.is_expired_at(chrono::Utc::now()))
            .map(|s| s.account)
            .ok_or(AppError::Unauthorized)
    }

    /// Per-request auth session, signed in when the token is live.
    async fn open_session(&self, access_token: Option<&str>) -> Result<AuthSession, AppError> {
        let auth = AuthSession::new(self.resolver.clone());
        if let Some(session) = self.lookup_session(access_token).await? {
            auth.apply(AuthEvent::SignedIn(session)).await;
        }
        Ok(auth)
    }

    async fn lookup_session(&self, access_token: Option<&str>) -> Result<Option<Session>, AppError> {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        Ok(self.identity.current_session(token).await?)
    }

    /// Self-service update of name and phone. The role is write-once: a
    /// request may repeat the stored role but never change it.
    pub async fn update_profile(
        &self,
        account: &Account,
        update: &ProfileUpdate,
    ) -> Result<UserContext, AppError> {
        let update = validation::validate_update(update).map_err(AppError::Validation)?;

        let profile = self
            .profiles
            .get_profile_by_account_id(account.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No profile for account {}", account.id)))?;

        if let Some(requested) = update.role {
            if profile.role != Some(requested) {
                return Err(AppError::RoleImmutable);
            }
        }

        if !update.is_empty() {
            self.profiles.update_profile(account.id, &update).await?;
            info!("Updated profile {} for account {}", profile.id, account.id);
        }

        Ok(self.resolver.resolve(account).await)
    }

    pub async fn complete_profile(
        &self,
        account: &Account,
        form: &SignupForm,
    ) -> Result<UserContext, AppError> {
        Ok(self.orchestrator.complete_profile(account, form).await?)
    }

    pub async fn check_access(
        &self,
        access_token: Option<&str>,
        gate: &RoleGate,
    ) -> Result<GateDecision, AppError> {
        let auth = self.open_session(access_token).await?;
        Ok(auth.gated(gate.clone()).decision())
    }
}
