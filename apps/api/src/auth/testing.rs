//! Shared fixtures for auth tests.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::resolver::SessionResolver;
use crate::auth::service::AuthService;
use crate::auth::signup::SignupOrchestrator;
use crate::auth::validation::{HrSignup, StudentSignup};
use crate::identity::memory::MemoryIdentityStore;
use crate::models::{Account, CourseEnrollment, Role, Session, UserContext};
use crate::store::memory::{MemoryEnrollmentStore, MemoryProfileStore};

pub const HIREDECK_PATH: &str = "/hiredeck";

#[derive(Default)]
pub struct Harness {
    pub identity: Arc<MemoryIdentityStore>,
    pub profiles: Arc<MemoryProfileStore>,
    pub enrollments: Arc<MemoryEnrollmentStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolver(&self) -> SessionResolver {
        SessionResolver::new(self.profiles.clone(), self.enrollments.clone())
    }

    pub fn orchestrator(&self) -> SignupOrchestrator {
        SignupOrchestrator::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.resolver(),
            HIREDECK_PATH.to_string(),
        )
    }

    pub fn service(&self) -> AuthService {
        AuthService::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.enrollments.clone(),
            HIREDECK_PATH.to_string(),
        )
    }
}

pub fn student() -> StudentSignup {
    StudentSignup {
        full_name: "Asha Rao".into(),
        email: "a@x.com".into(),
        password: "secret".into(),
        phone_number: None,
        degree: "B.Tech".into(),
        graduation_year: Some(2025),
    }
}

pub fn hr() -> HrSignup {
    HrSignup {
        full_name: "Ben Okafor".into(),
        email: "b@x.com".into(),
        password: "hunter22".into(),
        phone_number: Some("+91 98765-43210".into()),
        company_name: "Acme".into(),
        location: "Pune, India".into(),
        company_type: "Startup".into(),
        domain: "DevOps".into(),
    }
}

pub fn account_with_role(role: Option<Role>) -> Account {
    let id = Uuid::new_v4();
    Account {
        id,
        email: format!("{id}@fixture.test"),
        metadata_role: role,
        metadata_full_name: None,
    }
}

pub fn session_for(account: &Account) -> Session {
    Session {
        access_token: format!("tok-{}", account.id),
        refresh_token: None,
        expires_at: None,
        account: account.clone(),
    }
}

pub fn context_with_role(role: Role) -> UserContext {
    UserContext {
        account: account_with_role(Some(role)),
        profile: None,
        role,
        course_enrollment: match role {
            Role::Hr => Some(CourseEnrollment::NotApplicable),
            Role::Student => Some(CourseEnrollment::NoEnrollment),
        },
        degraded: false,
    }
}
