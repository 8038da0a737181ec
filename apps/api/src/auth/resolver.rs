//! Session resolution: account → `UserContext`.
//!
//! Role precedence is stored profile role, then account metadata role, then
//! Student. Store read failures never reach the caller; they are logged and
//! the context is returned with defaults and `degraded = true`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Account, CourseEnrollment, EnrollmentTable, Role, UserContext};
use crate::store::{EnrollmentStore, ProfileStore, StoreError};

pub const FALLBACK_ROLE: Role = Role::Student;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Profile lookup failed for account {account_id}: {source}")]
    ProfileLookupFailed {
        account_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("Enrollment lookup in {} failed for profile {profile_id}: {source}", .table.table_name())]
    EnrollmentLookupFailed {
        table: EnrollmentTable,
        profile_id: Uuid,
        #[source]
        source: StoreError,
    },
}

#[derive(Clone)]
pub struct SessionResolver {
    profiles: Arc<dyn ProfileStore>,
    enrollments: Arc<dyn EnrollmentStore>,
}

impl SessionResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>, enrollments: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            profiles,
            enrollments,
        }
    }

    pub async fn resolve(&self, account: &Account) -> UserContext {
        let mut degraded = false;

        let profile = match self.profiles.get_profile_by_account_id(account.id).await {
            Ok(profile) => profile,
            Err(source) => {
                let err = ResolutionError::ProfileLookupFailed {
                    account_id: account.id,
                    source,
                };
                warn!("{err}; continuing without profile");
                degraded = true;
                None
            }
        };

        let Some(profile) = profile else {
            debug!("No profile for account {}", account.id);
            return UserContext {
                account: account.clone(),
                profile: None,
                role: account.metadata_role.unwrap_or(FALLBACK_ROLE),
                course_enrollment: None,
                degraded,
            };
        };

        let role = profile
            .role
            .or(account.metadata_role)
            .unwrap_or(FALLBACK_ROLE);

        let course_enrollment = match role {
            Role::Hr => CourseEnrollment::NotApplicable,
            Role::Student => {
                let (enrollment, probe_failed) = self.find_enrollment(profile.id).await;
                degraded |= probe_failed;
                enrollment
            }
        };

        UserContext {
            account: account.clone(),
            profile: Some(profile),
            role,
            course_enrollment: Some(course_enrollment),
            degraded,
        }
    }

    /// Probes the enrollment tables in order and stops at the first row
    /// with a course. A failing table is skipped, not fatal.
    async fn find_enrollment(&self, profile_id: Uuid) -> (CourseEnrollment, bool) {
        let mut probe_failed = false;

        for table in EnrollmentTable::ALL {
            match self.enrollments.get_enrollment(table, profile_id).await {
                Ok(Some(row)) => {
                    if let Some(course) = row.course() {
                        debug!("Profile {profile_id} enrolled via {}", table.table_name());
                        return (CourseEnrollment::Course(course.to_string()), probe_failed);
                    }
                }
                Ok(None) => {}
                Err(source) => {
                    let err = ResolutionError::EnrollmentLookupFailed {
                        table,
                        profile_id,
                        source,
                    };
                    warn!("{err}");
                    probe_failed = true;
                }
            }
        }

        (CourseEnrollment::NoEnrollment, probe_failed)
    }
}
