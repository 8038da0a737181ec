use serde::{Serialize, Serializer};

use crate::models::account::{Account, Role};
use crate::models::profile::Profile;

pub const NO_ENROLLMENT: &str = "No Enrollment";
pub const HR_NOT_APPLICABLE: &str = "N/A (HR User)";

/// What the profile view shows under "Course Enrollment".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseEnrollment {
    Course(String),
    NoEnrollment,
    NotApplicable,
}

impl CourseEnrollment {
    pub fn as_str(&self) -> &str {
        match self {
            CourseEnrollment::Course(name) => name,
            CourseEnrollment::NoEnrollment => NO_ENROLLMENT,
            CourseEnrollment::NotApplicable => HR_NOT_APPLICABLE,
        }
    }
}

impl Serialize for CourseEnrollment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolved, in-memory view of the signed-in user. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserContext {
    pub account: Account,
    pub profile: Option<Profile>,
    pub role: Role,
    pub course_enrollment: Option<CourseEnrollment>,
    /// Set when a store read failed and a default was substituted.
    pub degraded: bool,
}
