pub mod account;
pub mod context;
pub mod enrollment;
pub mod profile;

pub use account::{Account, AccountMetadata, Role, Session};
pub use context::{CourseEnrollment, UserContext};
pub use enrollment::{Enrollment, EnrollmentTable};
pub use profile::{NewProfile, Profile, ProfileExtension, ProfileUpdate};
