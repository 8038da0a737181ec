use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The course-specific enrollment tables, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentTable {
    DataEngineering,
    ServiceDelivery,
    Dba,
    Devops,
    BusinessAnalysis,
}

impl EnrollmentTable {
    /// Probe order. When more than one table holds a row for the same
    /// profile, the earliest table here wins.
    pub const ALL: [EnrollmentTable; 5] = [
        EnrollmentTable::DataEngineering,
        EnrollmentTable::ServiceDelivery,
        EnrollmentTable::Dba,
        EnrollmentTable::Devops,
        EnrollmentTable::BusinessAnalysis,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EnrollmentTable::DataEngineering => "data_engineering_enrollments",
            EnrollmentTable::ServiceDelivery => "service_delivery_enrollments",
            EnrollmentTable::Dba => "dba_enrollments",
            EnrollmentTable::Devops => "devops_enrollments",
            EnrollmentTable::BusinessAnalysis => "business_analysis_enrollments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub selected_course: Option<String>,
}

impl Enrollment {
    /// The selected course, if the row carries a non-blank one.
    pub fn course(&self) -> Option<&str> {
        self.selected_course
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
