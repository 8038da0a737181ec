use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::profile::ProfileRow;
use crate::models::{
    Enrollment, EnrollmentTable, NewProfile, Profile, ProfileExtension, ProfileUpdate,
};
use crate::store::{EnrollmentStore, ProfileStore, StoreError};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error, account_id: Uuid) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(format!("Account {account_id} already has a profile"))
        }
        _ => StoreError::from(err),
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert_profile(
        &self,
        account_id: Uuid,
        profile: &NewProfile,
    ) -> Result<Uuid, StoreError> {
        // Common row and extension row land together or not at all.
        let mut tx = self.pool.begin().await?;

        let profile_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO user_profiles (auth_user_id, full_name, phone_number, email, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(account_id)
        .bind(&profile.full_name)
        .bind(&profile.phone_number)
        .bind(&profile.email)
        .bind(profile.role().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, account_id))?;

        match &profile.extension {
            ProfileExtension::Student {
                degree,
                graduation_year,
            } => {
                sqlx::query(
                    "INSERT INTO student_profiles (auth_user_id, degree, graduation_year) VALUES ($1, $2, $3)",
                )
                .bind(account_id)
                .bind(degree)
                .bind(graduation_year)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, account_id))?;
            }
            ProfileExtension::Hr {
                company_name,
                location,
                company_type,
                domain,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO hr_profiles (auth_user_id, company_name, location, company_type, domain)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(account_id)
                .bind(company_name)
                .bind(location)
                .bind(company_type)
                .bind(domain)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, account_id))?;
            }
        }

        tx.commit().await?;

        info!(
            "Inserted {} profile {profile_id} for account {account_id}",
            profile.role()
        );
        Ok(profile_id)
    }

    async fn get_profile_by_account_id(
        &self,
        account_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, auth_user_id, full_name, phone_number, email, role, created_at, updated_at
            FROM user_profiles
            WHERE auth_user_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn update_profile(
        &self,
        account_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET full_name = COALESCE($2, full_name),
                phone_number = COALESCE($3, phone_number),
                updated_at = NOW()
            WHERE auth_user_id = $1
            "#,
        )
        .bind(account_id)
        .bind(&update.full_name)
        .bind(&update.phone_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "No profile for account {account_id}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn get_enrollment(
        &self,
        table: EnrollmentTable,
        profile_id: Uuid,
    ) -> Result<Option<Enrollment>, StoreError> {
        // Table names come from a closed enum, never from input.
        let sql = format!(
            "SELECT user_id, selected_course FROM {} WHERE user_id = $1 LIMIT 1",
            table.table_name()
        );
        debug!("Probing {} for profile {profile_id}", table.table_name());

        let row: Option<Enrollment> = sqlx::query_as(&sql)
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
