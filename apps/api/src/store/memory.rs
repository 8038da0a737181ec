//! In-memory store fakes for tests, with failure injection and a call log.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::models::{Enrollment, EnrollmentTable, NewProfile, Profile, ProfileUpdate, Role};
use crate::store::{EnrollmentStore, ProfileStore, StoreError};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    fail_inserts: Mutex<bool>,
    fail_reads: Mutex<bool>,
    read_pause: Mutex<Option<Arc<Notify>>>,
}

impl MemoryProfileStore {
    pub async fn set_fail_inserts(&self, fail: bool) {
        *self.fail_inserts.lock().await = fail;
    }

    pub async fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().await = fail;
    }

    /// The next profile read waits until the returned handle is notified.
    pub async fn pause_next_read(&self) -> Arc<Notify> {
        let pause = Arc::new(Notify::new());
        *self.read_pause.lock().await = Some(pause.clone());
        pause
    }

    pub async fn count(&self) -> usize {
        self.profiles.lock().await.len()
    }

    pub async fn count_for_email(&self, email: &str) -> usize {
        self.profiles
            .lock()
            .await
            .values()
            .filter(|p| p.email == email)
            .count()
    }

    /// Seeds a profile row directly, bypassing the signup flow.
    pub async fn seed(&self, account_id: Uuid, role: Option<Role>) -> Profile {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            account_id,
            full_name: "Seeded User".into(),
            phone_number: None,
            email: format!("{account_id}@seed.test"),
            role,
            created_at: now,
            updated_at: now,
        };
        self.profiles.lock().await.insert(account_id, profile.clone());
        profile
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn insert_profile(
        &self,
        account_id: Uuid,
        profile: &NewProfile,
    ) -> Result<Uuid, StoreError> {
        if *self.fail_inserts.lock().await {
            return Err(StoreError::Unavailable("insert rejected".into()));
        }
        let mut profiles = self.profiles.lock().await;
        if profiles.contains_key(&account_id) {
            return Err(StoreError::Conflict(format!(
                "Account {account_id} already has a profile"
            )));
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        profiles.insert(
            account_id,
            Profile {
                id,
                account_id,
                full_name: profile.full_name.clone(),
                phone_number: profile.phone_number.clone(),
                email: profile.email.clone(),
                role: Some(profile.role()),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_profile_by_account_id(
        &self,
        account_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        let pause = self.read_pause.lock().await.take();
        if let Some(pause) = pause {
            pause.notified().await;
        }
        if *self.fail_reads.lock().await {
            return Err(StoreError::Unavailable("read timed out".into()));
        }
        Ok(self.profiles.lock().await.get(&account_id).cloned())
    }

    async fn update_profile(
        &self,
        account_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::NotFound(format!("No profile for account {account_id}")))?;
        if let Some(name) = &update.full_name {
            profile.full_name = name.clone();
        }
        if let Some(phone) = &update.phone_number {
            profile.phone_number = Some(phone.clone());
        }
        profile.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEnrollmentStore {
    rows: Mutex<HashMap<(EnrollmentTable, Uuid), String>>,
    failing: Mutex<HashSet<EnrollmentTable>>,
    probes: Mutex<Vec<EnrollmentTable>>,
}

impl MemoryEnrollmentStore {
    pub async fn enroll(&self, table: EnrollmentTable, profile_id: Uuid, course: &str) {
        self.rows
            .lock()
            .await
            .insert((table, profile_id), course.to_string());
    }

    pub async fn fail_table(&self, table: EnrollmentTable) {
        self.failing.lock().await.insert(table);
    }

    /// Tables probed so far, in call order.
    pub async fn probes(&self) -> Vec<EnrollmentTable> {
        self.probes.lock().await.clone()
    }
}

#[async_trait]
impl EnrollmentStore for MemoryEnrollmentStore {
    async fn get_enrollment(
        &self,
        table: EnrollmentTable,
        profile_id: Uuid,
    ) -> Result<Option<Enrollment>, StoreError> {
        self.probes.lock().await.push(table);
        if self.failing.lock().await.contains(&table) {
            return Err(StoreError::Unavailable(format!(
                "{} unreachable",
                table.table_name()
            )));
        }
        Ok(self
            .rows
            .lock()
            .await
            .get(&(table, profile_id))
            .map(|course| Enrollment {
                user_id: profile_id,
                selected_course: Some(course.clone()),
            }))
    }
}
