//! In-memory identity provider for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::identity::{IdentityError, IdentityStore};
use crate::models::{Account, AccountMetadata, Session};

struct StoredAccount {
    account: Account,
    password: String,
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    accounts: Mutex<HashMap<String, StoredAccount>>,
    sessions: Mutex<HashMap<String, Account>>,
    fail_next_create: Mutex<Option<IdentityError>>,
}

impl MemoryIdentityStore {
    pub async fn fail_next_create(&self, err: IdentityError) {
        *self.fail_next_create.lock().await = Some(err);
    }

    pub async fn count(&self) -> usize {
        self.accounts.lock().await.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<Account, IdentityError> {
        if let Some(err) = self.fail_next_create.lock().await.take() {
            return Err(err);
        }
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::DuplicateAccount);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            metadata_role: Some(metadata.role),
            metadata_full_name: Some(metadata.full_name.clone()),
        };
        accounts.insert(
            email.to_string(),
            StoredAccount {
                account: account.clone(),
                password: password.to_string(),
            },
        );
        Ok(account)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let account = {
            let accounts = self.accounts.lock().await;
            match accounts.get(email) {
                Some(stored) if stored.password == password => stored.account.clone(),
                _ => return Err(IdentityError::InvalidCredentials),
            }
        };
        let access_token = format!("tok-{}", Uuid::new_v4());
        self.sessions
            .lock()
            .await
            .insert(access_token.clone(), account.clone());
        Ok(Session {
            access_token,
            refresh_token: None,
            expires_at: None,
            account,
        })
    }

    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(access_token)
            .map(|account| Session {
                access_token: access_token.to_string(),
                refresh_token: None,
                expires_at: None,
                account: account.clone(),
            }))
    }
}
