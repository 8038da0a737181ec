//! GoTrue-compatible identity client (the auth API behind the hosted
//! backend). Only the three calls the auth flow needs are wrapped.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::identity::{IdentityError, IdentityStore};
use crate::models::{Account, AccountMetadata, Session};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: Value,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Map<String, Value>,
    identities: Option<Vec<Value>>,
}

impl GoTrueUser {
    /// With email confirmation on, signing up an already registered email
    /// answers 200 with an obfuscated user that carries no identities.
    fn is_obfuscated(&self) -> bool {
        self.identities.as_ref().is_some_and(|ids| ids.is_empty())
    }

    fn into_account(self) -> Account {
        let email = self.email.unwrap_or_default();
        Account::from_metadata(self.id, email, &self.user_metadata)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(Utc::now() + Duration::seconds(secs)),
            (None, None) => None,
        };
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            account: self.user.into_account(),
        }
    }
}

/// Signup returns a session when email confirmation is off, a bare user
/// otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignupResponse {
    WithSession(TokenResponse),
    UserOnly(GoTrueUser),
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

impl GoTrueErrorBody {
    fn text(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }
}

impl SignupResponse {
    fn into_account(self) -> Result<Account, IdentityError> {
        match self {
            SignupResponse::WithSession(token) => Ok(token.user.into_account()),
            SignupResponse::UserOnly(user) if user.is_obfuscated() => {
                Err(IdentityError::DuplicateAccount)
            }
            SignupResponse::UserOnly(user) => Ok(user.into_account()),
        }
    }
}

/// Extracts the human-readable message from a GoTrue error body,
/// falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<GoTrueErrorBody>(body)
        .ok()
        .and_then(|b| b.text().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn classify_signup_error(status: StatusCode, body: &str) -> IdentityError {
    let parsed: GoTrueErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = error_message(body);
    let duplicate = parsed.error_code.as_deref() == Some("user_already_exists")
        || message.to_ascii_lowercase().contains("already registered");
    if duplicate {
        IdentityError::DuplicateAccount
    } else {
        IdentityError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

fn classify_token_error(status: StatusCode, body: &str) -> IdentityError {
    let parsed: GoTrueErrorBody = serde_json::from_str(body).unwrap_or_default();
    let invalid_grant = parsed.error.as_deref() == Some("invalid_grant")
        || parsed.error_code.as_deref() == Some("invalid_credentials");
    if status == StatusCode::BAD_REQUEST && invalid_grant {
        IdentityError::InvalidCredentials
    } else {
        IdentityError::Rejected {
            status: status.as_u16(),
            message: error_message(body),
        }
    }
}

#[derive(Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: String) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityStore for GoTrueClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<Account, IdentityError> {
        let response = self
            .client
            .post(self.url("signup"))
            .header("apikey", &self.anon_key)
            .json(&SignupRequest {
                email,
                password,
                data: metadata.to_json(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Identity signup returned {status}: {body}");
            return Err(classify_signup_error(status, &body));
        }

        let parsed: SignupResponse =
            serde_json::from_str(&body).map_err(|e| IdentityError::Decode(e.to_string()))?;
        let account = parsed.into_account().inspect_err(|_| {
            warn!("Identity signup answered with an obfuscated user: email already registered");
        })?;
        debug!("Identity account {} created", account.id);
        Ok(account)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_token_error(status, &body));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| IdentityError::Decode(e.to_string()))?;
        Ok(token.into_session())
    }

    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let user: GoTrueUser =
            serde_json::from_str(&body).map_err(|e| IdentityError::Decode(e.to_string()))?;
        Ok(Some(Session {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
            account: user.into_account(),
        }))
    }
}
