use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::effects::{drain, Effects, UiEffect};
use crate::auth::gate::{AuthState, GateDecision, RoleGate};
use crate::auth::validation::SignupForm;
use crate::errors::AppError;
use crate::models::{ProfileUpdate, Session, UserContext};
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub context: UserContext,
    pub effects: Vec<UiEffect>,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub session: Session,
    pub context: UserContext,
    pub effects: Vec<UiEffect>,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let (effects, mut rx) = Effects::channel();
    let context = state.auth.signup(&form, &effects).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            context,
            effects: drain(&mut rx),
        }),
    ))
}

/// POST /api/v1/auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let (effects, mut rx) = Effects::channel();
    let (session, context) = state.auth.sign_in(&req.email, &req.password, &effects).await?;
    Ok(Json(SignInResponse {
        session,
        context,
        effects: drain(&mut rx),
    }))
}

/// GET /api/v1/me
pub async fn handle_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserContext>, AppError> {
    match state.auth.authenticate(bearer_token(&headers)).await? {
        AuthState::Authenticated(context) => Ok(Json(context)),
        AuthState::Anonymous => Err(AppError::Unauthorized),
    }
}

/// PATCH /api/v1/me/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserContext>, AppError> {
    let account = state.auth.require_account(bearer_token(&headers)).await?;
    let context = state.auth.update_profile(&account, &update).await?;
    Ok(Json(context))
}

/// POST /api/v1/me/profile/repair
pub async fn handle_repair_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<UserContext>), AppError> {
    let account = state.auth.require_account(bearer_token(&headers)).await?;
    let context = state.auth.complete_profile(&account, &form).await?;
    Ok((StatusCode::CREATED, Json(context)))
}

/// GET /api/v1/hiredeck/access
pub async fn handle_hiredeck_access(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GateDecision>, AppError> {
    let decision = state
        .auth
        .check_access(bearer_token(&headers), &RoleGate::hiredeck())
        .await?;
    Ok(Json(decision))
}
