use crate::auth::service::AuthService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Stores and the identity provider sit behind trait objects inside `AuthService`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
}
