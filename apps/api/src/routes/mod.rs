pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::auth::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/signup", post(handlers::handle_signup))
        .route("/api/v1/auth/signin", post(handlers::handle_sign_in))
        // Current user
        .route("/api/v1/me", get(handlers::handle_me))
        .route("/api/v1/me/profile", patch(handlers::handle_update_profile))
        .route(
            "/api/v1/me/profile/repair",
            post(handlers::handle_repair_profile),
        )
        // HireDeck (HR only)
        .route(
            "/api/v1/hiredeck/access",
            get(handlers::handle_hiredeck_access),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::testing::Harness;

    fn app(h: &Harness) -> Router {
        build_router(AppState { auth: h.service() })
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn hr_body() -> Value {
        json!({
            "role": "HR",
            "full_name": "Ben Okafor",
            "email": "b@x.com",
            "password": "hunter22",
            "company_name": "Acme",
            "location": "Pune, India",
            "company_type": "Startup",
            "domain": "DevOps"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new();
        let (status, body) = send(app(&h), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_hr_signup_returns_context_and_effects() {
        let h = Harness::new();
        let (status, body) =
            send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["context"]["role"], "HR");
        assert_eq!(body["context"]["course_enrollment"], "N/A (HR User)");
        assert_eq!(body["effects"][1]["kind"], "open_window");
        assert_eq!(body["effects"][1]["path"], "/hiredeck");
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let h = Harness::new();
        send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        let (status, body) =
            send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_ACCOUNT");
        assert_eq!(h.profiles.count().await, 1);
    }

    #[tokio::test]
    async fn test_signup_validation_errors_are_listed() {
        let h = Harness::new();
        let (status, body) = send(
            app(&h),
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({"role": "Student", "email": "nope", "password": "123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["field"].as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["full_name", "email", "password", "degree", "graduation_year"]
        );
        assert_eq!(h.identity.count().await, 0);
    }

    #[tokio::test]
    async fn test_profile_failure_exposes_account_id() {
        let h = Harness::new();
        h.profiles.set_fail_inserts(true).await;
        let (status, body) =
            send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "PROFILE_CREATION_FAILED");
        assert!(body["error"]["account_id"].is_string());
    }

    #[tokio::test]
    async fn test_sign_in_me_and_hiredeck_access() {
        let h = Harness::new();
        send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;

        let (status, body) = send(
            app(&h),
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({"email": "b@x.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["session"]["access_token"].as_str().unwrap().to_string();

        let (status, me) = send(app(&h), Method::GET, "/api/v1/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["profile"]["full_name"], "Ben Okafor");

        let (_, access) =
            send(app(&h), Method::GET, "/api/v1/hiredeck/access", Some(&token), None).await;
        assert_eq!(access["decision"], "allow");
    }

    #[tokio::test]
    async fn test_anonymous_hiredeck_access_redirects() {
        let h = Harness::new();
        let (status, body) =
            send(app(&h), Method::GET, "/api/v1/hiredeck/access", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "redirect");
        assert_eq!(body["target"], "/");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let h = Harness::new();
        let (status, _) = send(app(&h), Method::GET, "/api/v1/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_change_via_patch_is_rejected() {
        let h = Harness::new();
        send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        let (_, body) = send(
            app(&h),
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({"email": "b@x.com", "password": "hunter22"})),
        )
        .await;
        let token = body["session"]["access_token"].as_str().unwrap().to_string();

        let (status, body) = send(
            app(&h),
            Method::PATCH,
            "/api/v1/me/profile",
            Some(&token),
            Some(json!({"role": "Student"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ROLE_IMMUTABLE");
    }

    #[tokio::test]
    async fn test_repair_creates_missing_profile() {
        let h = Harness::new();
        h.profiles.set_fail_inserts(true).await;
        send(app(&h), Method::POST, "/api/v1/auth/signup", None, Some(hr_body())).await;
        h.profiles.set_fail_inserts(false).await;

        let (_, body) = send(
            app(&h),
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({"email": "b@x.com", "password": "hunter22"})),
        )
        .await;
        assert!(body["context"]["profile"].is_null());
        let token = body["session"]["access_token"].as_str().unwrap().to_string();

        let (status, ctx) = send(
            app(&h),
            Method::POST,
            "/api/v1/me/profile/repair",
            Some(&token),
            Some(hr_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ctx["profile"]["role"], "HR");
        assert_eq!(h.profiles.count().await, 1);
    }
}
