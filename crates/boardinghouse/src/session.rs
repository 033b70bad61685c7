//! Minimal sign-in: validates the form and echoes a session user. There is
//! no credential store behind it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Please fill in all fields")]
    MissingFields,
}

pub fn login(request: LoginRequest) -> Result<SessionUser, LoginError> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(LoginError::MissingFields);
    }

    let name = match request.role {
        Role::Admin => "Admin User".to_string(),
        Role::Student => username.to_string(),
    };
    Ok(SessionUser {
        id: 1,
        username: username.to_string(),
        role: request.role,
        name,
    })
}

pub fn session_router() -> Router {
    Router::new().route("/api/login", post(login_handler))
}

pub(crate) async fn login_handler(Json(request): Json<LoginRequest>) -> Response {
    match login(request) {
        Ok(user) => {
            info!(username = %user.username, role = ?user.role, "user signed in");
            (StatusCode::OK, Json(user)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn admin_gets_admin_display_name() {
        let user = login(LoginRequest {
            username: " registrar ".to_string(),
            password: "secret".to_string(),
            role: Role::Admin,
        })
        .expect("valid login");

        assert_eq!(user.username, "registrar");
        assert_eq!(user.name, "Admin User");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn blank_username_is_rejected() {
        let result = login(LoginRequest {
            username: "   ".to_string(),
            password: "secret".to_string(),
            role: Role::Student,
        });

        assert_eq!(result, Err(LoginError::MissingFields));
    }

    #[tokio::test]
    async fn missing_password_returns_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username":"maria","role":"student"}"#))
            .expect("request");

        let response = session_router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please fill in all fields");
    }
}
