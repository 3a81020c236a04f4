//! Auth HTTP handlers: register, login, current user.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::handlers::extract::JsonBody;
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let body = RegisterRequest {
        name: body.name.trim().to_string(),
        email: body.email.trim().to_string(),
        password: body.password,
    };
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let (user, token) = state
        .auth_service()
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, token) = state.auth_service().login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
        },
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.auth_service().current_user(user_id).await?;
    Ok(Json(MeResponse {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
        created_at: user.created_at.to_rfc3339(),
    }))
}
