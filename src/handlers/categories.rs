//! Email category HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;
use crate::models::{CategoryInput, CategoryListQuery, EmailCategory, Form, Page};

/// GET /api/email-categories
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Query(query), _): QueryParams<CategoryListQuery>,
) -> Result<Json<Page<EmailCategory>>, AppError> {
    let page = state
        .category_service()
        .list(query.search.as_deref(), query.pagination())
        .await?;
    Ok(Json(page))
}

/// GET /api/email-categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> Result<Json<EmailCategory>, AppError> {
    Ok(Json(state.category_service().get(id).await?))
}

/// POST /api/email-categories
pub async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Json(body), _): JsonBody<CategoryInput>,
) -> Result<(StatusCode, Json<EmailCategory>), AppError> {
    let row = state.category_service().create(body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/email-categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
    WithRejection(Json(body), _): JsonBody<CategoryInput>,
) -> Result<Json<EmailCategory>, AppError> {
    Ok(Json(state.category_service().update(id, body).await?))
}

/// DELETE /api/email-categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    state.category_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/email-categories/:id/form — the form bound to this category.
pub async fn get_category_form(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> Result<Json<Form>, AppError> {
    Ok(Json(state.form_service().get_by_category(id).await?))
}
