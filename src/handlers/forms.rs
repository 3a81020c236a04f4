//! Form builder HTTP handlers.

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
use crate::models::{Form, FormInput, FormListQuery, FormSummary, Page};

/// GET /api/forms
pub async fn list_forms(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Query(query), _): QueryParams<FormListQuery>,
) -> Result<Json<Page<FormSummary>>, AppError> {
    let page = state
        .form_service()
        .list(query.search.as_deref(), query.email_category_id, query.pagination())
        .await?;
    Ok(Json(page))
}

/// GET /api/forms/:id
pub async fn get_form(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> Result<Json<Form>, AppError> {
    Ok(Json(state.form_service().get(id).await?))
}

/// POST /api/forms — form, sections and fields in one transaction.
pub async fn create_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(body), _): JsonBody<FormInput>,
) -> Result<(StatusCode, Json<Form>), AppError> {
    let form = state.form_service().create(body, user_id).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

/// PUT /api/forms/:id — replaces all sections and fields.
pub async fn update_form(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
    WithRejection(Json(body), _): JsonBody<FormInput>,
) -> Result<Json<Form>, AppError> {
    Ok(Json(state.form_service().update(id, body).await?))
}

/// DELETE /api/forms/:id
pub async fn delete_form(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    state.form_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
