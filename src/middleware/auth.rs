//! Auth extractor: authenticated user from a JWT bearer token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;

/// Extractor: authenticated user ID from JWT (Bearer token).
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!(error = %e, "rejected request: bad Authorization header");
                    AppError::Auth("Missing or invalid Authorization header".to_string())
                })?;
        let user_id = state.jwt_secret().validate(bearer.token())?;
        Ok(AuthUser(user_id))
    }
}
