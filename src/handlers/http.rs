//! Shared application state and the health probe.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::{AuthAppService, JwtSecret};
use crate::db::DbPool;
use crate::services::{CategoryService, FormService};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: JwtSecret,
    pub auth_service: AuthAppService,
    pub category_service: CategoryService,
    pub form_service: FormService,
}

impl AppState {
    /// Wire every service onto one pool and signing secret.
    pub fn new(db: DbPool, jwt_secret: JwtSecret) -> Self {
        Self {
            auth_service: AuthAppService::new(db.clone(), jwt_secret.clone()),
            category_service: CategoryService::new(db.clone()),
            form_service: FormService::new(db),
            jwt_secret,
        }
    }

    pub fn jwt_secret(&self) -> &JwtSecret {
        &self.jwt_secret
    }
    pub fn auth_service(&self) -> &AuthAppService {
        &self.auth_service
    }
    pub fn category_service(&self) -> &CategoryService {
        &self.category_service
    }
    pub fn form_service(&self) -> &FormService {
        &self.form_service
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "formcms" })),
    )
}
