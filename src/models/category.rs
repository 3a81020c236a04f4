//! Email category model and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::pagination::{PageParams, Pagination};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmailCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST` and `PUT /api/email-categories`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl CategoryInput {
    /// Trim the name and drop blank descriptions.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

impl CategoryListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from(PageParams {
            page: self.page,
            per_page: self.per_page,
        })
    }
}
