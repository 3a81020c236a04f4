//! Email category management: name uniqueness and reference checks.

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{CategoryInput, EmailCategory, Page, Pagination};

#[derive(Clone)]
pub struct CategoryService {
    db: DbPool,
}

impl CategoryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> AppResult<Page<EmailCategory>> {
        let (rows, total) = db::categories_list(&self.db, search, page).await?;
        Ok(Page::new(rows, page, total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<EmailCategory> {
        db::category_get_by_id(&self.db, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<EmailCategory> {
        let input = checked(input)?;
        if db::category_find_by_name(&self.db, &input.name).await?.is_some() {
            debug!(name = %input.name, "category name taken");
            return Err(name_taken(&input.name));
        }
        let row = db::category_create(&self.db, &input.name, input.description.as_deref()).await?;
        info!(category_id = %row.id, name = %row.name, "email category created");
        Ok(row)
    }

    pub async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<EmailCategory> {
        let input = checked(input)?;
        self.get(id).await?;
        if let Some(existing) = db::category_find_by_name(&self.db, &input.name).await? {
            if existing.id != id {
                debug!(name = %input.name, "category name taken");
                return Err(name_taken(&input.name));
            }
        }
        let row = db::category_update(&self.db, id, &input.name, input.description.as_deref())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(category_id = %row.id, "email category updated");
        Ok(row)
    }

    /// Refuses while a form still references the category.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if let Some(form_id) = db::form_id_by_category(&self.db, id).await? {
            debug!(category_id = %id, form_id = %form_id, "category in use");
            return Err(AppError::Conflict(format!(
                "Email category is used by form {}",
                form_id
            )));
        }
        if !db::category_delete(&self.db, id).await? {
            return Err(not_found(id));
        }
        info!(category_id = %id, "email category deleted");
        Ok(())
    }
}

fn checked(input: CategoryInput) -> AppResult<CategoryInput> {
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(input)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Email category {} not found", id))
}

fn name_taken(name: &str) -> AppError {
    AppError::Conflict(format!("Email category '{}' already exists", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn checked_trims_before_validating() {
        let input = assert_ok!(checked(CategoryInput {
            name: "  Promotions  ".to_string(),
            description: None,
        }));
        assert_eq!(input.name, "Promotions");
    }

    #[test]
    fn checked_rejects_whitespace_only_name() {
        let err = assert_err!(checked(CategoryInput {
            name: "   ".to_string(),
            description: Some("desc".to_string()),
        }));
        assert!(matches!(err, AppError::Validation(_)));
    }
}
