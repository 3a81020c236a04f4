//! Repositories: users, email categories.

use crate::error::AppResult;
use crate::models::{EmailCategory, Pagination};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;

/// `ILIKE` pattern for a substring search; `None` when the search is blank.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    let s = search.map(str::trim).filter(|s| !s.is_empty())?;
    let escaped = s
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

// ---- User ----

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub async fn user_create(
    pool: &DbPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, password_hash, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn user_find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn user_get_by_id(pool: &DbPool, id: Uuid) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

// ---- Email categories ----

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

pub async fn category_create(
    pool: &DbPool,
    name: &str,
    description: Option<&str>,
) -> AppResult<EmailCategory> {
    let row = sqlx::query_as::<_, EmailCategory>(&format!(
        "INSERT INTO email_categories (name, description) VALUES ($1, $2) RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn category_get_by_id(pool: &DbPool, id: Uuid) -> AppResult<Option<EmailCategory>> {
    let row = sqlx::query_as::<_, EmailCategory>(&format!(
        "SELECT {} FROM email_categories WHERE id = $1",
        CATEGORY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Case-insensitive lookup by name.
pub async fn category_find_by_name(pool: &DbPool, name: &str) -> AppResult<Option<EmailCategory>> {
    let row = sqlx::query_as::<_, EmailCategory>(&format!(
        "SELECT {} FROM email_categories WHERE LOWER(name) = LOWER($1)",
        CATEGORY_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn categories_list(
    pool: &DbPool,
    search: Option<&str>,
    page: Pagination,
) -> AppResult<(Vec<EmailCategory>, i64)> {
    let pattern = like_pattern(search);
    let rows = sqlx::query_as::<_, EmailCategory>(&format!(
        r#"
        SELECT {} FROM email_categories
        WHERE ($1::text IS NULL OR name ILIKE $1)
        ORDER BY LOWER(name), id
        LIMIT $2 OFFSET $3
        "#,
        CATEGORY_COLUMNS
    ))
    .bind(pattern.as_deref())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM email_categories WHERE ($1::text IS NULL OR name ILIKE $1)",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;
    Ok((rows, total))
}

pub async fn category_update(
    pool: &DbPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> AppResult<Option<EmailCategory>> {
    let row = sqlx::query_as::<_, EmailCategory>(&format!(
        r#"
        UPDATE email_categories SET name = $1, description = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING {}
        "#,
        CATEGORY_COLUMNS
    ))
    .bind(name)
    .bind(description)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns `false` when no row matched.
pub async fn category_delete(pool: &DbPool, id: Uuid) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM email_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("news")).as_deref(), Some("%news%"));
        assert_eq!(like_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }
}
