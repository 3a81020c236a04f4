//! Form aggregate persistence: forms, ordered sections and ordered fields.
//!
//! Multi-statement operations take a `&mut PgConnection` so the service can run
//! them inside one transaction; single-statement lookups accept any executor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgExecutor};
use uuid::Uuid;

use super::repositories::like_pattern;
use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{FieldType, Form, FormField, FormSection, FormSummary, Pagination, SectionInput};

#[derive(Debug, FromRow)]
struct FormRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    email_category_id: Option<Uuid>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SectionRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    position: i32,
}

#[derive(Debug, FromRow)]
struct FieldRow {
    id: Uuid,
    section_id: Uuid,
    key: String,
    label: String,
    field_type: String,
    required: bool,
    placeholder: Option<String>,
    options: Option<Vec<String>>,
    position: i32,
}

impl TryFrom<FieldRow> for FormField {
    type Error = AppError;

    fn try_from(r: FieldRow) -> Result<Self, Self::Error> {
        let field_type: FieldType = r
            .field_type
            .parse()
            .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(FormField {
            id: r.id,
            key: r.key,
            label: r.label,
            field_type,
            required: r.required,
            placeholder: r.placeholder,
            options: r.options.unwrap_or_default(),
            position: r.position,
        })
    }
}

// ---- Category references ----

pub async fn category_exists<'e, E: PgExecutor<'e>>(exec: E, category_id: Uuid) -> AppResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM email_categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(exec)
            .await?;
    Ok(exists)
}

/// Id of the form bound to a category, if any.
pub async fn form_id_by_category<'e, E: PgExecutor<'e>>(
    exec: E,
    category_id: Uuid,
) -> AppResult<Option<Uuid>> {
    let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM forms WHERE email_category_id = $1")
        .bind(category_id)
        .fetch_optional(exec)
        .await?;
    Ok(id)
}

// ---- Form header ----

pub async fn form_insert(
    conn: &mut PgConnection,
    title: &str,
    description: Option<&str>,
    email_category_id: Option<Uuid>,
    created_by: Uuid,
) -> AppResult<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO forms (title, description, email_category_id, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(email_category_id)
    .bind(created_by)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Row-lock the form for the rest of the transaction. `false` when it does not exist.
pub async fn form_lock(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    let row: Option<Uuid> = sqlx::query_scalar("SELECT id FROM forms WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

pub async fn form_update_header(
    conn: &mut PgConnection,
    id: Uuid,
    title: &str,
    description: Option<&str>,
    email_category_id: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE forms
        SET title = $1, description = $2, email_category_id = $3, updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(email_category_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns `false` when no row matched. Sections and fields cascade.
pub async fn form_delete(pool: &DbPool, id: Uuid) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM forms WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

// ---- Sections and fields ----

/// Delete every section of a form; fields go with them.
pub async fn sections_delete(conn: &mut PgConnection, form_id: Uuid) -> AppResult<u64> {
    let r = sqlx::query("DELETE FROM form_sections WHERE form_id = $1")
        .bind(form_id)
        .execute(&mut *conn)
        .await?;
    Ok(r.rows_affected())
}

/// Insert sections and their fields, positions taken from slice order.
pub async fn sections_insert(
    conn: &mut PgConnection,
    form_id: Uuid,
    sections: &[SectionInput],
) -> AppResult<()> {
    for (section_pos, section) in sections.iter().enumerate() {
        let section_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO form_sections (form_id, title, description, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(form_id)
        .bind(&section.title)
        .bind(section.description.as_deref())
        .bind(section_pos as i32)
        .fetch_one(&mut *conn)
        .await?;

        for (field_pos, field) in section.fields.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO form_fields
                    (form_id, section_id, key, label, field_type, required, placeholder, options, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(form_id)
            .bind(section_id)
            .bind(&field.key)
            .bind(&field.label)
            .bind(field.field_type.as_str())
            .bind(field.required)
            .bind(field.placeholder.as_deref())
            .bind(field.options.clone())
            .bind(field_pos as i32)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

// ---- Reads ----

/// Load the full aggregate: sections by position, fields by position within their section.
pub async fn form_load(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Form>> {
    let Some(head) = sqlx::query_as::<_, FormRow>(
        r#"
        SELECT id, title, description, email_category_id, created_by, created_at, updated_at
        FROM forms WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    else {
        return Ok(None);
    };

    let section_rows = sqlx::query_as::<_, SectionRow>(
        "SELECT id, title, description, position FROM form_sections WHERE form_id = $1 ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let field_rows = sqlx::query_as::<_, FieldRow>(
        r#"
        SELECT id, section_id, key, label, field_type, required, placeholder, options, position
        FROM form_fields WHERE form_id = $1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_section: HashMap<Uuid, Vec<FormField>> = HashMap::new();
    for row in field_rows {
        let section_id = row.section_id;
        by_section
            .entry(section_id)
            .or_default()
            .push(FormField::try_from(row)?);
    }

    let sections = section_rows
        .into_iter()
        .map(|s| FormSection {
            fields: by_section.remove(&s.id).unwrap_or_default(),
            id: s.id,
            title: s.title,
            description: s.description,
            position: s.position,
        })
        .collect();

    Ok(Some(Form {
        id: head.id,
        title: head.title,
        description: head.description,
        email_category_id: head.email_category_id,
        created_by: head.created_by,
        created_at: head.created_at,
        updated_at: head.updated_at,
        sections,
    }))
}

pub async fn forms_list(
    pool: &DbPool,
    search: Option<&str>,
    email_category_id: Option<Uuid>,
    page: Pagination,
) -> AppResult<(Vec<FormSummary>, i64)> {
    let pattern = like_pattern(search);
    let rows = sqlx::query_as::<_, FormSummary>(
        r#"
        SELECT f.id, f.title, f.description, f.email_category_id,
               (SELECT COUNT(*) FROM form_sections s WHERE s.form_id = f.id) AS section_count,
               (SELECT COUNT(*) FROM form_fields ff WHERE ff.form_id = f.id) AS field_count,
               f.created_by, f.created_at, f.updated_at
        FROM forms f
        WHERE ($1::text IS NULL OR f.title ILIKE $1)
          AND ($2::uuid IS NULL OR f.email_category_id = $2)
        ORDER BY f.updated_at DESC, f.id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(pattern.as_deref())
    .bind(email_category_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM forms f
        WHERE ($1::text IS NULL OR f.title ILIKE $1)
          AND ($2::uuid IS NULL OR f.email_category_id = $2)
        "#,
    )
    .bind(pattern.as_deref())
    .bind(email_category_id)
    .fetch_one(pool)
    .await?;
    Ok((rows, total))
}
