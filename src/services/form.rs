//! Form builder: input rules and transactional create/update of the form aggregate.
//!
//! An update replaces the whole aggregate: the form row is locked, its sections
//! are deleted (fields cascade), and the new sections and fields are inserted in
//! request order. Everything happens in one transaction, so a failure at any
//! step leaves the stored form untouched.

use std::collections::HashSet;

use sqlx::PgConnection;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{FieldInput, Form, FormInput, FormSummary, Page, Pagination, SectionInput};

#[derive(Clone)]
pub struct FormService {
    db: DbPool,
}

impl FormService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        email_category_id: Option<Uuid>,
        page: Pagination,
    ) -> AppResult<Page<FormSummary>> {
        let (rows, total) = db::forms_list(&self.db, search, email_category_id, page).await?;
        Ok(Page::new(rows, page, total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Form> {
        let mut conn = self.db.acquire().await?;
        db::form_load(&mut conn, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// The form bound to an email category.
    pub async fn get_by_category(&self, category_id: Uuid) -> AppResult<Form> {
        let id = db::form_id_by_category(&self.db, category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No form for email category {}", category_id))
            })?;
        self.get(id).await
    }

    pub async fn create(&self, input: FormInput, created_by: Uuid) -> AppResult<Form> {
        let input = checked(input)?;
        let mut tx = self.db.begin().await?;

        if let Some(category_id) = input.email_category_id {
            ensure_category_available(&mut tx, category_id, None).await?;
        }
        let id = db::form_insert(
            &mut tx,
            &input.title,
            input.description.as_deref(),
            input.email_category_id,
            created_by,
        )
        .await?;
        db::sections_insert(&mut tx, id, &input.sections).await?;
        let form = db::form_load(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("form {} missing after insert", id)))?;

        tx.commit().await?;
        info!(form_id = %id, sections = form.sections.len(), "form created");
        Ok(form)
    }

    /// Replace title, category and all sections/fields of a form.
    pub async fn update(&self, id: Uuid, input: FormInput) -> AppResult<Form> {
        let input = checked(input)?;
        self.replace(id, input).await
    }

    /// Transactional half of `update`; `input` must already be checked.
    async fn replace(&self, id: Uuid, input: FormInput) -> AppResult<Form> {
        let mut tx = self.db.begin().await?;

        if !db::form_lock(&mut tx, id).await? {
            return Err(not_found(id));
        }
        if let Some(category_id) = input.email_category_id {
            ensure_category_available(&mut tx, category_id, Some(id)).await?;
        }
        db::form_update_header(
            &mut tx,
            id,
            &input.title,
            input.description.as_deref(),
            input.email_category_id,
        )
        .await?;
        let removed = db::sections_delete(&mut tx, id).await?;
        db::sections_insert(&mut tx, id, &input.sections).await?;
        let form = db::form_load(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        tx.commit().await?;
        info!(
            form_id = %id,
            removed_sections = removed,
            sections = form.sections.len(),
            "form updated"
        );
        Ok(form)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !db::form_delete(&self.db, id).await? {
            return Err(not_found(id));
        }
        info!(form_id = %id, "form deleted");
        Ok(())
    }
}

/// The category must exist and must not be bound to a form other than `form_id`.
async fn ensure_category_available(
    conn: &mut PgConnection,
    category_id: Uuid,
    form_id: Option<Uuid>,
) -> AppResult<()> {
    if !db::category_exists(&mut *conn, category_id).await? {
        return Err(AppError::Validation(format!(
            "email_category_id {} does not reference an existing category",
            category_id
        )));
    }
    match db::form_id_by_category(&mut *conn, category_id).await? {
        Some(owner) if Some(owner) != form_id => {
            debug!(category_id = %category_id, owner = %owner, "category already bound");
            Err(AppError::Conflict(format!(
                "Email category {} is already used by form {}",
                category_id, owner
            )))
        }
        _ => Ok(()),
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Form {} not found", id))
}

// ---- Input rules ----

/// Normalize and validate a form payload.
pub fn checked(input: FormInput) -> AppResult<FormInput> {
    let input = normalize(input);
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut seen = HashSet::new();
    for section in &input.sections {
        for field in &section.fields {
            check_field(field)?;
            if !seen.insert(field.key.as_str()) {
                return Err(AppError::Conflict(format!(
                    "Duplicate field key '{}'",
                    field.key
                )));
            }
        }
    }
    Ok(input)
}

fn check_field(field: &FieldInput) -> AppResult<()> {
    if !is_valid_key(&field.key) {
        return Err(AppError::Validation(format!(
            "Invalid field key '{}': must start with a letter and contain only letters, digits or '_'",
            field.key
        )));
    }
    match (&field.options, field.field_type.is_choice()) {
        (None, true) => Err(AppError::Validation(format!(
            "Field '{}' of type {} requires options",
            field.key, field.field_type
        ))),
        (Some(options), true) => {
            if options.is_empty() {
                return Err(AppError::Validation(format!(
                    "Field '{}' of type {} requires options",
                    field.key, field.field_type
                )));
            }
            let mut seen = HashSet::new();
            for option in options {
                if option.is_empty() {
                    return Err(AppError::Validation(format!(
                        "Field '{}' has an empty option",
                        field.key
                    )));
                }
                if !seen.insert(option.as_str()) {
                    return Err(AppError::Validation(format!(
                        "Field '{}' has duplicate option '{}'",
                        field.key, option
                    )));
                }
            }
            Ok(())
        }
        (Some(_), false) => Err(AppError::Validation(format!(
            "Field '{}' of type {} does not take options",
            field.key, field.field_type
        ))),
        (None, false) => Ok(()),
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn trimmed(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn normalize(input: FormInput) -> FormInput {
    FormInput {
        title: input.title.trim().to_string(),
        description: trimmed(input.description),
        email_category_id: input.email_category_id,
        sections: input
            .sections
            .into_iter()
            .map(|s| SectionInput {
                title: s.title.trim().to_string(),
                description: trimmed(s.description),
                fields: s
                    .fields
                    .into_iter()
                    .map(|f| FieldInput {
                        key: f.key.trim().to_string(),
                        label: f.label.trim().to_string(),
                        field_type: f.field_type,
                        required: f.required,
                        placeholder: trimmed(f.placeholder),
                        // empty list on a non-choice field is the same as none
                        options: f
                            .options
                            .map(|o| o.into_iter().map(|o| o.trim().to_string()).collect::<Vec<_>>())
                            .filter(|o| !o.is_empty() || f.field_type.is_choice()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn form(sections: serde_json::Value) -> FormInput {
        serde_json::from_value(json!({ "title": " Contact ", "sections": sections })).unwrap()
    }

    #[test]
    fn accepts_well_formed_form() {
        let input = assert_ok!(checked(form(json!([
            {
                "title": "About you",
                "fields": [
                    { "key": "full_name", "label": "Full name", "field_type": "text", "required": true },
                    { "key": "topic", "label": "Topic", "field_type": "select", "options": [" Sales ", "Support"] }
                ]
            },
            { "title": "Message", "fields": [{ "key": "body", "label": "Body", "field_type": "textarea" }] }
        ]))));
        assert_eq!(input.title, "Contact");
        assert_eq!(
            input.sections[0].fields[1].options.as_deref(),
            Some(&["Sales".to_string(), "Support".to_string()][..])
        );
    }

    #[test]
    fn duplicate_keys_across_sections_conflict() {
        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "email", "label": "Email", "field_type": "email" }] },
            { "title": "B", "fields": [{ "key": "email", "label": "Email again", "field_type": "email" }] }
        ]))));
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn key_format_is_enforced() {
        for key in ["1st", "_x", "has space", "dash-key", "é"] {
            let err = assert_err!(checked(form(json!([
                { "title": "A", "fields": [{ "key": key, "label": "L", "field_type": "text" }] }
            ]))));
            assert!(matches!(err, AppError::Validation(_)), "key {:?}", key);
        }
        assert!(is_valid_key("a"));
        assert!(is_valid_key("field_2"));
    }

    #[test]
    fn choice_fields_need_options() {
        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "pick", "label": "Pick", "field_type": "radio" }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));

        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "pick", "label": "Pick", "field_type": "checkbox", "options": [] }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn choice_options_must_be_unique_and_non_empty() {
        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "pick", "label": "Pick", "field_type": "select", "options": ["a", " a"] }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));

        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "pick", "label": "Pick", "field_type": "select", "options": ["a", "  "] }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn plain_fields_reject_options() {
        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "n", "label": "N", "field_type": "number", "options": ["1"] }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));

        let input = assert_ok!(checked(form(json!([
            { "title": "A", "fields": [{ "key": "n", "label": "N", "field_type": "number", "options": [] }] }
        ]))));
        assert!(input.sections[0].fields[0].options.is_none());
    }

    #[test]
    fn blank_titles_are_rejected_after_trimming() {
        let err = assert_err!(checked(form(json!([{ "title": "   " }]))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn too_many_sections_rejected() {
        let sections: Vec<_> = (0..51).map(|i| json!({ "title": format!("S{}", i) })).collect();
        let err = assert_err!(checked(form(serde_json::Value::Array(sections))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    fn section_with_fields(count: usize) -> serde_json::Value {
        let fields: Vec<_> = (0..count)
            .map(|i| json!({ "key": format!("f{}", i), "label": "L", "field_type": "text" }))
            .collect();
        json!([{ "title": "A", "fields": fields }])
    }

    #[test]
    fn fifty_sections_is_the_limit() {
        let sections: Vec<_> = (0..50).map(|i| json!({ "title": format!("S{}", i) })).collect();
        let input = assert_ok!(checked(form(serde_json::Value::Array(sections))));
        assert_eq!(input.sections.len(), 50);
    }

    #[test]
    fn hundred_fields_per_section_is_the_limit() {
        let input = assert_ok!(checked(form(section_with_fields(100))));
        assert_eq!(input.sections[0].fields.len(), 100);

        let err = assert_err!(checked(form(section_with_fields(101))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn key_length_limit_is_64() {
        let ok_key = format!("k{}", "a".repeat(63));
        assert_ok!(checked(form(json!([
            { "title": "A", "fields": [{ "key": ok_key, "label": "L", "field_type": "text" }] }
        ]))));

        let long_key = format!("k{}", "a".repeat(64));
        let err = assert_err!(checked(form(json!([
            { "title": "A", "fields": [{ "key": long_key, "label": "L", "field_type": "text" }] }
        ]))));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn non_ascii_options_and_labels_are_accepted() {
        let input = assert_ok!(checked(form(json!([
            {
                "title": "Préférences",
                "fields": [{
                    "key": "lang",
                    "label": "Langue / 言語",
                    "field_type": "radio",
                    "options": ["Français", "日本語", " Ünïcödé "]
                }]
            }
        ]))));
        assert_eq!(
            input.sections[0].fields[0].options.as_deref(),
            Some(&["Français".to_string(), "日本語".to_string(), "Ünïcödé".to_string()][..])
        );
    }

    // ---- Database-backed; skipped unless TEST_DATABASE_URL is set ----

    async fn test_service() -> Option<(FormService, Uuid)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = db::create_pool(&url, 2).await.ok()?;
        db::run_migrations(&pool).await.ok()?;
        let email = format!("svc-{}@example.com", Uuid::new_v4());
        let user = db::user_create(&pool, "Tester", &email, "unused-hash").await.ok()?;
        Some((FormService::new(pool), user.id))
    }

    #[tokio::test]
    async fn insert_failure_after_delete_rolls_back_update() {
        let Some((svc, user_id)) = test_service().await else { return };
        let original = svc
            .create(
                form(json!([
                    { "title": "A", "fields": [{ "key": "k", "label": "K", "field_type": "text" }] }
                ])),
                user_id,
            )
            .await
            .unwrap();

        // Skips `checked`, so the duplicate key only fails on the (form_id, key)
        // constraint, after the header update and the section delete ran.
        let mut dup = form(json!([
            { "title": "A", "fields": [{ "key": "k", "label": "K", "field_type": "text" }] },
            { "title": "B", "fields": [{ "key": "k", "label": "K", "field_type": "text" }] }
        ]));
        dup.title = "Renamed".to_string();
        let err = svc.replace(original.id, dup).await.unwrap_err();
        assert!(matches!(err, AppError::Db(_)));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let after = svc.get(original.id).await.unwrap();
        assert_eq!(after.title, "Contact");
        assert_eq!(after.updated_at, original.updated_at);
        let ids = |f: &Form| f.sections.iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids(&after), ids(&original));
        assert_eq!(after.sections[0].fields[0].id, original.sections[0].fields[0].id);

        svc.delete(original.id).await.unwrap();
    }

    #[tokio::test]
    async fn dangling_category_reference_maps_to_conflict() {
        let Some((svc, _)) = test_service().await else { return };
        let err: AppError = sqlx::query("INSERT INTO forms (title, email_category_id) VALUES ('orphan', $1)")
            .bind(Uuid::new_v4())
            .execute(&svc.db)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
