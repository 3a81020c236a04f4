//! Form builder models: field types, request payloads and the form aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::pagination::{PageParams, Pagination};

/// Input widget type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    Phone,
    Date,
    Select,
    Radio,
    Checkbox,
    File,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Phone => "phone",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
        }
    }

    /// Select, radio and checkbox fields pick from a list of options.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "email" => FieldType::Email,
            "number" => FieldType::Number,
            "phone" => FieldType::Phone,
            "date" => FieldType::Date,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "file" => FieldType::File,
            other => return Err(format!("unknown field type: {}", other)),
        })
    }
}

// ---- Request payloads ----

/// Body of `POST /api/forms` and `PUT /api/forms/:id`. Positions come from array order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FormInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub email_category_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 50), nested)]
    pub sections: Vec<SectionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SectionInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100), nested)]
    pub fields: Vec<FieldInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FieldInput {
    #[validate(length(min = 1, max = 64))]
    pub key: String,
    #[validate(length(min = 1, max = 255))]
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[validate(length(max = 255))]
    pub placeholder: Option<String>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub email_category_id: Option<Uuid>,
}

impl FormListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from(PageParams {
            page: self.page,
            per_page: self.per_page,
        })
    }
}

// ---- Aggregate ----

#[derive(Debug, Clone, Serialize)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub email_category_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSection {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
    pub position: i32,
}

/// List view of a form without its sections.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub email_category_id: Option<Uuid>,
    pub section_count: i64,
    pub field_count: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
