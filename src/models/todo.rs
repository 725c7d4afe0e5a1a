use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // Categories: letters, digits, spaces, underscores, hyphens
    static ref CATEGORY_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9 _-]*$").unwrap();
}

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

/// Payload for creating a todo.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTodoRequest {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TodoPriority>,

    /// Free-form grouping label, at most 50 characters.
    #[validate(
        length(max = 50),
        regex(
            path = "CATEGORY_REGEX",
            message = "Category must be alphanumeric, spaces, underscores, or hyphens"
        )
    )]
    pub category: Option<String>,

    /// RFC 3339 timestamp. Values that do not parse are stored as no due date.
    pub due_date: Option<String>,
}

/// Payload for replacing a todo's editable fields.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TodoPriority>,

    #[validate(
        length(max = 50),
        regex(
            path = "CATEGORY_REGEX",
            message = "Category must be alphanumeric, spaces, underscores, or hyphens"
        )
    )]
    pub category: Option<String>,

    pub due_date: Option<String>,

    pub completed: bool,
}

/// Normalized todo fields as handed to storage: trimmed strings, parsed due date.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// A todo as stored and returned by the API. Always owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parses an RFC 3339 date, treating blank or unparsable input as "no date".
pub fn parse_due_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
