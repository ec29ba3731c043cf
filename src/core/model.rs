//! Domain records shared by the repositories, services and jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user; also the rate-limit identity and token subject.
pub type UserId = i64;

/// Identifier of a todo, assigned by the repository.
pub type TodoId = i64;

/// A todo item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier (ignored on creation).
    #[serde(default)]
    pub id: TodoId,
    /// Short title.
    pub title: String,
    /// When the todo is due or was created; defaulted to now when absent.
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Owner; always overwritten with the authenticated caller.
    #[serde(default)]
    pub user_id: UserId,
}

impl Todo {
    /// Build an unsaved todo.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            datetime: None,
            description: description.into(),
            user_id: 0,
        }
    }
}

/// A registered user.
///
/// `password` holds the salted hash once stored and is never serialized back
/// out to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    #[serde(default)]
    pub user_id: UserId,
    /// Unique login name.
    pub user_name: String,
    /// Plain password on input, salted hash once stored.
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Contact address; may be empty.
    #[serde(default)]
    pub email: String,
}
