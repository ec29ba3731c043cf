//! Repositories for users and todos.
//!
//! Storage sits behind async traits so the HTTP layer and services never see
//! the backend. The bundled implementations are in-memory.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::model::{Todo, TodoId, User, UserId};

pub use memory::{InMemoryTodoRepository, InMemoryUserRepository};

/// Errors returned by repositories.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record matched.
    #[error("{0} not found")]
    NotFound(String),
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Todo storage scoped by owner.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Store a new todo and return it with its assigned id.
    async fn add(&self, todo: Todo) -> Result<Todo, RepositoryError>;

    /// Every todo of `owner`, in id order.
    async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError>;

    /// One todo of `owner`.
    async fn get(&self, owner: UserId, id: TodoId) -> Result<Todo, RepositoryError>;

    /// Delete one todo of `owner`.
    async fn delete(&self, owner: UserId, id: TodoId) -> Result<(), RepositoryError>;

    /// Delete every todo of `owner`.
    async fn delete_all(&self, owner: UserId) -> Result<(), RepositoryError>;
}

/// User storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user and return it with its assigned id.
    async fn create(&self, user: User) -> Result<User, RepositoryError>;

    /// Look up by id.
    async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError>;

    /// Look up by login name.
    async fn get_by_name(&self, user_name: &str) -> Result<User, RepositoryError>;

    /// Replace a stored user.
    async fn update(&self, user: User) -> Result<(), RepositoryError>;

    /// Delete by id.
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}
