//! Todo use cases.

use std::sync::Arc;

use chrono::Utc;

use crate::core::model::{Todo, TodoId, UserId};
use crate::infra::store::{RepositoryError, TodoRepository};

/// Todo operations scoped to the calling user.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    /// Wrap a repository.
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    /// Store `todo` for `owner`; a missing timestamp defaults to now.
    ///
    /// # Errors
    ///
    /// Propagates the repository error.
    pub async fn add(&self, owner: UserId, mut todo: Todo) -> Result<Todo, RepositoryError> {
        todo.user_id = owner;
        if todo.datetime.is_none() {
            todo.datetime = Some(Utc::now());
        }
        self.repo.add(todo).await
    }

    /// Every todo of `owner`.
    ///
    /// # Errors
    ///
    /// Propagates the repository error.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError> {
        self.repo.list(owner).await
    }

    /// One todo of `owner`.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if it does not exist or belongs to someone else.
    pub async fn get(&self, owner: UserId, id: TodoId) -> Result<Todo, RepositoryError> {
        self.repo.get(owner, id).await
    }

    /// Delete one todo of `owner`.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if it does not exist or belongs to someone else.
    pub async fn delete(&self, owner: UserId, id: TodoId) -> Result<(), RepositoryError> {
        self.repo.delete(owner, id).await
    }

    /// Delete every todo of `owner`.
    ///
    /// # Errors
    ///
    /// Propagates the repository error.
    pub async fn delete_all(&self, owner: UserId) -> Result<(), RepositoryError> {
        self.repo.delete_all(owner).await
    }
}
