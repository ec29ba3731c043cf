//! In-memory repositories.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{RepositoryError, TodoRepository, UserRepository};
use crate::core::model::{Todo, TodoId, User, UserId};

fn todo_not_found(id: TodoId) -> RepositoryError {
    RepositoryError::NotFound(format!("todo {id}"))
}

fn user_not_found(id: UserId) -> RepositoryError {
    RepositoryError::NotFound(format!("user {id}"))
}

/// Todos keyed by id; ids start at 1.
#[derive(Debug)]
pub struct InMemoryTodoRepository {
    todos: RwLock<BTreeMap<TodoId, Todo>>,
    next_id: AtomicI64,
}

impl InMemoryTodoRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            todos: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn add(&self, mut todo: Todo) -> Result<Todo, RepositoryError> {
        todo.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.todos.write().insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError> {
        Ok(self
            .todos
            .read()
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect())
    }

    async fn get(&self, owner: UserId, id: TodoId) -> Result<Todo, RepositoryError> {
        self.todos
            .read()
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned()
            .ok_or_else(|| todo_not_found(id))
    }

    async fn delete(&self, owner: UserId, id: TodoId) -> Result<(), RepositoryError> {
        let mut todos = self.todos.write();
        match todos.get(&id) {
            Some(t) if t.user_id == owner => {
                todos.remove(&id);
                Ok(())
            }
            _ => Err(todo_not_found(id)),
        }
    }

    async fn delete_all(&self, owner: UserId) -> Result<(), RepositoryError> {
        self.todos.write().retain(|_, t| t.user_id != owner);
        Ok(())
    }
}

/// Users keyed by id with unique names; ids start at 1.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<UserId, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write();
        if users.values().any(|u| u.user_name == user.user_name) {
            return Err(RepositoryError::Conflict(format!(
                "user name {} already taken",
                user.user_name
            )));
        }
        user.user_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        self.users.read().get(&id).cloned().ok_or_else(|| user_not_found(id))
    }

    async fn get_by_name(&self, user_name: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .values()
            .find(|u| u.user_name == user_name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("user {user_name}")))
    }

    async fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.write();
        if users
            .values()
            .any(|u| u.user_name == user.user_name && u.user_id != user.user_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "user name {} already taken",
                user.user_name
            )));
        }
        match users.get_mut(&user.user_id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(user_not_found(user.user_id)),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.users
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| user_not_found(id))
    }
}
