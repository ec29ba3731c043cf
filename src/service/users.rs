//! User use cases and password hashing.

use std::sync::Arc;

use crate::core::model::{User, UserId};
use crate::infra::store::{RepositoryError, UserRepository};

/// bcrypt work factor used when none is configured.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Hash `password` with bcrypt at `cost`; the salt is embedded in the output.
///
/// # Errors
///
/// Fails if `cost` is outside bcrypt's accepted range.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Whether `password` matches a value produced by [`hash_password`].
///
/// A malformed stored hash never matches.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// User registration, lookup and credential checks.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cost: u32,
}

impl UserService {
    /// Wrap a repository, hashing at [`DEFAULT_PASSWORD_COST`].
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            cost: DEFAULT_PASSWORD_COST,
        }
    }

    /// Override the bcrypt work factor.
    #[must_use]
    pub const fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Hash on the blocking pool.
    async fn hash(&self, password: String) -> Result<String, RepositoryError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| RepositoryError::Backend(format!("hashing task failed: {e}")))?
            .map_err(|e| RepositoryError::Backend(format!("password hashing failed: {e}")))
    }

    /// Register a user, hashing the supplied password.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if the name is taken, `RepositoryError::Backend`
    /// if hashing fails.
    pub async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        user.password = self.hash(std::mem::take(&mut user.password)).await?;
        self.repo.create(user).await
    }

    /// Look up by id.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if absent.
    pub async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    /// Look up by login name.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if absent.
    pub async fn get_by_name(&self, user_name: &str) -> Result<User, RepositoryError> {
        self.repo.get_by_name(user_name).await
    }

    /// Update a user. A non-empty password is re-hashed; an empty one keeps
    /// the stored hash.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the user does not exist.
    pub async fn update(&self, mut user: User) -> Result<(), RepositoryError> {
        if user.password.is_empty() {
            user.password = self.repo.get_by_id(user.user_id).await?.password;
        } else {
            user.password = self.hash(std::mem::take(&mut user.password)).await?;
        }
        self.repo.update(user).await
    }

    /// Delete by id.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if absent.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.repo.delete(id).await
    }

    /// Check a plain password against a stored hash.
    #[must_use]
    pub fn check_password(&self, password: &str, stored: &str) -> bool {
        verify_password(password, stored)
    }

    /// Resolve credentials to a user, `None` on any mismatch.
    ///
    /// # Errors
    ///
    /// Only backend failures are errors; unknown names yield `Ok(None)`.
    pub async fn authenticate(&self, user_name: &str, password: &str) -> Result<Option<User>, RepositoryError> {
        let user = match self.repo.get_by_name(user_name).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let password = password.to_owned();
        let stored = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| RepositoryError::Backend(format!("verification task failed: {e}")))?;
        Ok(matches.then_some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::InMemoryUserRepository;

    fn user(name: &str, password: &str) -> User {
        User {
            user_id: 0,
            user_name: name.into(),
            password: password.into(),
            email: format!("{name}@example.com"),
        }
    }

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new())).with_cost(4)
    }

    #[test]
    fn test_hash_is_salted_bcrypt() {
        let a = hash_password("pw", 4).unwrap();
        let b = hash_password("pw", 4).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$2"));
        assert!(verify_password("pw", &a));
        assert!(verify_password("pw", &b));
        assert!(!verify_password("other", &a));
        assert!(!verify_password("pw", "not-a-hash"));
    }

    #[test]
    fn test_hash_rejects_out_of_range_cost() {
        assert!(hash_password("pw", 2).is_err());
    }

    #[tokio::test]
    async fn test_create_with_bad_cost_is_backend_error() {
        let svc = UserService::new(Arc::new(InMemoryUserRepository::new())).with_cost(40);
        let err = svc.create(user("cy", "pw")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_plaintext() {
        let svc = service();
        let stored = svc.create(user("ana", "hunter2")).await.unwrap();
        assert_ne!(stored.password, "hunter2");
        assert!(svc.check_password("hunter2", &stored.password));

        assert!(svc.authenticate("ana", "hunter2").await.unwrap().is_some());
        assert!(svc.authenticate("ana", "wrong").await.unwrap().is_none());
        assert!(svc.authenticate("nobody", "hunter2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_hash_when_password_empty() {
        let svc = service();
        let stored = svc.create(user("ben", "first")).await.unwrap();

        let mut change = stored.clone();
        change.password = String::new();
        change.email = "ben@new.example".into();
        svc.update(change).await.unwrap();
        assert!(svc.authenticate("ben", "first").await.unwrap().is_some());

        let mut change = stored;
        change.password = "second".into();
        svc.update(change).await.unwrap();
        assert!(svc.authenticate("ben", "second").await.unwrap().is_some());
        assert!(svc.authenticate("ben", "first").await.unwrap().is_none());
    }
}
