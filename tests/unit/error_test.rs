//! Tests for error types

use todo_taskq::core::{EmailError, JobError, PoolError, PushError, RateLimitError, RenderError, StoreError};
use todo_taskq::infra::RepositoryError;
use todo_taskq::service::TokenError;

#[test]
fn test_pool_error_messages() {
    assert_eq!(format!("{}", PoolError::QueueFull), "work queue is full");
    assert_eq!(format!("{}", PoolError::PoolShutdown), "pool has been shut down");
    assert_eq!(format!("{}", PoolError::Cancelled), "pool has been cancelled");
    assert_eq!(format!("{}", PoolError::AlreadyStarted), "pool has already been started");
}

#[test]
fn test_job_error_wraps_collaborators() {
    let err = JobError::from(RenderError::InvalidInput("no rows".into()));
    assert_eq!(format!("{err}"), "failed to generate PDF: invalid report input: no rows");

    let err = JobError::from(EmailError::NoRecipients);
    assert_eq!(format!("{err}"), "email requires at least one recipient");
}

#[test]
fn test_store_error_is_wrapped_by_limiter_error() {
    let err = RateLimitError::from(StoreError::Unavailable("refused".into()));
    assert_eq!(format!("{err}"), "rate limiter store error: counter store unavailable: refused");
}

#[test]
fn test_collaborator_error_messages() {
    assert_eq!(format!("{}", PushError::NoSubscribers), "no subscriber connected");
    assert_eq!(format!("{}", RepositoryError::NotFound("todo 4".into())), "todo 4 not found");
    assert_eq!(format!("{}", TokenError::Invalid("expired".into())), "invalid token: expired");
}
