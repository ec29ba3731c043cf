//! Error types for jobs and the collaborators they call.

use thiserror::Error;

/// Failure reported by an email capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// No recipient was supplied.
    #[error("email requires at least one recipient")]
    NoRecipients,
    /// The transport refused or failed to deliver the message.
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Failure reported by a document renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the rendered document failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// The renderer rejected its input.
    #[error("invalid report input: {0}")]
    InvalidInput(String),
}

/// Failure reported by a push channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    /// Nobody is listening on the channel.
    #[error("no subscriber connected")]
    NoSubscribers,
    /// The channel has been closed.
    #[error("push channel closed")]
    Closed,
}

/// Errors produced while processing a unit of work.
///
/// The pool never inspects the variant for its own control flow; it only
/// distinguishes success from failure.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job was built with invalid input.
    #[error("invalid job: {0}")]
    Invalid(String),
    /// The email capability failed.
    #[error(transparent)]
    Email(#[from] EmailError),
    /// The renderer failed.
    #[error("failed to generate PDF: {0}")]
    Render(#[from] RenderError),
    /// `process()` panicked; caught at the executor boundary.
    #[error("job panicked: {0}")]
    Panicked(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
