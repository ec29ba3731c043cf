//! Units of work and the collaborator seams they call into.
//!
//! A [`Job`] is built synchronously by a request handler, owns everything it
//! needs by value, is submitted to the pool once and consumed by exactly one
//! executor. The set of job kinds is closed so the failure contract of the
//! pool stays auditable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::error::{EmailError, JobError, PushError, RenderError};
use super::model::{Todo, UserId};

/// Default simulated latency of a [`Notification`].
pub const NOTIFICATION_LATENCY: Duration = Duration::from_secs(1);

/// A one-shot unit of work.
///
/// `process` takes `self` by value: a job cannot be run twice.
pub trait Process {
    /// Run the job to completion.
    ///
    /// # Errors
    ///
    /// Returns the collaborator failure that stopped the job.
    fn process(self) -> Result<(), JobError>;
}

/// Capability for sending email.
pub trait EmailSender: Send + Sync {
    /// Send one message to every address in `to`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the message could not be handed off.
    fn send_email(&self, to: &[String], subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Capability for rendering a todo report to a file.
pub trait ReportRenderer: Send + Sync {
    /// Render `records` for the given owner and return the written file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the document could not be produced.
    fn render(
        &self,
        owner: UserId,
        display_name: &str,
        contact: &str,
        records: &[Todo],
    ) -> Result<PathBuf, RenderError>;
}

/// One-way push channel towards a connected client. No acknowledgment.
pub trait PushChannel: Send + Sync {
    /// Push raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PushError`] when nobody can receive the message.
    fn send(&self, message: &[u8]) -> Result<(), PushError>;
}

/// Sends a notification; simulates delivery latency and always succeeds.
#[derive(Debug, Clone)]
pub struct Notification {
    title: String,
    latency: Duration,
}

impl Notification {
    /// Build a notification with the default latency.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            latency: NOTIFICATION_LATENCY,
        }
    }

    /// Override the simulated latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Notification text.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Process for Notification {
    fn process(self) -> Result<(), JobError> {
        info!(title = %self.title, "sending the notification");
        thread::sleep(self.latency);
        Ok(())
    }
}

/// Dispatches one email through an injected [`EmailSender`].
pub struct EmailJob {
    sender: Arc<dyn EmailSender>,
    to: Vec<String>,
    subject: String,
    body: String,
}

impl EmailJob {
    /// Build an email job.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Invalid`] when `to` is empty.
    pub fn new(
        sender: Arc<dyn EmailSender>,
        to: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, JobError> {
        if to.is_empty() {
            return Err(JobError::Invalid("email job requires at least one recipient".into()));
        }
        Ok(Self {
            sender,
            to,
            subject: subject.into(),
            body: body.into(),
        })
    }

    /// Recipients, in submission order.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.to
    }
}

impl Process for EmailJob {
    fn process(self) -> Result<(), JobError> {
        self.sender.send_email(&self.to, &self.subject, &self.body)?;
        Ok(())
    }
}

/// Renders a todo report from a snapshot and announces it on a push channel.
///
/// The records are captured when the job is built; nothing is re-fetched at
/// run time.
pub struct ReportJob {
    user_id: UserId,
    user_name: String,
    email: String,
    todos: Vec<Todo>,
    renderer: Arc<dyn ReportRenderer>,
    push: Arc<dyn PushChannel>,
}

impl ReportJob {
    /// Build a report job over an already-fetched snapshot.
    pub fn new(
        user_id: UserId,
        user_name: impl Into<String>,
        email: impl Into<String>,
        todos: Vec<Todo>,
        renderer: Arc<dyn ReportRenderer>,
        push: Arc<dyn PushChannel>,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            email: email.into(),
            todos,
            renderer,
            push,
        }
    }

    /// Message pushed once the document at `path` is ready.
    #[must_use]
    pub fn completion_message(path: &Path) -> String {
        let file = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
        format!("PDF generation complete. Download from: /download/{file}")
    }
}

impl Process for ReportJob {
    fn process(self) -> Result<(), JobError> {
        let path = self
            .renderer
            .render(self.user_id, &self.user_name, &self.email, &self.todos)?;

        let message = Self::completion_message(&path);
        if let Err(e) = self.push.send(message.as_bytes()) {
            warn!(user_id = self.user_id, error = %e, "report ready but completion notice was not delivered");
        }
        Ok(())
    }
}

/// Every kind of work the pool accepts.
pub enum Job {
    /// Simulated notification.
    Notification(Notification),
    /// Email dispatch.
    Email(EmailJob),
    /// Report generation plus completion notice.
    Report(ReportJob),
}

impl Job {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Notification(_) => "notification",
            Self::Email(_) => "email",
            Self::Report(_) => "report",
        }
    }
}

impl Process for Job {
    fn process(self) -> Result<(), JobError> {
        match self {
            Self::Notification(job) => job.process(),
            Self::Email(job) => job.process(),
            Self::Report(job) => job.process(),
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Job").field(&self.kind()).finish()
    }
}

impl From<Notification> for Job {
    fn from(job: Notification) -> Self {
        Self::Notification(job)
    }
}

impl From<EmailJob> for Job {
    fn from(job: EmailJob) -> Self {
        Self::Email(job)
    }
}

impl From<ReportJob> for Job {
    fn from(job: ReportJob) -> Self {
        Self::Report(job)
    }
}
