//! Email capability that logs instead of delivering.

use tracing::info;

use crate::config::SmtpConfig;
use crate::core::error::EmailError;
use crate::core::job::EmailSender;

/// Logs every message it is asked to send. Stands in for an SMTP transport.
#[derive(Debug, Clone)]
pub struct LogEmailSender {
    from: String,
    relay: String,
}

impl LogEmailSender {
    /// Build from the SMTP settings; only the sender and relay are used.
    #[must_use]
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            from: config.from.clone(),
            relay: format!("{}:{}", config.host, config.port),
        }
    }
}

impl EmailSender for LogEmailSender {
    fn send_email(&self, to: &[String], subject: &str, body: &str) -> Result<(), EmailError> {
        if to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        info!(
            from = %self.from,
            relay = %self.relay,
            to = ?to,
            subject = subject,
            body_len = body.len(),
            "sending email"
        );
        Ok(())
    }
}
