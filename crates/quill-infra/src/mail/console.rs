use async_trait::async_trait;

use quill_core::error::MailError;
use quill_core::ports::{Mailer, OutgoingEmail};

/// Mailer that logs messages instead of delivering them. Used when no
/// SMTP host is configured.
#[derive(Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "outgoing email (console backend)");
        tracing::debug!(body = %mail.body, "email body");
        Ok(())
    }
}
