use async_trait::async_trait;

use crate::error::MailError;

/// An outbound plain-text email.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail dispatch port. Implementations: SMTP, console, in-memory.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError>;
}
