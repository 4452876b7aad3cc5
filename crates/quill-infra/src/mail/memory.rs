use std::sync::Mutex;

use async_trait::async_trait;

use quill_core::error::MailError;
use quill_core::ports::{Mailer, OutgoingEmail};

/// Mailer that records every message, for asserting on sent mail in tests.
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("mailer lock poisoned".to_string()))?
            .push(mail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sent_mail() {
        let mailer = InMemoryMailer::new();
        mailer
            .send(OutgoingEmail {
                to: "reader@example.com".to_string(),
                subject: "Hello".to_string(),
                body: "Check this out".to_string(),
            })
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "reader@example.com");
    }
}
