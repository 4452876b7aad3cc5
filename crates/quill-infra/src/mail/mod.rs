//! Outgoing mail adapters.
//!
//! `SmtpMailer` delivers over SMTP, `ConsoleMailer` logs instead of
//! sending, and `InMemoryMailer` records messages for tests.

mod console;
mod memory;

#[cfg(feature = "smtp")]
mod smtp;

pub use console::ConsoleMailer;
pub use memory::InMemoryMailer;

#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer};
