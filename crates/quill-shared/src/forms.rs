//! Form payloads and their validation.
//!
//! Validation never fails a request: handlers re-render the page with the
//! collected error messages and the submitted values.

use serde::{Deserialize, Serialize};

const COMMENT_NAME_MAX: usize = 80;
const SHARE_NAME_MAX: usize = 25;
const EMAIL_MAX: usize = 254;

/// Comment submission on the post detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

impl CommentForm {
    /// Trim all fields and collect validation errors.
    pub fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.push("Name is required".to_string());
        } else if self.name.len() > COMMENT_NAME_MAX {
            errors.push(format!("Name must be at most {COMMENT_NAME_MAX} characters"));
        }

        if let Err(e) = clean_email(&mut self.email) {
            errors.push(e);
        }

        self.body = self.body.trim().to_string();
        if self.body.is_empty() {
            errors.push("Comment body is required".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Share-a-post-by-email submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Recipient address.
    #[serde(default)]
    pub to: String,
    /// Optional note included in the email body.
    #[serde(default)]
    pub comments: String,
}

impl ShareForm {
    pub fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.push("Name is required".to_string());
        } else if self.name.len() > SHARE_NAME_MAX {
            errors.push(format!("Name must be at most {SHARE_NAME_MAX} characters"));
        }

        if let Err(e) = clean_email(&mut self.email) {
            errors.push(e);
        }

        if let Err(e) = clean_email(&mut self.to) {
            errors.push(format!("Recipient: {}", e));
        }

        self.comments = self.comments.trim().to_string();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Free-text search submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

impl SearchForm {
    /// Returns the trimmed query if it is usable.
    pub fn validate(&self) -> Result<String, Vec<String>> {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return Err(vec!["Search query is required".to_string()]);
        }
        Ok(query)
    }
}

fn clean_email(email: &mut String) -> Result<(), String> {
    *email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > EMAIL_MAX {
        return Err(format!("Email must be at most {EMAIL_MAX} characters"));
    }
    // Same shallow shape check the rest of the stack relies on; real
    // verification happens when the mail bounces.
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}
