use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - a reader comment attached to a post.
///
/// Only comments with `active = true` are rendered; the flag is flipped by
/// external moderation tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

/// Payload for creating a comment from a validated form submission.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i32,
    pub name: String,
    pub email: String,
    pub body: String,
}
