use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Publication status of a post. Transitions (draft -> published) are driven
/// by external authoring tooling; this codebase only reads the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

/// Post entity - a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
}

impl Post {
    /// Create a post with timestamps derived from the publish time.
    pub fn new(
        id: i32,
        author_id: i32,
        title: impl Into<String>,
        slug: impl Into<String>,
        body: impl Into<String>,
        publish: DateTime<Utc>,
        status: PostStatus,
    ) -> Self {
        Self {
            id,
            author_id,
            title: title.into(),
            slug: slug.into(),
            body: body.into(),
            publish,
            created_at: publish,
            updated_at: publish,
            status,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Canonical URL path of the post detail page.
    pub fn url_path(&self) -> String {
        format!(
            "/{}/{}/{}/{}",
            self.publish.year(),
            self.publish.month(),
            self.publish.day(),
            self.slug
        )
    }
}

/// A search result with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub post: Post,
    pub rank: f32,
}

/// A post annotated with its comment count.
#[derive(Debug, Clone, Serialize)]
pub struct CommentedPost {
    pub post: Post,
    pub total_comments: i64,
}
