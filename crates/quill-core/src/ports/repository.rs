use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Comment, CommentedPost, NewComment, Page, Post, SearchHit, Tag};
use crate::error::RepoError;

/// Post repository. Every query here is scoped to published posts and
/// ordered by publish time descending unless stated otherwise.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// One page of published posts, optionally restricted to a tag slug.
    /// The returned page is clamped to the last page when `page` overshoots.
    async fn list_published(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError>;

    /// Look up a published post by slug and publish date.
    async fn find_published_by_slug_and_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    async fn find_published_by_id(&self, id: i32) -> Result<Option<Post>, RepoError>;

    /// Published posts sharing at least one tag with the given post,
    /// excluding it, ordered by (shared-tag count desc, publish desc).
    async fn similar_to(&self, post_id: i32, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Weighted full-text search over title (weight A) and body (weight B).
    /// Results below `min_rank` are dropped; ordered by rank descending.
    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError>;

    async fn count_published(&self) -> Result<u64, RepoError>;

    /// The `limit` most recently published posts.
    async fn latest(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Published posts ordered by total comment count descending.
    async fn most_commented(&self, limit: u64) -> Result<Vec<CommentedPost>, RepoError>;

    /// Every published post (sitemap feed).
    async fn all_published(&self) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Active comments for a post, oldest first.
    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError>;

    /// Persist a new comment; it starts out active.
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Tags attached to a post, ordered by name.
    async fn for_post(&self, post_id: i32) -> Result<Vec<Tag>, RepoError>;
}
