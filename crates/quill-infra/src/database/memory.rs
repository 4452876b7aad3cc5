//! In-memory implementation of the repository ports.
//!
//! Used as the fallback when no database is configured and as the test
//! double for handler tests. Query semantics mirror the PostgreSQL
//! repositories so the ordering and filtering contracts can be exercised
//! without a live database.

use std::cmp::Ordering;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use quill_core::domain::{Comment, CommentedPost, NewComment, Page, Post, SearchHit, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, TagRepository};

// Weight classes applied by the Postgres search vector; a term found in the
// title counts as class A, in the body as class B.
const TITLE_WEIGHT: f32 = 1.0;
const BODY_WEIGHT: f32 = 0.4;

#[derive(Default)]
struct Store {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    tags: Vec<Tag>,
    post_tags: Vec<(i32, i32)>,
    next_comment_id: i32,
}

/// In-memory blog store implementing all repository ports.
#[derive(Default)]
pub struct InMemoryBlog {
    inner: RwLock<Store>,
}

impl InMemoryBlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post with its tags, creating tags by slug as needed.
    pub fn add_post(&self, post: Post, tag_names: &[&str]) {
        let mut store = self.inner.write().expect("store lock poisoned");
        for name in tag_names {
            let slug = slugify(name);
            let tag_id = match store.tags.iter().find(|t| t.slug == slug) {
                Some(tag) => tag.id,
                None => {
                    let id = store.tags.len() as i32 + 1;
                    store.tags.push(Tag {
                        id,
                        name: name.to_string(),
                        slug,
                    });
                    id
                }
            };
            store.post_tags.push((post.id, tag_id));
        }
        store.posts.push(post);
    }

    /// Insert a comment directly, bypassing form validation (fixtures).
    pub fn add_comment(&self, post_id: i32, name: &str, email: &str, body: &str, active: bool) {
        let mut store = self.inner.write().expect("store lock poisoned");
        store.next_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: store.next_comment_id,
            post_id,
            name: name.to_string(),
            email: email.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
            active,
        };
        store.comments.push(comment);
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>, RepoError> {
        self.inner
            .read()
            .map_err(|_| RepoError::Query("store lock poisoned".to_string()))
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl Store {
    fn published(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish));
        posts
    }

    fn tag_ids_for(&self, post_id: i32) -> Vec<i32> {
        self.post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .map(|(_, t)| *t)
            .collect()
    }
}

/// Term-averaged rank approximating the Postgres weighted search vector.
fn rank(post: &Post, terms: &[String]) -> f32 {
    let title = post.title.to_lowercase();
    let body = post.body.to_lowercase();
    let mut total = 0.0;
    for term in terms {
        if title.contains(term.as_str()) {
            total += TITLE_WEIGHT;
        } else if body.contains(term.as_str()) {
            total += BODY_WEIGHT;
        }
    }
    total / terms.len() as f32
}

#[async_trait]
impl PostRepository for InMemoryBlog {
    async fn list_published(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.read()?;
        let mut posts = store.published();

        if let Some(slug) = tag_slug {
            let tag_id = store.tags.iter().find(|t| t.slug == slug).map(|t| t.id);
            posts.retain(|p| {
                tag_id.is_some_and(|id| store.post_tags.contains(&(p.id, id)))
            });
        }

        let total_items = posts.len() as u64;
        let total_pages = Page::<Post>::pages_for(total_items, per_page);
        let number = Page::<Post>::clamp(page, total_pages);

        let start = ((number - 1) * per_page) as usize;
        let items = posts
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok(Page {
            items,
            number,
            total_pages,
            total_items,
            per_page,
        })
    }

    async fn find_published_by_slug_and_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let store = self.read()?;
        Ok(store
            .posts
            .iter()
            .find(|p| p.is_published() && p.slug == slug && p.publish.date_naive() == date)
            .cloned())
    }

    async fn find_published_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let store = self.read()?;
        Ok(store
            .posts
            .iter()
            .find(|p| p.is_published() && p.id == id)
            .cloned())
    }

    async fn similar_to(&self, post_id: i32, limit: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.read()?;
        let tag_ids = store.tag_ids_for(post_id);

        let mut candidates: Vec<(usize, Post)> = store
            .published()
            .into_iter()
            .filter(|p| p.id != post_id)
            .filter_map(|p| {
                let shared = store
                    .tag_ids_for(p.id)
                    .iter()
                    .filter(|t| tag_ids.contains(t))
                    .count();
                (shared > 0).then_some((shared, p))
            })
            .collect();

        candidates.sort_by(|(shared_a, a), (shared_b, b)| {
            shared_b
                .cmp(shared_a)
                .then_with(|| b.publish.cmp(&a.publish))
        });

        Ok(candidates
            .into_iter()
            .take(limit as usize)
            .map(|(_, p)| p)
            .collect())
    }

    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.read()?;
        let mut hits: Vec<SearchHit> = store
            .published()
            .into_iter()
            .map(|post| {
                let rank = rank(&post, &terms);
                SearchHit { post, rank }
            })
            .filter(|hit| hit.rank >= min_rank)
            .collect();

        hits.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.post.publish.cmp(&a.post.publish))
        });

        Ok(hits)
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        let store = self.read()?;
        Ok(store.posts.iter().filter(|p| p.is_published()).count() as u64)
    }

    async fn latest(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.read()?;
        Ok(store.published().into_iter().take(limit as usize).collect())
    }

    async fn most_commented(&self, limit: u64) -> Result<Vec<CommentedPost>, RepoError> {
        let store = self.read()?;
        let mut posts: Vec<CommentedPost> = store
            .published()
            .into_iter()
            .map(|post| {
                let total_comments = store
                    .comments
                    .iter()
                    .filter(|c| c.post_id == post.id)
                    .count() as i64;
                CommentedPost {
                    post,
                    total_comments,
                }
            })
            .collect();

        posts.sort_by(|a, b| {
            b.total_comments
                .cmp(&a.total_comments)
                .then_with(|| b.post.publish.cmp(&a.post.publish))
        });

        Ok(posts.into_iter().take(limit as usize).collect())
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.read()?;
        Ok(store.published())
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlog {
    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let store = self.read()?;
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let mut store = self
            .inner
            .write()
            .map_err(|_| RepoError::Query("store lock poisoned".to_string()))?;
        store.next_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: store.next_comment_id,
            post_id: new_comment.post_id,
            name: new_comment.name,
            email: new_comment.email,
            body: new_comment.body,
            created_at: now,
            updated_at: now,
            active: true,
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl TagRepository for InMemoryBlog {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let store = self.read()?;
        Ok(store.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn for_post(&self, post_id: i32) -> Result<Vec<Tag>, RepoError> {
        let store = self.read()?;
        let mut tags: Vec<Tag> = store
            .tags
            .iter()
            .filter(|t| store.post_tags.contains(&(post_id, t.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quill_core::domain::PostStatus;

    fn post(id: i32, title: &str, slug: &str, body: &str, day: u32, status: PostStatus) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
        Post::new(id, 1, title, slug, body, publish, status)
    }

    fn fixture() -> InMemoryBlog {
        let blog = InMemoryBlog::new();
        // P has tags {python, django}; Q shares one, R shares both, S none.
        blog.add_post(
            post(1, "Hello", "hello", "post about python and django", 10, PostStatus::Published),
            &["python", "django"],
        );
        blog.add_post(
            post(2, "Q", "q", "only python here", 8, PostStatus::Published),
            &["python"],
        );
        blog.add_post(
            post(3, "R", "r", "python and django again", 6, PostStatus::Published),
            &["python", "django"],
        );
        blog.add_post(
            post(4, "S", "s", "all about rust", 4, PostStatus::Published),
            &["rust"],
        );
        blog.add_post(
            post(5, "Unfinished", "unfinished", "draft body", 2, PostStatus::Draft),
            &["python"],
        );
        blog
    }

    #[tokio::test]
    async fn drafts_never_listed() {
        let blog = fixture();
        let page = blog.list_published(None, 1, 10).await.unwrap();
        assert_eq!(page.total_items, 4);
        assert!(page.items.iter().all(|p| p.slug != "unfinished"));

        assert!(
            blog.find_published_by_slug_and_date(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                "unfinished"
            )
            .await
            .unwrap()
            .is_none()
        );
        assert!(blog.find_published_by_id(5).await.unwrap().is_none());
        assert_eq!(blog.count_published().await.unwrap(), 4);
        assert!(blog.all_published().await.unwrap().iter().all(|p| p.is_published()));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_paginated() {
        let blog = fixture();
        let page = blog.list_published(None, 1, 3).await.unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(
            page.items.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        // Out-of-range requests clamp to the last page.
        let last = blog.list_published(None, 99, 3).await.unwrap();
        assert_eq!(last.number, 2);
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn listing_filters_by_tag() {
        let blog = fixture();
        let page = blog.list_published(Some("django"), 1, 10).await.unwrap();
        assert_eq!(
            page.items.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 3]
        );

        let empty = blog.list_published(Some("missing"), 1, 10).await.unwrap();
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn similar_posts_ranked_by_shared_tags_then_recency() {
        let blog = fixture();
        let similar = blog.similar_to(1, 4).await.unwrap();
        // R shares two tags, Q one, S none.
        assert_eq!(similar.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn search_weights_title_above_body() {
        let blog = InMemoryBlog::new();
        blog.add_post(
            post(1, "rust in the title", "t", "nothing else", 10, PostStatus::Published),
            &[],
        );
        blog.add_post(
            post(2, "unrelated", "b", "rust only in the body", 8, PostStatus::Published),
            &[],
        );
        blog.add_post(
            post(3, "no match", "n", "nothing relevant", 6, PostStatus::Published),
            &[],
        );

        let hits = blog.search("rust", 0.3).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].post.id, 1);
        assert!(hits[0].rank >= hits[1].rank);
        assert!(hits.iter().all(|h| h.rank >= 0.3));
    }

    #[tokio::test]
    async fn search_drops_weak_partial_matches() {
        let blog = InMemoryBlog::new();
        blog.add_post(
            post(1, "rust tooling roundup", "a", "irrelevant", 10, PostStatus::Published),
            &[],
        );
        // Matches one of two terms, in the body only: (0.4 + 0) / 2 = 0.2.
        blog.add_post(
            post(2, "unrelated", "b", "rust appears here once", 8, PostStatus::Published),
            &[],
        );

        let hits = blog.search("rust tooling", 0.3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.id, 1);
    }

    #[tokio::test]
    async fn most_commented_counts_all_comments() {
        let blog = fixture();
        blog.add_comment(2, "a", "a@x.com", "hi", true);
        blog.add_comment(2, "b", "b@x.com", "hi", false);
        blog.add_comment(3, "c", "c@x.com", "hi", true);

        let top = blog.most_commented(5).await.unwrap();
        assert_eq!(top[0].post.id, 2);
        assert_eq!(top[0].total_comments, 2);
    }

    #[tokio::test]
    async fn comments_are_active_only_and_oldest_first() {
        let blog = fixture();
        blog.add_comment(1, "first", "f@x.com", "one", true);
        blog.add_comment(1, "hidden", "h@x.com", "two", false);
        blog.add_comment(1, "second", "s@x.com", "three", true);

        let comments = blog.list_active(1).await.unwrap();
        assert_eq!(
            comments.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );

        let created = blog
            .create(NewComment {
                post_id: 1,
                name: "Alice".into(),
                email: "a@x.com".into(),
                body: "Nice post".into(),
            })
            .await
            .unwrap();
        assert!(created.active);
        assert_eq!(blog.list_active(1).await.unwrap().len(), 3);
    }
}
