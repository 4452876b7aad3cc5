//! PostgreSQL repository implementations.
//!
//! Straightforward queries go through the SeaORM query builder; the
//! similarity, search, and comment-count queries are hand-written SQL
//! decoded into row structs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, DbConn, EntityTrait, FromQueryResult,
    ItemsAndPagesNumber, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, Statement,
};

use quill_core::domain::{Comment, CommentedPost, NewComment, Page, Post, SearchHit, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, TagRepository};

use super::entity::{comment, post, post_tag, tag};

/// PostgreSQL post repository. The connection pool is shared between the
/// repositories, so it is held behind an `Arc`.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: Arc<DbConn>,
}

/// PostgreSQL tag repository.
pub struct PostgresTagRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

impl PostgresCommentRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

impl PostgresTagRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

/// Base query for everything public-facing: published posts, newest first.
fn published() -> Select<post::Entity> {
    post::Entity::find()
        .filter(post::Column::Status.eq(post::Status::Published))
        .order_by_desc(post::Column::Publish)
}

fn query_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Row produced by the hand-written post queries.
#[derive(Debug, FromQueryResult)]
struct PostRow {
    id: i32,
    author_id: i32,
    title: String,
    slug: String,
    body: String,
    publish: sea_orm::prelude::DateTimeWithTimeZone,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    status: String,
}

impl PostRow {
    fn into_domain(self) -> Post {
        Post {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            slug: self.slug,
            body: self.body,
            publish: self.publish.into(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            status: if self.status == "published" {
                quill_core::domain::PostStatus::Published
            } else {
                quill_core::domain::PostStatus::Draft
            },
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct RankedPostRow {
    id: i32,
    author_id: i32,
    title: String,
    slug: String,
    body: String,
    publish: sea_orm::prelude::DateTimeWithTimeZone,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    status: String,
    rank: f32,
}

#[derive(Debug, FromQueryResult)]
struct CommentedPostRow {
    id: i32,
    author_id: i32,
    title: String,
    slug: String,
    body: String,
    publish: sea_orm::prelude::DateTimeWithTimeZone,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    status: String,
    total_comments: i64,
}

const SIMILAR_SQL: &str = r#"
SELECT p.id, p.author_id, p.title, p.slug, p.body,
       p.publish, p.created_at, p.updated_at, p.status,
       COUNT(pt.tag_id) AS same_tags
FROM posts p
JOIN post_tags pt ON pt.post_id = p.id
WHERE pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1)
  AND p.id <> $1
  AND p.status = 'published'
GROUP BY p.id
ORDER BY same_tags DESC, p.publish DESC
LIMIT $2
"#;

const SEARCH_SQL: &str = r#"
SELECT p.id, p.author_id, p.title, p.slug, p.body,
       p.publish, p.created_at, p.updated_at, p.status,
       ts_rank(setweight(to_tsvector('english', p.title), 'A')
            || setweight(to_tsvector('english', p.body), 'B'),
               plainto_tsquery('english', $1)) AS rank
FROM posts p
WHERE p.status = 'published'
  AND ts_rank(setweight(to_tsvector('english', p.title), 'A')
           || setweight(to_tsvector('english', p.body), 'B'),
              plainto_tsquery('english', $1)) >= $2
ORDER BY rank DESC
"#;

const MOST_COMMENTED_SQL: &str = r#"
SELECT p.id, p.author_id, p.title, p.slug, p.body,
       p.publish, p.created_at, p.updated_at, p.status,
       COUNT(c.id) AS total_comments
FROM posts p
LEFT JOIN comments c ON c.post_id = p.id
WHERE p.status = 'published'
GROUP BY p.id
ORDER BY total_comments DESC, p.publish DESC
LIMIT $1
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_published(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let select = match tag_slug {
            Some(slug) => published()
                .join(JoinType::InnerJoin, post::Relation::PostTags.def())
                .join(JoinType::InnerJoin, post_tag::Relation::Tag.def())
                .filter(tag::Column::Slug.eq(slug)),
            None => published(),
        };

        let paginator = select.paginate(self.db.as_ref(), per_page);
        let ItemsAndPagesNumber {
            number_of_items, ..
        } = paginator.num_items_and_pages().await.map_err(query_err)?;

        let total_pages = Page::<Post>::pages_for(number_of_items, per_page);
        let number = Page::<Post>::clamp(page, total_pages);

        let items = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_err)?
            .into_iter()
            .map(Post::from)
            .collect();

        Ok(Page {
            items,
            number,
            total_pages,
            total_items: number_of_items,
            per_page,
        })
    }

    async fn find_published_by_slug_and_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);

        let result = published()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start))
            .filter(post::Column::Publish.lt(end))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let result = published()
            .filter(post::Column::Id.eq(id))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn similar_to(&self, post_id: i32, limit: u64) -> Result<Vec<Post>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SIMILAR_SQL,
            [post_id.into(), (limit as i64).into()],
        );

        let rows = PostRow::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(PostRow::into_domain).collect())
    }

    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SEARCH_SQL,
            [query.into(), min_rank.into()],
        );

        let rows = RankedPostRow::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let rank = row.rank;
                SearchHit {
                    post: PostRow {
                        id: row.id,
                        author_id: row.author_id,
                        title: row.title,
                        slug: row.slug,
                        body: row.body,
                        publish: row.publish,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                        status: row.status,
                    }
                    .into_domain(),
                    rank,
                }
            })
            .collect())
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        published().count(self.db.as_ref()).await.map_err(query_err)
    }

    async fn latest(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = published()
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn most_commented(&self, limit: u64) -> Result<Vec<CommentedPost>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            MOST_COMMENTED_SQL,
            [(limit as i64).into()],
        );

        let rows = CommentedPostRow::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let total_comments = row.total_comments;
                CommentedPost {
                    post: PostRow {
                        id: row.id,
                        author_id: row.author_id,
                        title: row.title,
                        slug: row.slug,
                        body: row.body,
                        publish: row.publish,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                        status: row.status,
                    }
                    .into_domain(),
                    total_comments,
                }
            })
            .collect())
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        let result = published().all(self.db.as_ref()).await.map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let result = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let now = Utc::now();
        let model = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            name: Set(new_comment.name),
            email: Set(new_comment.email),
            body: Set(new_comment.body),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            active: Set(true),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(query_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn for_post(&self, post_id: i32) -> Result<Vec<Tag>, RepoError> {
        let result = tag::Entity::find()
            .join(JoinType::InnerJoin, tag::Relation::PostTags.def())
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
