//! Post pages: listing, detail with comments, and email sharing.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quill_core::domain::{Comment, NewComment, Post, Tag, requested_page};
use quill_core::ports::{
    CommentRepository, Mailer, OutgoingEmail, PostRepository, TagRepository,
};
use quill_shared::{CommentForm, ShareForm};

use crate::middleware::{AppError, AppResult};
use crate::state::AppState;

use super::{base_context, render};

const POSTS_PER_PAGE: u64 = 3;
const SIMILAR_POSTS_LIMIT: u64 = 4;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// A post with its tags, as shown on the listing page.
#[derive(Serialize)]
struct ListEntry {
    post: Post,
    tags: Vec<Tag>,
}

pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    render_list(&state, None, query.page.as_deref()).await
}

pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    render_list(&state, Some(path.as_str()), query.page.as_deref()).await
}

async fn render_list(
    state: &AppState,
    tag_slug: Option<&str>,
    page_raw: Option<&str>,
) -> AppResult<HttpResponse> {
    let tag = match tag_slug {
        Some(slug) => Some(
            state
                .tags
                .find_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No tag \"{slug}\"")))?,
        ),
        None => None,
    };

    let page = requested_page(page_raw);
    let posts = state
        .posts
        .list_published(tag_slug, page, POSTS_PER_PAGE)
        .await?;

    let mut entries = Vec::with_capacity(posts.items.len());
    for post in &posts.items {
        let tags = state.tags.for_post(post.id).await?;
        entries.push(ListEntry {
            post: post.clone(),
            tags,
        });
    }

    let mut context = base_context(state).await?;
    context.insert("posts", &posts);
    context.insert("entries", &entries);
    context.insert("tag", &tag);

    render(state, "post/list.html", &context)
}

/// Resolve the dated detail path to a published post.
async fn post_from_path(
    state: &AppState,
    path: &(String, String, String, String),
) -> AppResult<Post> {
    let (year, month, day, slug) = path;
    let not_found = || AppError::NotFound("No post found matching the query".to_string());

    let date = year
        .parse::<i32>()
        .ok()
        .zip(month.parse::<u32>().ok())
        .zip(day.parse::<u32>().ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
        .ok_or_else(not_found)?;

    state
        .posts
        .find_published_by_slug_and_date(date, slug)
        .await?
        .ok_or_else(not_found)
}

pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String, String)>,
) -> AppResult<HttpResponse> {
    let post = post_from_path(&state, &path).await?;
    render_detail(&state, post, CommentForm::default(), Vec::new(), None).await
}

pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String, String)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post = post_from_path(&state, &path).await?;
    let mut form = form.into_inner();

    match form.validate() {
        Ok(()) => {
            let comment = state
                .comments
                .create(NewComment {
                    post_id: post.id,
                    name: form.name.clone(),
                    email: form.email.clone(),
                    body: form.body.clone(),
                })
                .await?;

            tracing::info!(post_id = post.id, comment_id = comment.id, "comment added");
            render_detail(&state, post, CommentForm::default(), Vec::new(), Some(comment)).await
        }
        Err(errors) => render_detail(&state, post, form, errors, None).await,
    }
}

async fn render_detail(
    state: &AppState,
    post: Post,
    form: CommentForm,
    form_errors: Vec<String>,
    new_comment: Option<Comment>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list_active(post.id).await?;
    let similar_posts = state.posts.similar_to(post.id, SIMILAR_POSTS_LIMIT).await?;
    let tags = state.tags.for_post(post.id).await?;

    let mut context = base_context(state).await?;
    context.insert("post", &post);
    context.insert("tags", &tags);
    context.insert("comments", &comments);
    context.insert("similar_posts", &similar_posts);
    context.insert("form", &form);
    context.insert("form_errors", &form_errors);
    context.insert("new_comment", &new_comment);

    render(state, "post/detail.html", &context)
}

/// Resolve the `{post_id}` path segment to a published post.
async fn post_from_id(state: &AppState, raw_id: &str) -> AppResult<Post> {
    let not_found = || AppError::NotFound("No post found matching the query".to_string());

    let id = raw_id.parse::<i32>().map_err(|_| not_found())?;
    state
        .posts
        .find_published_by_id(id)
        .await?
        .ok_or_else(not_found)
}

pub async fn post_share(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = post_from_id(&state, &path).await?;
    render_share(&state, post, ShareForm::default(), Vec::new(), false).await
}

pub async fn post_share_submit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<ShareForm>,
) -> AppResult<HttpResponse> {
    let post = post_from_id(&state, &path).await?;
    let mut form = form.into_inner();

    match form.validate() {
        Ok(()) => {
            let post_url = format!("{}{}", state.site.base_url, post.url_path());
            let mail = OutgoingEmail {
                to: form.to.clone(),
                subject: format!("{} recommends you read {}", form.name, post.title),
                body: format!(
                    "Read {} at {}\n\n{}'s comments: {}",
                    post.title, post_url, form.name, form.comments
                ),
            };

            state.mailer.send(mail).await?;
            tracing::info!(post_id = post.id, to = %form.to, "post shared by email");
            render_share(&state, post, form, Vec::new(), true).await
        }
        Err(errors) => render_share(&state, post, form, errors, false).await,
    }
}

async fn render_share(
    state: &AppState,
    post: Post,
    form: ShareForm,
    form_errors: Vec<String>,
    sent: bool,
) -> AppResult<HttpResponse> {
    let mut context = base_context(state).await?;
    context.insert("post", &post);
    context.insert("form", &form);
    context.insert("form_errors", &form_errors);
    context.insert("sent", &sent);

    render(state, "post/share.html", &context)
}
