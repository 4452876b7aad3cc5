//! HTTP handlers and route configuration.

mod feed;
mod posts;
mod search;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, web};
use tera::Context;

use quill_core::ports::PostRepository;

use crate::middleware::AppResult;
use crate::state::AppState;

/// Number of posts shown in the sidebar lists.
const SIDEBAR_POSTS: u64 = 5;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::post_list))
        .route("/search", web::get().to(search::post_search))
        .route("/feed", web::get().to(feed::latest_posts_feed))
        .route("/sitemap.xml", web::get().to(feed::sitemap))
        .route("/tag/{tag_slug}", web::get().to(posts::post_list_by_tag))
        .route("/{post_id}/share", web::get().to(posts::post_share))
        .route("/{post_id}/share", web::post().to(posts::post_share_submit))
        .route(
            "/{year}/{month}/{day}/{slug}",
            web::get().to(posts::post_detail),
        )
        .route(
            "/{year}/{month}/{day}/{slug}",
            web::post().to(posts::post_comment),
        );
}

/// Context shared by every page: site metadata and the sidebar lists.
pub async fn base_context(state: &AppState) -> AppResult<Context> {
    let mut context = Context::new();
    context.insert("site", &state.site);
    context.insert("total_posts", &state.posts.count_published().await?);
    context.insert("latest_posts", &state.posts.latest(SIDEBAR_POSTS).await?);
    context.insert(
        "most_commented_posts",
        &state.posts.most_commented(SIDEBAR_POSTS).await?,
    );
    Ok(context)
}

/// Render a template to an HTML response.
pub fn render(state: &AppState, template: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = state.templates.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
