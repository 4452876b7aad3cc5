//! Syndication endpoints: RSS feed and XML sitemap.

use actix_web::{HttpResponse, web};
use pulldown_cmark::{Parser, html};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use serde::Serialize;
use tera::Context;

use quill_core::ports::PostRepository;

use crate::middleware::AppResult;
use crate::state::AppState;

const FEED_POSTS: u64 = 5;
const FEED_SUMMARY_WORDS: usize = 30;

/// Cut the raw post body down to a feed-sized summary, then render it.
/// Truncating before rendering keeps the emitted HTML well formed.
fn summary(body: &str) -> String {
    let words: Vec<&str> = body.split_whitespace().collect();
    let truncated = if words.len() <= FEED_SUMMARY_WORDS {
        body.to_string()
    } else {
        format!("{}…", words[..FEED_SUMMARY_WORDS].join(" "))
    };

    let mut rendered = String::with_capacity(truncated.len() * 2);
    html::push_html(&mut rendered, Parser::new(&truncated));
    rendered
}

pub async fn latest_posts_feed(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.latest(FEED_POSTS).await?;

    let items: Vec<rss::Item> = posts
        .iter()
        .map(|post| {
            let link = format!("{}{}", state.site.base_url, post.url_path());
            ItemBuilder::default()
                .title(Some(post.title.clone()))
                .link(Some(link.clone()))
                .guid(Some(GuidBuilder::default().value(link).permalink(true).build()))
                .description(Some(summary(&post.body)))
                .pub_date(Some(post.publish.to_rfc2822()))
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(state.site.title.clone())
        .link(state.site.base_url.clone())
        .description(state.site.description.clone())
        .items(items)
        .build();

    Ok(HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(channel.to_string()))
}

#[derive(Serialize)]
struct SitemapUrl {
    loc: String,
    lastmod: String,
}


pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.all_published().await?;

    let urls: Vec<SitemapUrl> = posts
        .iter()
        .map(|post| SitemapUrl {
            loc: format!("{}{}", state.site.base_url, post.url_path()),
            lastmod: post.updated_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("urls", &urls);

    let body = state.templates.render("sitemap.xml", &context)?;
    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(body))
}
