use std::sync::Arc;

use actix_web::{App, test, web};
use chrono::{TimeZone, Utc};

use quill_core::domain::{Post, PostStatus};
use quill_infra::{InMemoryBlog, InMemoryMailer};

use crate::config::SiteConfig;
use crate::handlers::configure_routes;
use crate::state::AppState;

fn post(id: i32, title: &str, slug: &str, body: &str, day: u32, status: PostStatus) -> Post {
    let publish = Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
    Post::new(id, 1, title, slug, body, publish, status)
}

fn fixture_state() -> (AppState, Arc<InMemoryBlog>, Arc<InMemoryMailer>) {
    let store = Arc::new(InMemoryBlog::new());
    store.add_post(
        post(
            1,
            "Hello world",
            "hello-world",
            "An introduction to python web frameworks and django in particular.",
            10,
            PostStatus::Published,
        ),
        &["python", "django"],
    );
    store.add_post(
        post(
            2,
            "Quarterly notes",
            "quarterly-notes",
            "Short hello and a roundup of python links.",
            8,
            PostStatus::Published,
        ),
        &["python"],
    );
    store.add_post(
        post(
            3,
            "Reading list",
            "reading-list",
            "Books about python and django worth your time.",
            6,
            PostStatus::Published,
        ),
        &["python", "django"],
    );
    store.add_post(
        post(
            4,
            "Systems corner",
            "systems-corner",
            "Notes on rust and low level tooling.",
            4,
            PostStatus::Published,
        ),
        &["rust"],
    );
    store.add_post(
        post(
            5,
            "Unfinished draft",
            "unfinished-draft",
            "not ready yet",
            2,
            PostStatus::Draft,
        ),
        &["python"],
    );

    let mailer = Arc::new(InMemoryMailer::new());

    let state = AppState {
        posts: store.clone(),
        comments: store.clone(),
        tags: store.clone(),
        mailer: mailer.clone(),
        templates: Arc::new(crate::templates::build().expect("templates parse")),
        site: SiteConfig {
            base_url: "http://testserver".to_string(),
            title: "My Blog".to_string(),
            description: "New posts of my blog.".to_string(),
        },
    };

    (state, store, mailer)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

async fn read_body_text(
    resp: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// The page body without the sidebar, which lists latest posts site-wide.
fn content_of(body: &str) -> &str {
    &body[..body.find("id=\"sidebar\"").unwrap_or(body.len())]
}

#[actix_web::test]
async fn test_index_lists_published_posts_only() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("Hello world"));
    assert!(!body.contains("Unfinished draft"));
}

#[actix_web::test]
async fn test_non_numeric_page_falls_back_to_first() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/?page=abc").to_request(),
    )
    .await;
    let body = read_body_text(resp).await;
    assert!(body.contains("Page 1 of 2"));
}

#[actix_web::test]
async fn test_out_of_range_page_clamps_to_last() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/?page=99").to_request(),
    )
    .await;
    let body = read_body_text(resp).await;
    assert!(body.contains("Page 2 of 2"));
}

#[actix_web::test]
async fn test_tag_listing_filters_posts() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tag/django").to_request(),
    )
    .await;
    let body = read_body_text(resp).await;
    let content = content_of(&body);
    assert!(content.contains("Posts tagged with \"django\""));
    assert!(content.contains("Hello world"));
    assert!(content.contains("Reading list"));
    assert!(!content.contains("Systems corner"));
}

#[actix_web::test]
async fn test_unknown_tag_is_not_found() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tag/missing").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_detail_shows_similar_posts_by_shared_tags() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/2024/1/10/hello-world")
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    let content = content_of(&body);
    // Reading list shares two tags, Quarterly notes one, Systems corner none.
    let reading = content.find("Reading list").expect("similar post shown");
    let quarterly = content.find("Quarterly notes").expect("similar post shown");
    assert!(reading < quarterly);
    assert!(!content.contains("Systems corner"));
}

#[actix_web::test]
async fn test_detail_of_draft_is_not_found() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/2024/1/2/unfinished-draft")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_valid_comment_is_stored_and_confirmed() {
    let (state, store, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/2024/1/10/hello-world")
            .set_form([
                ("name", "Alice"),
                ("email", "alice@example.com"),
                ("body", "Great introduction!"),
            ])
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("Your comment has been added."));

    use quill_core::ports::CommentRepository;
    let comments = store.list_active(1).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].name, "Alice");
}

#[actix_web::test]
async fn test_invalid_comment_rerenders_with_errors() {
    let (state, store, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/2024/1/10/hello-world")
            .set_form([("name", "Alice"), ("email", "alice@example.com"), ("body", "  ")])
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("Comment body is required"));
    assert!(body.contains("There are no comments yet."));

    use quill_core::ports::CommentRepository;
    assert!(store.list_active(1).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_share_sends_one_email() {
    let (state, _, mailer) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/1/share")
            .set_form([
                ("name", "Bob"),
                ("email", "bob@example.com"),
                ("to", "carol@example.com"),
                ("comments", "You will like this one."),
            ])
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("E-mail successfully sent"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "carol@example.com");
    assert_eq!(sent[0].subject, "Bob recommends you read Hello world");
    assert!(sent[0].body.contains("http://testserver/2024/1/10/hello-world"));
    assert!(sent[0].body.contains("Bob's comments: You will like this one."));
}

#[actix_web::test]
async fn test_invalid_share_sends_nothing() {
    let (state, _, mailer) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/1/share")
            .set_form([
                ("name", "Bob"),
                ("email", "bob@example.com"),
                ("to", "not-an-address"),
            ])
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("Recipient"));
    assert!(mailer.sent().is_empty());
}

#[actix_web::test]
async fn test_share_of_unknown_post_is_not_found() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/999/share").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_search_ranks_title_matches_first() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/search?query=hello")
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    let content = content_of(&body);
    assert!(content.contains("Posts containing \"hello\""));
    // Title match outranks the body match.
    let title_hit = content.find("Hello world").expect("title match listed");
    let body_hit = content.find("Quarterly notes").expect("body match listed");
    assert!(title_hit < body_hit);
}

#[actix_web::test]
async fn test_search_without_query_shows_form() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/search").to_request()).await;
    let body = read_body_text(resp).await;
    assert!(body.contains("Search for posts"));
}

#[actix_web::test]
async fn test_feed_lists_latest_published_posts() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/feed").to_request()).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .unwrap(),
        "application/rss+xml; charset=utf-8"
    );

    let body = read_body_text(resp).await;
    assert!(body.contains("<rss"));
    assert!(body.contains("Hello world"));
    assert!(!body.contains("Unfinished draft"));
}

#[actix_web::test]
async fn test_sitemap_lists_post_urls() {
    let (state, _, _) = fixture_state();
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/sitemap.xml").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = read_body_text(resp).await;
    assert!(body.contains("<loc>http://testserver/2024/1/10/hello-world</loc>"));
    assert!(body.contains("<changefreq>weekly</changefreq>"));
    assert!(body.contains("<priority>0.9</priority>"));
    assert!(!body.contains("unfinished-draft"));
}

#[actix_web::test]
async fn test_sidebar_shows_totals_and_latest() {
    let (state, store, _) = fixture_state();
    store.add_comment(3, "a", "a@x.com", "good list", true);
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body = read_body_text(resp).await;
    assert!(body.contains("I've written 4 posts so far."));
    assert!(body.contains("Most commented posts"));
}
