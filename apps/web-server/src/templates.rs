//! Tera template registry and custom filters.
//!
//! Templates are compiled into the binary so the server has no runtime
//! file dependencies.

use std::collections::HashMap;

use pulldown_cmark::{Parser, html};
use tera::{Result, Tera, Value};

use quill_core::domain::Post;

/// Build the template registry with all pages and filters registered.
pub fn build() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("post/list.html", include_str!("../templates/post/list.html")),
        (
            "post/detail.html",
            include_str!("../templates/post/detail.html"),
        ),
        (
            "post/share.html",
            include_str!("../templates/post/share.html"),
        ),
        (
            "post/search.html",
            include_str!("../templates/post/search.html"),
        ),
        ("sitemap.xml", include_str!("../templates/sitemap.xml")),
    ])?;

    // The sitemap is XML; HTML-escaping would mangle the URLs in <loc>.
    tera.autoescape_on(vec![".html"]);

    tera.register_filter("markdown", markdown);
    tera.register_filter("truncate_words", truncate_words);
    tera.register_filter("post_url", post_url);

    Ok(tera)
}

/// Render a markdown string as HTML.
fn markdown(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let source = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("markdown filter expects a string"))?;

    let mut out = String::with_capacity(source.len() * 2);
    html::push_html(&mut out, Parser::new(source));

    Ok(Value::String(out))
}

/// Truncate a string to `count` words (default 30), appending an ellipsis
/// when anything was cut.
fn truncate_words(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let source = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("truncate_words filter expects a string"))?;

    let count = args
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or(30) as usize;

    let words: Vec<&str> = source.split_whitespace().collect();
    if words.len() <= count {
        return Ok(Value::String(source.to_string()));
    }

    Ok(Value::String(format!("{}…", words[..count].join(" "))))
}

/// Canonical path for a post value, `/{year}/{month}/{day}/{slug}`.
fn post_url(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let post: Post = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("post_url filter expects a post: {e}")))?;

    Ok(Value::String(post.url_path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quill_core::domain::PostStatus;

    fn args() -> HashMap<String, Value> {
        HashMap::new()
    }

    #[test]
    fn markdown_renders_emphasis() {
        let out = markdown(&Value::String("*hi* there".into()), &args()).unwrap();
        assert!(out.as_str().unwrap().contains("<em>hi</em>"));
    }

    #[test]
    fn truncate_words_cuts_long_text() {
        let text = "one two three four five";
        let mut with_count = HashMap::new();
        with_count.insert("count".to_string(), Value::from(3u64));

        let out = truncate_words(&Value::String(text.into()), &with_count).unwrap();
        assert_eq!(out.as_str().unwrap(), "one two three…");

        let untouched = truncate_words(&Value::String(text.into()), &args()).unwrap();
        assert_eq!(untouched.as_str().unwrap(), text);
    }

    #[test]
    fn truncating_raw_body_then_rendering_stays_well_formed() {
        // The page templates truncate the raw body before the markdown
        // filter, so the cut can never leave tags open.
        let body = format!("{} [docs](http://example.com/docs)", "word ".repeat(5).trim());
        let mut with_count = HashMap::new();
        with_count.insert("count".to_string(), Value::from(5u64));

        let cut = truncate_words(&Value::String(body), &with_count).unwrap();
        let rendered = markdown(&cut, &args()).unwrap();

        let html = rendered.as_str().unwrap();
        assert!(html.trim_end().ends_with("</p>"));
        assert!(!html.contains("<a"));
    }

    #[test]
    fn post_url_builds_dated_path() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let post = Post::new(1, 1, "Hello", "hello", "body", publish, PostStatus::Published);

        let out = post_url(&serde_json::to_value(&post).unwrap(), &args()).unwrap();
        assert_eq!(out.as_str().unwrap(), "/2024/3/5/hello");
    }
}
