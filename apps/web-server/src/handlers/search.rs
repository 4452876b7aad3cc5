//! Full-text search over published posts.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::ports::PostRepository;
use quill_shared::SearchForm;

use crate::middleware::AppResult;
use crate::state::AppState;

use super::{base_context, render};

/// Hits below this relevance are dropped.
const SEARCH_RANK_THRESHOLD: f32 = 0.3;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

pub async fn post_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let mut context = base_context(&state).await?;

    match &params.query {
        Some(raw) => {
            let form = SearchForm { query: raw.clone() };
            match form.validate() {
                Ok(query) => {
                    let results = state
                        .posts
                        .search(&query, SEARCH_RANK_THRESHOLD)
                        .await?;

                    tracing::debug!(query = %query, hits = results.len(), "search executed");
                    context.insert("query", &query);
                    context.insert("results", &results);
                }
                Err(errors) => {
                    context.insert("query", &Option::<String>::None);
                    context.insert("form_errors", &errors);
                }
            }
        }
        None => {
            context.insert("query", &Option::<String>::None);
            context.insert("form_errors", &Vec::<String>::new());
        }
    }

    render(&state, "post/search.html", &context)
}
