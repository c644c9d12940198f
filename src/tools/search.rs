//! Web search implementation using daedra
//!
//! This module provides web search capabilities via the daedra crate,
//! which uses DuckDuckGo as the search backend.

use crate::types::{AppError, Result, SearchHit};
use async_trait::async_trait;

/// Anything that can turn a search term into result snippets
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>>;
}

/// Web search powered by daedra
#[derive(Debug, Default, Clone, Copy)]
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebSearch for DaedraSearch {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Empty search query".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .map(|r| SearchHit {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    description: r.description.clone(),
                })
                .collect()),
            Err(e) => Err(AppError::Search(format!("Search failed: {}", e))),
        }
    }
}

/// Render hits as the plain-text block handed to the search agent
pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    let mut out = format!("Search term: {}\n\nResults:\n", query);
    if hits.is_empty() {
        out.push_str("(no results)\n");
    }
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            hit.title,
            hit.url,
            hit.description
        ));
    }
    out
}
