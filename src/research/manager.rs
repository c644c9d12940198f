use crate::agents::{
    AgentKind, AgentRunner, AgentSpec, QuestionSet, Questions, WebSearchItem, WebSearchPlan,
};
use crate::tools::search::{WebSearch, format_hits};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ConfigManager;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One item of a research run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum ResearchUpdate {
    /// Status line, not part of the report
    Progress(String),
    /// Report fragment, in arrival order
    Chunk(String),
}

/// Finite, non-restartable stream of research updates
pub type ResearchStream = Box<dyn Stream<Item = Result<ResearchUpdate>> + Send + Unpin>;

/// The two entry points the wizard drives
#[async_trait]
pub trait ResearchPipeline: Send + Sync {
    /// Ask the question generator for exactly three clarifying questions
    async fn generate_questions(&self, topic: &str) -> Result<QuestionSet>;

    /// Research an enriched query, streaming progress and the report
    ///
    /// Nothing runs until the stream is polled; dropping it aborts
    /// in-flight searches.
    fn run_full(&self, query: String) -> ResearchStream;
}

/// Summary of one completed search
#[derive(Debug, Clone)]
struct SearchSummary {
    query: String,
    summary: String,
}

/// Plans searches, runs them concurrently, summarizes each and streams the
/// writer's report.
#[derive(Clone)]
pub struct ResearchManager {
    runner: AgentRunner,
    search: Arc<dyn WebSearch>,
    config: Arc<ConfigManager>,
}

impl ResearchManager {
    pub fn new(runner: AgentRunner, search: Arc<dyn WebSearch>, config: Arc<ConfigManager>) -> Self {
        Self {
            runner,
            search,
            config,
        }
    }

    async fn plan_searches(&self, query: &str) -> Result<Vec<WebSearchItem>> {
        let config = self.config.config();
        let how_many = config.research.how_many_searches;
        let spec = AgentKind::Planner.spec(&config);

        let plan: WebSearchPlan = self
            .runner
            .run_structured(&spec, &WebSearchPlan::prompt(query, how_many))
            .await?;

        let searches = plan.normalized(how_many);
        if searches.is_empty() {
            return Err(AppError::InvalidOutput(
                "Planner Agent returned no usable searches".to_string(),
            ));
        }

        tracing::info!(count = searches.len(), "Planned web searches");
        Ok(searches)
    }

    /// Search one term and condense the hits with the search agent
    async fn search_one(
        runner: AgentRunner,
        search: Arc<dyn WebSearch>,
        item: WebSearchItem,
        results: usize,
        spec: AgentSpec,
    ) -> Result<SearchSummary> {
        let hits = search.search(&item.query, results).await?;
        tracing::debug!(query = %item.query, hits = hits.len(), "Search returned");

        let input = format!("{}\nReason for searching: {}", format_hits(&item.query, &hits), item.reason);
        let summary = runner.run_text(&spec, &input).await?;

        Ok(SearchSummary {
            query: item.query,
            summary,
        })
    }

    fn writer_input(query: &str, summaries: &[SearchSummary]) -> String {
        let mut input = format!("Original query:\n{}\n\nSummarized search results:\n", query);
        if summaries.is_empty() {
            input.push_str("\n(no search results were available)\n");
        }
        for (i, s) in summaries.iter().enumerate() {
            input.push_str(&format!("\n## Search {}: {}\n{}\n", i + 1, s.query, s.summary.trim()));
        }
        input
    }

    fn pipeline(self, query: String) -> impl Stream<Item = Result<ResearchUpdate>> + Send {
        async_stream::try_stream! {
            yield ResearchUpdate::Progress("Starting research...".to_string());

            let searches = self.plan_searches(&query).await?;
            let total = searches.len();
            yield ResearchUpdate::Progress(format!("Searches planned, starting to search ({} searches)...", total));

            let config = self.config.config();
            let limits = config.research.clone();
            let spec = AgentKind::Search.spec(&config);
            let semaphore = Arc::new(Semaphore::new(limits.max_concurrent_searches.max(1)));
            let timeout = Duration::from_secs(limits.search_timeout_secs);

            let mut set = JoinSet::new();
            for item in searches {
                let runner = self.runner.clone();
                let search = self.search.clone();
                let spec = spec.clone();
                let semaphore = semaphore.clone();
                let results = limits.results_per_search;

                set.spawn(async move {
                    let term = item.query.clone();
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return Err(AppError::Internal(format!("Search semaphore closed: {}", e))),
                    };

                    match tokio::time::timeout(timeout, Self::search_one(runner, search, item, results, spec)).await {
                        Ok(result) => result,
                        Err(_) => Err(AppError::Search(format!(
                            "Search for '{}' timed out after {:?}",
                            term, timeout
                        ))),
                    }
                });
            }

            let mut summaries = Vec::with_capacity(total);
            let mut finished = 0;
            while let Some(joined) = set.join_next().await {
                finished += 1;
                match joined {
                    Ok(Ok(summary)) => summaries.push(summary),
                    Ok(Err(e)) => tracing::warn!(error = %e, "Skipping failed search"),
                    Err(e) => tracing::warn!(error = %e, "Search task did not complete"),
                }
                yield ResearchUpdate::Progress(format!("Searching... {}/{} completed", finished, total));
            }

            if summaries.is_empty() {
                tracing::warn!("All searches failed, writing report without search results");
            }

            yield ResearchUpdate::Progress("Searches complete, writing report...".to_string());

            let writer = AgentKind::Writer.spec(&config);
            let mut report = self
                .runner
                .run_streamed(&writer, &Self::writer_input(&query, &summaries))
                .await?;

            let mut bytes = 0usize;
            while let Some(chunk) = report.next().await {
                let chunk = chunk?;
                bytes += chunk.len();
                yield ResearchUpdate::Chunk(chunk);
            }

            tracing::info!(bytes, searches = summaries.len(), "Report complete");
            yield ResearchUpdate::Progress("Report complete".to_string());
        }
    }
}

#[async_trait]
impl ResearchPipeline for ResearchManager {
    async fn generate_questions(&self, topic: &str) -> Result<QuestionSet> {
        let spec = AgentKind::Questions.spec(&self.config.config());
        let questions: Questions = self.runner.run_structured(&spec, topic).await?;
        let set = QuestionSet::try_from(questions)?;
        tracing::info!(topic_len = topic.len(), "Generated clarifying questions");
        Ok(set)
    }

    fn run_full(&self, query: String) -> ResearchStream {
        tracing::debug!(query_len = query.len(), "Starting research run");
        Box::new(Box::pin(self.clone().pipeline(query)))
    }
}
