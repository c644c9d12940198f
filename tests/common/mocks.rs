//! Mock implementations for testing.
//!
//! This module provides a scripted research pipeline, mock LLM clients and a
//! mock web search that can be shared across test files.

#![allow(dead_code)]

use async_trait::async_trait;
use deep_research::agents::{Question, QuestionSet, Questions};
use deep_research::llm::{LLMClient, LLMClientFactory, OutputSchema, TextStream};
use deep_research::research::{ResearchPipeline, ResearchStream, ResearchUpdate};
use deep_research::tools::WebSearch;
use deep_research::types::{AppError, Result, SearchHit};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// One step of a scripted research run
#[derive(Debug, Clone)]
pub enum Step {
    Progress(&'static str),
    Chunk(&'static str),
    /// Yield an error and end the stream
    Fail(&'static str),
    /// Never yield again
    Hang,
}

/// Research pipeline with canned questions and a scripted report.
///
/// Questions are numbered by generation round, so regenerated questions are
/// always different from the previous ones:
///
/// ```text
/// Round 1 question 1?  Round 1 question 2?  Round 1 question 3?
/// ```
pub struct MockPipeline {
    rounds: AtomicUsize,
    counts: Mutex<VecDeque<usize>>,
    script: Vec<Step>,
    gate: Option<Arc<Semaphore>>,
    /// Topics passed to `generate_questions`, in call order
    pub topics: Mutex<Vec<String>>,
    /// Queries passed to `run_full`, in call order
    pub queries: Mutex<Vec<String>>,
}

impl MockPipeline {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            rounds: AtomicUsize::new(0),
            counts: Mutex::new(VecDeque::new()),
            script,
            gate: None,
            topics: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A pipeline that reports progress then streams `chunks`
    pub fn reporting(chunks: &[&'static str]) -> Self {
        let mut script = vec![Step::Progress("Starting research...")];
        script.extend(chunks.iter().map(|c| Step::Chunk(*c)));
        Self::new(script)
    }

    /// Make the next generation produce `count` questions instead of three
    pub fn next_question_count(self, count: usize) -> Self {
        self.counts.lock().push_back(count);
        self
    }

    /// Block every generation until `gate` has a permit
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn rounds(&self) -> usize {
        self.rounds.load(Ordering::SeqCst)
    }

    pub fn questions_for_round(round: usize) -> [String; 3] {
        [1, 2, 3].map(|i| format!("Round {} question {}?", round, i))
    }
}

#[async_trait]
impl ResearchPipeline for MockPipeline {
    async fn generate_questions(&self, topic: &str) -> Result<QuestionSet> {
        self.topics.lock().push(topic.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?
                .forget();
        }

        let round = self.rounds.fetch_add(1, Ordering::SeqCst) + 1;
        let count = self.counts.lock().pop_front().unwrap_or(3);

        let questions = Questions {
            questions: (1..=count)
                .map(|i| Question {
                    question: format!("Round {} question {}?", round, i),
                })
                .collect(),
        };
        QuestionSet::try_from(questions)
    }

    fn run_full(&self, query: String) -> ResearchStream {
        self.queries.lock().push(query);
        let script = self.script.clone();

        Box::new(Box::pin(async_stream::stream! {
            for step in script {
                match step {
                    Step::Progress(text) => yield Ok(ResearchUpdate::Progress(text.to_string())),
                    Step::Chunk(text) => yield Ok(ResearchUpdate::Chunk(text.to_string())),
                    Step::Fail(message) => {
                        yield Err(AppError::LLM(message.to_string()));
                        return;
                    }
                    Step::Hang => futures::future::pending::<()>().await,
                }
            }
        }))
    }
}

/// Mock LLM client answering structured requests by schema name.
#[derive(Clone)]
pub struct MockLLMClient {
    structured: Vec<(String, Value)>,
    text: String,
    stream: Vec<String>,
    should_fail: bool,
}

impl MockLLMClient {
    /// A client that plays every research agent
    pub fn research() -> Self {
        Self {
            structured: vec![
                (
                    "questions".to_string(),
                    json!({"questions": [
                        {"question": "Which cities?"},
                        {"question": "What time frame?"},
                        {"question": "Rent or ownership?"}
                    ]}),
                ),
                (
                    "web_search_plan".to_string(),
                    json!({"searches": [
                        {"reason": "prices", "query": "remote work housing prices"},
                        {"reason": "migration", "query": "remote work migration suburbs"}
                    ]}),
                ),
            ],
            text: "Summary of the search results.".to_string(),
            stream: vec!["# Remote work\n\n".to_string(), "Housing shifted.".to_string()],
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            structured: vec![],
            text: String::new(),
            stream: vec![],
            should_fail: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.check()?;
        Ok(self.text.clone())
    }

    async fn generate_structured(
        &self,
        _system: &str,
        _prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value> {
        self.check()?;
        self.structured
            .iter()
            .find(|(name, _)| name == &schema.name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| AppError::InvalidOutput(format!("no canned '{}'", schema.name)))
    }

    async fn stream_with_system(&self, _system: &str, _prompt: &str) -> Result<TextStream> {
        self.check()?;
        let chunks: Vec<Result<String>> = self.stream.iter().cloned().map(Ok).collect();
        Ok(Box::new(futures::stream::iter(chunks)))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Factory handing out clones of one mock client
pub struct MockFactory {
    client: MockLLMClient,
}

impl MockFactory {
    pub fn new(client: MockLLMClient) -> Self {
        Self { client }
    }
}

impl LLMClientFactory for MockFactory {
    fn create_for_model(&self, _model_name: &str) -> Result<Box<dyn LLMClient>> {
        Ok(Box::new(self.client.clone()))
    }
}

/// Web search returning one hit per query
#[derive(Default)]
pub struct MockSearch {
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str, _num_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().push(query.to_string());
        Ok(vec![SearchHit {
            title: format!("About {}", query),
            url: "https://example.com/article".to_string(),
            description: "An article snippet.".to_string(),
        }])
    }
}
