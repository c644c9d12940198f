//! LLM client tests against mocked provider endpoints
//!
//! wiremock stands in for the OpenAI and Ollama servers so request shapes,
//! structured output parsing, stream termination and error mapping are
//! covered without network access.

use deep_research::AppError;
use deep_research::llm::ollama::OllamaClient;
use deep_research::llm::openai::OpenAIClient;
use deep_research::llm::{GenerationOptions, LLMClient, OutputSchema, Provider};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

fn openai_client(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        "sk-test".to_string(),
        server.uri(),
        "gpt-4o-mini".to_string(),
        GenerationOptions::default(),
    )
    .unwrap()
}

fn ollama_client(server: &MockServer) -> OllamaClient {
    OllamaClient::new(server.uri(), "llama3.2".to_string(), GenerationOptions::default()).unwrap()
}

fn completion(message: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": "stop"
        }]
    })
}

fn text_completion(content: &str) -> serde_json::Value {
    completion(json!({"role": "assistant", "content": content}))
}

fn questions_schema() -> OutputSchema {
    OutputSchema {
        name: "questions".to_string(),
        schema: json!({
            "type": "object",
            "properties": {"questions": {"type": "array"}},
            "required": ["questions"]
        }),
    }
}

fn stream_chunk(delta: serde_json::Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    });
    format!("data: {}\n\n", chunk)
}

/// SSE body for `fragments`, closed with a `stop` chunk and `[DONE]`
fn sse_body(fragments: &[&str]) -> String {
    let mut body = sse_fragments(fragments);
    body.push_str(&stream_chunk(json!({}), Some("stop")));
    body.push_str("data: [DONE]\n\n");
    body
}

fn sse_fragments(fragments: &[&str]) -> String {
    fragments
        .iter()
        .map(|fragment| stream_chunk(json!({"content": fragment}), None))
        .collect()
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream")
}

fn ollama_chunk(content: &str, done: bool) -> serde_json::Value {
    json!({
        "model": "llama3.2",
        "created_at": "2025-01-01T00:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": done
    })
}

async fn collect(client: &dyn LLMClient) -> Vec<deep_research::Result<String>> {
    client
        .stream_with_system("sys", "write")
        .await
        .unwrap()
        .collect()
        .await
}

// ============= Provider =============

#[test]
fn test_provider_creates_clients() {
    let openai = Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: "https://api.openai.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
        options: GenerationOptions::default(),
    };
    assert_eq!(openai.create_client().unwrap().model_name(), "gpt-4o-mini");

    let ollama = Provider::Ollama {
        base_url: "http://localhost:11434".to_string(),
        model: "llama3.2".to_string(),
        options: GenerationOptions::default(),
    };
    assert_eq!(ollama.create_client().unwrap().model_name(), "llama3.2");
}

// ============= OpenAI =============

#[tokio::test]
async fn test_openai_generate_with_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_completion("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = openai_client(&server)
        .generate_with_system("Be brief.", "Hello")
        .await
        .unwrap();
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_openai_structured_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "questions", "strict": true}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_completion(
            r#"{"questions":[{"question":"Which cities?"}]}"#,
        )))
        .mount(&server)
        .await;

    let value = openai_client(&server)
        .generate_structured("sys", "topic", &questions_schema())
        .await
        .unwrap();
    assert_eq!(value["questions"][0]["question"], "Which cities?");
}

#[tokio::test]
async fn test_openai_structured_output_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_completion("not json")))
        .mount(&server)
        .await;

    let err = openai_client(&server)
        .generate_structured("sys", "topic", &questions_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidOutput(_)));
}

#[tokio::test]
async fn test_openai_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let err = openai_client(&server)
        .generate_with_system("sys", "Hello")
        .await
        .unwrap_err();
    match err {
        AppError::LLM(message) => assert!(message.contains("Incorrect API key")),
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_refusal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({"role": "assistant", "content": null, "refusal": "no"}),
        )))
        .mount(&server)
        .await;

    let err = openai_client(&server)
        .generate_with_system("sys", "Hello")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LLM(_)));
}

#[tokio::test]
async fn test_openai_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(sse_response(sse_body(&["# Remote", " work", "\n\nBody."])))
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let fragments: Vec<String> = collect(&client)
        .await
        .into_iter()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(fragments, vec!["# Remote", " work", "\n\nBody."]);
}

#[tokio::test]
async fn test_openai_stream_cut_short_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse_response(sse_fragments(&["Part one", " part two"])))
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let items = collect(&client).await;

    assert_eq!(items[0].as_deref().unwrap(), "Part one");
    assert!(
        items.last().unwrap().is_err(),
        "a stream without a finish reason must not look complete"
    );
}

#[tokio::test]
async fn test_openai_stream_malformed_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse_response(format!(
            "{}data: {{oops\n\n",
            sse_fragments(&["ok"])
        )))
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let items = collect(&client).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().unwrap(), "ok");
    assert!(items[1].is_err());
}

// ============= Ollama =============

#[tokio::test]
async fn test_ollama_generate_with_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_chunk("Hi there", true)))
        .expect(1)
        .mount(&server)
        .await;

    let reply = ollama_client(&server)
        .generate_with_system("Be brief.", "Hello")
        .await
        .unwrap();
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_ollama_structured_output_sends_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "stream": false,
            "format": {"type": "object", "required": ["questions"]}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ollama_chunk("{\"questions\":[]}", true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let value = ollama_client(&server)
        .generate_structured("sys", "topic", &questions_schema())
        .await
        .unwrap();
    assert_eq!(value, json!({"questions": []}));
}

#[tokio::test]
async fn test_ollama_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'llama3.2' not found"})),
        )
        .mount(&server)
        .await;

    let err = ollama_client(&server)
        .generate_with_system("sys", "Hello")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LLM(_)));
}

#[tokio::test]
async fn test_ollama_stream_final_chunk_without_newline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ollama_chunk("Housing shifted.", true).to_string(), "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let client = ollama_client(&server);
    let items = collect(&client).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_deref().unwrap(), "Housing shifted.");
}

#[tokio::test]
async fn test_ollama_stream_without_done_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("{}\n", ollama_chunk("Housing", false)),
            "application/x-ndjson",
        ))
        .mount(&server)
        .await;

    let client = ollama_client(&server);
    let items = collect(&client).await;

    assert_eq!(items[0].as_deref().unwrap(), "Housing");
    assert!(
        items.last().unwrap().is_err(),
        "a stream without `done` must not look complete"
    );
}
