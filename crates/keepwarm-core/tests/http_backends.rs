use httpmock::{Method::POST, MockServer};
use keepwarm_core::config::{BackendConfig, BackendProvider};
use keepwarm_core::llm::{backend_from_config, CompletionRequest};
use keepwarm_core::{
    BackendError, CacheWarmer, CachedMessages, LlmMessage, WarmReporter, WarmingConfig,
};
use parking_lot::Mutex;
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;

fn can_bind_localhost() -> bool {
    match std::net::TcpListener::bind(("127.0.0.1", 0)) {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(err) => panic!("failed to bind localhost for httpmock tests: {err}"),
    }
}

fn backend_config(provider: BackendProvider, base_url: String, api_key: &str) -> BackendConfig {
    BackendConfig {
        provider,
        base_url: Some(base_url),
        api_key: Some(api_key.to_string()),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn cached_prefix() -> Vec<LlmMessage> {
    vec![
        LlmMessage::system("You are a coding assistant.").with_cache_control(),
        LlmMessage::user("Repository map: src/lib.rs ...").with_cache_control(),
    ]
}

#[tokio::test]
async fn anthropic_backend_reports_cache_reads() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "sk-ant-test")
                .header("anthropic-version", "2023-06-01")
                .body_includes(r#""max_tokens":1"#)
                .body_includes(r#""stream":false"#)
                .body_includes(r#""cache_control":{"type":"ephemeral"}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "id": "msg_01",
                    "type": "message",
                    "model": "claude-sonnet-4-20250514",
                    "content": [{"type": "text", "text": "."}],
                    "usage": {
                        "input_tokens": 4,
                        "output_tokens": 1,
                        "cache_read_input_tokens": 20480,
                        "cache_creation_input_tokens": 0
                    }
                }));
        })
        .await;

    let backend = backend_from_config(&backend_config(
        BackendProvider::Anthropic,
        server.base_url(),
        "sk-ant-test",
    ))
    .unwrap();

    let response = backend
        .complete(CompletionRequest::keepalive(
            "claude-sonnet-4-20250514",
            cached_prefix(),
            Map::new(),
        ))
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(response.cache_hit_tokens(), 20480);
    assert_eq!(response.model.as_deref(), Some("claude-sonnet-4-20250514"));
}

#[tokio::test]
async fn openai_backend_reports_prompt_cache_hits() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-ds-test")
                .body_includes(r#""model":"deepseek-chat""#)
                .body_includes(r#""max_tokens":1"#)
                .body_includes(r#""temperature":0.0"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "id": "chatcmpl-1",
                    "model": "deepseek-chat",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "."}}],
                    "usage": {
                        "prompt_tokens": 1600,
                        "completion_tokens": 1,
                        "prompt_cache_hit_tokens": 1536,
                        "prompt_cache_miss_tokens": 64
                    }
                }));
        })
        .await;

    let backend = backend_from_config(&backend_config(
        BackendProvider::OpenAi,
        server.base_url(),
        "sk-ds-test",
    ))
    .unwrap();

    let mut extra = Map::new();
    extra.insert("temperature".to_string(), json!(0.0));
    extra.insert("max_tokens".to_string(), json!(2048));

    let response = backend
        .complete(CompletionRequest::keepalive(
            "deepseek-chat",
            cached_prefix(),
            extra,
        ))
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(response.cache_hit_tokens(), 1536);
}

#[tokio::test]
async fn api_errors_are_classified_and_sanitized() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529)
                .header("content-type", "application/json")
                .body(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded","api_key":"sk-ant-leaked"}}"#);
        })
        .await;

    let backend = backend_from_config(&backend_config(
        BackendProvider::Anthropic,
        server.base_url(),
        "sk-ant-test",
    ))
    .unwrap();

    let err = backend
        .complete(CompletionRequest::keepalive("claude", cached_prefix(), Map::new()))
        .await
        .unwrap_err();

    match err {
        BackendError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 529);
            assert!(message.contains("Overloaded"));
            assert!(!message.contains("sk-ant-leaked"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>gateway</html>");
        })
        .await;

    let backend = backend_from_config(&backend_config(
        BackendProvider::OpenAi,
        server.base_url(),
        "sk",
    ))
    .unwrap();

    let err = backend
        .complete(CompletionRequest::keepalive("gpt-4o", cached_prefix(), Map::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let backend = backend_from_config(&backend_config(
        BackendProvider::Anthropic,
        "http://127.0.0.1:1".to_string(),
        "sk",
    ))
    .unwrap();

    let err = backend
        .complete(CompletionRequest::keepalive("claude", cached_prefix(), Map::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
    assert_eq!(err.kind(), "transport");
}

#[derive(Default)]
struct CollectingReporter {
    lines: Mutex<Vec<String>>,
}

impl WarmReporter for CollectingReporter {
    fn warning(&self, message: &str) {
        self.lines.lock().push(format!("warning: {message}"));
    }

    fn output(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

#[tokio::test]
async fn warmer_pings_anthropic_backend() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .body_includes(r#""max_tokens":1"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "model": "claude-sonnet-4-20250514",
                    "usage": {"input_tokens": 4, "output_tokens": 1, "cache_read_input_tokens": 20480}
                }));
        })
        .await;

    let config = WarmingConfig {
        ping_count: 1,
        keepalive_delay: Duration::ZERO,
        verbose: true,
        backend: backend_config(BackendProvider::Anthropic, server.base_url(), "sk-ant-test"),
        ..Default::default()
    };
    let backend = backend_from_config(&config.backend).unwrap();
    let reporter = Arc::new(CollectingReporter::default());
    let warmer = CacheWarmer::builder(config, backend)
        .reporter(reporter.clone())
        .delay_source(Arc::new(|| None::<String>))
        .build()
        .unwrap();

    warmer.arm(Arc::new(CachedMessages::new(cached_prefix())));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while warmer.snapshot().pings_fired() == 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    mock.assert_async().await;
    assert_eq!(warmer.snapshot().pings_succeeded, 1);
    assert_eq!(
        *reporter.lines.lock(),
        vec!["Warmed 20k cached tokens.".to_string()]
    );

    warmer.shutdown();
    warmer.wait_stopped().await;
}
