//! Tool host integration tests
//!
//! Drives `ToolHostSession` against a real MCP server process
//! (`tests/fixtures/tool_host.rs`) over stdio.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

use miaa_gateway::{
    config::ToolHostConfig,
    tools::{CapabilityProvider, HostStatus, SessionState},
    ToolHostSession,
};

use crate::common::{bearer, chat_request, constants, StaticProvider, TestHarness};

const FIXTURE_HOST: &str = env!("CARGO_BIN_EXE_fixture-tool-host");

async fn connected_session() -> Arc<ToolHostSession> {
    let session = Arc::new(ToolHostSession::new(ToolHostConfig {
        command: FIXTURE_HOST.to_string(),
        args: Vec::new(),
        env: Vec::new(),
    }));
    assert_eq!(session.connect().await, SessionState::Ready);
    session
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn tool_names(tools: &Value) -> Vec<&str> {
    tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["function"]["name"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Session against a live host
// =============================================================================

#[tokio::test]
async fn test_connected_session_reports_connected() {
    let session = connected_session().await;

    assert_eq!(session.state().await, SessionState::Ready);
    assert_eq!(session.status().await, HostStatus::Connected);

    session.disconnect().await;
}

#[tokio::test]
async fn test_list_tools_maps_host_tools_to_functions() {
    let session = connected_session().await;

    let tools = session.list_tools().await;
    let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["echo", "mixed", "fail", "crash"]);

    assert_eq!(
        serde_json::to_value(&tools[0]).unwrap(),
        json!({
            "type": "function",
            "function": {
                "name": "echo",
                "description": "Echo the message back",
                "parameters": {
                    "type": "object",
                    "properties": {"message": {"type": "string"}},
                    "required": ["message"]
                },
                "strict": false
            }
        })
    );

    // A host tool without a description gets an empty one
    assert_eq!(tools[1].function.description.as_deref(), Some(""));

    session.disconnect().await;
}

#[tokio::test]
async fn test_call_tool_returns_text() {
    let session = connected_session().await;

    let output = session
        .call_tool("echo", args(json!({"message": "hello host"})))
        .await;

    assert_eq!(output, "hello host");
    session.disconnect().await;
}

#[tokio::test]
async fn test_call_tool_keeps_only_text_segments() {
    let session = connected_session().await;

    let output = session.call_tool("mixed", Map::new()).await;

    assert_eq!(output, "alphabeta");
    session.disconnect().await;
}

#[tokio::test]
async fn test_call_tool_error_result_becomes_error_text() {
    let session = connected_session().await;

    let output = session.call_tool("fail", Map::new()).await;

    assert_eq!(output, "Error executing tool fail: disk on fire");
    session.disconnect().await;
}

#[tokio::test]
async fn test_concurrent_calls_share_one_channel() {
    let session = connected_session().await;

    let calls = (0..8).map(|i| {
        let session = session.clone();
        async move {
            session
                .call_tool("echo", args(json!({"message": format!("msg-{}", i)})))
                .await
        }
    });
    let outputs = futures::future::join_all(calls).await;

    let expected: Vec<String> = (0..8).map(|i| format!("msg-{}", i)).collect();
    assert_eq!(outputs, expected);
    session.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_from_ready() {
    let session = connected_session().await;

    session.disconnect().await;

    assert_eq!(session.state().await, SessionState::Disconnected);
    assert_eq!(session.status().await, HostStatus::Error);
    assert!(session.list_tools().await.is_empty());
    assert_eq!(
        session.call_tool("echo", Map::new()).await,
        "Error executing tool echo: tool host session is not active"
    );

    // Second disconnect is a no-op
    session.disconnect().await;
    assert_eq!(session.state().await, SessionState::Disconnected);
}

#[tokio::test]
async fn test_host_exit_after_handshake_reports_error() {
    let session = connected_session().await;

    let output = tokio::time::timeout(
        Duration::from_secs(10),
        session.call_tool("crash", Map::new()),
    )
    .await
    .expect("call on a crashed host should not hang");
    assert!(output.starts_with("Error executing tool crash:"), "{}", output);

    // The channel closes once the service loop notices the exit
    let mut status = session.status().await;
    for _ in 0..50 {
        if status == HostStatus::Error {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        status = session.status().await;
    }

    assert_eq!(status, HostStatus::Error);
    assert!(matches!(session.state().await, SessionState::Failed(_)));
    assert!(session.list_tools().await.is_empty());

    session.disconnect().await;
}

// =============================================================================
// Gateway with a live host
// =============================================================================

async fn harness_with_host() -> (TestHarness, Arc<ToolHostSession>) {
    let session = connected_session().await;
    let providers: Vec<Arc<dyn CapabilityProvider>> = vec![
        session.clone(),
        Arc::new(StaticProvider::native(&["web_search"])),
    ];
    let harness = TestHarness::with_providers(providers, Some(session.clone())).await;
    (harness, session)
}

#[tokio::test]
async fn test_health_reports_connected_host() {
    let (harness, session) = harness_with_host().await;

    let body: Value = harness.server.get("/health").await.json();

    assert_eq!(body["capability_provider"], "connected");
    session.disconnect().await;
}

#[tokio::test]
async fn test_host_tools_listed_after_native_tools() {
    let (harness, session) = harness_with_host().await;

    let response = harness
        .server
        .get("/v1/tools")
        .add_header(header::AUTHORIZATION, bearer().parse().unwrap())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        tool_names(&body["tools"]),
        vec!["web_search", "echo", "mixed", "fail", "crash"]
    );
    session.disconnect().await;
}

#[tokio::test]
async fn test_host_tools_merged_into_backend_request() {
    let (harness, session) = harness_with_host().await;
    harness
        .inference
        .mock_chat_completion_success("ok", constants::TEST_UPSTREAM_KEY)
        .await;

    let mut request = chat_request();
    request["tools"] = json!([{
        "type": "function",
        "function": {"name": "get_weather", "parameters": {"type": "object"}}
    }]);

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, bearer().parse().unwrap())
        .json(&request)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let bodies = harness.inference.received_bodies().await;
    assert_eq!(
        tool_names(&bodies[0]["tools"]),
        vec!["get_weather", "web_search", "echo", "mixed", "fail", "crash"]
    );
    assert_eq!(bodies[0]["tool_choice"], "auto");
    session.disconnect().await;
}

#[tokio::test]
async fn test_execute_routes_to_host() {
    let (harness, session) = harness_with_host().await;

    let response = harness
        .server
        .post("/v1/tools/execute")
        .add_header(header::AUTHORIZATION, bearer().parse().unwrap())
        .json(&json!({"name": "echo", "arguments": {"message": "via gateway"}}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({"name": "echo", "content": "via gateway"}));
    session.disconnect().await;
}
