use std::sync::Arc;

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use tower::ServiceExt;

use nlm_service::NlmService;
use nlm_testkit::FakeNotebookLm;
use notebooklm_mcp::{McpAuthState, server};

fn service() -> Arc<NlmService> {
	Arc::new(NlmService::new(nlm_config::Config::default(), Arc::new(FakeNotebookLm::new())))
}

fn initialize_request(authorization: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri("/")
		.header("content-type", "application/json")
		.header("accept", "application/json, text/event-stream");

	if let Some(value) = authorization {
		builder = builder.header("authorization", value);
	}

	builder
		.body(Body::from(
			r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"tests","version":"0.0.0"}}}"#,
		))
		.expect("Failed to build request.")
}

#[test]
fn registers_all_tools() {
	let names = server::tool_names();
	let expected = [
		"list_notebooks",
		"create_notebook",
		"add_source",
		"ask",
		"compare_topics",
		"create_note",
		"get_conversation",
		"clear_conversation",
	];

	for name in expected {
		assert!(names.iter().any(|registered| registered == name), "Missing tool registration: {name}.");
	}

	assert_eq!(names.len(), expected.len(), "Unexpected tool count for MCP registration.");
}

#[tokio::test]
async fn static_keys_mode_rejects_missing_bearer_token() {
	let auth_state = McpAuthState::StaticKeys { bearer_token: "token-a".to_string() };
	let response = server::router(auth_state, service())
		.oneshot(initialize_request(None))
		.await
		.expect("Failed to call router.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn static_keys_mode_rejects_wrong_bearer_token() {
	let auth_state = McpAuthState::StaticKeys { bearer_token: "token-a".to_string() };
	let response = server::router(auth_state, service())
		.oneshot(initialize_request(Some("Bearer token-b")))
		.await
		.expect("Failed to call router.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn static_keys_mode_passes_matching_bearer_token_through() {
	let auth_state = McpAuthState::StaticKeys { bearer_token: "token-a".to_string() };
	let response = server::router(auth_state, service())
		.oneshot(initialize_request(Some("Bearer token-a")))
		.await
		.expect("Failed to call router.");

	assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
