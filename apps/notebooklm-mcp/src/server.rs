use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request, StatusCode},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use rmcp::{
	ErrorData, ServerHandler, ServiceExt,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use tokio::net::TcpListener;

use crate::McpAuthState;
use nlm_service::{NlmService, ToolName, ToolResponse};

const HEADER_AUTHORIZATION: &str = "Authorization";

/// MCP front for [`NlmService`]. Every session shares the same service, so conversation history
/// outlives individual client connections.
#[derive(Clone)]
pub struct NotebookLmMcp {
	service: Arc<NlmService>,
	tool_router: ToolRouter<Self>,
}
impl NotebookLmMcp {
	pub fn new(service: Arc<NlmService>) -> Self {
		Self { service, tool_router: Self::tool_router() }
	}

	async fn call(&self, tool: ToolName, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let response = self.service.dispatch(tool.as_str(), Some(params)).await;

		Ok(into_call_result(response))
	}
}

#[rmcp::tool_router]
impl NotebookLmMcp {
	#[rmcp::tool(
		name = "list_notebooks",
		description = "List the NotebookLM notebooks available to the signed-in account.",
		input_schema = list_notebooks_schema()
	)]
	async fn list_notebooks(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::ListNotebooks, params).await
	}

	#[rmcp::tool(
		name = "create_notebook",
		description = "Create a notebook with the given title. An optional description is saved as its first source.",
		input_schema = create_notebook_schema()
	)]
	async fn create_notebook(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::CreateNotebook, params).await
	}

	#[rmcp::tool(
		name = "add_source",
		description = "Add a website URL, Google Drive document or pasted text to a notebook. Optional metadata is written ahead of pasted text and its tags guide later questions to this source.",
		input_schema = add_source_schema()
	)]
	async fn add_source(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::AddSource, params).await
	}

	#[rmcp::tool(
		name = "ask",
		description = "Ask a question grounded in a notebook's sources. Follow-up questions reuse the recent conversation in that notebook. Answers are saved as notes unless auto_save is false.",
		input_schema = ask_schema()
	)]
	async fn ask(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::Ask, params).await
	}

	#[rmcp::tool(
		name = "compare_topics",
		description = "Ask the notebook to compare two topics, optionally within one section. Recorded in the notebook's conversation like ask.",
		input_schema = compare_topics_schema()
	)]
	async fn compare_topics(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::CompareTopics, params).await
	}

	#[rmcp::tool(
		name = "create_note",
		description = "Save text as a note in a notebook.",
		input_schema = create_note_schema()
	)]
	async fn create_note(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::CreateNote, params).await
	}

	#[rmcp::tool(
		name = "get_conversation",
		description = "Return the questions and answers recorded for a notebook in this session.",
		input_schema = get_conversation_schema()
	)]
	async fn get_conversation(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::GetConversation, params).await
	}

	#[rmcp::tool(
		name = "clear_conversation",
		description = "Forget the recorded conversation for a notebook so the next question starts fresh.",
		input_schema = clear_conversation_schema()
	)]
	async fn clear_conversation(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.call(ToolName::ClearConversation, params).await
	}
}

#[rmcp::tool_handler]
impl ServerHandler for NotebookLmMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"NotebookLM tools: list or create notebooks, add sources, ask or compare with follow-up context, and save notes."
					.to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

/// Names of every registered tool, in registration order.
pub fn tool_names() -> Vec<String> {
	NotebookLmMcp::tool_router().list_all().into_iter().map(|tool| tool.name.into_owned()).collect()
}

pub async fn serve_stdio(service: Arc<NlmService>) -> Result<()> {
	tracing::info!("Serving MCP over stdio.");

	let running = NotebookLmMcp::new(service).serve(rmcp::transport::stdio()).await?;
	let reason = running.waiting().await?;

	tracing::info!(?reason, "MCP stdio session ended.");

	Ok(())
}

pub async fn serve_http(
	bind_addr: &str,
	auth_state: McpAuthState,
	service: Arc<NlmService>,
) -> Result<()> {
	let bind_addr: SocketAddr = bind_addr.parse()?;
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "Serving MCP over streamable HTTP.");

	axum::serve(listener, router(auth_state, service)).await?;

	Ok(())
}

pub fn router(auth_state: McpAuthState, service: Arc<NlmService>) -> Router {
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let mcp = StreamableHttpService::new(
		move || Ok(NotebookLmMcp::new(service.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);

	Router::new()
		.fallback_service(mcp)
		.layer(middleware::from_fn_with_state(auth_state, mcp_auth_middleware))
}

fn into_call_result(response: ToolResponse) -> CallToolResult {
	let is_error = response.is_error();
	let value = response.into_value();

	if is_error { CallToolResult::structured_error(value) } else { CallToolResult::structured(value) }
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::StaticKeys { bearer_token } =>
			read_bearer_token(headers).is_some_and(|token| token == bearer_token),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(HEADER_AUTHORIZATION)?.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		tracing::debug!("Rejected MCP request without a valid bearer token.");

		return (
			StatusCode::UNAUTHORIZED,
			"Authentication required for security.auth_mode=static_keys with a Bearer token.",
		)
			.into_response();
	}

	next.run(req).await
}

fn list_notebooks_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {}
	}))
}

fn create_notebook_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["title"],
		"properties": {
			"title": { "type": "string", "minLength": 1 },
			"description": {
				"type": ["string", "null"],
				"description": "How the notebook is organized. Saved as a pasted-text source."
			}
		}
	}))
}

fn add_source_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id", "kind", "content"],
		"properties": {
			"notebook_id": { "type": "string" },
			"kind": { "type": "string", "enum": ["website", "drive-document", "pasted-text"] },
			"content": {
				"type": "string",
				"description": "Website URL, Drive document id or URL, or the text to paste."
			},
			"title": { "type": ["string", "null"] },
			"metadata": {
				"type": ["object", "null"],
				"additionalProperties": false,
				"required": ["category"],
				"properties": {
					"category": { "type": "string", "minLength": 1 },
					"source_type": {
						"type": "string",
						"enum": ["documentation", "code", "tutorial", "reference", "api_docs", "examples"]
					},
					"tags": { "type": "array", "items": { "type": "string" } },
					"description": { "type": ["string", "null"] },
					"related_sections": { "type": "array", "items": { "type": "string" } }
				}
			}
		}
	}))
}

fn ask_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id", "question"],
		"properties": {
			"notebook_id": { "type": "string" },
			"question": { "type": "string", "minLength": 1 },
			"auto_save": { "type": ["boolean", "null"] },
			"sections": {
				"type": "array",
				"items": { "type": "string" },
				"description": "Notebook sections to focus the question on."
			}
		}
	}))
}

fn compare_topics_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id", "first", "second"],
		"properties": {
			"notebook_id": { "type": "string" },
			"first": { "type": "string", "minLength": 1 },
			"second": { "type": "string", "minLength": 1 },
			"section": { "type": ["string", "null"] },
			"auto_save": { "type": ["boolean", "null"] }
		}
	}))
}

fn create_note_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id", "text"],
		"properties": {
			"notebook_id": { "type": "string" },
			"text": { "type": "string", "minLength": 1 },
			"title": { "type": ["string", "null"] }
		}
	}))
}

fn get_conversation_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id"],
		"properties": {
			"notebook_id": { "type": "string" },
			"max_turns": { "type": ["integer", "null"], "minimum": 1 }
		}
	}))
}

fn clear_conversation_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["notebook_id"],
		"properties": {
			"notebook_id": { "type": "string" }
		}
	}))
}

#[cfg(test)]
mod tests {
	use axum::http::HeaderMap;
	use serde_json::json;

	use nlm_service::{Error, ToolOutput, ToolResponse};

	use crate::{McpAuthState, server};

	#[test]
	fn failures_are_flagged_as_tool_errors() {
		let failure = server::into_call_result(ToolResponse::failure(&Error::NotFound {
			message: "nb-9".to_string(),
		}));
		let success = server::into_call_result(ToolResponse::Success(ToolOutput {
			result: json!({ "notebooks": [] }),
			warnings: Vec::new(),
		}));

		assert_eq!(failure.is_error, Some(true));
		assert_eq!(
			failure.structured_content,
			Some(json!({ "error": { "kind": "not_found_error", "message": "Not found: nb-9" } }))
		);
		assert_ne!(success.is_error, Some(true));
	}

	#[test]
	fn off_mode_allows_requests_without_auth_header() {
		assert!(server::is_authorized(&HeaderMap::new(), &McpAuthState::Off));
	}

	#[test]
	fn static_keys_mode_requires_matching_bearer_token() {
		let auth_state = McpAuthState::StaticKeys { bearer_token: "token-a".to_string() };
		let mut headers = HeaderMap::new();

		headers.insert(server::HEADER_AUTHORIZATION, "Bearer token-a".parse().expect("valid header"));

		assert!(server::is_authorized(&headers, &auth_state));

		headers.insert(server::HEADER_AUTHORIZATION, "Bearer token-b".parse().expect("valid header"));

		assert!(!server::is_authorized(&headers, &auth_state));

		headers.insert(server::HEADER_AUTHORIZATION, "bearer token-a".parse().expect("valid header"));

		assert!(!server::is_authorized(&headers, &auth_state));
	}
}
