//! Tool routing: name and argument parsing, execution and the result envelope.
//!
//! Every call moves through `received -> validated -> executing -> succeeded | failed`; each step
//! is logged at debug level with the tool name. A call counts as validated once both its arguments
//! and their field-level checks pass.

use std::{fmt, str::FromStr};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};

use crate::{
	AddSourceRequest, AskRequest, ClearConversationRequest, CompareRequest, CreateNoteRequest,
	CreateNotebookRequest, Error, ErrorKind, GetConversationRequest, NlmService, Result, Warning,
	notebooks::ListNotebooksRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
	ListNotebooks,
	CreateNotebook,
	AddSource,
	Ask,
	CompareTopics,
	CreateNote,
	GetConversation,
	ClearConversation,
}
impl ToolName {
	pub const ALL: [Self; 8] = [
		Self::ListNotebooks,
		Self::CreateNotebook,
		Self::AddSource,
		Self::Ask,
		Self::CompareTopics,
		Self::CreateNote,
		Self::GetConversation,
		Self::ClearConversation,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::ListNotebooks => "list_notebooks",
			Self::CreateNotebook => "create_notebook",
			Self::AddSource => "add_source",
			Self::Ask => "ask",
			Self::CompareTopics => "compare_topics",
			Self::CreateNote => "create_note",
			Self::GetConversation => "get_conversation",
			Self::ClearConversation => "clear_conversation",
		}
	}
}
impl fmt::Display for ToolName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ToolName {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::ALL.into_iter().find(|name| name.as_str() == raw).ok_or_else(|| Error::Validation {
			message: format!("Unknown tool {raw:?}."),
		})
	}
}

/// A recognized tool with its parsed arguments.
#[derive(Debug, Clone)]
pub enum ToolCall {
	ListNotebooks,
	CreateNotebook(CreateNotebookRequest),
	AddSource(AddSourceRequest),
	Ask(AskRequest),
	CompareTopics(CompareRequest),
	CreateNote(CreateNoteRequest),
	GetConversation(GetConversationRequest),
	ClearConversation(ClearConversationRequest),
}
impl ToolCall {
	pub fn parse(name: &str, arguments: Map<String, Value>) -> Result<Self> {
		let tool: ToolName = name.parse()?;
		let call = match tool {
			ToolName::ListNotebooks => {
				parse_args::<ListNotebooksRequest>(tool, arguments)?;

				Self::ListNotebooks
			},
			ToolName::CreateNotebook => Self::CreateNotebook(parse_args(tool, arguments)?),
			ToolName::AddSource => Self::AddSource(parse_args(tool, arguments)?),
			ToolName::Ask => Self::Ask(parse_args(tool, arguments)?),
			ToolName::CompareTopics => Self::CompareTopics(parse_args(tool, arguments)?),
			ToolName::CreateNote => Self::CreateNote(parse_args(tool, arguments)?),
			ToolName::GetConversation => Self::GetConversation(parse_args(tool, arguments)?),
			ToolName::ClearConversation => Self::ClearConversation(parse_args(tool, arguments)?),
		};

		Ok(call)
	}

	pub fn name(&self) -> ToolName {
		match self {
			Self::ListNotebooks => ToolName::ListNotebooks,
			Self::CreateNotebook(_) => ToolName::CreateNotebook,
			Self::AddSource(_) => ToolName::AddSource,
			Self::Ask(_) => ToolName::Ask,
			Self::CompareTopics(_) => ToolName::CompareTopics,
			Self::CreateNote(_) => ToolName::CreateNote,
			Self::GetConversation(_) => ToolName::GetConversation,
			Self::ClearConversation(_) => ToolName::ClearConversation,
		}
	}

	/// Runs the field-level checks of the call without touching any state.
	pub fn validate(&self) -> Result<()> {
		match self {
			Self::ListNotebooks => Ok(()),
			Self::CreateNotebook(req) => req.validated().map(drop),
			Self::AddSource(req) => req.validated().map(drop),
			Self::Ask(req) => req.validated().map(drop),
			Self::CompareTopics(req) => req.validated().map(drop),
			Self::CreateNote(req) => req.validated().map(drop),
			Self::GetConversation(req) => req.validated().map(drop),
			Self::ClearConversation(req) => req.validated().map(drop),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
	pub result: Value,
	pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
	pub kind: ErrorKind,
	pub message: String,
}

/// What a tool call returns to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
	Success(ToolOutput),
	Failure(ErrorBody),
}
impl ToolResponse {
	pub fn failure(err: &Error) -> Self {
		Self::Failure(ErrorBody { kind: err.kind(), message: err.to_string() })
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Self::Failure(_))
	}

	/// `{ "result", "warnings" }` on success, `{ "error": { "kind", "message" } }` on failure.
	pub fn into_value(self) -> Value {
		match self {
			Self::Success(output) => json!({ "result": output.result, "warnings": output.warnings }),
			Self::Failure(error) => json!({ "error": error }),
		}
	}
}

impl NlmService {
	pub async fn dispatch(&self, name: &str, arguments: Option<Map<String, Value>>) -> ToolResponse {
		tracing::debug!(tool = name, state = "received", "Tool call.");

		let call = match ToolCall::parse(name, arguments.unwrap_or_default())
			.and_then(|call| call.validate().map(|()| call))
		{
			Ok(call) => call,
			Err(err) => return failed(name, &err),
		};

		tracing::debug!(tool = name, state = "validated", "Tool call.");
		tracing::debug!(tool = name, state = "executing", "Tool call.");

		match self.execute(call).await {
			Ok(output) => {
				tracing::debug!(
					tool = name,
					state = "succeeded",
					warnings = output.warnings.len(),
					"Tool call."
				);

				ToolResponse::Success(output)
			},
			Err(err) => failed(name, &err),
		}
	}

	pub async fn execute(&self, call: ToolCall) -> Result<ToolOutput> {
		let tool = call.name();

		match call {
			ToolCall::ListNotebooks => plain(tool, self.list_notebooks().await?),
			ToolCall::CreateNotebook(req) => {
				let outcome = self.create_notebook(req).await?;

				Ok(ToolOutput { result: encode(tool, &outcome.response)?, warnings: outcome.warnings })
			},
			ToolCall::AddSource(req) => plain(tool, self.add_source(req).await?),
			ToolCall::Ask(req) => {
				let outcome = self.ask(req).await?;

				Ok(ToolOutput { result: encode(tool, &outcome.response)?, warnings: outcome.warnings })
			},
			ToolCall::CompareTopics(req) => {
				let outcome = self.compare(req).await?;

				Ok(ToolOutput { result: encode(tool, &outcome.response)?, warnings: outcome.warnings })
			},
			ToolCall::CreateNote(req) => plain(tool, self.create_note(req).await?),
			ToolCall::GetConversation(req) => plain(tool, self.get_conversation(req).await?),
			ToolCall::ClearConversation(req) => plain(tool, self.clear_conversation(req).await?),
		}
	}
}

fn parse_args<T>(tool: ToolName, arguments: Map<String, Value>) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_json::from_value(Value::Object(arguments)).map_err(|err| Error::Validation {
		message: format!("Invalid arguments for {tool}: {err}."),
	})
}

fn plain<T>(tool: ToolName, value: T) -> Result<ToolOutput>
where
	T: Serialize,
{
	Ok(ToolOutput { result: encode(tool, &value)?, warnings: Vec::new() })
}

fn encode<T>(tool: ToolName, value: &T) -> Result<Value>
where
	T: Serialize,
{
	serde_json::to_value(value).map_err(|err| Error::Remote {
		message: format!("Failed to encode {tool} result: {err}."),
	})
}

fn failed(name: &str, err: &Error) -> ToolResponse {
	tracing::debug!(tool = name, state = "failed", kind = err.kind().as_str(), error = %err, "Tool call.");

	ToolResponse::failure(err)
}

#[cfg(test)]
mod tests {
	use serde_json::{Map, Value, json};

	use crate::{Error, ErrorKind, ToolCall, ToolName, ToolOutput, ToolResponse, Warning};

	fn args(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("Arguments must be an object."),
		}
	}

	#[test]
	fn tool_names_round_trip() {
		for name in ToolName::ALL {
			assert_eq!(name.as_str().parse::<ToolName>(), Ok(name));
		}
	}

	#[test]
	fn unknown_tool_is_a_validation_error() {
		let err = ToolCall::parse("delete_notebook", Map::new()).expect_err("Expected rejection.");

		assert_eq!(err.kind(), ErrorKind::ValidationError);
		assert!(err.to_string().contains("delete_notebook"), "Unexpected error message: {err}");
	}

	#[test]
	fn unexpected_argument_is_rejected() {
		let err = ToolCall::parse("create_notebook", args(json!({ "title": "A", "color": "red" })))
			.expect_err("Expected rejection.");

		assert!(matches!(err, Error::Validation { .. }));
		assert!(ToolCall::parse("list_notebooks", args(json!({ "page": 2 }))).is_err());
	}

	#[test]
	fn missing_argument_is_rejected() {
		let err = ToolCall::parse("ask", args(json!({ "notebook_id": "nb-1" })))
			.expect_err("Expected rejection.");
		let message = err.to_string();

		assert!(message.contains("question"), "Unexpected error message: {message}");
	}

	#[test]
	fn ask_arguments_parse_with_defaults() {
		let call = ToolCall::parse("ask", args(json!({ "notebook_id": "nb-1", "question": "Why?" })))
			.expect("Expected valid call.");
		let ToolCall::Ask(req) = call else {
			panic!("Expected an ask call.");
		};

		assert_eq!(req.auto_save, None);
		assert!(req.sections.is_empty());
	}

	#[test]
	fn field_checks_run_before_a_call_counts_as_validated() {
		let blank = ToolCall::parse("ask", args(json!({ "notebook_id": "nb-1", "question": "  " })))
			.expect("Arguments have the right shape.");
		let bad_kind = ToolCall::parse(
			"add_source",
			args(json!({ "notebook_id": "nb-1", "kind": "podcast", "content": "x" })),
		)
		.expect("Arguments have the right shape.");
		let bad_metadata = ToolCall::parse(
			"add_source",
			args(json!({
				"notebook_id": "nb-1",
				"kind": "pasted-text",
				"content": "x",
				"metadata": { "category": " " },
			})),
		)
		.expect("Arguments have the right shape.");
		let fine = ToolCall::parse("compare_topics", args(json!({
			"notebook_id": "nb-1",
			"first": "GET",
			"second": "POST",
		})))
		.expect("Arguments have the right shape.");

		for call in [blank, bad_kind, bad_metadata] {
			let err = call.validate().expect_err("Expected rejection.");

			assert_eq!(err.kind(), ErrorKind::ValidationError);
		}

		assert!(fine.validate().is_ok());
	}

	#[test]
	fn envelopes_have_stable_shape() {
		let success = ToolResponse::Success(ToolOutput {
			result: json!({ "answer": "A" }),
			warnings: vec![Warning::skipped("not saved")],
		});
		let failure = ToolResponse::failure(&Error::Auth { message: "Sign in again.".to_string() });

		assert_eq!(
			success.into_value(),
			json!({
				"result": { "answer": "A" },
				"warnings": [{ "kind": "skipped_with_warning", "message": "not saved" }],
			})
		);
		assert!(failure.is_error());
		assert_eq!(
			failure.into_value(),
			json!({ "error": { "kind": "auth_error", "message": "Sign in again." } })
		);
	}
}
