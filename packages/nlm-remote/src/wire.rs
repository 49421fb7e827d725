//! JSON shapes exchanged with the NotebookLM gateway.
//!
//! Responses are read leniently: the service has shipped several field spellings for the same
//! values, and a missing optional field should never fail an otherwise good call.

use serde_json::{Value, json};

use nlm_domain::{ConversationTurn, Notebook, Source, SourceContent, SourceKind};

use crate::{Error, Result};

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

pub fn notebook_body(title: &str) -> Value {
	json!({ "title": title })
}

pub fn source_body(content: &SourceContent) -> Value {
	match content {
		SourceContent::Website { url } => json!({ "kind": SourceKind::Website, "url": url }),
		SourceContent::DriveDocument { document_id } =>
			json!({ "kind": SourceKind::DriveDocument, "document_id": document_id }),
		SourceContent::PastedText { title, text } =>
			json!({ "kind": SourceKind::PastedText, "title": title, "text": text }),
	}
}

pub fn query_body(question: &str, context: &[ConversationTurn]) -> Value {
	let conversation: Vec<Value> = context
		.iter()
		.map(|turn| json!({ "question": turn.question, "answer": turn.answer }))
		.collect();

	json!({ "question": question, "conversation": conversation })
}

pub fn note_body(title: &str, text: &str) -> Value {
	json!({ "title": title, "text": text })
}

pub fn parse_notebooks(json: Value) -> Result<Vec<Notebook>> {
	let items = match json {
		Value::Array(items) => items,
		Value::Object(mut map) => match map.remove("notebooks") {
			Some(Value::Array(items)) => items,
			Some(Value::Null) | None => Vec::new(),
			Some(_) => return Err(invalid("notebooks must be an array.")),
		},
		Value::Null => Vec::new(),
		_ => return Err(invalid("Notebook list must be an array or an object.")),
	};

	items.into_iter().map(parse_notebook).collect()
}

pub fn parse_notebook(json: Value) -> Result<Notebook> {
	let json = unwrap_field(json, "notebook");
	let id = first_str(&json, &["id", "notebookId", "notebook_id"])
		.ok_or_else(|| invalid("Notebook is missing an id."))?;
	let title = first_str(&json, &["title", "name"]).unwrap_or_default();
	let url = first_str(&json, &["url"]);
	let sources = match json.get("sources") {
		Some(Value::Array(items)) => items
			.iter()
			.cloned()
			.map(|item| parse_source(item, &id, SourceKind::PastedText))
			.collect::<Result<Vec<_>>>()?,
		_ => Vec::new(),
	};

	Ok(Notebook { id, title, url, sources })
}

/// `fallback_kind` applies when the service omits the kind, which it does for freshly created
/// sources.
pub fn parse_source(json: Value, notebook_id: &str, fallback_kind: SourceKind) -> Result<Source> {
	let id = first_str(&json, &["sourceId", "source_id", "id"])
		.or_else(|| json.get("source").and_then(|source| first_str(source, &["id", "sourceId"])))
		.ok_or_else(|| invalid("Source is missing an id."))?;
	let kind = first_str(&json, &["kind", "type"])
		.and_then(|raw| raw.parse::<SourceKind>().ok())
		.unwrap_or(fallback_kind);
	let title = first_str(&json, &["title"])
		.or_else(|| json.get("source").and_then(|source| first_str(source, &["title"])));
	let notebook_id =
		first_str(&json, &["notebookId", "notebook_id"]).unwrap_or_else(|| notebook_id.to_string());

	Ok(Source { id, kind, notebook_id, title })
}

pub fn parse_answer(json: Value) -> Result<String> {
	let answer = match &json {
		Value::String(text) => Some(text.clone()),
		_ => first_str(&json, &["answer", "response", "text"]),
	};

	answer
		.map(|text| text.trim().to_string())
		.filter(|text| !text.is_empty())
		.ok_or_else(|| invalid("Answer is missing or empty."))
}

/// Maps a non-success status onto the error taxonomy.
pub fn classify_status(status: u16, body: &[u8]) -> Error {
	let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));

	match status {
		401 | 403 => Error::Auth { message: crate::auth_required(&format!("{message}.")) },
		404 => Error::NotFound { message },
		400 | 422 => Error::Validation { message },
		_ => Error::Remote { message: format!("HTTP {status}: {message}") },
	}
}

fn error_message(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let message = match serde_json::from_slice::<Value>(body) {
		Ok(json) => json
			.get("error")
			.and_then(|error| match error {
				Value::String(text) => Some(text.clone()),
				other => first_str(other, &["message"]),
			})
			.or_else(|| first_str(&json, &["message"])),
		Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
	}?;
	let message = message.trim();

	if message.is_empty() {
		return None;
	}

	Some(message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect())
}

fn unwrap_field(json: Value, field: &str) -> Value {
	match json {
		Value::Object(mut map) if map.get(field).is_some_and(Value::is_object) =>
			map.remove(field).unwrap_or(Value::Null),
		other => other,
	}
}

fn first_str(json: &Value, keys: &[&str]) -> Option<String> {
	keys.iter().find_map(|key| match json.get(key) {
		Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
		Some(Value::Number(number)) => Some(number.to_string()),
		_ => None,
	})
}

fn invalid(message: &str) -> Error {
	Error::InvalidResponse { message: message.to_string() }
}
