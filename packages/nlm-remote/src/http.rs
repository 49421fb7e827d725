use std::{sync::Arc, time::Duration};

use reqwest::{
	Client, Method, Url,
	header::{COOKIE, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use nlm_credentials::CredentialStore;
use nlm_domain::{ConversationTurn, Notebook, Source, SourceContent, SourceKind};

use crate::{BoxFuture, Error, RemoteClient, Result, RetryPolicy, retry, wire};

const HEADER_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");
const HEADER_SESSION_ID: HeaderName = HeaderName::from_static("x-session-id");

/// [`RemoteClient`] speaking JSON over HTTPS to the NotebookLM gateway.
pub struct HttpRemoteClient {
	client: Client,
	api_base: Url,
	default_headers: HeaderMap,
	retry: RetryPolicy,
	credentials: Arc<CredentialStore>,
}
impl HttpRemoteClient {
	pub fn new(cfg: &nlm_config::Remote, credentials: Arc<CredentialStore>) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()
			.map_err(|err| Error::InvalidConfig {
				message: format!("Failed to build HTTP client: {err}."),
			})?;
		let api_base = Url::parse(&cfg.api_base).map_err(|err| Error::InvalidConfig {
			message: format!("remote.api_base is not a valid URL: {err}."),
		})?;

		if api_base.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: "remote.api_base must be a base URL.".to_string(),
			});
		}

		Ok(Self {
			client,
			api_base,
			default_headers: default_headers(&cfg.default_headers)?,
			retry: RetryPolicy::from_config(cfg),
			credentials,
		})
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.api_base.clone();

		url.path_segments_mut()
			.map_err(|_| Error::InvalidConfig {
				message: "remote.api_base must be a base URL.".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	/// Builds per-call headers from the stored credential. Never touches the network.
	fn request_headers(&self) -> Result<HeaderMap> {
		let credential = match self.credentials.current() {
			Ok(credential) => credential,
			Err(nlm_credentials::Error::NotFound { .. }) =>
				return Err(Error::Auth {
					message: crate::auth_required("No NotebookLM credentials are stored."),
				}),
			Err(err) =>
				return Err(Error::Auth {
					message: crate::auth_required(&format!("Stored credentials are unusable: {err}")),
				}),
		};

		if credential.is_expired(OffsetDateTime::now_utc()) {
			self.invalidate_credentials();

			return Err(Error::Auth {
				message: crate::auth_required("The stored NotebookLM session has expired."),
			});
		}

		let mut headers = self.default_headers.clone();

		headers.insert(COOKIE, sensitive_value(&credential.cookie_header())?);
		headers.insert(HEADER_CSRF_TOKEN, sensitive_value(&credential.csrf_token)?);

		if let Some(session_id) = credential.session_id.as_deref() {
			headers.insert(HEADER_SESSION_ID, sensitive_value(session_id)?);
		}

		Ok(headers)
	}

	fn invalidate_credentials(&self) {
		if let Err(err) = self.credentials.invalidate() {
			tracing::error!(error = %err, "Failed to invalidate NotebookLM credential.");
		}
	}

	async fn send(
		&self,
		op: &'static str,
		method: Method,
		url: Url,
		body: Option<&Value>,
	) -> Result<Value> {
		let headers = self.request_headers()?;
		let result = retry::run(&self.retry, op, |attempt| {
			tracing::debug!(op, attempt, "Sending NotebookLM request.");

			self.send_once(method.clone(), url.clone(), &headers, body)
		})
		.await;

		if let Err(Error::Auth { .. }) = &result {
			self.invalidate_credentials();
		}

		result
	}

	async fn send_once(
		&self,
		method: Method,
		url: Url,
		headers: &HeaderMap,
		body: Option<&Value>,
	) -> Result<Value> {
		let mut builder = self.client.request(method, url).headers(headers.clone());

		if let Some(body) = body {
			builder = builder.json(body);
		}

		let response = builder
			.send()
			.await
			.map_err(|err| Error::Remote { message: err.without_url().to_string() })?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(|err| Error::Remote {
			message: format!("Failed to read response body: {}", err.without_url()),
		})?;

		if !status.is_success() {
			return Err(wire::classify_status(status.as_u16(), &bytes));
		}
		if bytes.is_empty() {
			return Ok(Value::Null);
		}

		serde_json::from_slice(&bytes).map_err(|err| Error::InvalidResponse {
			message: format!("Response body is not JSON: {err}."),
		})
	}

	async fn list_notebooks_inner(&self) -> Result<Vec<Notebook>> {
		let url = self.endpoint(&["api", "notebooks"])?;
		let json = self.send("list_notebooks", Method::GET, url, None).await?;

		wire::parse_notebooks(json)
	}

	async fn create_notebook_inner(&self, title: &str) -> Result<Notebook> {
		let title = nlm_domain::validate::notebook_title(title)
			.map_err(|err| Error::Validation { message: err.to_string() })?;
		let url = self.endpoint(&["api", "notebooks"])?;
		let body = wire::notebook_body(&title);
		let json = self.send("create_notebook", Method::POST, url, Some(&body)).await?;
		let mut notebook = wire::parse_notebook(json)?;

		if notebook.title.is_empty() {
			notebook.title = title;
		}

		Ok(notebook)
	}

	async fn add_source_inner(&self, notebook_id: &str, content: &SourceContent) -> Result<Source> {
		let url = self.endpoint(&["api", "notebooks", notebook_id, "sources"])?;
		let body = wire::source_body(content);
		let json = self.send("add_source", Method::POST, url, Some(&body)).await?;

		wire::parse_source(json, notebook_id, content.kind())
	}

	async fn ask_inner(
		&self,
		notebook_id: &str,
		question: &str,
		context: &[ConversationTurn],
	) -> Result<String> {
		let url = self.endpoint(&["api", "notebooks", notebook_id, "query"])?;
		let body = wire::query_body(question, context);
		let json = self.send("ask", Method::POST, url, Some(&body)).await?;

		wire::parse_answer(json)
	}

	async fn create_note_inner(&self, notebook_id: &str, title: &str, text: &str) -> Result<Source> {
		let url = self.endpoint(&["api", "notebooks", notebook_id, "notes"])?;
		let body = wire::note_body(title, text);
		let json = self.send("create_note", Method::POST, url, Some(&body)).await?;
		let mut source = wire::parse_source(json, notebook_id, SourceKind::GeneratedNote)?;

		if source.title.is_none() {
			source.title = Some(title.to_string());
		}

		Ok(source)
	}
}
impl RemoteClient for HttpRemoteClient {
	fn list_notebooks(&self) -> BoxFuture<'_, Result<Vec<Notebook>>> {
		Box::pin(self.list_notebooks_inner())
	}

	fn create_notebook<'a>(&'a self, title: &'a str) -> BoxFuture<'a, Result<Notebook>> {
		Box::pin(self.create_notebook_inner(title))
	}

	fn add_source<'a>(
		&'a self,
		notebook_id: &'a str,
		content: &'a SourceContent,
	) -> BoxFuture<'a, Result<Source>> {
		Box::pin(self.add_source_inner(notebook_id, content))
	}

	fn ask<'a>(
		&'a self,
		notebook_id: &'a str,
		question: &'a str,
		context: &'a [ConversationTurn],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(self.ask_inner(notebook_id, question, context))
	}

	fn create_note<'a>(
		&'a self,
		notebook_id: &'a str,
		title: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, Result<Source>> {
		Box::pin(self.create_note_inner(notebook_id, title, text))
	}
}

fn default_headers(configured: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in configured {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("remote.default_headers.{key} must be a string."),
			});
		};
		let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| Error::InvalidConfig {
			message: format!("remote.default_headers.{key} is not a valid header name: {err}."),
		})?;
		let value = HeaderValue::from_str(raw).map_err(|err| Error::InvalidConfig {
			message: format!("remote.default_headers.{key} is not a valid header value: {err}."),
		})?;

		headers.insert(name, value);
	}

	Ok(headers)
}

fn sensitive_value(raw: &str) -> Result<HeaderValue> {
	let mut value = HeaderValue::from_str(raw).map_err(|_| Error::Auth {
		message: crate::auth_required("Stored credentials contain characters that cannot be sent."),
	})?;

	value.set_sensitive(true);

	Ok(value)
}
