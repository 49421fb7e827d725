mod error;

pub mod http;
pub mod retry;
pub mod wire;

pub use error::{Error, Result};
pub use http::HttpRemoteClient;
pub use retry::RetryPolicy;

use std::{future::Future, pin::Pin};

use nlm_domain::{AUTH_COMMAND, ConversationTurn, Notebook, Source, SourceContent};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Authenticated boundary to the NotebookLM service.
///
/// Implementations own retries and credential invalidation; callers only see the final outcome.
/// Everything except `list_notebooks` mutates remote state or is billed per call, so callers must
/// not replay operations on their own.
pub trait RemoteClient
where
	Self: Send + Sync,
{
	fn list_notebooks(&self) -> BoxFuture<'_, Result<Vec<Notebook>>>;

	fn create_notebook<'a>(&'a self, title: &'a str) -> BoxFuture<'a, Result<Notebook>>;

	fn add_source<'a>(
		&'a self,
		notebook_id: &'a str,
		content: &'a SourceContent,
	) -> BoxFuture<'a, Result<Source>>;

	/// `context` is the chronological follow-up history; empty for a fresh question.
	fn ask<'a>(
		&'a self,
		notebook_id: &'a str,
		question: &'a str,
		context: &'a [ConversationTurn],
	) -> BoxFuture<'a, Result<String>>;

	fn create_note<'a>(
		&'a self,
		notebook_id: &'a str,
		title: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, Result<Source>>;
}

pub fn auth_required(detail: &str) -> String {
	format!("{detail} Run {AUTH_COMMAND} to sign in to NotebookLM again, then retry.")
}
