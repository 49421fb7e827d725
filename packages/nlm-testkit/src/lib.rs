//! In-memory NotebookLM double for service and server tests.

use std::{
	collections::{HashMap, VecDeque},
	sync::{Mutex, MutexGuard},
	time::Duration,
};

use nlm_domain::{ConversationTurn, Notebook, Source, SourceContent, SourceKind};
use nlm_remote::{BoxFuture, Error, RemoteClient, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
	ListNotebooks,
	CreateNotebook,
	AddSource,
	Ask,
	CreateNote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAsk {
	pub notebook_id: String,
	pub question: String,
	pub context: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNote {
	pub notebook_id: String,
	pub title: String,
	pub text: String,
}

#[derive(Default)]
struct FakeState {
	notebooks: Vec<Notebook>,
	texts: HashMap<String, Vec<String>>,
	asks: Vec<RecordedAsk>,
	notes: Vec<RecordedNote>,
	calls: HashMap<FakeOp, usize>,
	failures: HashMap<FakeOp, VecDeque<Error>>,
	always_failing: HashMap<FakeOp, Error>,
	next_id: usize,
}

/// Remote client that keeps notebooks in memory and answers from the stored source text.
///
/// Every call is counted, including injected failures, so tests can assert how often the remote
/// was reached.
#[derive(Default)]
pub struct FakeNotebookLm {
	state: Mutex<FakeState>,
	ask_delay: Option<Duration>,
	note_delay: Option<Duration>,
}
impl FakeNotebookLm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_ask_delay(mut self, delay: Duration) -> Self {
		self.ask_delay = Some(delay);

		self
	}

	pub fn with_note_delay(mut self, delay: Duration) -> Self {
		self.note_delay = Some(delay);

		self
	}

	/// Adds a notebook without counting a remote call.
	pub fn seed_notebook(&self, title: &str) -> Notebook {
		let mut state = self.lock();
		let notebook = Notebook {
			id: next_id(&mut state, "nb"),
			title: title.to_string(),
			url: None,
			sources: Vec::new(),
		};

		state.notebooks.push(notebook.clone());

		notebook
	}

	/// Queues `err` for the next call of `op`; queued errors are consumed in order.
	pub fn fail_next(&self, op: FakeOp, err: Error) {
		self.lock().failures.entry(op).or_default().push_back(err);
	}

	pub fn fail_always(&self, op: FakeOp, err: Error) {
		self.lock().always_failing.insert(op, err);
	}

	pub fn calls(&self, op: FakeOp) -> usize {
		self.lock().calls.get(&op).copied().unwrap_or_default()
	}

	pub fn total_calls(&self) -> usize {
		self.lock().calls.values().sum()
	}

	pub fn asks(&self) -> Vec<RecordedAsk> {
		self.lock().asks.clone()
	}

	pub fn notes(&self) -> Vec<RecordedNote> {
		self.lock().notes.clone()
	}

	/// Text stored for every source and note of `notebook_id`, in insertion order.
	pub fn source_texts(&self, notebook_id: &str) -> Vec<String> {
		self.lock().texts.get(notebook_id).cloned().unwrap_or_default()
	}

	fn lock(&self) -> MutexGuard<'_, FakeState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn begin(&self, op: FakeOp) -> Result<MutexGuard<'_, FakeState>> {
		let mut state = self.lock();

		*state.calls.entry(op).or_default() += 1;

		if let Some(err) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
			return Err(err);
		}
		if let Some(err) = state.always_failing.get(&op) {
			return Err(err.clone());
		}

		Ok(state)
	}

	fn list(&self) -> Result<Vec<Notebook>> {
		Ok(self.begin(FakeOp::ListNotebooks)?.notebooks.clone())
	}

	fn create(&self, title: &str) -> Result<Notebook> {
		let mut state = self.begin(FakeOp::CreateNotebook)?;

		if title.trim().is_empty() {
			return Err(Error::Validation { message: "title must not be empty.".to_string() });
		}

		let notebook = Notebook {
			id: next_id(&mut state, "nb"),
			title: title.trim().to_string(),
			url: None,
			sources: Vec::new(),
		};

		state.notebooks.push(notebook.clone());

		Ok(notebook)
	}

	fn insert_source(
		&self,
		op: FakeOp,
		notebook_id: &str,
		kind: SourceKind,
		title: Option<String>,
		text: String,
	) -> Result<Source> {
		let mut state = self.begin(op)?;
		let id = next_id(&mut state, "src");
		let source = Source { id, kind, notebook_id: notebook_id.to_string(), title };
		let Some(notebook) = state.notebooks.iter_mut().find(|notebook| notebook.id == notebook_id)
		else {
			return Err(Error::NotFound { message: format!("Notebook {notebook_id} does not exist.") });
		};

		notebook.sources.push(source.clone());
		state.texts.entry(notebook_id.to_string()).or_default().push(text);

		Ok(source)
	}

	fn answer(
		&self,
		notebook_id: &str,
		question: &str,
		context: &[ConversationTurn],
	) -> Result<String> {
		let mut state = self.begin(FakeOp::Ask)?;

		if !state.notebooks.iter().any(|notebook| notebook.id == notebook_id) {
			return Err(Error::NotFound { message: format!("Notebook {notebook_id} does not exist.") });
		}

		state.asks.push(RecordedAsk {
			notebook_id: notebook_id.to_string(),
			question: question.to_string(),
			context: context.to_vec(),
		});

		let texts = state.texts.get(notebook_id).map(|texts| texts.join(" ")).unwrap_or_default();

		if texts.is_empty() {
			return Ok(format!("No sources cover: {question}"));
		}

		Ok(format!("Based on the sources ({texts}), here is what covers: {question}"))
	}
}
impl RemoteClient for FakeNotebookLm {
	fn list_notebooks(&self) -> BoxFuture<'_, Result<Vec<Notebook>>> {
		Box::pin(async move { self.list() })
	}

	fn create_notebook<'a>(&'a self, title: &'a str) -> BoxFuture<'a, Result<Notebook>> {
		Box::pin(async move { self.create(title) })
	}

	fn add_source<'a>(
		&'a self,
		notebook_id: &'a str,
		content: &'a SourceContent,
	) -> BoxFuture<'a, Result<Source>> {
		let (title, text) = match content {
			SourceContent::Website { url } => (None, url.clone()),
			SourceContent::DriveDocument { document_id } => (None, document_id.clone()),
			SourceContent::PastedText { title, text } => (title.clone(), text.clone()),
		};

		Box::pin(async move {
			self.insert_source(FakeOp::AddSource, notebook_id, content.kind(), title, text)
		})
	}

	fn ask<'a>(
		&'a self,
		notebook_id: &'a str,
		question: &'a str,
		context: &'a [ConversationTurn],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			if let Some(delay) = self.ask_delay {
				tokio::time::sleep(delay).await;
			}

			self.answer(notebook_id, question, context)
		})
	}

	fn create_note<'a>(
		&'a self,
		notebook_id: &'a str,
		title: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, Result<Source>> {
		Box::pin(async move {
			if let Some(delay) = self.note_delay {
				tokio::time::sleep(delay).await;
			}

			let source = self.insert_source(
				FakeOp::CreateNote,
				notebook_id,
				SourceKind::GeneratedNote,
				Some(title.to_string()),
				text.to_string(),
			)?;

			self.lock().notes.push(RecordedNote {
				notebook_id: notebook_id.to_string(),
				title: title.to_string(),
				text: text.to_string(),
			});

			Ok(source)
		})
	}
}

fn next_id(state: &mut FakeState, prefix: &str) -> String {
	state.next_id += 1;

	format!("{prefix}-{}", state.next_id)
}
