mod error;

pub mod ask;
pub mod autosave;
pub mod conversation;
pub mod dispatch;
pub mod history;
pub mod navigation;
pub mod notebooks;
pub mod registry;
pub mod sources;

pub use ask::{AskOutcome, AskRequest, AskResponse, CompareRequest};
pub use autosave::{AutoSaveCoordinator, AutoSaveOutcome};
pub use conversation::ConversationState;
pub use dispatch::{ToolCall, ToolName, ToolOutput, ToolResponse};
pub use error::{Error, ErrorKind, Result, Warning};
pub use history::{
	ClearConversationRequest, ClearConversationResponse, GetConversationRequest,
	GetConversationResponse,
};
pub use navigation::NavigationIndex;
pub use notebooks::{
	CreateNotebookOutcome, CreateNotebookRequest, CreateNotebookResponse, ListNotebooksResponse,
};
pub use registry::NotebookRegistry;
pub use sources::{AddSourceRequest, AddSourceResponse, CreateNoteRequest, CreateNoteResponse};

use std::sync::Arc;

use nlm_config::Config;
use nlm_remote::RemoteClient;

/// Tool semantics shared by every transport.
pub struct NlmService {
	pub cfg: Config,
	pub remote: Arc<dyn RemoteClient>,
	pub conversations: ConversationState,
	pub registry: NotebookRegistry,
	pub navigation: NavigationIndex,
	autosave: AutoSaveCoordinator,
}
impl NlmService {
	pub fn new(cfg: Config, remote: Arc<dyn RemoteClient>) -> Self {
		let autosave = AutoSaveCoordinator::new(remote.clone(), cfg.notes.clone());

		Self {
			cfg,
			remote,
			conversations: ConversationState::new(),
			registry: NotebookRegistry::default(),
			navigation: NavigationIndex::default(),
			autosave,
		}
	}

	/// Fails with `NotFound` unless `notebook_id` was listed or created in this session, refreshing
	/// the registry once on a miss.
	pub(crate) async fn ensure_notebook(&self, notebook_id: &str) -> Result<()> {
		if self.registry.contains(notebook_id) {
			return Ok(());
		}

		tracing::debug!(notebook_id, "Notebook not cached. Refreshing notebook list.");

		let notebooks = self.remote.list_notebooks().await?;

		self.registry.remember(&notebooks);

		if self.registry.contains(notebook_id) {
			return Ok(());
		}

		Err(Error::NotFound {
			message: format!(
				"Notebook {notebook_id} is not available. Call list_notebooks to see the notebooks you can use."
			),
		})
	}
}
