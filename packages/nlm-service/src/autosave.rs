use std::{sync::Arc, time::Duration};

use nlm_domain::{Source, note};
use nlm_remote::RemoteClient;

use crate::Warning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveOutcome {
	Saved(Source),
	Skipped(Warning),
}

/// Saves answered questions back into their notebook as notes.
///
/// A failed save is reported as a warning and never turns a successful answer into an error.
pub struct AutoSaveCoordinator {
	remote: Arc<dyn RemoteClient>,
	cfg: nlm_config::Notes,
}
impl AutoSaveCoordinator {
	pub fn new(remote: Arc<dyn RemoteClient>, cfg: nlm_config::Notes) -> Self {
		Self { remote, cfg }
	}

	pub fn enabled_by_default(&self) -> bool {
		self.cfg.auto_save
	}

	pub async fn save_answer(&self, notebook_id: &str, question: &str, answer: &str) -> AutoSaveOutcome {
		let title = note::title(&self.cfg.prefix, self.cfg.max_title_chars, question);
		let body = note::body(question, answer);
		let timeout = Duration::from_millis(self.cfg.auto_save_timeout_ms);

		match tokio::time::timeout(timeout, self.remote.create_note(notebook_id, &title, &body)).await {
			Ok(Ok(source)) => {
				tracing::info!(notebook_id, source_id = %source.id, "Saved answer as note.");

				AutoSaveOutcome::Saved(source)
			},
			Ok(Err(err)) => {
				tracing::warn!(notebook_id, error = %err, "Auto-save skipped.");

				AutoSaveOutcome::Skipped(Warning::skipped(format!(
					"The answer was not saved as a note: {err}"
				)))
			},
			Err(_) => {
				tracing::warn!(notebook_id, timeout_ms = self.cfg.auto_save_timeout_ms, "Auto-save timed out.");

				AutoSaveOutcome::Skipped(Warning::skipped(format!(
					"Saving the answer as a note did not finish within {} ms. The note may still appear in the notebook.",
					self.cfg.auto_save_timeout_ms
				)))
			},
		}
	}
}
