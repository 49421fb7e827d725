use serde::{Deserialize, Serialize};

use nlm_domain::{Source, query, validate};

use crate::{AutoSaveOutcome, NlmService, Result, Warning};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AskRequest {
	pub notebook_id: String,
	pub question: String,
	/// Overrides `[notes].auto_save` for this call.
	pub auto_save: Option<bool>,
	#[serde(default)]
	pub sections: Vec<String>,
}
impl AskRequest {
	pub(crate) fn validated(&self) -> Result<(String, String)> {
		let notebook_id = validate::require_text("notebook_id", &self.notebook_id)?;
		let question = validate::require_text("question", &self.question)?;

		Ok((notebook_id, question))
	}
}

/// Asks the notebook to compare two topics, optionally within one section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareRequest {
	pub notebook_id: String,
	pub first: String,
	pub second: String,
	pub section: Option<String>,
	pub auto_save: Option<bool>,
}
impl CompareRequest {
	/// Returns the notebook id and the comparison question recorded in the conversation.
	pub(crate) fn validated(&self) -> Result<(String, String)> {
		let notebook_id = validate::require_text("notebook_id", &self.notebook_id)?;
		let first = validate::require_text("first", &self.first)?;
		let second = validate::require_text("second", &self.second)?;

		Ok((notebook_id, query::comparison(&first, &second)))
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
	pub notebook_id: String,
	pub question: String,
	pub answer: String,
	pub sequence: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<Source>,
}

#[derive(Debug, Clone)]
pub struct AskOutcome {
	pub response: AskResponse,
	pub warnings: Vec<Warning>,
}

impl NlmService {
	/// Asks a question in the notebook's running conversation.
	///
	/// Explicit `sections` scope the sent question. Without them, a question whose words match the
	/// keywords of a source added with metadata is scoped to that source's section.
	pub async fn ask(&self, req: AskRequest) -> Result<AskOutcome> {
		let (notebook_id, question) = req.validated()?;
		let auto_save = req.auto_save.unwrap_or_else(|| self.autosave.enabled_by_default());

		self.ensure_notebook(&notebook_id).await?;

		let enabled = self.cfg.query.use_optimization;
		let sent = if !req.sections.is_empty() {
			query::shape(&question, &req.sections, enabled)
		} else {
			match self.navigation.section_for(&notebook_id, &question) {
				Some(section) => query::shape(&question, &[section], enabled),
				None => question.clone(),
			}
		};

		self.converse(notebook_id, question, sent, auto_save).await
	}

	pub async fn compare(&self, req: CompareRequest) -> Result<AskOutcome> {
		let (notebook_id, question) = req.validated()?;
		let auto_save = req.auto_save.unwrap_or_else(|| self.autosave.enabled_by_default());

		self.ensure_notebook(&notebook_id).await?;

		let sent = query::scoped_comparison(
			&question,
			req.section.as_deref(),
			self.cfg.query.use_optimization,
		);

		self.converse(notebook_id, question, sent, auto_save).await
	}

	/// Sends `sent` and records the turn under the caller's `question`.
	///
	/// The notebook's lane is held from the context read until the turn is recorded, so follow-ups
	/// in one notebook are answered and recorded in call order. A failed ask records nothing.
	async fn converse(
		&self,
		notebook_id: String,
		question: String,
		sent: String,
		auto_save: bool,
	) -> Result<AskOutcome> {
		let turn = {
			let mut session = self.conversations.session(&notebook_id).await;
			let context = session.context(self.cfg.conversation.max_turns);

			tracing::debug!(notebook_id = %notebook_id, context_turns = context.len(), "Asking notebook.");

			let answer = self.remote.ask(&notebook_id, &sent, &context).await?;

			session.append(&notebook_id, &question, &answer)
		};

		tracing::info!(notebook_id = %notebook_id, sequence = turn.sequence, "Recorded conversation turn.");

		let mut warnings = Vec::new();
		let note = if auto_save {
			match self.autosave.save_answer(&notebook_id, &turn.question, &turn.answer).await {
				AutoSaveOutcome::Saved(source) => Some(source),
				AutoSaveOutcome::Skipped(warning) => {
					warnings.push(warning);

					None
				},
			}
		} else {
			None
		};

		Ok(AskOutcome {
			response: AskResponse {
				notebook_id,
				question: turn.question,
				answer: turn.answer,
				sequence: turn.sequence,
				note,
			},
			warnings,
		})
	}
}
