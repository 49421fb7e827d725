use serde::{Deserialize, Serialize};

use nlm_domain::{Source, SourceContent, SourceKind, SourceMetadata, validate};

use crate::{NlmService, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddSourceRequest {
	pub notebook_id: String,
	/// One of `website`, `drive-document` or `pasted-text`.
	pub kind: String,
	/// URL, Drive document id or URL, or the pasted text itself.
	pub content: String,
	pub title: Option<String>,
	/// Rendered ahead of pasted text and indexed for question navigation.
	pub metadata: Option<SourceMetadata>,
}
impl AddSourceRequest {
	pub(crate) fn validated(&self) -> Result<(String, SourceContent, Option<SourceMetadata>)> {
		let notebook_id = validate::require_text("notebook_id", &self.notebook_id)?;
		let kind: SourceKind = self.kind.parse()?;
		let content = validate::source_content(kind, &self.content, self.title.as_deref())?;
		let metadata = self.metadata.as_ref().map(SourceMetadata::normalized).transpose()?;

		Ok((notebook_id, content, metadata))
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSourceResponse {
	pub source: Source,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
	pub notebook_id: String,
	pub text: String,
	pub title: Option<String>,
}
impl CreateNoteRequest {
	pub(crate) fn validated(&self) -> Result<(String, String)> {
		let notebook_id = validate::require_text("notebook_id", &self.notebook_id)?;
		let text = validate::require_text("text", &self.text)?;

		Ok((notebook_id, text))
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteResponse {
	pub source: Source,
}

impl NlmService {
	pub async fn add_source(&self, req: AddSourceRequest) -> Result<AddSourceResponse> {
		let (notebook_id, content, metadata) = req.validated()?;
		let kind = content.kind();

		self.ensure_notebook(&notebook_id).await?;

		let content = match &metadata {
			Some(metadata) => metadata.apply(content),
			None => content,
		};
		let source = self.remote.add_source(&notebook_id, &content).await?;

		// Sections are named after the source, falling back to its category.
		if let Some(metadata) = metadata {
			let section = req
				.title
				.as_deref()
				.map(str::trim)
				.filter(|title| !title.is_empty())
				.map(str::to_string)
				.or_else(|| source.title.clone())
				.unwrap_or_else(|| metadata.category.clone());

			self.navigation.record(&notebook_id, &section, metadata.keywords());
		}

		tracing::info!(notebook_id = %notebook_id, source_id = %source.id, kind = %kind, "Added source.");

		Ok(AddSourceResponse { source })
	}

	/// Saves `text` as a note. Without a title the note is named after the first line of the text.
	pub async fn create_note(&self, req: CreateNoteRequest) -> Result<CreateNoteResponse> {
		let (notebook_id, text) = req.validated()?;
		let title = match req.title.as_deref().map(str::trim).filter(|title| !title.is_empty()) {
			Some(title) => title.to_string(),
			None => {
				let first_line = text.lines().next().unwrap_or_default();

				nlm_domain::note::title(&self.cfg.notes.prefix, self.cfg.notes.max_title_chars, first_line)
			},
		};

		self.ensure_notebook(&notebook_id).await?;

		let source = self.remote.create_note(&notebook_id, &title, &text).await?;

		tracing::info!(notebook_id = %notebook_id, source_id = %source.id, "Created note.");

		Ok(CreateNoteResponse { source })
	}
}
