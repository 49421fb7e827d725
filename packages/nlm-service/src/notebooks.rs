use serde::{Deserialize, Serialize};

use nlm_domain::{NOTEBOOK_DESCRIPTION_TITLE, Notebook, Source, SourceContent, validate};

use crate::{Error, NlmService, Result, Warning};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListNotebooksRequest {}

#[derive(Debug, Clone, Serialize)]
pub struct ListNotebooksResponse {
	pub notebooks: Vec<Notebook>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNotebookRequest {
	pub title: String,
	/// Saved as the notebook's first source so answers can refer to its layout.
	pub description: Option<String>,
}
impl CreateNotebookRequest {
	pub(crate) fn validated(&self) -> Result<(String, Option<String>)> {
		let title = validate::notebook_title(&self.title)?;
		let description = self
			.description
			.as_deref()
			.map(str::trim)
			.filter(|description| !description.is_empty())
			.map(str::to_string);

		Ok((title, description))
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNotebookResponse {
	pub notebook: Notebook,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description_source: Option<Source>,
}

#[derive(Debug, Clone)]
pub struct CreateNotebookOutcome {
	pub response: CreateNotebookResponse,
	pub warnings: Vec<Warning>,
}

impl NlmService {
	pub async fn list_notebooks(&self) -> Result<ListNotebooksResponse> {
		let notebooks = self.remote.list_notebooks().await?;

		self.registry.remember(&notebooks);

		tracing::info!(count = notebooks.len(), "Listed notebooks.");

		Ok(ListNotebooksResponse { notebooks })
	}

	/// Creates a notebook. A failed description source leaves the notebook in place and is
	/// reported as a warning.
	pub async fn create_notebook(&self, req: CreateNotebookRequest) -> Result<CreateNotebookOutcome> {
		let (title, description) = req.validated()?;
		let notebook = self.remote.create_notebook(&title).await?;

		self.registry.remember([&notebook]);

		tracing::info!(notebook_id = %notebook.id, "Created notebook.");

		let mut warnings = Vec::new();
		let description_source = match description {
			Some(text) => {
				let content = SourceContent::PastedText {
					title: Some(NOTEBOOK_DESCRIPTION_TITLE.to_string()),
					text,
				};

				match self.remote.add_source(&notebook.id, &content).await {
					Ok(source) => Some(source),
					Err(err) => {
						let err = Error::from(err);

						tracing::warn!(notebook_id = %notebook.id, error = %err, "Failed to save notebook description.");
						warnings.push(Warning::skipped(format!(
							"Notebook created, but its description was not saved: {err}"
						)));

						None
					},
				}
			},
			None => None,
		};

		Ok(CreateNotebookOutcome {
			response: CreateNotebookResponse { notebook, description_source },
			warnings,
		})
	}
}
