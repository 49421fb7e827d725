use std::{collections::HashSet, sync::RwLock};

use nlm_domain::Notebook;

/// Notebook ids seen in `list_notebooks` or `create_notebook` results during this session.
#[derive(Default)]
pub struct NotebookRegistry {
	known: RwLock<HashSet<String>>,
}
impl NotebookRegistry {
	pub fn contains(&self, notebook_id: &str) -> bool {
		self.known.read().unwrap_or_else(|err| err.into_inner()).contains(notebook_id)
	}

	pub fn remember<'a, I>(&self, notebooks: I)
	where
		I: IntoIterator<Item = &'a Notebook>,
	{
		let mut known = self.known.write().unwrap_or_else(|err| err.into_inner());

		known.extend(notebooks.into_iter().map(|notebook| notebook.id.clone()));
	}
}
