use std::{collections::HashMap, sync::RwLock};

use nlm_domain::query::{self, Section};

/// Keyword map per notebook, built from the metadata of sources added in this session.
#[derive(Default)]
pub struct NavigationIndex {
	sections: RwLock<HashMap<String, Vec<Section>>>,
}
impl NavigationIndex {
	pub fn record(&self, notebook_id: &str, title: &str, keywords: Vec<String>) {
		let mut sections = self.sections.write().unwrap_or_else(|err| err.into_inner());

		sections
			.entry(notebook_id.to_string())
			.or_default()
			.push(Section { title: title.to_string(), keywords });
	}

	/// Section of `notebook_id` that `question` points to, if any.
	pub fn section_for(&self, notebook_id: &str, question: &str) -> Option<String> {
		let sections = self.sections.read().unwrap_or_else(|err| err.into_inner());

		sections.get(notebook_id).and_then(|map| query::navigate(question, map)).map(str::to_string)
	}
}
