//! Descriptive metadata attached to a source when it is added.
//!
//! Pasted text carries the metadata as a short Markdown header so NotebookLM indexes it with the
//! content. Every source kind also contributes its tags and category as navigation keywords.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{SourceContent, validate::Rejection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
	#[default]
	Documentation,
	Code,
	Tutorial,
	Reference,
	ApiDocs,
	Examples,
}
impl SourceType {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Documentation => "documentation",
			Self::Code => "code",
			Self::Tutorial => "tutorial",
			Self::Reference => "reference",
			Self::ApiDocs => "api_docs",
			Self::Examples => "examples",
		}
	}
}
impl fmt::Display for SourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceMetadata {
	pub category: String,
	#[serde(default)]
	pub source_type: SourceType,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub related_sections: Vec<String>,
}
impl SourceMetadata {
	/// Trims every field and drops blank list entries. The category is required.
	pub fn normalized(&self) -> Result<Self, Rejection> {
		let category = self.category.trim();

		if category.is_empty() {
			return Err(Rejection::new("metadata.category", "must be non-empty."));
		}

		Ok(Self {
			category: category.to_string(),
			source_type: self.source_type,
			tags: non_blank(&self.tags),
			description: self
				.description
				.as_deref()
				.map(str::trim)
				.filter(|description| !description.is_empty())
				.map(str::to_string),
			related_sections: non_blank(&self.related_sections),
		})
	}

	/// Markdown header placed ahead of pasted text.
	pub fn header(&self, title: Option<&str>) -> String {
		let mut lines = Vec::new();

		if let Some(title) = title {
			lines.push(format!("# {title}"));
		}

		lines.push(format!("**Category:** {}", self.category));
		lines.push(format!("**Type:** {}", self.source_type));

		if !self.tags.is_empty() {
			lines.push(format!("**Tags:** {}", self.tags.join(", ")));
		}
		if let Some(description) = &self.description {
			lines.push(format!("**Description:** {description}"));
		}
		if !self.related_sections.is_empty() {
			lines.push(format!("**Related sections:** {}", self.related_sections.join(", ")));
		}

		lines.push("---".to_string());

		lines.join("\n")
	}

	/// Tags followed by the category.
	pub fn keywords(&self) -> Vec<String> {
		let mut keywords = self.tags.clone();

		keywords.push(self.category.clone());

		keywords
	}

	/// Prefixes pasted text with [`Self::header`]. Other kinds only reference remote content and
	/// are returned unchanged.
	pub fn apply(&self, content: SourceContent) -> SourceContent {
		match content {
			SourceContent::PastedText { title, text } => {
				let header = self.header(title.as_deref());

				SourceContent::PastedText { title, text: format!("{header}\n\n{text}") }
			},
			other => other,
		}
	}
}

fn non_blank(values: &[String]) -> Vec<String> {
	values
		.iter()
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use crate::{SourceContent, SourceMetadata, SourceType};

	fn metadata() -> SourceMetadata {
		SourceMetadata {
			category: " Networking ".to_string(),
			source_type: SourceType::ApiDocs,
			tags: vec!["retries".to_string(), " ".to_string(), "timeouts".to_string()],
			description: Some("  Client transport settings. ".to_string()),
			related_sections: vec!["Errors".to_string()],
		}
	}

	#[test]
	fn header_lists_every_present_field() {
		let metadata = metadata().normalized().expect("metadata");

		assert_eq!(
			metadata.header(Some("HTTP client")),
			"# HTTP client\n**Category:** Networking\n**Type:** api_docs\n**Tags:** retries, timeouts\n**Description:** Client transport settings.\n**Related sections:** Errors\n---"
		);
	}

	#[test]
	fn minimal_header_has_category_and_type() {
		let metadata = SourceMetadata {
			category: "Ops".to_string(),
			source_type: SourceType::default(),
			tags: Vec::new(),
			description: Some(" ".to_string()),
			related_sections: Vec::new(),
		}
		.normalized()
		.expect("metadata");

		assert_eq!(metadata.header(None), "**Category:** Ops\n**Type:** documentation\n---");
	}

	#[test]
	fn blank_category_is_rejected() {
		let mut raw = metadata();

		raw.category = "  ".to_string();

		assert_eq!(raw.normalized().expect_err("expected rejection").field, "metadata.category");
	}

	#[test]
	fn only_pasted_text_gets_the_header() {
		let metadata = metadata().normalized().expect("metadata");
		let pasted = metadata.apply(SourceContent::PastedText {
			title: None,
			text: "Body".to_string(),
		});
		let website =
			metadata.apply(SourceContent::Website { url: "https://example.com".to_string() });

		let SourceContent::PastedText { text, .. } = pasted else {
			panic!("Expected pasted text.");
		};

		assert!(text.starts_with("**Category:** Networking\n"), "Unexpected text: {text}");
		assert!(text.ends_with("---\n\nBody"), "Unexpected text: {text}");
		assert_eq!(website, SourceContent::Website { url: "https://example.com".to_string() });
		assert_eq!(metadata.keywords(), ["retries", "timeouts", "Networking"]);
	}
}
