use std::sync::LazyLock;

use regex::Regex;

use crate::{SourceContent, SourceKind};

static WEBSITE_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?i)https?://[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?(?::\d{1,5})?(?:[/?#]\S*)?$")
		.expect("website URL pattern is valid")
});
static DRIVE_DOCUMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("drive document id pattern is valid")
});
static DRIVE_DOCUMENT_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^https://(?:docs|drive)\.google\.com/(?:[a-z]+/)?(?:d|file/d)/([A-Za-z0-9_-]{10,})")
		.expect("drive document URL pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct Rejection {
	pub field: &'static str,
	pub reason: String,
}
impl Rejection {
	pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
		Self { field, reason: reason.into() }
	}
}

/// Trims `raw` and rejects it when nothing is left.
pub fn require_text(field: &'static str, raw: &str) -> Result<String, Rejection> {
	let text = raw.trim();

	if text.is_empty() {
		return Err(Rejection::new(field, "must be non-empty."));
	}

	Ok(text.to_string())
}

pub fn notebook_title(raw: &str) -> Result<String, Rejection> {
	require_text("title", raw)
}

pub fn source_content(
	kind: SourceKind,
	content: &str,
	title: Option<&str>,
) -> Result<SourceContent, Rejection> {
	let content = require_text("content", content)?;

	match kind {
		SourceKind::Website => {
			if !WEBSITE_URL.is_match(&content) {
				return Err(Rejection::new(
					"content",
					"must be an http(s) URL for website sources.",
				));
			}

			Ok(SourceContent::Website { url: content })
		},
		SourceKind::DriveDocument => {
			let document_id = drive_document_id(&content).ok_or_else(|| {
				Rejection::new(
					"content",
					"must be a Google Drive document id or document URL for drive-document sources.",
				)
			})?;

			Ok(SourceContent::DriveDocument { document_id })
		},
		SourceKind::PastedText => {
			let title = title.map(str::trim).filter(|title| !title.is_empty()).map(str::to_string);

			Ok(SourceContent::PastedText { title, text: content })
		},
		SourceKind::GeneratedNote =>
			Err(Rejection::new("kind", "generated-note sources are created with create_note.")),
	}
}

fn drive_document_id(content: &str) -> Option<String> {
	if DRIVE_DOCUMENT_ID.is_match(content) {
		return Some(content.to_string());
	}

	DRIVE_DOCUMENT_URL
		.captures(content)
		.and_then(|captures| captures.get(1))
		.map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
	use crate::{SourceContent, SourceKind, validate};

	#[test]
	fn blank_title_is_rejected() {
		let err = validate::notebook_title("   ").expect_err("expected rejection");

		assert_eq!(err.to_string(), "title must be non-empty.");
	}

	#[test]
	fn website_requires_http_url() {
		let content =
			validate::source_content(SourceKind::Website, " https://example.com/docs?page=1 ", None)
				.expect("valid url");

		assert_eq!(
			content,
			SourceContent::Website { url: "https://example.com/docs?page=1".to_string() }
		);
		assert!(validate::source_content(SourceKind::Website, "example.com", None).is_err());
		assert!(validate::source_content(SourceKind::Website, "ftp://example.com", None).is_err());
	}

	#[test]
	fn drive_document_accepts_id_or_url() {
		let from_id =
			validate::source_content(SourceKind::DriveDocument, "1AbCdEfGhIjKlMn", None).expect("id");
		let from_url = validate::source_content(
			SourceKind::DriveDocument,
			"https://docs.google.com/document/d/1AbCdEfGhIjKlMn/edit",
			None,
		)
		.expect("url");

		assert_eq!(from_id, from_url);
		assert!(validate::source_content(SourceKind::DriveDocument, "short", None).is_err());
	}

	#[test]
	fn pasted_text_drops_blank_title() {
		let content =
			validate::source_content(SourceKind::PastedText, "Hello world", Some("  ")).expect("text");

		assert_eq!(content, SourceContent::PastedText { title: None, text: "Hello world".to_string() });
	}

	#[test]
	fn generated_note_cannot_be_added_as_source() {
		let err = validate::source_content(SourceKind::GeneratedNote, "text", None)
			.expect_err("expected rejection");

		assert_eq!(err.field, "kind");
	}
}
