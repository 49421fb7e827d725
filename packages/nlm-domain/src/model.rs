use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::validate::Rejection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
	pub id: String,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default)]
	pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
	pub id: String,
	pub kind: SourceKind,
	/// Back-reference only; the notebook itself is owned by the remote service.
	pub notebook_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
	Website,
	DriveDocument,
	PastedText,
	GeneratedNote,
}
impl SourceKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Website => "website",
			Self::DriveDocument => "drive-document",
			Self::PastedText => "pasted-text",
			Self::GeneratedNote => "generated-note",
		}
	}
}
impl fmt::Display for SourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for SourceKind {
	type Err = Rejection;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
			"website" => Ok(Self::Website),
			"drive-document" => Ok(Self::DriveDocument),
			"pasted-text" => Ok(Self::PastedText),
			"generated-note" => Ok(Self::GeneratedNote),
			_ => Err(Rejection::new(
				"kind",
				"must be one of website, drive-document, or pasted-text.",
			)),
		}
	}
}

/// Validated payload for adding a source. Notes are created through a separate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
	Website { url: String },
	DriveDocument { document_id: String },
	PastedText { title: Option<String>, text: String },
}
impl SourceContent {
	pub const fn kind(&self) -> SourceKind {
		match self {
			Self::Website { .. } => SourceKind::Website,
			Self::DriveDocument { .. } => SourceKind::DriveDocument,
			Self::PastedText { .. } => SourceKind::PastedText,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
	pub notebook_id: String,
	/// 1-based, assigned per notebook in append order.
	pub sequence: u64,
	pub question: String,
	pub answer: String,
	#[serde(with = "time::serde::rfc3339")]
	pub asked_at: OffsetDateTime,
}
