use time::macros::datetime;

use nlm_domain::{ConversationTurn, Notebook, Source, SourceKind};

#[test]
fn conversation_turn_serializes_rfc3339_timestamp() {
	let turn = ConversationTurn {
		notebook_id: "nb-1".to_string(),
		sequence: 3,
		question: "What changed?".to_string(),
		answer: "The retry cap.".to_string(),
		asked_at: datetime!(2026-03-01 12:30:00 UTC),
	};
	let json = serde_json::to_value(&turn).expect("Failed to serialize turn.");

	assert_eq!(json["asked_at"], "2026-03-01T12:30:00Z");
	assert_eq!(json["sequence"], 3);

	let parsed: ConversationTurn = serde_json::from_value(json).expect("Failed to parse turn.");

	assert_eq!(parsed, turn);
}

#[test]
fn notebook_without_sources_or_url_parses() {
	let notebook: Notebook =
		serde_json::from_value(serde_json::json!({ "id": "nb-1", "title": "Research" }))
			.expect("Failed to parse notebook.");

	assert_eq!(notebook.url, None);
	assert!(notebook.sources.is_empty());
}

#[test]
fn source_round_trips_kind_tag() {
	let source = Source {
		id: "src-1".to_string(),
		kind: SourceKind::DriveDocument,
		notebook_id: "nb-1".to_string(),
		title: None,
	};
	let json = serde_json::to_value(&source).expect("Failed to serialize source.");

	assert_eq!(json["kind"], "drive-document");
	assert!(json.get("title").is_none());
}
