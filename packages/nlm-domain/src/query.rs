//! Section-scoped question shaping.
//!
//! Pointing NotebookLM at named sections keeps it from scanning the whole notebook. The shaped
//! text is only what gets sent; conversation history keeps the caller's own wording.

/// A titled area of a notebook and the keywords that lead to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	pub title: String,
	pub keywords: Vec<String>,
}

/// Returns the question to send for `question` scoped to `sections`.
///
/// Blank section names are ignored. With no usable sections, or with `enabled` off, the trimmed
/// question is returned unchanged.
pub fn shape(question: &str, sections: &[String], enabled: bool) -> String {
	let question = question.trim();

	if !enabled {
		return question.to_string();
	}

	let sections: Vec<&str> =
		sections.iter().map(|section| section.trim()).filter(|section| !section.is_empty()).collect();

	match sections.as_slice() {
		[] => question.to_string(),
		[section] => format!("In section '{section}' find: {question}"),
		many => {
			let quoted: Vec<String> = many.iter().map(|section| format!("'{section}'")).collect();

			format!("In sections {} find: {question}", quoted.join(", "))
		},
	}
}

/// Title of the first section with a keyword that appears in `question` as whole words,
/// ignoring case.
pub fn navigate<'a>(question: &str, sections: &'a [Section]) -> Option<&'a str> {
	let question = words(question);

	sections
		.iter()
		.find(|section| {
			section.keywords.iter().any(|keyword| contains_phrase(&question, &words(keyword)))
		})
		.map(|section| section.title.as_str())
}

pub fn comparison(first: &str, second: &str) -> String {
	format!("Compare {} and {}", first.trim(), second.trim())
}

/// Scopes a [`comparison`] question to one section.
pub fn scoped_comparison(comparison: &str, section: Option<&str>, enabled: bool) -> String {
	match section.map(str::trim).filter(|section| !section.is_empty()) {
		Some(section) if enabled => format!("In section '{section}' {comparison}"),
		_ => comparison.to_string(),
	}
}

fn words(text: &str) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
		.collect()
}

fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
	!phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}

#[cfg(test)]
mod tests {
	use crate::query::{self, Section};

	fn sections(raw: &[&str]) -> Vec<String> {
		raw.iter().map(|value| value.to_string()).collect()
	}

	fn section(title: &str, keywords: &[&str]) -> Section {
		Section {
			title: title.to_string(),
			keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
		}
	}

	#[test]
	fn single_section_is_named() {
		assert_eq!(
			query::shape("how do I log in?", &sections(&["API Reference"]), true),
			"In section 'API Reference' find: how do I log in?"
		);
	}

	#[test]
	fn multiple_sections_are_listed() {
		assert_eq!(
			query::shape("retries", &sections(&["Client", " ", "Server"]), true),
			"In sections 'Client', 'Server' find: retries"
		);
	}

	#[test]
	fn disabled_or_empty_sections_keep_question() {
		assert_eq!(query::shape(" retries ", &sections(&["Client"]), false), "retries");
		assert_eq!(query::shape("retries", &[], true), "retries");
	}

	#[test]
	fn navigation_matches_whole_words_ignoring_case() {
		let map = [
			section("Storage", &["disk", "snapshots"]),
			section("HTTP client", &["retry policy", "Timeouts"]),
		];

		assert_eq!(query::navigate("What are the default timeouts?", &map), Some("HTTP client"));
		assert_eq!(query::navigate("Explain the retry policy.", &map), Some("HTTP client"));
		assert_eq!(query::navigate("Which retry is used?", &map), None);
		assert_eq!(query::navigate("diskless mode", &map), None);
	}

	#[test]
	fn navigation_prefers_the_first_matching_section() {
		let map = [section("Guide", &["auth"]), section("Reference", &["auth"])];

		assert_eq!(query::navigate("auth flow", &map), Some("Guide"));
	}

	#[test]
	fn comparison_can_be_scoped() {
		let question = query::comparison(" GET ", "POST");

		assert_eq!(question, "Compare GET and POST");
		assert_eq!(
			query::scoped_comparison(&question, Some("HTTP Methods"), true),
			"In section 'HTTP Methods' Compare GET and POST"
		);
		assert_eq!(query::scoped_comparison(&question, Some("HTTP Methods"), false), question);
		assert_eq!(query::scoped_comparison(&question, Some(" "), true), question);
	}
}
