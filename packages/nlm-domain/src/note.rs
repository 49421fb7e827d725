//! Formatting for answers saved back into a notebook as notes.

const ELLIPSIS: &str = "...";

/// Builds `"{prefix} {question}"`, cutting the question to `max_chars` characters and marking the
/// cut with an ellipsis.
pub fn title(prefix: &str, max_chars: usize, question: &str) -> String {
	let question = question.trim();
	let shortened = if question.chars().count() > max_chars {
		let mut cut: String = question.chars().take(max_chars).collect();

		cut.push_str(ELLIPSIS);

		cut
	} else {
		question.to_string()
	};

	format!("{} {shortened}", prefix.trim())
}

/// The saved note keeps the question so the note reads on its own.
pub fn body(question: &str, answer: &str) -> String {
	format!("Question: {}\n\n{}", question.trim(), answer.trim())
}

#[cfg(test)]
mod tests {
	use crate::note;

	#[test]
	fn short_question_is_kept_whole() {
		assert_eq!(note::title("Note:", 50, "  What is Rust? "), "Note: What is Rust?");
	}

	#[test]
	fn long_question_is_cut_on_char_boundary() {
		let title = note::title("Note:", 5, "Ünïcödé question");

		assert_eq!(title, "Note: Ünïcö...");
	}

	#[test]
	fn body_leads_with_question() {
		assert_eq!(
			note::body("Why?", "Because.\n"),
			"Question: Why?\n\nBecause."
		);
	}
}
