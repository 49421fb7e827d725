//! In-memory follow-up history, one ordering lane per notebook.
//!
//! A lane pairs an async ordering lock, held by `ask` across the remote call, with the turns
//! themselves behind a short-lived `RwLock`. Readers only take the `RwLock`, so they never wait
//! on a remote call in flight.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use time::OffsetDateTime;
use tokio::sync::{Mutex as OrderMutex, OwnedMutexGuard};

use nlm_domain::ConversationTurn;

/// Turns recorded for a single notebook.
#[derive(Debug, Default)]
pub struct NotebookHistory {
	turns: Vec<ConversationTurn>,
	next_sequence: u64,
}
impl NotebookHistory {
	/// Last `max_turns` turns in chronological order.
	pub fn context(&self, max_turns: usize) -> Vec<ConversationTurn> {
		let start = self.turns.len().saturating_sub(max_turns);

		self.turns[start..].to_vec()
	}

	pub fn turns(&self) -> &[ConversationTurn] {
		&self.turns
	}

	pub fn append(&mut self, notebook_id: &str, question: &str, answer: &str) -> ConversationTurn {
		self.next_sequence += 1;

		let turn = ConversationTurn {
			notebook_id: notebook_id.to_string(),
			sequence: self.next_sequence,
			question: question.to_string(),
			answer: answer.to_string(),
			asked_at: OffsetDateTime::now_utc(),
		};

		self.turns.push(turn.clone());

		turn
	}

	/// Drops recorded turns. Sequence numbers keep counting so cleared turns are never reused.
	pub fn clear(&mut self) -> usize {
		let cleared = self.turns.len();

		self.turns.clear();

		cleared
	}
}

#[derive(Default)]
struct Lane {
	order: Arc<OrderMutex<()>>,
	history: RwLock<NotebookHistory>,
}
impl Lane {
	fn read(&self) -> RwLockReadGuard<'_, NotebookHistory> {
		self.history.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, NotebookHistory> {
		self.history.write().unwrap_or_else(|err| err.into_inner())
	}
}

/// Exclusive turn on one notebook's lane, held for the whole read-ask-append cycle.
///
/// Holding a session orders writers only. History reads go through [`ConversationState`] and do
/// not wait for it.
pub struct Session {
	_order: OwnedMutexGuard<()>,
	lane: Arc<Lane>,
}
impl Session {
	pub fn context(&self, max_turns: usize) -> Vec<ConversationTurn> {
		self.lane.read().context(max_turns)
	}

	pub fn append(&mut self, notebook_id: &str, question: &str, answer: &str) -> ConversationTurn {
		self.lane.write().append(notebook_id, question, answer)
	}
}

#[derive(Default)]
pub struct ConversationState {
	lanes: Mutex<HashMap<String, Arc<Lane>>>,
}
impl ConversationState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Waits for exclusive access to `notebook_id`. Other notebooks are never blocked.
	pub async fn session(&self, notebook_id: &str) -> Session {
		let lane = self.lane(notebook_id);
		let order = lane.order.clone().lock_owned().await;

		Session { _order: order, lane }
	}

	/// Records a turn after any session already held on the notebook is released.
	pub async fn append_turn(
		&self,
		notebook_id: &str,
		question: &str,
		answer: &str,
	) -> ConversationTurn {
		self.session(notebook_id).await.append(notebook_id, question, answer)
	}

	pub fn get_context(&self, notebook_id: &str, max_turns: usize) -> Vec<ConversationTurn> {
		self.existing(notebook_id).map(|lane| lane.read().context(max_turns)).unwrap_or_default()
	}

	pub fn history(&self, notebook_id: &str) -> Vec<ConversationTurn> {
		self.existing(notebook_id).map(|lane| lane.read().turns().to_vec()).unwrap_or_default()
	}

	/// Drops the recorded turns of `notebook_id`. An ask already in flight still records its turn.
	pub fn clear(&self, notebook_id: &str) -> usize {
		self.existing(notebook_id).map(|lane| lane.write().clear()).unwrap_or_default()
	}

	fn lanes(&self) -> MutexGuard<'_, HashMap<String, Arc<Lane>>> {
		self.lanes.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn lane(&self, notebook_id: &str) -> Arc<Lane> {
		self.lanes().entry(notebook_id.to_string()).or_default().clone()
	}

	fn existing(&self, notebook_id: &str) -> Option<Arc<Lane>> {
		self.lanes().get(notebook_id).cloned()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use crate::conversation::ConversationState;

	#[tokio::test]
	async fn context_is_the_most_recent_turns_in_order() {
		let state = ConversationState::new();

		for index in 1..=7 {
			state.append_turn("nb-1", &format!("q{index}"), &format!("a{index}")).await;
		}

		let context = state.get_context("nb-1", 5);
		let questions: Vec<_> = context.iter().map(|turn| turn.question.as_str()).collect();

		assert_eq!(questions, ["q3", "q4", "q5", "q6", "q7"]);
		assert_eq!(context[0].sequence, 3);
		assert_eq!(state.history("nb-1").len(), 7, "Reading context must not trim history.");
	}

	#[test]
	fn unknown_notebook_reads_and_clears_leave_no_lane() {
		let state = ConversationState::new();

		assert!(state.get_context("nb-missing", 5).is_empty());
		assert!(state.history("nb-other").is_empty());
		assert_eq!(state.clear("nb-third"), 0);
		assert!(state.lanes().is_empty());
	}

	#[tokio::test]
	async fn clear_keeps_sequence_counting() {
		let state = ConversationState::new();

		state.append_turn("nb-1", "q1", "a1").await;
		state.append_turn("nb-1", "q2", "a2").await;

		assert_eq!(state.clear("nb-1"), 2);
		assert!(state.history("nb-1").is_empty());
		assert_eq!(state.append_turn("nb-1", "q3", "a3").await.sequence, 3);
	}

	#[tokio::test]
	async fn held_session_does_not_block_other_notebooks() {
		let state = ConversationState::new();
		let _held = state.session("nb-1").await;
		let other = tokio::time::timeout(Duration::from_secs(1), state.append_turn("nb-2", "q", "a"))
			.await
			.expect("Other notebooks must not wait on nb-1.");

		assert_eq!(other.sequence, 1);

		let blocked =
			tokio::time::timeout(Duration::from_millis(50), state.append_turn("nb-1", "q", "a")).await;

		assert!(blocked.is_err(), "nb-1 must wait for the held session.");
	}

	#[tokio::test]
	async fn held_session_does_not_block_history_reads() {
		let state = ConversationState::new();

		state.append_turn("nb-1", "q1", "a1").await;

		let mut held = state.session("nb-1").await;

		assert_eq!(state.history("nb-1").len(), 1);
		assert_eq!(state.get_context("nb-1", 5)[0].question, "q1");

		held.append("nb-1", "q2", "a2");

		assert_eq!(state.history("nb-1").len(), 2);
	}
}
