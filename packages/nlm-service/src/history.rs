use serde::{Deserialize, Serialize};

use nlm_domain::{ConversationTurn, validate};

use crate::{Error, NlmService, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetConversationRequest {
	pub notebook_id: String,
	/// Most recent turns to return. All recorded turns when absent.
	pub max_turns: Option<usize>,
}
impl GetConversationRequest {
	pub(crate) fn validated(&self) -> Result<String> {
		if self.max_turns == Some(0) {
			return Err(Error::Validation {
				message: "max_turns must be greater than zero.".to_string(),
			});
		}

		Ok(validate::require_text("notebook_id", &self.notebook_id)?)
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct GetConversationResponse {
	pub notebook_id: String,
	pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClearConversationRequest {
	pub notebook_id: String,
}
impl ClearConversationRequest {
	pub(crate) fn validated(&self) -> Result<String> {
		Ok(validate::require_text("notebook_id", &self.notebook_id)?)
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearConversationResponse {
	pub notebook_id: String,
	pub cleared: usize,
}

// Conversation tools only touch local state and never consult the remote service. Reads never
// wait for an ask in flight on the same notebook.
impl NlmService {
	pub async fn get_conversation(
		&self,
		req: GetConversationRequest,
	) -> Result<GetConversationResponse> {
		let notebook_id = req.validated()?;
		let turns = match req.max_turns {
			Some(max_turns) => self.conversations.get_context(&notebook_id, max_turns),
			None => self.conversations.history(&notebook_id),
		};

		Ok(GetConversationResponse { notebook_id, turns })
	}

	pub async fn clear_conversation(
		&self,
		req: ClearConversationRequest,
	) -> Result<ClearConversationResponse> {
		let notebook_id = req.validated()?;
		let cleared = self.conversations.clear(&notebook_id);

		tracing::info!(notebook_id = %notebook_id, cleared, "Cleared conversation.");

		Ok(ClearConversationResponse { notebook_id, cleared })
	}
}
