pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	Auth { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("NotebookLM request failed: {message}")]
	Remote { message: String },
	#[error("Unexpected NotebookLM response: {message}")]
	InvalidResponse { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
impl Error {
	/// Only transient transport and service faults are worth another attempt.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Remote { .. })
	}
}
