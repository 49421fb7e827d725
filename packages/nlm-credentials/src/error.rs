use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No NotebookLM credentials found at {path:?}.")]
	NotFound { path: PathBuf },
	#[error("Failed to read credentials at {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	// Only the position is kept; parser messages can quote secret values.
	#[error("Credentials at {path:?} are malformed near line {line}, column {column}.")]
	Parse { path: PathBuf, line: usize, column: usize },
	#[error("Failed to write credentials at {path:?}.")]
	Write { path: PathBuf, source: std::io::Error },
	#[error("Failed to lock credentials at {path:?}.")]
	Lock { path: PathBuf, source: std::io::Error },
	#[error(transparent)]
	Serialize(#[from] serde_json::Error),
}
