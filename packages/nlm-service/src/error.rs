use serde::Serialize;

use nlm_domain::Rejection;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stable tags reported to MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	ValidationError,
	AuthError,
	NotFoundError,
	RemoteError,
	SkippedWithWarning,
}
impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ValidationError => "validation_error",
			Self::AuthError => "auth_error",
			Self::NotFoundError => "not_found_error",
			Self::RemoteError => "remote_error",
			Self::SkippedWithWarning => "skipped_with_warning",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("{message}")]
	Auth { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("{message}")]
	Remote { message: String },
}
impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Validation { .. } => ErrorKind::ValidationError,
			Self::Auth { .. } => ErrorKind::AuthError,
			Self::NotFound { .. } => ErrorKind::NotFoundError,
			Self::Remote { .. } => ErrorKind::RemoteError,
		}
	}
}

impl From<Rejection> for Error {
	fn from(err: Rejection) -> Self {
		Self::Validation { message: err.to_string() }
	}
}

impl From<nlm_remote::Error> for Error {
	fn from(err: nlm_remote::Error) -> Self {
		match err {
			nlm_remote::Error::Auth { message } => Self::Auth { message },
			nlm_remote::Error::NotFound { message } => Self::NotFound { message },
			nlm_remote::Error::Validation { message } => Self::Validation { message },
			err @ (nlm_remote::Error::Remote { .. }
			| nlm_remote::Error::InvalidResponse { .. }
			| nlm_remote::Error::InvalidConfig { .. }) => Self::Remote { message: err.to_string() },
		}
	}
}

/// Non-fatal problem attached to a successful tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
	pub kind: ErrorKind,
	pub message: String,
}
impl Warning {
	pub fn skipped(message: impl Into<String>) -> Self {
		Self { kind: ErrorKind::SkippedWithWarning, message: message.into() }
	}
}
