pub mod metadata;
pub mod model;
pub mod note;
pub mod query;
pub mod validate;

pub use metadata::{SourceMetadata, SourceType};
pub use model::{ConversationTurn, Notebook, Source, SourceContent, SourceKind};
pub use validate::Rejection;

/// External, human-driven command that populates the credential file.
pub const AUTH_COMMAND: &str = "notebooklm-mcp-auth";

/// Title of the pasted-text source that carries a notebook's description.
pub const NOTEBOOK_DESCRIPTION_TITLE: &str = "Notebook structure description";
