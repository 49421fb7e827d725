use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub security: Security,
	pub credentials: Credentials,
	pub remote: Remote,
	pub conversation: Conversation,
	pub notes: Notes,
	pub query: Query,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	/// Either "stdio" or "http".
	pub transport: String,
	/// Only used by the streamable HTTP transport.
	pub mcp_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self {
			transport: "stdio".to_string(),
			mcp_bind: "127.0.0.1:8765".to_string(),
			log_level: "info".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Security {
	/// Either "off" or "static_keys".
	pub auth_mode: String,
	pub bearer_token: Option<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self { auth_mode: "off".to_string(), bearer_token: None }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
	/// Defaults to `~/.notebooklm-mcp/auth.json`. A leading `~/` is expanded.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Remote {
	pub api_base: String,
	pub timeout_ms: u64,
	pub max_attempts: u32,
	pub backoff_initial_ms: u64,
	pub backoff_max_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for Remote {
	fn default() -> Self {
		Self {
			api_base: "https://notebooklm.google.com".to_string(),
			timeout_ms: 60_000,
			max_attempts: 3,
			backoff_initial_ms: 250,
			backoff_max_ms: 4_000,
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Conversation {
	/// Number of most recent turns sent as context with a follow-up question.
	pub max_turns: usize,
}
impl Default for Conversation {
	fn default() -> Self {
		Self { max_turns: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Notes {
	pub prefix: String,
	pub max_title_chars: usize,
	pub auto_save: bool,
	pub auto_save_timeout_ms: u64,
}
impl Default for Notes {
	fn default() -> Self {
		Self {
			prefix: "Note:".to_string(),
			max_title_chars: 50,
			auto_save: true,
			auto_save_timeout_ms: 30_000,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Query {
	/// Rewrites questions that carry section hints into section-scoped queries.
	pub use_optimization: bool,
}
impl Default for Query {
	fn default() -> Self {
		Self { use_optimization: true }
	}
}
