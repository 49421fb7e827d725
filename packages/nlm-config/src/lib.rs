mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Conversation, Credentials, Notes, Query, Remote, Security, Service};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

pub const HOME_DIR_NAME: &str = ".notebooklm-mcp";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CREDENTIALS_FILE_NAME: &str = "auth.json";

const ENV_NOTE_PREFIX: &str = "NOTEBOOKLM_NOTE_PREFIX";
const ENV_NOTE_MAX_TITLE: &str = "NOTEBOOKLM_NOTE_MAX_TITLE";
const ENV_AUTO_SAVE: &str = "NOTEBOOKLM_AUTO_SAVE";
const ENV_USE_OPTIMIZATION: &str = "NOTEBOOKLM_USE_OPTIMIZATION";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	finish(&mut cfg, |key| env::var(key).ok())?;

	Ok(cfg)
}

/// Loads `path` when given, otherwise `~/.notebooklm-mcp/config.toml` when it exists, otherwise
/// the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
	if let Some(path) = path {
		return load(path);
	}

	let default_path = home_dir()?.join(CONFIG_FILE_NAME);

	if default_path.is_file() {
		return load(&default_path);
	}

	let mut cfg = Config::default();

	finish(&mut cfg, |key| env::var(key).ok())?;

	Ok(cfg)
}

pub fn home_dir() -> Result<PathBuf> {
	dirs::home_dir()
		.map(|home| home.join(HOME_DIR_NAME))
		.ok_or(Error::HomeDirUnavailable { what: "the NotebookLM MCP state directory" })
}

pub fn credentials_path(cfg: &Config) -> Result<PathBuf> {
	match cfg.credentials.path.as_deref() {
		Some(path) => expand_home(path),
		None => Ok(home_dir()?.join(CREDENTIALS_FILE_NAME)),
	}
}

pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(prefix) = lookup(ENV_NOTE_PREFIX) {
		cfg.notes.prefix = prefix;
	}
	if let Some(raw) = lookup(ENV_NOTE_MAX_TITLE) {
		cfg.notes.max_title_chars = raw.trim().parse().map_err(|_| Error::Validation {
			message: format!("{ENV_NOTE_MAX_TITLE} must be a non-negative integer, got {raw:?}."),
		})?;
	}
	if let Some(raw) = lookup(ENV_AUTO_SAVE) {
		cfg.notes.auto_save = parse_flag(&raw);
	}
	if let Some(raw) = lookup(ENV_USE_OPTIMIZATION) {
		cfg.query.use_optimization = parse_flag(&raw);
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if !matches!(cfg.service.transport.as_str(), "stdio" | "http") {
		return Err(Error::Validation {
			message: "service.transport must be one of stdio or http.".to_string(),
		});
	}
	if cfg.service.mcp_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be non-empty.".to_string(),
		});
	}

	match cfg.security.auth_mode.as_str() {
		"off" => {},
		"static_keys" =>
			if cfg.security.bearer_token.is_none() {
				return Err(Error::Validation {
					message: "security.bearer_token is required when security.auth_mode=static_keys."
						.to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "security.auth_mode must be one of off or static_keys.".to_string(),
			});
		},
	}

	let api_base = cfg.remote.api_base.trim();

	if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
		return Err(Error::Validation {
			message: "remote.api_base must start with http:// or https://.".to_string(),
		});
	}
	if cfg.remote.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "remote.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !(1..=10).contains(&cfg.remote.max_attempts) {
		return Err(Error::Validation {
			message: "remote.max_attempts must be in the range 1-10.".to_string(),
		});
	}
	if cfg.remote.backoff_initial_ms > cfg.remote.backoff_max_ms {
		return Err(Error::Validation {
			message: "remote.backoff_initial_ms must not exceed remote.backoff_max_ms.".to_string(),
		});
	}

	for (key, value) in &cfg.remote.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("remote.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.conversation.max_turns == 0 {
		return Err(Error::Validation {
			message: "conversation.max_turns must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.prefix.trim().is_empty() {
		return Err(Error::Validation { message: "notes.prefix must be non-empty.".to_string() });
	}
	if cfg.notes.max_title_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_title_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.auto_save_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "notes.auto_save_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn finish<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	apply_env_overrides(cfg, lookup)?;
	normalize(cfg);
	validate(cfg)
}

fn normalize(cfg: &mut Config) {
	cfg.service.transport = cfg.service.transport.trim().to_ascii_lowercase();
	cfg.security.auth_mode = cfg.security.auth_mode.trim().to_ascii_lowercase();

	if cfg.security.bearer_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.security.bearer_token = None;
	}

	cfg.remote.api_base = cfg.remote.api_base.trim().trim_end_matches('/').to_string();
}

fn parse_flag(raw: &str) -> bool {
	raw.trim().eq_ignore_ascii_case("true")
}

fn expand_home(path: &Path) -> Result<PathBuf> {
	match path.strip_prefix("~") {
		Ok(rest) => dirs::home_dir()
			.map(|home| home.join(rest))
			.ok_or(Error::HomeDirUnavailable { what: "credentials.path" }),
		Err(_) => Ok(path.to_path_buf()),
	}
}
