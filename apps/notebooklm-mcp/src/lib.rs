pub mod cli;
pub mod server;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, ValueEnum};
use color_eyre::{Result, eyre};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use nlm_config::{Config, Security};
use nlm_credentials::CredentialStore;
use nlm_domain::AUTH_COMMAND;
use nlm_remote::HttpRemoteClient;
use nlm_service::NlmService;

#[derive(Debug, Parser)]
#[command(
	version = cli::VERSION,
	rename_all = "kebab",
	styles = cli::styles(),
)]
pub struct Args {
	/// Defaults to `~/.notebooklm-mcp/config.toml` when present.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	/// Overrides `service.transport`.
	#[arg(long, short = 't', value_enum)]
	pub transport: Option<Transport>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transport {
	Stdio,
	Http,
}
impl Transport {
	fn from_config(raw: &str) -> Result<Self> {
		match raw {
			"stdio" => Ok(Self::Stdio),
			"http" => Ok(Self::Http),
			other =>
				Err(eyre::eyre!("service.transport must be one of stdio or http, got {other}.")),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum McpAuthState {
	Off,
	StaticKeys { bearer_token: String },
}

pub async fn run(args: Args) -> Result<()> {
	let config = nlm_config::load_or_default(args.config.as_deref())?;

	init_tracing(&config)?;

	let transport = match args.transport {
		Some(transport) => transport,
		None => Transport::from_config(&config.service.transport)?,
	};
	let auth_state = match transport {
		Transport::Http => Some(build_auth_state(&config.security, &config.service.mcp_bind)?),
		Transport::Stdio => None,
	};
	let credentials = Arc::new(CredentialStore::new(nlm_config::credentials_path(&config)?));

	check_credentials(&credentials)?;

	let remote = Arc::new(HttpRemoteClient::new(&config.remote, credentials)?);
	let mcp_bind = config.service.mcp_bind.clone();
	let service = Arc::new(NlmService::new(config, remote));

	match auth_state {
		Some(auth_state) => server::serve_http(&mcp_bind, auth_state, service).await,
		None => server::serve_stdio(service).await,
	}
}

fn init_tracing(config: &Config) -> Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	// Stdout carries the stdio transport.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}

/// Refuses to start without a credential so the user learns about a missing sign-in before the
/// first tool call.
fn check_credentials(credentials: &CredentialStore) -> Result<()> {
	let credential = match credentials.load() {
		Ok(credential) => credential,
		Err(nlm_credentials::Error::NotFound { path }) => {
			return Err(eyre::eyre!(
				"No NotebookLM credentials found at {}. Run {AUTH_COMMAND} to sign in.",
				path.display()
			));
		},
		Err(err) => return Err(err.into()),
	};

	if credential.is_expired(OffsetDateTime::now_utc()) {
		tracing::warn!(
			path = %credentials.path().display(),
			"Stored NotebookLM session looks expired. Run {AUTH_COMMAND} if tool calls fail."
		);
	}

	tracing::info!(fingerprint = %credentials.fingerprint()?, "Using NotebookLM credential.");

	Ok(())
}

fn build_auth_state(security: &Security, mcp_bind: &str) -> Result<McpAuthState> {
	match security.auth_mode.as_str() {
		"off" => {
			enforce_loopback_for_off_mode(mcp_bind)?;

			Ok(McpAuthState::Off)
		},
		"static_keys" => {
			let bearer_token = security.bearer_token.clone().ok_or_else(|| {
				eyre::eyre!("security.bearer_token is required when security.auth_mode=static_keys.")
			})?;

			Ok(McpAuthState::StaticKeys { bearer_token })
		},
		other => Err(eyre::eyre!(
			"security.auth_mode must be one of off or static_keys, got {other}."
		)),
	}
}

fn enforce_loopback_for_off_mode(mcp_bind: &str) -> Result<()> {
	let bind_addr: SocketAddr = mcp_bind.parse().map_err(|err| {
		eyre::eyre!(
			"service.mcp_bind must be a valid socket address when security.auth_mode=off: {err}"
		)
	})?;

	if !bind_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.mcp_bind must be a loopback address when security.auth_mode=off."
		));
	}

	Ok(())
}
