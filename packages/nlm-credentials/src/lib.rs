//! Local NotebookLM credential artifact.
//!
//! The artifact is produced by the external sign-in flow and consumed here. Contents never leave
//! this crate except as request headers built by the remote client; logs only ever see the
//! [`CredentialStore::fingerprint`].

mod error;

pub use error::{Error, Result};

use std::{
	collections::BTreeMap,
	fmt,
	fs::{self, File, OpenOptions},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
	sync::RwLock,
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const FINGERPRINT_HEX_LEN: usize = 12;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	pub cookies: BTreeMap<String, String>,
	pub csrf_token: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub extracted_at: Option<OffsetDateTime>,
	/// Once passed, the remote client treats the session as expired: it invalidates the store and
	/// fails the call without contacting the remote service.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl Credential {
	pub fn cookie_header(&self) -> String {
		self.cookies.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("; ")
	}

	pub fn is_expired(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at <= now)
	}
}
impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credential")
			.field("cookies", &format_args!("<{} redacted>", self.cookies.len()))
			.field("csrf_token", &"<redacted>")
			.field("session_id", &self.session_id.as_ref().map(|_| "<redacted>"))
			.field("extracted_at", &self.extracted_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Exclusive handle on the credential artifact, created once at startup and shared by reference.
pub struct CredentialStore {
	path: PathBuf,
	cached: RwLock<Option<Credential>>,
}
impl CredentialStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), cached: RwLock::new(None) }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the artifact from disk and refreshes the cached copy.
	pub fn load(&self) -> Result<Credential> {
		let raw = match fs::read(&self.path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => {
				self.clear_cache();

				return Err(Error::NotFound { path: self.path.clone() });
			},
			Err(err) => return Err(Error::Read { path: self.path.clone(), source: err }),
		};
		let credential: Credential = serde_json::from_slice(&raw).map_err(|err| Error::Parse {
			path: self.path.clone(),
			line: err.line(),
			column: err.column(),
		})?;

		*self.cached.write().unwrap_or_else(|err| err.into_inner()) = Some(credential.clone());

		tracing::debug!(fingerprint = %fingerprint_of(&raw), "Loaded NotebookLM credential.");

		Ok(credential)
	}

	/// Returns the cached credential, falling back to disk so a fresh sign-in is picked up
	/// without a restart.
	pub fn current(&self) -> Result<Credential> {
		if let Some(credential) =
			self.cached.read().unwrap_or_else(|err| err.into_inner()).as_ref()
		{
			return Ok(credential.clone());
		}

		self.load()
	}

	pub fn save(&self, credential: &Credential) -> Result<()> {
		let payload = serde_json::to_vec_pretty(credential)?;
		let _guard = self.lock()?;
		let tmp_path = self.path.with_extension("json.tmp");

		write_private(&tmp_path, &payload)
			.map_err(|err| Error::Write { path: tmp_path.clone(), source: err })?;
		fs::rename(&tmp_path, &self.path)
			.map_err(|err| Error::Write { path: self.path.clone(), source: err })?;

		*self.cached.write().unwrap_or_else(|err| err.into_inner()) = Some(credential.clone());

		tracing::info!(fingerprint = %fingerprint_of(&payload), "Saved NotebookLM credential.");

		Ok(())
	}

	/// Drops the cached credential and removes the artifact. Every later remote call fails fast
	/// until the external sign-in flow writes a new one.
	pub fn invalidate(&self) -> Result<()> {
		let _guard = self.lock()?;

		self.clear_cache();

		match fs::remove_file(&self.path) {
			Ok(()) => {},
			Err(err) if err.kind() == ErrorKind::NotFound => {},
			Err(err) => return Err(Error::Write { path: self.path.clone(), source: err }),
		}

		tracing::warn!(path = ?self.path, "Invalidated NotebookLM credential; sign-in required.");

		Ok(())
	}

	/// Short digest of the artifact, safe to log.
	pub fn fingerprint(&self) -> Result<String> {
		match fs::read(&self.path) {
			Ok(raw) => Ok(fingerprint_of(&raw)),
			Err(err) if err.kind() == ErrorKind::NotFound =>
				Err(Error::NotFound { path: self.path.clone() }),
			Err(err) => Err(Error::Read { path: self.path.clone(), source: err }),
		}
	}

	fn clear_cache(&self) {
		*self.cached.write().unwrap_or_else(|err| err.into_inner()) = None;
	}

	// Held for the duration of a write. Dropping the file releases the lock.
	fn lock(&self) -> Result<File> {
		let lock_path = self.path.with_extension("json.lock");

		if let Some(parent) = lock_path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)
				.map_err(|err| Error::Lock { path: lock_path.clone(), source: err })?;
		}

		let file = OpenOptions::new()
			.create(true)
			.truncate(false)
			.write(true)
			.open(&lock_path)
			.map_err(|err| Error::Lock { path: lock_path.clone(), source: err })?;

		file.lock().map_err(|err| Error::Lock { path: lock_path, source: err })?;

		Ok(file)
	}
}

fn fingerprint_of(raw: &[u8]) -> String {
	let hex = blake3::hash(raw).to_hex();

	hex.as_str()[..FINGERPRINT_HEX_LEN].to_string()
}

fn write_private(path: &Path, payload: &[u8]) -> std::io::Result<()> {
	let mut options = OpenOptions::new();

	options.create(true).truncate(true).write(true);

	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;

		options.mode(0o600);
	}

	let mut file = options.open(path)?;

	file.write_all(payload)?;
	file.sync_all()
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use time::macros::datetime;

	use crate::Credential;

	fn sample() -> Credential {
		Credential {
			cookies: BTreeMap::from([
				("SID".to_string(), "sid-secret".to_string()),
				("HSID".to_string(), "hsid-secret".to_string()),
			]),
			csrf_token: "csrf-secret".to_string(),
			session_id: Some("session-secret".to_string()),
			extracted_at: None,
			expires_at: Some(datetime!(2026-01-01 00:00:00 UTC)),
		}
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let rendered = format!("{:?}", sample());

		for secret in ["sid-secret", "hsid-secret", "csrf-secret", "session-secret"] {
			assert!(!rendered.contains(secret), "Debug output leaked {secret}: {rendered}");
		}
	}

	#[test]
	fn cookie_header_joins_sorted_pairs() {
		assert_eq!(sample().cookie_header(), "HSID=hsid-secret; SID=sid-secret");
	}

	#[test]
	fn expiry_hint_is_inclusive() {
		let credential = sample();

		assert!(credential.is_expired(datetime!(2026-01-01 00:00:00 UTC)));
		assert!(!credential.is_expired(datetime!(2025-12-31 23:59:59 UTC)));
	}
}
