use std::{collections::BTreeMap, fs, sync::Arc, thread};

use nlm_credentials::{Credential, CredentialStore, Error};

fn credential(csrf: &str) -> Credential {
	Credential {
		cookies: BTreeMap::from([("SID".to_string(), format!("sid-{csrf}"))]),
		csrf_token: csrf.to_string(),
		session_id: None,
		extracted_at: None,
		expires_at: None,
	}
}

#[test]
fn load_without_artifact_is_not_found() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = CredentialStore::new(dir.path().join("auth.json"));
	let err = store.load().expect_err("Expected missing credential.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");
}

#[test]
fn save_then_load_returns_same_credential() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("nested").join("auth.json");
	let store = CredentialStore::new(&path);

	store.save(&credential("token-a")).expect("Failed to save credential.");

	let reopened = CredentialStore::new(&path);

	assert_eq!(reopened.load().expect("Failed to load credential."), credential("token-a"));
	assert!(!path.with_extension("json.tmp").exists(), "Temp file must be renamed into place.");
}

#[test]
fn invalidate_removes_artifact_and_cache() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("auth.json");
	let store = CredentialStore::new(&path);

	store.save(&credential("token-a")).expect("Failed to save credential.");
	store.current().expect("Credential must be available.");
	store.invalidate().expect("Failed to invalidate credential.");

	assert!(!path.exists());
	assert!(matches!(store.current(), Err(Error::NotFound { .. })));

	// Invalidating twice is harmless.
	store.invalidate().expect("Second invalidation must succeed.");
}

#[test]
fn current_picks_up_credential_written_after_invalidation() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("auth.json");
	let store = CredentialStore::new(&path);

	store.invalidate().expect("Failed to invalidate credential.");

	let payload = serde_json::to_vec(&credential("fresh")).expect("Failed to encode credential.");

	fs::write(&path, payload).expect("Failed to write credential.");

	assert_eq!(store.current().expect("Credential must load.").csrf_token, "fresh");
}

#[test]
fn malformed_artifact_reports_position_without_contents() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("auth.json");

	fs::write(&path, r#"{"cookies": {"SID": "leaky-secret"}, "csrf_token": 42}"#)
		.expect("Failed to write credential.");

	let err = CredentialStore::new(&path).load().expect_err("Expected parse failure.");

	assert!(matches!(err, Error::Parse { .. }), "Unexpected error: {err:?}");
	assert!(!format!("{err} {err:?}").contains("leaky-secret"));
}

#[test]
fn concurrent_saves_leave_a_parseable_artifact() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = Arc::new(CredentialStore::new(dir.path().join("auth.json")));
	let handles: Vec<_> = (0..8)
		.map(|index| {
			let store = store.clone();

			thread::spawn(move || store.save(&credential(&format!("token-{index}"))))
		})
		.collect();

	for handle in handles {
		handle.join().expect("Save thread panicked.").expect("Save must succeed.");
	}

	let loaded = store.load().expect("Final artifact must parse.");

	assert!(loaded.csrf_token.starts_with("token-"));
}

#[test]
fn fingerprint_is_stable_and_short() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = CredentialStore::new(dir.path().join("auth.json"));

	store.save(&credential("token-a")).expect("Failed to save credential.");

	let first = store.fingerprint().expect("fingerprint");
	let second = store.fingerprint().expect("fingerprint");

	assert_eq!(first, second);
	assert_eq!(first.len(), 12);
}

#[cfg(unix)]
#[test]
fn saved_artifact_is_owner_only() {
	use std::os::unix::fs::PermissionsExt;

	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("auth.json");

	CredentialStore::new(&path).save(&credential("token-a")).expect("Failed to save credential.");

	let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;

	assert_eq!(mode, 0o600);
}
