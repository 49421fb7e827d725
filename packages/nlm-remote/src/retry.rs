use std::{future::Future, time::Duration};

use crate::{Error, Result};

const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
}
impl RetryPolicy {
	pub fn from_config(cfg: &nlm_config::Remote) -> Self {
		Self {
			max_attempts: cfg.max_attempts.max(1),
			initial_backoff: Duration::from_millis(cfg.backoff_initial_ms),
			max_backoff: Duration::from_millis(cfg.backoff_max_ms),
		}
	}

	/// Delay after the 1-based `attempt` failed.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);

		self.initial_backoff.saturating_mul(1 << shift).min(self.max_backoff)
	}
}

/// Runs `attempt_fn` until it succeeds, fails with a non-retryable error, or the attempt cap is
/// reached. Exhaustion surfaces a single error carrying the last cause and the attempt count.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, op: &'static str, mut attempt_fn: F) -> Result<T>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let max_attempts = policy.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match attempt_fn(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) if err.is_retryable() && attempt < max_attempts => {
				let delay = policy.backoff(attempt);

				tracing::warn!(
					op,
					attempt,
					max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"Retrying NotebookLM request."
				);
				tokio::time::sleep(delay).await;

				attempt += 1;
			},
			Err(Error::Remote { message }) if max_attempts > 1 =>
				return Err(Error::Remote {
					message: format!("{message} (gave up after {attempt} attempts)"),
				}),
			Err(err) => return Err(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::{
		sync::atomic::{AtomicU32, Ordering},
		time::Duration,
	};

	use crate::{Error, RetryPolicy, retry};

	fn policy(max_attempts: u32) -> RetryPolicy {
		RetryPolicy {
			max_attempts,
			initial_backoff: Duration::from_millis(1),
			max_backoff: Duration::from_millis(4),
		}
	}

	#[test]
	fn backoff_doubles_until_cap() {
		let policy = RetryPolicy {
			max_attempts: 5,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_millis(1_000),
		};

		assert_eq!(policy.backoff(1), Duration::from_millis(250));
		assert_eq!(policy.backoff(2), Duration::from_millis(500));
		assert_eq!(policy.backoff(3), Duration::from_millis(1_000));
		assert_eq!(policy.backoff(40), Duration::from_millis(1_000));
	}

	#[tokio::test]
	async fn transient_failures_stop_at_attempt_cap() {
		let calls = AtomicU32::new(0);
		let result: crate::Result<()> = retry::run(&policy(3), "list_notebooks", |_| {
			calls.fetch_add(1, Ordering::SeqCst);

			async { Err(Error::Remote { message: "HTTP 503".to_string() }) }
		})
		.await;

		assert_eq!(calls.load(Ordering::SeqCst), 3);

		let err = result.expect_err("expected exhaustion");

		assert!(err.to_string().contains("gave up after 3 attempts"), "unexpected error: {err}");
	}

	#[tokio::test]
	async fn auth_failures_are_not_retried() {
		let calls = AtomicU32::new(0);
		let result: crate::Result<()> = retry::run(&policy(3), "ask", |_| {
			calls.fetch_add(1, Ordering::SeqCst);

			async { Err(Error::Auth { message: "expired".to_string() }) }
		})
		.await;

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(matches!(result, Err(Error::Auth { .. })));
	}

	#[tokio::test]
	async fn recovers_after_transient_failure() {
		let result = retry::run(&policy(3), "create_note", |attempt| async move {
			if attempt == 1 {
				Err(Error::Remote { message: "connection reset".to_string() })
			} else {
				Ok(attempt)
			}
		})
		.await;

		assert_eq!(result, Ok(2));
	}
}
