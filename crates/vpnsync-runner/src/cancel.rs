// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Stops a run from starting new actuations. Work already in flight is left
/// to finish.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
	inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
	cancelled: AtomicBool,
	notify: Notify,
}

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.inner.cancelled.store(true, Ordering::SeqCst);
		self.inner.notify.notify_waiters();
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.cancelled.load(Ordering::SeqCst)
	}

	/// Resolves once [`cancel`](Self::cancel) has been called.
	pub async fn cancelled(&self) {
		let notified = self.inner.notify.notified();
		tokio::pin!(notified);
		notified.as_mut().enable();
		if self.is_cancelled() {
			return;
		}
		notified.await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn test_clones_share_state() {
		let token = CancellationToken::new();
		let clone = token.clone();
		assert!(!clone.is_cancelled());
		token.cancel();
		assert!(clone.is_cancelled());
	}

	#[tokio::test]
	async fn test_cancelled_wakes_waiter() {
		let token = CancellationToken::new();
		let waiter = {
			let token = token.clone();
			tokio::spawn(async move { token.cancelled().await })
		};

		tokio::time::sleep(Duration::from_millis(10)).await;
		token.cancel();

		tokio::time::timeout(Duration::from_secs(1), waiter)
			.await
			.unwrap()
			.unwrap();
	}

	#[tokio::test]
	async fn test_cancelled_returns_when_already_cancelled() {
		let token = CancellationToken::new();
		token.cancel();
		tokio::time::timeout(Duration::from_secs(1), token.cancelled())
			.await
			.unwrap();
	}
}
