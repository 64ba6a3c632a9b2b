// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded fan-out of actuations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::cancel::CancellationToken;

/// How a pool turns the non-completing cases into outcomes.
pub(crate) struct Fallbacks<O> {
	/// Not started because the run was cancelled.
	pub skipped: O,
	/// Exceeded the per-item timeout.
	pub timed_out: O,
	/// The worker task panicked.
	pub crashed: O,
}

/// Run `action` for every item with at most `concurrency` in flight.
///
/// Items still waiting for a permit when `cancel` fires are skipped; running
/// ones finish. `on_done` is called in completion order; the returned outcomes
/// are in item order.
pub(crate) async fn run_bounded<T, O, F, Fut>(
	items: &[T],
	concurrency: usize,
	timeout: Duration,
	cancel: &CancellationToken,
	fallbacks: Fallbacks<O>,
	action: F,
	mut on_done: impl FnMut(&T, &O),
) -> Vec<O>
where
	T: Clone,
	O: Clone + Send + 'static,
	F: Fn(T) -> Fut,
	Fut: Future<Output = O> + Send + 'static,
{
	let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
	let mut tasks = JoinSet::new();

	for (index, item) in items.iter().cloned().enumerate() {
		let semaphore = Arc::clone(&semaphore);
		let cancel = cancel.clone();
		let skipped = fallbacks.skipped.clone();
		let timed_out = fallbacks.timed_out.clone();
		let work = action(item);

		tasks.spawn(async move {
			let permit = tokio::select! {
				biased;
				_ = cancel.cancelled() => None,
				permit = semaphore.acquire_owned() => permit.ok(),
			};
			let Some(_permit) = permit else {
				return (index, skipped);
			};
			if cancel.is_cancelled() {
				return (index, skipped);
			}
			match tokio::time::timeout(timeout, work).await {
				Ok(outcome) => (index, outcome),
				Err(_) => {
					warn!(index, timeout_secs = timeout.as_secs_f64(), "actuation timed out");
					(index, timed_out)
				}
			}
		});
	}

	let mut outcomes: Vec<Option<O>> = vec![None; items.len()];
	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((index, outcome)) => {
				on_done(&items[index], &outcome);
				outcomes[index] = Some(outcome);
			}
			Err(e) => error!(error = %e, "actuation task failed"),
		}
	}

	outcomes
		.into_iter()
		.zip(items)
		.map(|(outcome, item)| {
			outcome.unwrap_or_else(|| {
				let crashed = fallbacks.crashed.clone();
				on_done(item, &crashed);
				crashed
			})
		})
		.collect()
}
