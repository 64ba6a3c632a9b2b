// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use vpnsync_actuator::{CredentialIssuer, CredentialRevoker, ProvisionOutcome, RevokeOutcome};
use vpnsync_config::SyncConfig;
use vpnsync_core::{normalize_batch, reconcile, scan_directory, CredentialParser};
use vpnsync_directory::{DirectoryClient, DirectoryError};

use crate::cancel::CancellationToken;
use crate::error::{Result, RunError};
use crate::pool::{run_bounded, Fallbacks};
use crate::report::{RunReport, RunSummary, SyncReporter};

/// The subset of [`SyncConfig`] the runner needs.
#[derive(Debug, Clone)]
pub struct RunSettings {
	pub group: String,
	pub profile_dir: PathBuf,
	pub extension: String,
	pub protected: Vec<String>,
	pub concurrency: usize,
	pub directory_timeout: Duration,
	pub scan_timeout: Duration,
	pub actuation_timeout: Duration,
	pub dry_run: bool,
}

impl RunSettings {
	pub fn from_config(config: &SyncConfig) -> Self {
		Self {
			group: config.directory.group.clone(),
			profile_dir: config.storage.profile_dir.clone(),
			extension: config.storage.extension.clone(),
			protected: config.storage.protected.clone(),
			concurrency: config.concurrency,
			directory_timeout: config.directory.timeout,
			scan_timeout: config.storage.scan_timeout,
			actuation_timeout: config.tool.timeout,
			dry_run: config.dry_run,
		}
	}
}

/// Runs one reconciliation pass end to end.
pub struct SyncRunner {
	directory: Arc<dyn DirectoryClient>,
	issuer: Arc<dyn CredentialIssuer>,
	revoker: Arc<dyn CredentialRevoker>,
	settings: RunSettings,
}

impl SyncRunner {
	pub fn new(
		directory: Arc<dyn DirectoryClient>,
		issuer: Arc<dyn CredentialIssuer>,
		revoker: Arc<dyn CredentialRevoker>,
		settings: RunSettings,
	) -> Self {
		Self {
			directory,
			issuer,
			revoker,
			settings,
		}
	}

	pub fn settings(&self) -> &RunSettings {
		&self.settings
	}

	/// Query, scan, reconcile, then provision and revoke.
	///
	/// An `Err` means nothing was actuated. Per-item failures are reported
	/// in the returned [`RunReport`] and never abort the run. Every
	/// provisioning attempt finishes before the first revocation starts.
	#[instrument(skip_all, fields(group = %self.settings.group, dry_run = self.settings.dry_run))]
	pub async fn run(&self, reporter: &mut dyn SyncReporter, cancel: &CancellationToken) -> Result<RunReport> {
		let settings = &self.settings;

		let records = tokio::time::timeout(
			settings.directory_timeout,
			self.directory.group_members(&settings.group),
		)
		.await
		.map_err(|_| DirectoryError::Timeout(settings.directory_timeout))??;

		let batch = normalize_batch(&records);
		for malformed in &batch.malformed {
			warn!(record = %malformed.record, reason = %malformed.reason, "skipping malformed directory record");
			reporter.malformed(malformed);
		}
		info!(
			identities = batch.identities.len(),
			malformed = batch.malformed.len(),
			"directory query complete"
		);

		let catalog = tokio::time::timeout(settings.scan_timeout, scan_directory(&settings.profile_dir))
			.await
			.map_err(|_| RunError::ScanTimeout(settings.scan_timeout))??;

		let parser = CredentialParser::new(batch.principal_names())
			.with_extension(settings.extension.clone())
			.with_protected(settings.protected.iter().cloned());
		let plan = reconcile(&batch.identities, catalog.artifacts(&parser));
		info!(
			satisfied = plan.satisfied.len(),
			to_provision = plan.to_provision.len(),
			to_revoke = plan.to_revoke.len(),
			protected = plan.protected.len(),
			"reconciliation complete"
		);
		reporter.planned(&plan);

		let mut summary = RunSummary {
			identities: batch.identities.len(),
			malformed: batch.malformed.len(),
			satisfied: plan.satisfied.len(),
			to_provision: plan.to_provision.len(),
			to_revoke: plan.to_revoke.len(),
			protected: plan.protected.len(),
			dry_run: settings.dry_run,
			..RunSummary::default()
		};

		if settings.dry_run {
			info!("dry run, skipping actuation");
			reporter.finished(&summary);
			return Ok(RunReport {
				plan,
				provisions: Vec::new(),
				revocations: Vec::new(),
				summary,
			});
		}

		let timeout_message = format!("timed out after {}s", settings.actuation_timeout.as_secs());

		let provisions = run_bounded(
			&plan.to_provision,
			settings.concurrency,
			settings.actuation_timeout,
			cancel,
			Fallbacks {
				skipped: ProvisionOutcome::Skipped,
				timed_out: ProvisionOutcome::failed(timeout_message.clone()),
				crashed: ProvisionOutcome::failed("provisioning task panicked"),
			},
			|identity| {
				let issuer = Arc::clone(&self.issuer);
				async move { issuer.provision(identity.principal_name()).await }
			},
			|identity, outcome| reporter.provisioned(identity, outcome),
		)
		.await;

		let revocations = run_bounded(
			&plan.to_revoke,
			settings.concurrency,
			settings.actuation_timeout,
			cancel,
			Fallbacks {
				skipped: RevokeOutcome::Skipped,
				timed_out: RevokeOutcome::failed(timeout_message),
				crashed: RevokeOutcome::failed("revocation task panicked"),
			},
			|artifact| {
				let revoker = Arc::clone(&self.revoker);
				async move { revoker.revoke(&artifact).await }
			},
			|artifact, outcome| reporter.revoked(artifact, outcome),
		)
		.await;

		for outcome in &provisions {
			match outcome {
				ProvisionOutcome::Succeeded => summary.provisioned += 1,
				ProvisionOutcome::Failed { .. } => summary.provision_failed += 1,
				ProvisionOutcome::Skipped => summary.skipped += 1,
			}
		}
		for outcome in &revocations {
			match outcome {
				RevokeOutcome::Succeeded => summary.revoked += 1,
				RevokeOutcome::Failed { .. } => summary.revoke_failed += 1,
				RevokeOutcome::Skipped => summary.skipped += 1,
			}
		}

		info!(
			provisioned = summary.provisioned,
			provision_failed = summary.provision_failed,
			revoked = summary.revoked,
			revoke_failed = summary.revoke_failed,
			skipped = summary.skipped,
			"sync complete"
		);
		reporter.finished(&summary);

		Ok(RunReport {
			provisions: plan.to_provision.iter().cloned().zip(provisions).collect(),
			revocations: plan.to_revoke.iter().cloned().zip(revocations).collect(),
			plan,
			summary,
		})
	}
}
