// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use vpnsync_actuator::{ProvisionOutcome, RevokeOutcome};
use vpnsync_core::{CredentialArtifact, Identity, MalformedIdentity, ReconciliationResult};

/// Receives progress of a run as it happens.
///
/// Outcome callbacks fire in completion order, which with more than one
/// worker need not match plan order.
pub trait SyncReporter: Send {
	fn malformed(&mut self, _record: &MalformedIdentity) {}

	fn planned(&mut self, _plan: &ReconciliationResult) {}

	fn provisioned(&mut self, _identity: &Identity, _outcome: &ProvisionOutcome) {}

	fn revoked(&mut self, _artifact: &CredentialArtifact, _outcome: &RevokeOutcome) {}

	fn finished(&mut self, _summary: &RunSummary) {}
}

/// Reporter that ignores everything.
#[derive(Debug, Default)]
pub struct NullReporter;

impl SyncReporter for NullReporter {}

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
	/// Every operation succeeded.
	Success,
	/// At least one provisioning or revocation failed.
	ActuationFailed,
	/// Configuration or connectivity error; nothing was actuated.
	Fatal,
	/// Interrupted before every actuation could start.
	Interrupted,
}

impl ExitStatus {
	pub fn code(self) -> i32 {
		match self {
			Self::Success => 0,
			Self::ActuationFailed => 1,
			Self::Fatal => 2,
			Self::Interrupted => 130,
		}
	}
}

/// Counts for the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
	pub identities: usize,
	pub malformed: usize,
	pub satisfied: usize,
	pub to_provision: usize,
	pub provisioned: usize,
	pub provision_failed: usize,
	pub to_revoke: usize,
	pub revoked: usize,
	pub revoke_failed: usize,
	pub protected: usize,
	pub skipped: usize,
	pub dry_run: bool,
}

impl RunSummary {
	pub fn exit_status(&self) -> ExitStatus {
		if self.provision_failed > 0 || self.revoke_failed > 0 {
			ExitStatus::ActuationFailed
		} else if self.skipped > 0 {
			ExitStatus::Interrupted
		} else {
			ExitStatus::Success
		}
	}
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
	pub plan: ReconciliationResult,
	/// Provisioning outcomes in plan order.
	pub provisions: Vec<(Identity, ProvisionOutcome)>,
	/// Revocation outcomes in plan order.
	pub revocations: Vec<(CredentialArtifact, RevokeOutcome)>,
	pub summary: RunSummary,
}
