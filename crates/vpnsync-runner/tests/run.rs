// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end runs against in-memory directory and tool fakes.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use vpnsync_actuator::{CredentialIssuer, CredentialRevoker, ProvisionOutcome, RevokeOutcome};
use vpnsync_core::{CredentialArtifact, Identity, MalformedIdentity, RawIdentity, ReconciliationResult};
use vpnsync_directory::{DirectoryClient, DirectoryError};
use vpnsync_runner::{
	CancellationToken, ExitStatus, NullReporter, RunError, RunSettings, RunSummary, SyncReporter, SyncRunner,
};

enum Members {
	List(Vec<RawIdentity>),
	NotFound,
	Hang,
}

struct FakeDirectory {
	members: Members,
}

impl FakeDirectory {
	fn with(principals: &[&str]) -> Self {
		Self {
			members: Members::List(principals.iter().map(|p| RawIdentity::with_principal(*p)).collect()),
		}
	}
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
	async fn group_members(&self, group: &str) -> Result<Vec<RawIdentity>, DirectoryError> {
		match &self.members {
			Members::List(members) => Ok(members.clone()),
			Members::NotFound => Err(DirectoryError::GroupNotFound(group.to_string())),
			Members::Hang => {
				tokio::time::sleep(Duration::from_secs(60)).await;
				Ok(Vec::new())
			}
		}
	}
}

/// Records calls and fails or stalls for chosen names.
#[derive(Default)]
struct FakeTool {
	calls: Mutex<Vec<String>>,
	fail: HashSet<String>,
	stall: HashSet<String>,
	delay: Duration,
	in_flight: AtomicUsize,
	peak: AtomicUsize,
	cancel_after_first: Option<CancellationToken>,
}

impl FakeTool {
	fn failing(names: &[&str]) -> Self {
		Self {
			fail: names.iter().map(|n| n.to_string()).collect(),
			..Self::default()
		}
	}

	fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	async fn act(&self, label: String, name: &str) -> bool {
		let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.peak.fetch_max(now, Ordering::SeqCst);
		self.calls.lock().unwrap().push(label);
		if let Some(token) = &self.cancel_after_first {
			token.cancel();
		}
		if self.stall.contains(name) {
			tokio::time::sleep(Duration::from_secs(60)).await;
		}
		tokio::time::sleep(self.delay).await;
		self.in_flight.fetch_sub(1, Ordering::SeqCst);
		!self.fail.contains(name)
	}
}

#[async_trait]
impl CredentialIssuer for FakeTool {
	async fn provision(&self, principal_name: &str) -> ProvisionOutcome {
		if self.act(format!("add {principal_name}"), principal_name).await {
			ProvisionOutcome::Succeeded
		} else {
			ProvisionOutcome::failed("Client name already exists")
		}
	}
}

#[async_trait]
impl CredentialRevoker for FakeTool {
	async fn revoke(&self, artifact: &CredentialArtifact) -> RevokeOutcome {
		let name = artifact.bare_name();
		if self.act(format!("revoke {name}"), name).await {
			RevokeOutcome::Succeeded
		} else {
			RevokeOutcome::failed("no success marker")
		}
	}
}

#[derive(Default)]
struct RecordingReporter {
	malformed: Vec<String>,
	planned: Option<ReconciliationResult>,
	provisioned: Vec<(String, ProvisionOutcome)>,
	revoked: Vec<(String, RevokeOutcome)>,
	finished: Option<RunSummary>,
}

impl SyncReporter for RecordingReporter {
	fn malformed(&mut self, record: &MalformedIdentity) {
		self.malformed.push(record.record.clone());
	}

	fn planned(&mut self, plan: &ReconciliationResult) {
		self.planned = Some(plan.clone());
	}

	fn provisioned(&mut self, identity: &Identity, outcome: &ProvisionOutcome) {
		self.provisioned.push((identity.principal_name().to_string(), outcome.clone()));
	}

	fn revoked(&mut self, artifact: &CredentialArtifact, outcome: &RevokeOutcome) {
		self.revoked.push((artifact.artifact_id().to_string(), outcome.clone()));
	}

	fn finished(&mut self, summary: &RunSummary) {
		self.finished = Some(summary.clone());
	}
}

fn profiles(names: &[&str]) -> TempDir {
	let dir = TempDir::new().unwrap();
	for name in names {
		std::fs::write(dir.path().join(name), "client\n").unwrap();
	}
	dir
}

fn settings(dir: &Path) -> RunSettings {
	RunSettings {
		group: "VPN Users".to_string(),
		profile_dir: dir.to_path_buf(),
		extension: ".ovpn".to_string(),
		protected: Vec::new(),
		concurrency: 4,
		directory_timeout: Duration::from_secs(5),
		scan_timeout: Duration::from_secs(5),
		actuation_timeout: Duration::from_secs(5),
		dry_run: false,
	}
}

fn runner(directory: FakeDirectory, tool: Arc<FakeTool>, settings: RunSettings) -> SyncRunner {
	SyncRunner::new(Arc::new(directory), tool.clone(), tool, settings)
}

#[tokio::test]
async fn test_provisions_missing_and_revokes_orphans() {
	let dir = profiles(&["a@x.ovpn", "c@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(FakeDirectory::with(&["a@x", "b@x"]), tool.clone(), settings(dir.path()));

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(tool.calls(), vec!["add b@x", "revoke c@x"]);
	assert_eq!(report.summary.satisfied, 1);
	assert_eq!(report.summary.provisioned, 1);
	assert_eq!(report.summary.revoked, 1);
	assert_eq!(report.summary.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_converged_state_is_noop() {
	let dir = profiles(&["a@x.ovpn", "b@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(FakeDirectory::with(&["a@x", "b@x"]), tool.clone(), settings(dir.path()));

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert!(report.plan.is_noop());
	assert!(tool.calls().is_empty());
	assert_eq!(report.summary.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_empty_directory_provisions_everyone() {
	let dir = profiles(&[]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(FakeDirectory::with(&["a@x", "b@x"]), tool.clone(), settings(dir.path()));

	runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	let mut calls = tool.calls();
	calls.sort();
	assert_eq!(calls, vec!["add a@x", "add b@x"]);
}

#[tokio::test]
async fn test_variant_profile_satisfies_and_is_revoked_with_owner() {
	let dir = profiles(&["a@x--laptop.ovpn", "gone@x.ovpn", "gone@x--phone.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(FakeDirectory::with(&["a@x"]), tool.clone(), settings(dir.path()));

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(report.summary.to_provision, 0);
	let mut calls = tool.calls();
	calls.sort();
	assert_eq!(calls, vec!["revoke gone@x", "revoke gone@x--phone"]);
}

#[tokio::test]
async fn test_failure_does_not_abort_other_items() {
	let dir = profiles(&["old@x.ovpn", "stale@x.ovpn"]);
	let tool = Arc::new(FakeTool::failing(&["b@x", "old@x"]));
	let runner = runner(
		FakeDirectory::with(&["a@x", "b@x", "c@x"]),
		tool.clone(),
		settings(dir.path()),
	);

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(tool.calls().len(), 5);
	assert_eq!(report.summary.provisioned, 2);
	assert_eq!(report.summary.provision_failed, 1);
	assert_eq!(report.summary.revoked, 1);
	assert_eq!(report.summary.revoke_failed, 1);
	assert_eq!(report.summary.exit_status(), ExitStatus::ActuationFailed);

	let outcomes: Vec<_> = report
		.provisions
		.iter()
		.map(|(identity, outcome)| (identity.principal_name(), outcome.is_success()))
		.collect();
	assert_eq!(outcomes, vec![("a@x", true), ("b@x", false), ("c@x", true)]);
}

#[tokio::test]
async fn test_provisioning_finishes_before_revocation() {
	let dir = profiles(&["o1@x.ovpn", "o2@x.ovpn"]);
	let tool = Arc::new(FakeTool {
		delay: Duration::from_millis(10),
		..FakeTool::default()
	});
	let runner = runner(
		FakeDirectory::with(&["n1@x", "n2@x", "n3@x"]),
		tool.clone(),
		settings(dir.path()),
	);

	runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	let calls = tool.calls();
	assert_eq!(calls.len(), 5);
	assert!(calls[..3].iter().all(|c| c.starts_with("add ")), "{calls:?}");
	assert!(calls[3..].iter().all(|c| c.starts_with("revoke ")), "{calls:?}");
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
	let dir = profiles(&[]);
	let tool = Arc::new(FakeTool {
		delay: Duration::from_millis(20),
		..FakeTool::default()
	});
	let principals: Vec<String> = (0..10).map(|i| format!("user{i}@x")).collect();
	let refs: Vec<&str> = principals.iter().map(String::as_str).collect();
	let mut settings = settings(dir.path());
	settings.concurrency = 3;
	let runner = runner(FakeDirectory::with(&refs), tool.clone(), settings);

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(report.summary.provisioned, 10);
	assert!(tool.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_directory_error_is_fatal_before_actuation() {
	let dir = profiles(&["a@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(
		FakeDirectory {
			members: Members::NotFound,
		},
		tool.clone(),
		settings(dir.path()),
	);

	let err = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap_err();

	assert!(matches!(err, RunError::Directory(DirectoryError::GroupNotFound(_))));
	assert!(err.is_configuration());
	assert!(tool.calls().is_empty());
}

#[tokio::test]
async fn test_directory_timeout() {
	let dir = profiles(&["a@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let mut settings = settings(dir.path());
	settings.directory_timeout = Duration::from_millis(50);
	let runner = runner(
		FakeDirectory {
			members: Members::Hang,
		},
		tool.clone(),
		settings,
	);

	let err = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap_err();

	assert!(matches!(err, RunError::Directory(DirectoryError::Timeout(_))));
	assert!(tool.calls().is_empty());
}

#[tokio::test]
async fn test_missing_profile_dir_is_fatal() {
	let dir = TempDir::new().unwrap();
	let tool = Arc::new(FakeTool::default());
	let runner = runner(
		FakeDirectory::with(&["a@x"]),
		tool.clone(),
		settings(&dir.path().join("missing")),
	);

	let err = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap_err();

	assert!(matches!(err, RunError::Scan(_)));
	assert!(err.is_configuration());
	assert!(tool.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_records_are_reported_and_skipped() {
	let dir = profiles(&["a@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let directory = FakeDirectory {
		members: Members::List(vec![
			RawIdentity::with_principal("a@x"),
			RawIdentity {
				common_name: Some("Service Account".to_string()),
				..RawIdentity::default()
			},
			RawIdentity::with_principal("../etc@x"),
		]),
	};
	let runner = runner(directory, tool.clone(), settings(dir.path()));
	let mut reporter = RecordingReporter::default();

	let report = runner
		.run(&mut reporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(reporter.malformed.len(), 2);
	assert_eq!(report.summary.malformed, 2);
	assert!(tool.calls().is_empty());
	assert_eq!(report.summary.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_protected_profiles_are_kept() {
	let dir = profiles(&["server.ovpn", "a@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let mut settings = settings(dir.path());
	settings.protected = vec!["server.ovpn".to_string()];
	let runner = runner(FakeDirectory::with(&[]), tool.clone(), settings);

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(tool.calls(), vec!["revoke a@x"]);
	assert_eq!(report.summary.protected, 1);
}

#[tokio::test]
async fn test_dry_run_plans_without_actuating() {
	let dir = profiles(&["c@x.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let mut settings = settings(dir.path());
	settings.dry_run = true;
	let runner = runner(FakeDirectory::with(&["a@x"]), tool.clone(), settings);
	let mut reporter = RecordingReporter::default();

	let report = runner
		.run(&mut reporter, &CancellationToken::new())
		.await
		.unwrap();

	assert!(tool.calls().is_empty());
	assert_eq!(report.summary.to_provision, 1);
	assert_eq!(report.summary.to_revoke, 1);
	assert!(report.summary.dry_run);
	assert!(reporter.planned.is_some());
	assert_eq!(reporter.finished, Some(report.summary.clone()));
}

#[tokio::test]
async fn test_cancellation_skips_unstarted_items() {
	let dir = profiles(&["o1@x.ovpn", "o2@x.ovpn"]);
	let cancel = CancellationToken::new();
	let tool = Arc::new(FakeTool {
		cancel_after_first: Some(cancel.clone()),
		..FakeTool::default()
	});
	let mut settings = settings(dir.path());
	settings.concurrency = 1;
	let runner = runner(FakeDirectory::with(&["n1@x", "n2@x"]), tool.clone(), settings);
	let mut reporter = RecordingReporter::default();

	let report = runner.run(&mut reporter, &cancel).await.unwrap();

	assert_eq!(tool.calls().len(), 1);
	assert_eq!(report.summary.provisioned, 1);
	assert_eq!(report.summary.skipped, 3);
	assert_eq!(report.summary.exit_status(), ExitStatus::Interrupted);
	assert_eq!(reporter.provisioned.len(), 2);
	assert_eq!(reporter.revoked.len(), 2);
	assert!(reporter
		.revoked
		.iter()
		.all(|(_, outcome)| *outcome == RevokeOutcome::Skipped));
}

#[tokio::test]
async fn test_stalled_actuation_times_out() {
	let dir = profiles(&[]);
	let tool = Arc::new(FakeTool {
		stall: ["slow@x".to_string()].into_iter().collect(),
		..FakeTool::default()
	});
	let mut settings = settings(dir.path());
	settings.actuation_timeout = Duration::from_millis(50);
	let runner = runner(FakeDirectory::with(&["fast@x", "slow@x"]), tool.clone(), settings);

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(report.summary.provisioned, 1);
	assert_eq!(report.summary.provision_failed, 1);
	match &report.provisions[1] {
		(identity, ProvisionOutcome::Failed { diagnostic }) => {
			assert_eq!(identity.principal_name(), "slow@x");
			assert!(diagnostic.contains("timed out"), "{diagnostic}");
		}
		other => panic!("expected timeout failure, got {other:?}"),
	}
}

#[tokio::test]
async fn test_empty_group_revokes_everything() {
	let dir = profiles(&["a@x.ovpn", "b@x--tablet.ovpn"]);
	let tool = Arc::new(FakeTool::default());
	let runner = runner(FakeDirectory::with(&[]), tool.clone(), settings(dir.path()));

	let report = runner
		.run(&mut NullReporter, &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(report.summary.revoked, 2);
	assert_eq!(report.summary.to_provision, 0);
}
