// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human-readable console output for a sync run.

use chrono::Utc;
use console::style;
use vpnsync_actuator::{ProvisionOutcome, RevokeOutcome};
use vpnsync_config::SyncConfig;
use vpnsync_core::{CredentialArtifact, Identity, MalformedIdentity, ReconciliationResult};
use vpnsync_runner::{RunSummary, SyncReporter};

const CHECK: &str = "✔";
const CROSS: &str = "✖";

/// `text` framed by rules of its own width.
pub fn banner(text: &str, top: char, bottom: char) -> String {
	let width = text.chars().count();
	format!(
		"{}\n{}\n{}",
		top.to_string().repeat(width),
		text,
		bottom.to_string().repeat(width)
	)
}

/// Print the title banner and the job header.
pub fn print_header(config: &SyncConfig) {
	let user = std::env::var("USER")
		.or_else(|_| std::env::var("USERNAME"))
		.unwrap_or_else(|_| "unknown".to_string());
	let rows = [
		("Domain Controller", config.directory.controller.clone()),
		("AD Service Account", config.directory.username.clone()),
		("AD Group", config.directory.group.clone()),
		("Profile Directory", config.storage.profile_dir.display().to_string()),
		("Current User", user),
		("Job Time", Utc::now().to_rfc2822()),
	];

	println!("{}", banner("Active Directory-PiVPN Sync Tool", '-', '-'));
	for (label, value) in rows {
		println!("  {:<20} {}", style(label).dim(), value);
	}
	if config.dry_run {
		println!("  {}", style("Dry run: nothing will be provisioned or revoked").yellow());
	}
}

/// One profile, with its variant tag highlighted.
pub fn format_artifact(artifact: &CredentialArtifact, extension: &str) -> String {
	let principal = artifact.principal_name().unwrap_or(artifact.bare_name());
	let variant = artifact
		.variant_suffix()
		.map(|v| format!("{}{}", style("--").dim(), style(v).cyan().bright()))
		.unwrap_or_default();
	format!("{}{}{}", style(principal).white(), variant, style(extension).dim())
}

/// Streams run progress to stdout.
pub struct ConsoleReporter {
	extension: String,
}

impl ConsoleReporter {
	pub fn new(extension: impl Into<String>) -> Self {
		Self {
			extension: extension.into(),
		}
	}
}

impl SyncReporter for ConsoleReporter {
	fn malformed(&mut self, record: &MalformedIdentity) {
		println!(
			"{} skipping {}: {}",
			style("!").yellow().bold(),
			record.record,
			record.reason
		);
	}

	fn planned(&mut self, plan: &ReconciliationResult) {
		println!("\n{}", style(banner("Provisioning VPN profiles", ' ', '-')).white().bright());
		for satisfied in &plan.satisfied {
			println!(
				"{} {}",
				style(CHECK).green(),
				style(satisfied.identity.principal_name()).dim()
			);
		}
		for identity in &plan.to_provision {
			println!(
				"{} {}",
				style("+").yellow(),
				style(identity.principal_name()).white().bright()
			);
		}

		println!("\n{}", banner("Verifying existing VPN profiles", ' ', '-'));
		for artifact in plan.satisfied.iter().flat_map(|s| &s.artifacts) {
			println!("{} {}", style(CHECK).green(), format_artifact(artifact, &self.extension));
		}
		for artifact in &plan.protected {
			println!(
				"{} {} {}",
				style(CHECK).green(),
				artifact.artifact_id(),
				style("(protected)").dim()
			);
		}

		println!("\n{}", banner("Revoking disowned/orphaned profiles", ' ', '-'));
		for artifact in &plan.to_revoke {
			println!("  {} {}", style("...").yellow(), artifact.bare_name());
		}
	}

	fn provisioned(&mut self, identity: &Identity, outcome: &ProvisionOutcome) {
		let name = identity.principal_name();
		match outcome {
			ProvisionOutcome::Succeeded => {
				println!("  {} VPN profile provisioned for {name}.", style(CHECK).green());
			}
			ProvisionOutcome::Failed { diagnostic } => {
				println!(
					"  {} Error provisioning VPN profile for {name}: {diagnostic}",
					style(CROSS).red()
				);
			}
			ProvisionOutcome::Skipped => {
				println!("  {} Skipped provisioning {name}.", style("-").dim());
			}
		}
	}

	fn revoked(&mut self, artifact: &CredentialArtifact, outcome: &RevokeOutcome) {
		let name = artifact.bare_name();
		match outcome {
			RevokeOutcome::Succeeded => {
				println!(
					"  {} Successfully revoked {name}. Restart OpenVPN to kick user.",
					style(CHECK).green()
				);
			}
			RevokeOutcome::Failed {
				reason,
				log_path: Some(path),
			} => {
				println!(
					"  {} Unable to revoke {name} ({reason}). Log written to {}.",
					style(CROSS).red(),
					path.display()
				);
			}
			RevokeOutcome::Failed { reason, log_path: None } => {
				println!("  {} Unable to revoke {name}: {reason}", style(CROSS).red());
			}
			RevokeOutcome::Skipped => {
				println!("  {} Skipped revoking {name}.", style("-").dim());
			}
		}
	}

	fn finished(&mut self, summary: &RunSummary) {
		println!();
		println!(
			"{} satisfied, {} to provision, {} to revoke, {} protected.",
			summary.satisfied, summary.to_provision, summary.to_revoke, summary.protected
		);
		if summary.dry_run {
			println!("Dry run: no VPN profiles were provisioned or revoked.");
			return;
		}

		println!("Provisioned {} VPN profiles.", summary.provisioned);
		println!("Revoked {} VPN profiles.", summary.revoked);
		let failed = summary.provision_failed + summary.revoke_failed;
		if failed > 0 {
			println!("{} {failed} operation(s) failed.", style(CROSS).red().bold());
		}
		if summary.skipped > 0 {
			println!(
				"{} {} operation(s) skipped after interrupt.",
				style("!").yellow().bold(),
				summary.skipped
			);
		}
	}
}
