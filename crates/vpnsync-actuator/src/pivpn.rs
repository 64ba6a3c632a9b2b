// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};
use vpnsync_config::ToolSettings;
use vpnsync_core::{CredentialArtifact, DEFAULT_EXTENSION};

use crate::client::{CredentialIssuer, CredentialRevoker, ProvisionOutcome, RevokeOutcome};
use crate::diagnostics::write_revocation_log;

/// Printed by `pivpn revoke` once the CRL has been regenerated.
pub const REVOKE_SUCCESS_MARKER: &str = "Certificate revoked, and CRL file updated.";

/// Printed by `pivpn add` for a newly issued profile. WireGuard installs
/// write `.conf` profiles, OpenVPN ones `.ovpn`.
pub fn provision_success_marker(principal_name: &str, extension: &str) -> String {
	format!("Done! {principal_name}{extension} successfully created!")
}

/// Captured output of one tool invocation.
#[derive(Debug, Default)]
struct ToolOutput {
	stdout: String,
	stderr: String,
	status: Option<i32>,
}

impl ToolOutput {
	fn combined(&self) -> String {
		if self.stderr.is_empty() {
			self.stdout.clone()
		} else {
			format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr)
		}
	}

	/// Short explanation for a run that lacked the success marker.
	fn summary(&self) -> String {
		let last_line = self
			.stderr
			.lines()
			.chain(self.stdout.lines())
			.map(str::trim)
			.filter(|l| !l.is_empty())
			.last();

		match (self.status, last_line) {
			(Some(0), Some(line)) => format!("no success marker in output: {line}"),
			(Some(code), Some(line)) => format!("exited with status {code}: {line}"),
			(Some(code), None) => format!("exited with status {code} without output"),
			(None, Some(line)) => format!("terminated by signal: {line}"),
			(None, None) => "terminated by signal without output".to_string(),
		}
	}
}

/// pivpn client driving the `pivpn` CLI.
///
/// The child is killed if the future is dropped, so a caller-side timeout
/// leaves no process behind.
#[derive(Debug, Clone)]
pub struct PivpnCli {
	program: String,
	leading_args: Vec<String>,
	validity_days: u32,
	extension: String,
	diagnostics_dir: PathBuf,
}

impl PivpnCli {
	/// `command` is the program followed by any leading arguments, e.g.
	/// `["sudo", "/usr/local/bin/pivpn"]`.
	pub fn new(command: Vec<String>, validity_days: u32, diagnostics_dir: PathBuf) -> Self {
		let mut parts = command.into_iter();
		let program = parts.next().unwrap_or_else(|| "pivpn".to_string());
		Self {
			program,
			leading_args: parts.collect(),
			validity_days,
			extension: DEFAULT_EXTENSION.to_string(),
			diagnostics_dir,
		}
	}

	/// Profile extension expected in the `pivpn add` confirmation.
	pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	pub fn from_settings(settings: &ToolSettings) -> Self {
		Self::new(
			settings.command.clone(),
			settings.validity_days,
			settings.diagnostics_dir.clone(),
		)
		.with_extension(settings.extension.clone())
	}

	async fn run(&self, args: &[&str]) -> std::io::Result<ToolOutput> {
		let mut cmd = Command::new(&self.program);
		cmd.args(&self.leading_args)
			.args(args)
			.stdin(Stdio::null())
			.kill_on_drop(true);

		trace!(
			cmd = %format!("{} {} {}", self.program, self.leading_args.join(" "), args.join(" ")),
			"running pivpn command"
		);

		let output = cmd.output().await?;
		Ok(ToolOutput {
			stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
			stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
			status: output.status.code(),
		})
	}
}

#[async_trait]
impl CredentialIssuer for PivpnCli {
	#[instrument(skip(self))]
	async fn provision(&self, principal_name: &str) -> ProvisionOutcome {
		let days = self.validity_days.to_string();
		let args = ["add", "--name", principal_name, "nopass", "--days", days.as_str()];

		let output = match self.run(&args).await {
			Ok(output) => output,
			Err(e) => {
				warn!(error = %e, program = %self.program, "failed to start pivpn");
				return ProvisionOutcome::failed(format!("failed to run {}: {e}", self.program));
			}
		};

		if output
			.stdout
			.contains(&provision_success_marker(principal_name, &self.extension))
		{
			debug!("profile created");
			ProvisionOutcome::Succeeded
		} else {
			debug!(output = %output.combined(), "pivpn add did not confirm");
			ProvisionOutcome::failed(output.summary())
		}
	}
}

#[async_trait]
impl CredentialRevoker for PivpnCli {
	#[instrument(skip(self, artifact), fields(artifact = %artifact.artifact_id()))]
	async fn revoke(&self, artifact: &CredentialArtifact) -> RevokeOutcome {
		let name = artifact.bare_name();

		let (output, reason) = match self.run(&["revoke", name]).await {
			Ok(output) if output.stdout.contains(REVOKE_SUCCESS_MARKER) => {
				debug!("certificate revoked");
				return RevokeOutcome::Succeeded;
			}
			Ok(output) => {
				let reason = output.summary();
				(output.combined(), reason)
			}
			Err(e) => {
				let reason = format!("failed to run {}: {e}", self.program);
				(reason.clone(), reason)
			}
		};

		match write_revocation_log(&self.diagnostics_dir, name, &output).await {
			Ok(path) => RevokeOutcome::Failed {
				reason,
				log_path: Some(path),
			},
			Err(e) => {
				warn!(error = %e, "failed to write revocation log");
				RevokeOutcome::failed(reason)
			}
		}
	}
}
