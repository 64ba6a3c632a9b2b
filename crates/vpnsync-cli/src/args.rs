// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::Parser;
use vpnsync_config::{ConfigLayer, SecretString};

/// Provision and revoke PiVPN profiles to match an Active Directory group.
#[derive(Debug, Parser)]
#[command(name = "vpnsync", version, about)]
pub struct Args {
	/// Config file (default: $XDG_CONFIG_HOME/vpnsync/config.toml, then /etc/vpnsync/config.toml)
	#[arg(long, env = "VPNSYNC_CONFIG")]
	pub config: Option<PathBuf>,

	/// Directory controller URL, e.g. ldaps://dc01.contoso.local
	#[arg(short = 'c', long, env = "VPNSYNC_CONTROLLER")]
	pub controller: Option<String>,

	/// Search base for group and member lookups
	#[arg(long = "dn", env = "VPNSYNC_BASE_DN")]
	pub base_dn: Option<String>,

	/// Service account used to bind
	#[arg(short = 'u', long, env = "VPNSYNC_USERNAME")]
	pub username: Option<String>,

	/// Service account password
	#[arg(short = 'p', long, env = "VPNSYNC_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Read the service account password from a file
	#[arg(long, env = "VPNSYNC_PASSWORD_FILE", conflicts_with = "password")]
	pub password_file: Option<PathBuf>,

	/// Group whose members should hold a VPN profile (name or DN)
	#[arg(short = 'g', long, env = "VPNSYNC_GROUP")]
	pub group: Option<String>,

	/// Directory holding the issued .ovpn profiles
	#[arg(short = 'o', long = "ovpn-directory", env = "VPNSYNC_PROFILE_DIR")]
	pub profile_dir: Option<PathBuf>,

	/// Profile file extension
	#[arg(long, env = "VPNSYNC_EXTENSION")]
	pub extension: Option<String>,

	/// pivpn program and leading arguments, e.g. "sudo /usr/local/bin/pivpn"
	#[arg(long, env = "VPNSYNC_PIVPN_COMMAND", value_delimiter = ' ', num_args = 1..)]
	pub pivpn_command: Option<Vec<String>>,

	/// Validity of newly issued certificates in days
	#[arg(long, env = "VPNSYNC_VALIDITY_DAYS")]
	pub validity_days: Option<u32>,

	/// Maximum concurrent pivpn invocations
	#[arg(short = 'j', long, env = "VPNSYNC_CONCURRENCY")]
	pub concurrency: Option<usize>,

	/// Directory query timeout in seconds
	#[arg(long, env = "VPNSYNC_DIRECTORY_TIMEOUT")]
	pub directory_timeout: Option<u64>,

	/// Profile directory scan timeout in seconds
	#[arg(long, env = "VPNSYNC_SCAN_TIMEOUT")]
	pub scan_timeout: Option<u64>,

	/// Timeout for a single pivpn invocation in seconds
	#[arg(long, env = "VPNSYNC_ACTUATION_TIMEOUT")]
	pub actuation_timeout: Option<u64>,

	/// Where revocation failure logs are written
	#[arg(long, env = "VPNSYNC_DIAGNOSTICS_DIR")]
	pub diagnostics_dir: Option<PathBuf>,

	/// Profile file that must never be revoked (repeatable)
	#[arg(long = "protect", env = "VPNSYNC_PROTECTED", value_delimiter = ',')]
	pub protected: Vec<String>,

	/// Show the plan without provisioning or revoking anything
	#[arg(short = 'n', long, env = "VPNSYNC_DRY_RUN")]
	pub dry_run: bool,

	/// Emit logs as JSON
	#[arg(long, env = "VPNSYNC_LOG_JSON")]
	pub log_json: bool,
}

impl Args {
	/// The command-line layer, which overrides the config file.
	pub fn overrides(&self) -> ConfigLayer {
		ConfigLayer {
			controller: self.controller.clone(),
			base_dn: self.base_dn.clone(),
			username: self.username.clone(),
			password: self.password.clone().map(SecretString::new),
			password_file: self.password_file.clone(),
			group: self.group.clone(),
			profile_dir: self.profile_dir.clone(),
			extension: self.extension.clone(),
			pivpn_command: self.pivpn_command.clone(),
			validity_days: self.validity_days,
			concurrency: self.concurrency,
			directory_timeout_secs: self.directory_timeout,
			scan_timeout_secs: self.scan_timeout,
			actuation_timeout_secs: self.actuation_timeout,
			diagnostics_dir: self.diagnostics_dir.clone(),
			protected: (!self.protected.is_empty()).then(|| self.protected.clone()),
			dry_run: self.dry_run.then_some(true),
		}
	}
}
