// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validated runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::file::ConfigLayer;
use crate::secret::SecretString;

pub const DEFAULT_EXTENSION: &str = ".ovpn";
pub const DEFAULT_PIVPN: &str = "/usr/local/bin/pivpn";
pub const DEFAULT_VALIDITY_DAYS: u32 = 1080;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ACTUATION_TIMEOUT_SECS: u64 = 120;

/// Where identities come from.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
	pub controller: String,
	pub base_dn: String,
	pub username: String,
	pub password: SecretString,
	pub group: String,
	pub timeout: Duration,
}

/// Where credentials live.
#[derive(Debug, Clone)]
pub struct StorageSettings {
	pub profile_dir: PathBuf,
	pub extension: String,
	pub protected: Vec<String>,
	pub scan_timeout: Duration,
}

/// How credentials are issued and revoked.
#[derive(Debug, Clone)]
pub struct ToolSettings {
	/// Program followed by leading arguments, e.g. `["sudo", "pivpn"]`.
	pub command: Vec<String>,
	pub validity_days: u32,
	/// Extension of the profiles the tool writes; same as the storage one.
	pub extension: String,
	pub timeout: Duration,
	pub diagnostics_dir: PathBuf,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
	pub directory: DirectorySettings,
	pub storage: StorageSettings,
	pub tool: ToolSettings,
	pub concurrency: usize,
	pub dry_run: bool,
}

impl SyncConfig {
	/// Resolve a merged layer into a validated config.
	///
	/// Relative paths are resolved against `cwd`.
	pub fn from_layer(layer: ConfigLayer, cwd: &Path) -> Result<Self, ConfigError> {
		let controller = required(layer.controller, "controller")?;
		if !(controller.starts_with("ldap://") || controller.starts_with("ldaps://")) {
			return Err(ConfigError::invalid_value(
				"controller",
				format!("expected an ldap:// or ldaps:// URL, got {controller:?}"),
			));
		}

		let password = match (layer.password, layer.password_file) {
			(Some(password), _) => password,
			(None, Some(path)) => read_secret_file(&cwd.join(path))?,
			(None, None) => return Err(ConfigError::missing_field("password")),
		};
		if password.is_empty() {
			return Err(ConfigError::missing_field("password"));
		}

		let directory = DirectorySettings {
			controller,
			base_dn: required(layer.base_dn, "base_dn")?,
			username: required(layer.username, "username")?,
			password,
			group: required(layer.group, "group")?,
			timeout: timeout(layer.directory_timeout_secs, DEFAULT_DIRECTORY_TIMEOUT_SECS, "directory_timeout_secs")?,
		};

		let profile_dir = layer
			.profile_dir
			.filter(|p| !p.as_os_str().is_empty())
			.ok_or_else(|| ConfigError::missing_field("profile_dir"))?;

		let extension = layer.extension.unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
		if extension.is_empty() {
			return Err(ConfigError::invalid_value("extension", "must not be empty"));
		}

		let storage = StorageSettings {
			profile_dir: cwd.join(profile_dir),
			extension: extension.clone(),
			protected: layer.protected.unwrap_or_default(),
			scan_timeout: timeout(layer.scan_timeout_secs, DEFAULT_SCAN_TIMEOUT_SECS, "scan_timeout_secs")?,
		};

		let command = layer
			.pivpn_command
			.unwrap_or_else(|| vec![DEFAULT_PIVPN.to_string()]);
		if command.first().map_or(true, |program| program.is_empty()) {
			return Err(ConfigError::invalid_value("pivpn_command", "must name a program"));
		}

		let validity_days = layer.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS);
		if validity_days == 0 {
			return Err(ConfigError::invalid_value("validity_days", "must be at least 1"));
		}

		let tool = ToolSettings {
			command,
			validity_days,
			extension,
			timeout: timeout(
				layer.actuation_timeout_secs,
				DEFAULT_ACTUATION_TIMEOUT_SECS,
				"actuation_timeout_secs",
			)?,
			diagnostics_dir: cwd.join(layer.diagnostics_dir.unwrap_or_else(|| PathBuf::from("."))),
		};

		let concurrency = layer.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
		if concurrency == 0 {
			return Err(ConfigError::invalid_value("concurrency", "must be at least 1"));
		}

		Ok(Self {
			directory,
			storage,
			tool,
			concurrency,
			dry_run: layer.dry_run.unwrap_or(false),
		})
	}
}

fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.ok_or_else(|| ConfigError::missing_field(field))
}

fn timeout(secs: Option<u64>, default: u64, field: &str) -> Result<Duration, ConfigError> {
	match secs.unwrap_or(default) {
		0 => Err(ConfigError::invalid_value(field, "must be at least 1 second")),
		secs => Ok(Duration::from_secs(secs)),
	}
}

fn read_secret_file(path: &Path) -> Result<SecretString, ConfigError> {
	let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
	Ok(SecretString::new(content.trim_end_matches(|c| c == '\r' || c == '\n')))
}
