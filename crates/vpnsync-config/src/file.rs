// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! TOML config file layer.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::secret::SecretString;

/// One config layer. Every field is optional; unset fields fall through to
/// lower layers or defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
	pub controller: Option<String>,
	pub base_dn: Option<String>,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	pub password_file: Option<PathBuf>,
	pub group: Option<String>,
	pub profile_dir: Option<PathBuf>,
	pub extension: Option<String>,
	pub pivpn_command: Option<Vec<String>>,
	pub validity_days: Option<u32>,
	pub concurrency: Option<usize>,
	pub directory_timeout_secs: Option<u64>,
	pub scan_timeout_secs: Option<u64>,
	pub actuation_timeout_secs: Option<u64>,
	pub diagnostics_dir: Option<PathBuf>,
	pub protected: Option<Vec<String>>,
	pub dry_run: Option<bool>,
}

impl ConfigLayer {
	pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(path.to_path_buf())
			} else {
				ConfigError::io(path, e)
			}
		})?;
		tracing::debug!(path = %path.display(), "loaded config file");
		Self::from_toml_str(&content, path)
	}

	/// Overlay `other` on top of `self`; set fields of `other` win.
	pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
		// A password given on a higher layer also shadows a lower
		// password_file, and the other way round.
		let (password, password_file) = if other.password.is_some() || other.password_file.is_some() {
			(other.password, other.password_file)
		} else {
			(self.password, self.password_file)
		};

		ConfigLayer {
			controller: other.controller.or(self.controller),
			base_dn: other.base_dn.or(self.base_dn),
			username: other.username.or(self.username),
			password,
			password_file,
			group: other.group.or(self.group),
			profile_dir: other.profile_dir.or(self.profile_dir),
			extension: other.extension.or(self.extension),
			pivpn_command: other.pivpn_command.or(self.pivpn_command),
			validity_days: other.validity_days.or(self.validity_days),
			concurrency: other.concurrency.or(self.concurrency),
			directory_timeout_secs: other.directory_timeout_secs.or(self.directory_timeout_secs),
			scan_timeout_secs: other.scan_timeout_secs.or(self.scan_timeout_secs),
			actuation_timeout_secs: other.actuation_timeout_secs.or(self.actuation_timeout_secs),
			diagnostics_dir: other.diagnostics_dir.or(self.diagnostics_dir),
			protected: other.protected.or(self.protected),
			dry_run: other.dry_run.or(self.dry_run),
		}
	}
}
