// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Config file discovery.

use std::path::{Path, PathBuf};

/// System-wide config file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/vpnsync/config.toml";

/// Candidate config file locations, highest priority first.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
	/// User config file: $XDG_CONFIG_HOME/vpnsync/config.toml
	pub user_config_file: Option<PathBuf>,
	/// System config file: /etc/vpnsync/config.toml
	pub system_config_file: PathBuf,
}

impl ConfigPaths {
	/// The first candidate that exists on disk.
	pub fn existing(&self) -> Option<&Path> {
		self
			.user_config_file
			.as_deref()
			.into_iter()
			.chain(std::iter::once(self.system_config_file.as_path()))
			.find(|p| p.is_file())
	}
}

/// Resolve config paths.
///
/// Uses XDG_CONFIG_HOME if set, otherwise the platform config directory.
pub fn resolve_config_paths() -> ConfigPaths {
	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(dirs::config_dir);

	let user_config_file = config_home.map(|home| home.join("vpnsync/config.toml"));

	tracing::debug!(
		user_config_file = ?user_config_file,
		system_config_file = SYSTEM_CONFIG_FILE,
		"resolved config paths"
	);

	ConfigPaths {
		user_config_file,
		system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_system_config_is_etc() {
		let paths = resolve_config_paths();
		assert_eq!(paths.system_config_file, PathBuf::from("/etc/vpnsync/config.toml"));
	}

	#[test]
	fn test_existing_prefers_user_file() {
		let dir = TempDir::new().unwrap();
		let user = dir.path().join("user.toml");
		let system = dir.path().join("system.toml");
		std::fs::write(&user, "").unwrap();
		std::fs::write(&system, "").unwrap();

		let paths = ConfigPaths {
			user_config_file: Some(user.clone()),
			system_config_file: system.clone(),
		};
		assert_eq!(paths.existing(), Some(user.as_path()));

		std::fs::remove_file(&user).unwrap();
		assert_eq!(paths.existing(), Some(system.as_path()));

		std::fs::remove_file(&system).unwrap();
		assert_eq!(paths.existing(), None);
	}
}
