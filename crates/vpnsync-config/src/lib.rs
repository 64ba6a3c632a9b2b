// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for vpnsync.
//!
//! This crate provides:
//! - Config file discovery (user file, then `/etc/vpnsync/config.toml`)
//! - TOML config layers merged under command-line and environment overrides
//! - Validation into a [`SyncConfig`] before any I/O happens
//! - [`SecretString`] for the directory service password

pub mod error;
pub mod file;
pub mod paths;
pub mod runtime;
pub mod secret;

use std::path::Path;

pub use error::ConfigError;
pub use file::ConfigLayer;
pub use paths::{resolve_config_paths, ConfigPaths};
pub use runtime::{DirectorySettings, StorageSettings, SyncConfig, ToolSettings};
pub use secret::{SecretString, REDACTED};

/// Load configuration with command-line overrides.
///
/// `explicit` must exist when given. Otherwise the first existing default
/// config file is used, and a missing one is not an error.
pub fn load_config(overrides: ConfigLayer, explicit: Option<&Path>) -> Result<SyncConfig, ConfigError> {
	let file_layer = match explicit {
		Some(path) => ConfigLayer::from_file(path)?,
		None => match resolve_config_paths().existing() {
			Some(path) => ConfigLayer::from_file(path)?,
			None => ConfigLayer::default(),
		},
	};

	let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
		path: ".".into(),
		source: e,
	})?;

	SyncConfig::from_layer(file_layer.merge(overrides), &cwd)
}
