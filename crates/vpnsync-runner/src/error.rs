// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use vpnsync_core::ScanError;
use vpnsync_directory::DirectoryError;

/// Failures that end a run before any actuation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
	#[error("directory query failed: {0}")]
	Directory(#[from] DirectoryError),

	#[error("credential scan failed: {0}")]
	Scan(#[from] ScanError),

	#[error("credential scan timed out after {0:?}")]
	ScanTimeout(Duration),
}

impl RunError {
	/// Whether the failure comes from a misconfigured path or group rather
	/// than connectivity.
	pub fn is_configuration(&self) -> bool {
		match self {
			Self::Scan(e) => e.is_configuration(),
			Self::Directory(DirectoryError::GroupNotFound(_) | DirectoryError::AmbiguousGroup { .. }) => true,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, RunError>;
