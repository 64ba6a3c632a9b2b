// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::artifact::ArtifactCatalog;

/// Errors listing credential storage.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
	#[error("credential directory does not exist: {}", .0.display())]
	Missing(PathBuf),

	#[error("credential path is not a directory: {}", .0.display())]
	NotADirectory(PathBuf),

	#[error("failed to list credential directory {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl ScanError {
	/// Whether the failure points at a misconfigured path rather than an I/O
	/// fault.
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::Missing(_) | Self::NotADirectory(_))
	}

	fn io(path: &Path, source: std::io::Error) -> Self {
		Self::Io {
			path: path.to_path_buf(),
			source,
		}
	}
}

/// List the regular files of a credential directory.
///
/// An existing empty directory yields an empty catalog; a missing one is an
/// error.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub async fn scan_directory(dir: &Path) -> Result<ArtifactCatalog, ScanError> {
	let metadata = match fs::metadata(dir).await {
		Ok(metadata) => metadata,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			return Err(ScanError::Missing(dir.to_path_buf()));
		}
		Err(e) => return Err(ScanError::io(dir, e)),
	};
	if !metadata.is_dir() {
		return Err(ScanError::NotADirectory(dir.to_path_buf()));
	}

	let mut entries = fs::read_dir(dir).await.map_err(|e| ScanError::io(dir, e))?;
	let mut names = Vec::new();

	while let Some(entry) = entries.next_entry().await.map_err(|e| ScanError::io(dir, e))? {
		let file_type = entry.file_type().await.map_err(|e| ScanError::io(dir, e))?;
		if !file_type.is_file() {
			continue;
		}
		match entry.file_name().into_string() {
			Ok(name) => names.push(name),
			Err(raw) => warn!(name = ?raw, "skipping non UTF-8 file name"),
		}
	}

	debug!(count = names.len(), "listed credential directory");
	Ok(ArtifactCatalog::new(names))
}
