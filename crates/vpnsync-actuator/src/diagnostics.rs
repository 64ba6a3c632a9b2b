// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Names tried per log before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// File name for a failed revocation of `bare_name` at `millis`. `attempt`
/// is zero for the first choice and counts up on name collisions.
pub fn revocation_log_name(bare_name: &str, millis: i64, attempt: u32) -> String {
	match attempt {
		0 => format!("revocation-fail--{bare_name}--{millis}.log"),
		n => format!("revocation-fail--{bare_name}--{millis}-{n}.log"),
	}
}

/// Persist the tool output of a failed revocation and return its path.
///
/// Never replaces an existing log.
#[instrument(skip(output), fields(dir = %dir.display()))]
pub async fn write_revocation_log(dir: &Path, bare_name: &str, output: &str) -> std::io::Result<PathBuf> {
	write_log_at(dir, bare_name, Utc::now().timestamp_millis(), output).await
}

async fn write_log_at(dir: &Path, bare_name: &str, millis: i64, output: &str) -> std::io::Result<PathBuf> {
	fs::create_dir_all(dir).await?;

	let mut attempt = 0;
	let (path, mut file) = loop {
		let path = dir.join(revocation_log_name(bare_name, millis, attempt));
		match OpenOptions::new().write(true).create_new(true).open(&path).await {
			Ok(file) => break (path, file),
			Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt + 1 < MAX_NAME_ATTEMPTS => {
				debug!(path = %path.display(), "log name taken");
				attempt += 1;
			}
			Err(e) => return Err(e),
		}
	};

	file.write_all(output.as_bytes()).await?;
	file.flush().await?;
	Ok(path)
}
