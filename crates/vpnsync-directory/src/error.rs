// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

/// Errors querying the directory. None of these may be read as "the group
/// is empty".
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
	#[error("failed to connect to {url}: {source}")]
	Connect {
		url: String,
		#[source]
		source: ldap3::LdapError,
	},

	#[error("bind as {user} was rejected: {message}")]
	Bind { user: String, message: String },

	#[error("directory search failed: {0}")]
	Search(#[source] ldap3::LdapError),

	#[error("group not found: {0}")]
	GroupNotFound(String),

	#[error("group name {group} matches {count} directory entries")]
	AmbiguousGroup { group: String, count: usize },

	#[error("directory query timed out after {0:?}")]
	Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
