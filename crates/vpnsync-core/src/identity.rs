// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Normalization of directory records into matchable identities.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A directory record as returned by the directory collaborator.
///
/// Every field is optional; only `user_principal_name` is required to
/// produce an [`Identity`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentity {
	pub user_principal_name: Option<String>,
	pub display_name: Option<String>,
	pub common_name: Option<String>,
	pub sam_account_name: Option<String>,
	pub distinguished_name: Option<String>,
}

impl RawIdentity {
	/// Record with only a principal name, mostly useful in tests and fakes.
	pub fn with_principal(principal: impl Into<String>) -> Self {
		Self {
			user_principal_name: Some(principal.into()),
			..Self::default()
		}
	}

	/// Best identifier for warnings about this record.
	fn describe(&self) -> String {
		self
			.distinguished_name
			.as_deref()
			.or(self.sam_account_name.as_deref())
			.or(self.common_name.as_deref())
			.unwrap_or("<unnamed record>")
			.to_string()
	}
}

/// An authoritative identity, valid for the duration of one run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
	principal_name: String,
	display_label: String,
}

impl Identity {
	/// The join key used for matching credentials.
	pub fn principal_name(&self) -> &str {
		&self.principal_name
	}

	/// Human-readable label, reporting only.
	pub fn display_label(&self) -> &str {
		&self.display_label
	}
}

/// Why a record could not become an [`Identity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
	/// The principal name was absent or blank.
	MissingPrincipal,
	/// The principal name cannot be used as a credential label.
	InvalidPrincipal(String),
}

/// A record skipped during normalization.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed identity {record}: {reason}")]
pub struct MalformedIdentity {
	pub record: String,
	pub reason: MalformedReason,
}

impl std::fmt::Display for MalformedReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::MissingPrincipal => write!(f, "missing principal name"),
			Self::InvalidPrincipal(name) => write!(f, "invalid principal name {name:?}"),
		}
	}
}

/// Normalize a single record.
pub fn normalize(raw: &RawIdentity) -> Result<Identity, MalformedIdentity> {
	let principal = raw
		.user_principal_name
		.as_deref()
		.map(str::trim)
		.filter(|p| !p.is_empty())
		.ok_or_else(|| MalformedIdentity {
			record: raw.describe(),
			reason: MalformedReason::MissingPrincipal,
		})?;

	if principal.contains(|c| matches!(c, '/' | '\\' | '\0')) {
		return Err(MalformedIdentity {
			record: raw.describe(),
			reason: MalformedReason::InvalidPrincipal(principal.to_string()),
		});
	}

	let display_label = raw
		.display_name
		.as_deref()
		.or(raw.common_name.as_deref())
		.map(str::trim)
		.filter(|l| !l.is_empty())
		.unwrap_or(principal)
		.to_string();

	Ok(Identity {
		principal_name: principal.to_string(),
		display_label,
	})
}

/// Result of normalizing one directory batch.
#[derive(Clone, Debug, Default)]
pub struct NormalizedBatch {
	/// Identities in arrival order, one per principal name.
	pub identities: Vec<Identity>,
	/// Records that were skipped.
	pub malformed: Vec<MalformedIdentity>,
}

impl NormalizedBatch {
	/// The principal names of the batch, for parameterizing the scanner.
	pub fn principal_names(&self) -> HashSet<String> {
		self
			.identities
			.iter()
			.map(|i| i.principal_name.clone())
			.collect()
	}
}

/// Normalize a batch. The first occurrence of a principal wins; later
/// duplicates are dropped silently.
pub fn normalize_batch<'a, I>(records: I) -> NormalizedBatch
where
	I: IntoIterator<Item = &'a RawIdentity>,
{
	let mut seen = HashSet::new();
	let mut batch = NormalizedBatch::default();

	for raw in records {
		match normalize(raw) {
			Ok(identity) => {
				if seen.insert(identity.principal_name.clone()) {
					batch.identities.push(identity);
				} else {
					debug!(principal = %identity.principal_name, "dropping duplicate identity");
				}
			}
			Err(malformed) => batch.malformed.push(malformed),
		}
	}

	batch
}

#[cfg(test)]
pub(crate) fn identity(principal: &str) -> Identity {
	Identity {
		principal_name: principal.to_string(),
		display_label: principal.to_string(),
	}
}
