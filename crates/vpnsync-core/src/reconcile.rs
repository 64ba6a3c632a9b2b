// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Three-way classification of identities and credential artifacts.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::artifact::CredentialArtifact;
use crate::identity::Identity;

/// An identity that already holds at least one credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Satisfied {
	pub identity: Identity,
	/// Every artifact owned by the identity, in artifact id order.
	pub artifacts: Vec<CredentialArtifact>,
}

/// The plan for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
	/// Identities with at least one artifact, in identity order.
	pub satisfied: Vec<Satisfied>,
	/// Identities without any artifact, in identity order.
	pub to_provision: Vec<Identity>,
	/// Artifacts without a matching identity, in artifact id order.
	pub to_revoke: Vec<CredentialArtifact>,
	/// Allow-listed artifacts left untouched.
	pub protected: Vec<CredentialArtifact>,
}

impl ReconciliationResult {
	pub fn is_noop(&self) -> bool {
		self.to_provision.is_empty() && self.to_revoke.is_empty()
	}
}

/// Classify identities against artifacts.
///
/// Any artifact of a principal, primary or variant, satisfies that
/// principal. An artifact is revoked when the scanner did not recognize it
/// or when its principal is not among `identities`. Artifacts are expected
/// in ascending id order, which [`crate::ArtifactCatalog`] guarantees.
pub fn reconcile<I>(identities: &[Identity], artifacts: I) -> ReconciliationResult
where
	I: IntoIterator<Item = CredentialArtifact>,
{
	let index: HashMap<&str, usize> = identities
		.iter()
		.enumerate()
		.map(|(i, identity)| (identity.principal_name(), i))
		.collect();

	let mut owned: Vec<Vec<CredentialArtifact>> = vec![Vec::new(); identities.len()];
	let mut result = ReconciliationResult::default();

	for artifact in artifacts {
		if artifact.is_protected() {
			result.protected.push(artifact);
			continue;
		}

		match artifact.principal_name().and_then(|p| index.get(p).copied()) {
			Some(i) => owned[i].push(artifact),
			None => result.to_revoke.push(artifact),
		}
	}

	for (identity, artifacts) in identities.iter().zip(owned) {
		if artifacts.is_empty() {
			result.to_provision.push(identity.clone());
		} else {
			result.satisfied.push(Satisfied {
				identity: identity.clone(),
				artifacts,
			});
		}
	}

	if identities.is_empty() && !result.to_revoke.is_empty() {
		warn!(
			count = result.to_revoke.len(),
			"no authorized identities; every credential will be revoked"
		);
	}

	debug!(
		satisfied = result.satisfied.len(),
		to_provision = result.to_provision.len(),
		to_revoke = result.to_revoke.len(),
		protected = result.protected.len(),
		"reconciled"
	);

	result
}
