// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use vpnsync_core::CredentialArtifact;

/// Result of issuing one credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
	Succeeded,
	/// The tool did not confirm issuance.
	Failed { diagnostic: String },
	/// Not attempted because the run was interrupted.
	Skipped,
}

impl ProvisionOutcome {
	pub fn failed(diagnostic: impl Into<String>) -> Self {
		Self::Failed {
			diagnostic: diagnostic.into(),
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Succeeded)
	}
}

/// Result of revoking one credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevokeOutcome {
	Succeeded,
	/// The tool did not confirm revocation. `log_path` holds the tool output
	/// unless writing it failed too.
	Failed {
		reason: String,
		log_path: Option<PathBuf>,
	},
	/// Not attempted because the run was interrupted.
	Skipped,
}

impl RevokeOutcome {
	pub fn failed(reason: impl Into<String>) -> Self {
		Self::Failed {
			reason: reason.into(),
			log_path: None,
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Succeeded)
	}
}

/// Issues credentials. Implementations report failure through the outcome
/// and never abort the caller.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
	async fn provision(&self, principal_name: &str) -> ProvisionOutcome;
}

/// Invalidates credentials.
#[async_trait]
pub trait CredentialRevoker: Send + Sync {
	async fn revoke(&self, artifact: &CredentialArtifact) -> RevokeOutcome;
}
