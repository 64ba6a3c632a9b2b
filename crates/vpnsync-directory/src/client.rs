// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use vpnsync_core::RawIdentity;

use crate::error::DirectoryError;

/// Source of authoritative identities.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
	/// Every user that is a member of `group`, directly or through nested
	/// groups. A group that cannot be found is an error, not an empty list.
	async fn group_members(&self, group: &str) -> Result<Vec<RawIdentity>, DirectoryError>;
}
