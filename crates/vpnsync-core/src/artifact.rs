// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential artifacts and the filename tokenizer that ties them to
//! principals.

use std::collections::HashSet;

use serde::Serialize;

/// Default extension of issued VPN profiles.
pub const DEFAULT_EXTENSION: &str = ".ovpn";

/// Separator between a principal name and a variant tag.
pub const VARIANT_SEPARATOR: &str = "--";

/// Who an artifact belongs to, as decided by [`CredentialParser`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactOwner {
	/// Issued to a known principal, optionally as a variant.
	Principal {
		principal_name: String,
		variant_suffix: Option<String>,
	},
	/// Allow-listed; never revoked.
	Protected,
	/// Does not belong to any known principal.
	Unrecognized,
}

/// One credential file found in storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CredentialArtifact {
	artifact_id: String,
	bare_name: String,
	owner: ArtifactOwner,
}

impl CredentialArtifact {
	/// The on-disk file name.
	pub fn artifact_id(&self) -> &str {
		&self.artifact_id
	}

	/// The file name without the credential extension, as the revocation
	/// tool expects it.
	pub fn bare_name(&self) -> &str {
		&self.bare_name
	}

	pub fn owner(&self) -> &ArtifactOwner {
		&self.owner
	}

	pub fn principal_name(&self) -> Option<&str> {
		match &self.owner {
			ArtifactOwner::Principal { principal_name, .. } => Some(principal_name),
			_ => None,
		}
	}

	pub fn variant_suffix(&self) -> Option<&str> {
		match &self.owner {
			ArtifactOwner::Principal { variant_suffix, .. } => variant_suffix.as_deref(),
			_ => None,
		}
	}

	pub fn is_protected(&self) -> bool {
		matches!(self.owner, ArtifactOwner::Protected)
	}
}

/// Parses artifact names against the principal set of the current run.
///
/// Names have the shape `<principal>[--<variant>]<extension>`. Matching is
/// exact string comparison; principal names are never interpreted as
/// patterns.
#[derive(Clone, Debug)]
pub struct CredentialParser {
	principals: HashSet<String>,
	protected: HashSet<String>,
	extension: String,
}

impl CredentialParser {
	pub fn new(principals: HashSet<String>) -> Self {
		Self {
			principals,
			protected: HashSet::new(),
			extension: DEFAULT_EXTENSION.to_string(),
		}
	}

	pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	/// Artifact names that must never be revoked.
	pub fn with_protected<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.protected = names.into_iter().map(Into::into).collect();
		self
	}

	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// Classify one artifact name.
	pub fn parse(&self, artifact_id: &str) -> CredentialArtifact {
		let stem = artifact_id.strip_suffix(self.extension.as_str());
		let bare_name = stem.unwrap_or(artifact_id).to_string();

		// A current principal's artifact stays theirs even when allow-listed.
		let owner = match stem.and_then(|stem| self.match_stem(stem)) {
			Some(owner) => owner,
			None if self.protected.contains(artifact_id) => ArtifactOwner::Protected,
			None => ArtifactOwner::Unrecognized,
		};

		CredentialArtifact {
			artifact_id: artifact_id.to_string(),
			bare_name,
			owner,
		}
	}

	fn match_stem(&self, stem: &str) -> Option<ArtifactOwner> {
		// A whole-stem match wins over a variant split, so a principal that
		// itself contains `--` still owns its primary artifact.
		if self.principals.contains(stem) {
			return Some(ArtifactOwner::Principal {
				principal_name: stem.to_string(),
				variant_suffix: None,
			});
		}

		let (principal, variant) = stem.rsplit_once(VARIANT_SEPARATOR)?;
		if variant.is_empty() || !variant.chars().all(|c| c.is_ascii_alphabetic()) {
			return None;
		}
		if !self.principals.contains(principal) {
			return None;
		}

		Some(ArtifactOwner::Principal {
			principal_name: principal.to_string(),
			variant_suffix: Some(variant.to_string()),
		})
	}
}

/// The artifact names of one storage listing, sorted ascending.
///
/// Parsing is deferred until iteration, and [`ArtifactCatalog::artifacts`]
/// can be called any number of times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactCatalog {
	names: Vec<String>,
}

impl ArtifactCatalog {
	pub fn new(mut names: Vec<String>) -> Self {
		names.sort();
		names.dedup();
		Self { names }
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn artifacts<'a>(
		&'a self,
		parser: &'a CredentialParser,
	) -> impl Iterator<Item = CredentialArtifact> + 'a {
		self.names.iter().map(move |name| parser.parse(name))
	}
}

impl FromIterator<String> for ArtifactCatalog {
	fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
		Self::new(iter.into_iter().collect())
	}
}
