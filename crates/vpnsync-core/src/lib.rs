// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core model for vpnsync.
//!
//! This crate provides:
//! - Normalization of directory records into [`Identity`] values
//! - Listing of credential storage and exact parsing of artifact names
//! - The pure reconciliation of identities against artifacts

pub mod artifact;
pub mod identity;
pub mod reconcile;
pub mod scan;

pub use artifact::{
	ArtifactCatalog, ArtifactOwner, CredentialArtifact, CredentialParser, DEFAULT_EXTENSION,
	VARIANT_SEPARATOR,
};
pub use identity::{
	normalize, normalize_batch, Identity, MalformedIdentity, MalformedReason, NormalizedBatch,
	RawIdentity,
};
pub use reconcile::{reconcile, ReconciliationResult, Satisfied};
pub use scan::{scan_directory, ScanError};
