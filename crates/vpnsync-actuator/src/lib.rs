// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential issuance and revocation.
//!
//! The traits in [`client`] are what a sync run drives; [`PivpnCli`] is the
//! implementation that shells out to `pivpn`.

pub mod client;
pub mod diagnostics;
pub mod pivpn;

pub use client::{CredentialIssuer, CredentialRevoker, ProvisionOutcome, RevokeOutcome};
pub use diagnostics::{revocation_log_name, write_revocation_log};
pub use pivpn::{provision_success_marker, PivpnCli, REVOKE_SUCCESS_MARKER};
