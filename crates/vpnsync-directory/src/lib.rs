// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory queries for vpnsync.
//!
//! [`DirectoryClient`] is the seam the sync run depends on; [`LdapDirectory`]
//! implements it against Active Directory, resolving nested membership on
//! the server side.

pub mod client;
pub mod error;
pub mod filter;
pub mod ldap;

pub use client::DirectoryClient;
pub use error::{DirectoryError, Result};
pub use ldap::LdapDirectory;
