// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Active Directory group lookup over LDAP.

use std::collections::HashMap;

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use tracing::{debug, info, instrument, warn};
use vpnsync_config::DirectorySettings;
use vpnsync_core::RawIdentity;

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, Result};
use crate::filter::{group_lookup_filter, is_distinguished_name, members_filter, MEMBER_ATTRIBUTES};

/// AD refuses unpaged searches above its MaxPageSize (1000 by default).
const PAGE_SIZE: i32 = 500;

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;
const RC_NO_SUCH_OBJECT: u32 = 32;

/// [`DirectoryClient`] backed by an LDAP server.
pub struct LdapDirectory {
	settings: DirectorySettings,
}

impl LdapDirectory {
	pub fn new(settings: DirectorySettings) -> Self {
		Self { settings }
	}

	async fn connect(&self) -> Result<Ldap> {
		let url = &self.settings.controller;
		debug!(url = %url, "connecting to directory");

		let conn_settings = LdapConnSettings::new().set_conn_timeout(self.settings.timeout);
		let (conn, mut ldap) = LdapConnAsync::with_settings(conn_settings, url)
			.await
			.map_err(|source| DirectoryError::Connect {
				url: url.clone(),
				source,
			})?;

		tokio::spawn(async move {
			if let Err(e) = conn.drive().await {
				warn!(error = %e, "LDAP connection driver error");
			}
		});

		let user = &self.settings.username;
		let result = ldap
			.with_timeout(self.settings.timeout)
			.simple_bind(user, self.settings.password.expose())
			.await
			.map_err(|source| DirectoryError::Connect {
				url: url.clone(),
				source,
			})?;

		if result.rc != 0 {
			let message = if result.rc == RC_INVALID_CREDENTIALS {
				"invalid credentials".to_string()
			} else {
				format!("code {}: {}", result.rc, result.text)
			};
			return Err(DirectoryError::Bind {
				user: user.clone(),
				message,
			});
		}

		info!(url = %url, "directory bind succeeded");
		Ok(ldap)
	}

	async fn resolve_group_dn(&self, ldap: &mut Ldap, group: &str) -> Result<String> {
		if is_distinguished_name(group) {
			let (entries, _) = ldap
				.with_timeout(self.settings.timeout)
				.search(group, Scope::Base, "(objectClass=group)", vec!["cn"])
				.await
				.map_err(DirectoryError::Search)?
				.success()
				.map_err(|e| group_lookup_error(group, e))?;
			return match entries.into_iter().next() {
				Some(entry) => Ok(SearchEntry::construct(entry).dn),
				None => Err(DirectoryError::GroupNotFound(group.to_string())),
			};
		}

		let (entries, _) = ldap
			.with_timeout(self.settings.timeout)
			.search(
				&self.settings.base_dn,
				Scope::Subtree,
				&group_lookup_filter(group),
				vec!["distinguishedName"],
			)
			.await
			.map_err(DirectoryError::Search)?
			.success()
			.map_err(DirectoryError::Search)?;

		match entries.len() {
			0 => Err(DirectoryError::GroupNotFound(group.to_string())),
			1 => Ok(entries
				.into_iter()
				.map(SearchEntry::construct)
				.map(|e| e.dn)
				.next()
				.unwrap_or_default()),
			count => Err(DirectoryError::AmbiguousGroup {
				group: group.to_string(),
				count,
			}),
		}
	}

	async fn search_members(&self, ldap: &mut Ldap, group_dn: &str) -> Result<Vec<RawIdentity>> {
		let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
			Box::new(EntriesOnly::new()),
			Box::new(PagedResults::new(PAGE_SIZE)),
		];

		let mut stream = ldap
			.streaming_search_with(
				adapters,
				&self.settings.base_dn,
				Scope::Subtree,
				&members_filter(group_dn),
				MEMBER_ATTRIBUTES.to_vec(),
			)
			.await
			.map_err(DirectoryError::Search)?;

		let mut members = Vec::new();
		while let Some(entry) = stream.next().await.map_err(DirectoryError::Search)? {
			members.push(raw_identity(SearchEntry::construct(entry)));
		}
		stream
			.finish()
			.await
			.success()
			.map_err(DirectoryError::Search)?;

		Ok(members)
	}
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
	#[instrument(skip(self), fields(controller = %self.settings.controller))]
	async fn group_members(&self, group: &str) -> Result<Vec<RawIdentity>> {
		let mut ldap = self.connect().await?;

		let outcome = async {
			let group_dn = self.resolve_group_dn(&mut ldap, group).await?;
			debug!(group_dn = %group_dn, "resolved group");
			self.search_members(&mut ldap, &group_dn).await
		}
		.await;

		if let Err(e) = ldap.unbind().await {
			debug!(error = %e, "unbind failed");
		}

		let members = outcome?;
		info!(count = members.len(), "fetched group members");
		Ok(members)
	}
}

fn raw_identity(entry: SearchEntry) -> RawIdentity {
	let SearchEntry { dn, attrs, .. } = entry;
	RawIdentity {
		user_principal_name: first(&attrs, "userPrincipalName"),
		display_name: first(&attrs, "displayName"),
		common_name: first(&attrs, "cn"),
		sam_account_name: first(&attrs, "sAMAccountName"),
		distinguished_name: first(&attrs, "distinguishedName").or(Some(dn)),
	}
}

fn first(attrs: &HashMap<String, Vec<String>>, name: &str) -> Option<String> {
	attrs
		.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.and_then(|(_, values)| values.first().cloned())
}

/// Only a missing object means the group is wrong; any other result code
/// is a failed search.
fn group_lookup_error(group: &str, err: LdapError) -> DirectoryError {
	match err {
		LdapError::LdapResult { result } if result.rc == RC_NO_SUCH_OBJECT => {
			DirectoryError::GroupNotFound(group.to_string())
		}
		other => DirectoryError::Search(other),
	}
}
