// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! LDAP filter construction.

/// Active Directory matching rule that walks nested group membership.
pub const LDAP_MATCHING_RULE_IN_CHAIN: &str = "1.2.840.113556.1.4.1941";

/// Attributes fetched for every member.
pub const MEMBER_ATTRIBUTES: [&str; 5] = [
	"userPrincipalName",
	"displayName",
	"cn",
	"sAMAccountName",
	"distinguishedName",
];

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => escaped.push_str("\\5c"),
			'*' => escaped.push_str("\\2a"),
			'(' => escaped.push_str("\\28"),
			')' => escaped.push_str("\\29"),
			'\0' => escaped.push_str("\\00"),
			c => escaped.push(c),
		}
	}
	escaped
}

/// Whether `group` should be used as a distinguished name rather than looked
/// up by name.
pub fn is_distinguished_name(group: &str) -> bool {
	group.contains('=') && group.contains(',')
}

/// Filter locating a group by common name or account name.
pub fn group_lookup_filter(group: &str) -> String {
	let value = escape_filter_value(group);
	format!("(&(objectClass=group)(|(cn={value})(sAMAccountName={value})))")
}

/// Filter matching every user inside the group with DN `group_dn`.
pub fn members_filter(group_dn: &str) -> String {
	format!(
		"(&(objectCategory=person)(objectClass=user)(memberOf:{}:={}))",
		LDAP_MATCHING_RULE_IN_CHAIN,
		escape_filter_value(group_dn)
	)
}
