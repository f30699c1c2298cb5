//! Sharing records attached to every sharable object

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access::AccessString;

/// The two flavors of principal that can hold an access entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalKind {
    User,
    UserGroup,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::User => f.write_str("User"),
            PrincipalKind::UserGroup => f.write_str("UserGroup"),
        }
    }
}

/// A user or user group, by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal {
    pub kind: PrincipalKind,
    pub id: String,
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Principal { kind: PrincipalKind::User, id: id.into() }
    }

    pub fn user_group(id: impl Into<String>) -> Self {
        Principal { kind: PrincipalKind::UserGroup, id: id.into() }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.id)
    }
}

/// One principal's access on one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    pub id: String,
    pub access: AccessString,
}

impl AccessEntry {
    pub fn new(id: impl Into<String>, access: AccessString) -> Self {
        AccessEntry { id: id.into(), access }
    }
}

/// Public access plus per-user and per-group entries, keyed by principal id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sharing {
    #[serde(default)]
    pub public_access: AccessString,
    #[serde(default)]
    pub users: BTreeMap<String, AccessEntry>,
    #[serde(default)]
    pub user_groups: BTreeMap<String, AccessEntry>,
}

impl Sharing {
    /// Sharing with no public access and no entries
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_access(mut self, access: AccessString) -> Self {
        self.public_access = access;
        self
    }

    pub fn with_user(mut self, id: impl Into<String>, access: AccessString) -> Self {
        self.add(PrincipalKind::User, AccessEntry::new(id, access));
        self
    }

    pub fn with_user_group(mut self, id: impl Into<String>, access: AccessString) -> Self {
        self.add(PrincipalKind::UserGroup, AccessEntry::new(id, access));
        self
    }

    /// Insert or replace an entry
    pub fn add(&mut self, kind: PrincipalKind, entry: AccessEntry) {
        self.entries_mut(kind).insert(entry.id.clone(), entry);
    }

    pub fn entries(&self, kind: PrincipalKind) -> &BTreeMap<String, AccessEntry> {
        match kind {
            PrincipalKind::User => &self.users,
            PrincipalKind::UserGroup => &self.user_groups,
        }
    }

    pub fn entries_mut(&mut self, kind: PrincipalKind) -> &mut BTreeMap<String, AccessEntry> {
        match kind {
            PrincipalKind::User => &mut self.users,
            PrincipalKind::UserGroup => &mut self.user_groups,
        }
    }

    pub fn access(&self, kind: PrincipalKind, id: &str) -> Option<AccessString> {
        self.entries(kind).get(id).map(|e| e.access)
    }

    /// Whether the principal can read, either through public access or its
    /// own entry. Group membership is not resolved here.
    pub fn can_read(&self, kind: PrincipalKind, id: &str) -> bool {
        self.public_access.can_read() || self.access(kind, id).is_some_and(|a| a.can_read())
    }
}
