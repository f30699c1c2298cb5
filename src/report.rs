//! Outcome of one cascade run

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::{ObjectKey, ObjectType, Uid};
use crate::sharing::Principal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Principal cannot read the source object, so its access is not cascaded
    E3019,
}

/// A principal on the dashboard that was asked to cascade without holding
/// read access itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: ErrorCode,
    pub container: ObjectKey,
    pub principal: Principal,
    pub target: ObjectKey,
    /// Human readable form, rendered once when the entry is built
    pub message: String,
}

impl ErrorEntry {
    pub fn unreadable(container: ObjectKey, principal: Principal, target: ObjectKey) -> Self {
        let message = format!(
            "{} cannot read {}, access is not cascaded to {}",
            principal, container, target
        );
        ErrorEntry { code: ErrorCode::E3019, container, principal, target, message }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Accumulated result of a run. Only ever grows while the run is in progress.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    /// Objects whose sharing was (or, in a dry run, would have been) extended
    pub updated_objects: BTreeMap<ObjectType, BTreeSet<Uid>>,
    /// Dashboard items whose sub-graph needed access before the run
    pub updated_dashboard_items: usize,
    /// In the order they were found
    pub errors: Vec<ErrorEntry>,
    /// Lookup set over `errors`
    #[serde(skip)]
    seen_errors: BTreeSet<ErrorEntry>,
}

impl PartialEq for CascadeReport {
    fn eq(&self, other: &Self) -> bool {
        self.updated_objects == other.updated_objects
            && self.updated_dashboard_items == other.updated_dashboard_items
            && self.errors == other.errors
    }
}

impl Eq for CascadeReport {}

impl CascadeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an updated object. Returns false if it was already recorded.
    pub fn add_updated_object(&mut self, key: &ObjectKey) -> bool {
        self.updated_objects
            .entry(key.object_type)
            .or_default()
            .insert(key.uid.clone())
    }

    pub fn inc_updated_dashboard_item(&mut self) {
        self.updated_dashboard_items += 1;
    }

    /// Record an error unless the same entry is already present
    pub fn add_error(&mut self, entry: ErrorEntry) -> bool {
        // `errors` is public and skipped lookups are not deserialized
        if self.seen_errors.len() != self.errors.len() {
            self.seen_errors = self.errors.iter().cloned().collect();
        }
        if !self.seen_errors.insert(entry.clone()) {
            return false;
        }
        self.errors.push(entry);
        true
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of updated objects of one type
    pub fn updated_count(&self, object_type: ObjectType) -> usize {
        self.updated_objects.get(&object_type).map_or(0, |s| s.len())
    }

    /// Number of updated objects across all types
    pub fn total_updated(&self) -> usize {
        self.updated_objects.values().map(|s| s.len()).sum()
    }

    pub fn is_updated(&self, key: &ObjectKey) -> bool {
        self.updated_objects
            .get(&key.object_type)
            .is_some_and(|s| s.contains(&key.uid))
    }

    /// All updated objects, grouped by type
    pub fn updated_keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.updated_objects
            .iter()
            .flat_map(|(t, uids)| uids.iter().map(move |u| ObjectKey::new(*t, u.clone())))
    }
}
