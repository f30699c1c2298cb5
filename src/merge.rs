//! Access merge rule and sharing propagation.
//!
//! Propagation only ever adds read access. It never grants write, never
//! lowers an existing entry and never touches an object that is already
//! publicly readable.

use std::collections::BTreeMap;

use crate::access::AccessString;
use crate::sharing::{AccessEntry, Principal, PrincipalKind, Sharing};

/// Result of merging one source entry into a target's entries
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source principal cannot read the source object itself
    Unreadable,
    /// The target already grants read (or more)
    Unchanged,
    /// The target must hold this entry
    Grant(AccessEntry),
}

/// Decide what a target entry must become for one source principal.
///
/// Granted entries carry exactly [`AccessString::READ`], whatever the source
/// holds.
pub fn merge_entry(source: &AccessEntry, target: Option<&AccessEntry>) -> MergeOutcome {
    if !source.access.can_read() {
        return MergeOutcome::Unreadable;
    }
    if target.is_some_and(|t| t.access.can_read()) {
        return MergeOutcome::Unchanged;
    }
    MergeOutcome::Grant(AccessEntry::new(source.id.clone(), AccessString::READ))
}

/// What a single propagation did to its target
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    pub changed: bool,
    /// Source principals below read level, in user-then-group order
    pub unreadable: Vec<Principal>,
}

/// Merge the per-user and per-group entries of `source` into `target`.
///
/// A publicly readable target is left alone and reports nothing. Users and
/// groups are merged independently; `changed` is true if either map changed.
pub fn propagate(source: &Sharing, target: &mut Sharing) -> Propagation {
    let mut p = Propagation::default();
    if target.public_access.can_read() {
        return p;
    }
    for kind in [PrincipalKind::User, PrincipalKind::UserGroup] {
        let changed = merge_entries(kind, source.entries(kind), target.entries_mut(kind), &mut p.unreadable);
        p.changed |= changed;
    }
    p
}

fn merge_entries(
    kind: PrincipalKind,
    source: &BTreeMap<String, AccessEntry>,
    target: &mut BTreeMap<String, AccessEntry>,
    unreadable: &mut Vec<Principal>,
) -> bool {
    let mut changed = false;
    for entry in source.values() {
        match merge_entry(entry, target.get(&entry.id)) {
            MergeOutcome::Unreadable => unreadable.push(Principal { kind, id: entry.id.clone() }),
            MergeOutcome::Unchanged => {}
            MergeOutcome::Grant(granted) => {
                target.insert(granted.id.clone(), granted);
                changed = true;
            }
        }
    }
    changed
}
