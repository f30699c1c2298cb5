//! Access strings, the merge rule and single-object propagation

use cascade_sharing::constants::{DATA_READ, DATA_WRITE, METADATA_READ, METADATA_WRITE};
use cascade_sharing::{merge_entry, propagate, AccessEntry, AccessString, MergeOutcome, Principal, Sharing};

fn access(s: &str) -> AccessString {
    s.parse().unwrap()
}

#[test]
fn test_parse_and_display() {
    assert_eq!(access("--------"), AccessString::DEFAULT);
    assert_eq!(access("r-------"), AccessString::READ);
    assert_eq!(access("rw------"), AccessString::READ_WRITE);
    assert_eq!(access("rwrw----").to_string(), "rwrw----");
    assert_eq!(access("rwrw----").bits(), METADATA_READ | METADATA_WRITE | DATA_READ | DATA_WRITE);
    assert_eq!(access("--r-----").bits(), DATA_READ);
    assert_eq!(AccessString::DEFAULT.to_string(), "--------");
}

#[test]
fn test_parse_rejects_malformed() {
    assert!("r------".parse::<AccessString>().is_err());
    assert!("r--------".parse::<AccessString>().is_err());
    assert!("w-------".parse::<AccessString>().is_err());
    assert!("rw--r---".parse::<AccessString>().is_err());
    assert!("RW------".parse::<AccessString>().is_err());
    assert!("".parse::<AccessString>().is_err());
}

#[test]
fn test_write_implies_read() {
    let a = access("-w------");
    assert!(a.can_read());
    assert!(a.can_write());
    assert_eq!(a, AccessString::READ_WRITE);

    let d = AccessString::from_bits(DATA_WRITE);
    assert!(d.can_read_data());
    assert!(!d.can_read());
}

#[test]
fn test_can_read_is_monotonic() {
    for bits in 0u8..=0x0F {
        let a = AccessString::from_bits(bits);
        if a.can_write() {
            assert!(a.can_read(), "{} writes but cannot read", a);
        }
        if a.contains(AccessString::READ) {
            assert!(a.can_read());
        }
    }
    assert!(!AccessString::DEFAULT.can_read());
    assert!(!access("--rw----").can_read());
}

#[test]
fn test_serde_uses_string_form() {
    let json = serde_json::to_string(&AccessString::READ_WRITE).unwrap();
    assert_eq!(json, "\"rw------\"");
    let back: AccessString = serde_json::from_str("\"r-r-----\"").unwrap();
    assert!(back.can_read() && back.can_read_data());
    assert!(serde_json::from_str::<AccessString>("\"nope\"").is_err());
}

// Merge rule

#[test]
fn test_merge_grants_read_to_missing_entry() {
    let source = AccessEntry::new("userA", AccessString::READ);
    assert_eq!(
        merge_entry(&source, None),
        MergeOutcome::Grant(AccessEntry::new("userA", AccessString::READ))
    );
}

#[test]
fn test_merge_never_grants_write() {
    let source = AccessEntry::new("userB", AccessString::READ_WRITE);
    match merge_entry(&source, None) {
        MergeOutcome::Grant(e) => {
            assert_eq!(e.access, AccessString::READ);
            assert!(!e.access.can_write());
        }
        other => panic!("expected grant, got {:?}", other),
    }
}

#[test]
fn test_merge_upgrades_unreadable_target() {
    let source = AccessEntry::new("userA", AccessString::READ);
    let target = AccessEntry::new("userA", access("--r-----"));
    assert_eq!(
        merge_entry(&source, Some(&target)),
        MergeOutcome::Grant(AccessEntry::new("userA", AccessString::READ))
    );
}

#[test]
fn test_merge_keeps_readable_target() {
    let source = AccessEntry::new("userA", AccessString::READ);
    let target = AccessEntry::new("userA", AccessString::READ_WRITE);
    assert_eq!(merge_entry(&source, Some(&target)), MergeOutcome::Unchanged);
}

#[test]
fn test_merge_unreadable_source() {
    let source = AccessEntry::new("userA", AccessString::DEFAULT);
    assert_eq!(merge_entry(&source, None), MergeOutcome::Unreadable);
}

// Propagation

#[test]
fn test_propagate_users_and_groups_independently() {
    let source = Sharing::new()
        .with_user("userA", AccessString::READ)
        .with_user_group("groupA", AccessString::READ_WRITE);
    let mut target = Sharing::new().with_user("userA", AccessString::READ_WRITE);

    let p = propagate(&source, &mut target);
    assert!(p.changed);
    assert!(p.unreadable.is_empty());
    // userA already readable: untouched, not downgraded
    assert_eq!(target.users["userA"].access, AccessString::READ_WRITE);
    assert_eq!(target.user_groups["groupA"].access, AccessString::READ);
    // Never crosses flavors
    assert!(!target.users.contains_key("groupA"));
    assert!(!target.user_groups.contains_key("userA"));
}

#[test]
fn test_propagate_skips_public_target() {
    let source = Sharing::new()
        .with_user("userA", AccessString::READ)
        .with_user("userB", AccessString::DEFAULT);
    let mut target = Sharing::new().with_public_access(AccessString::READ);
    let before = target.clone();

    let p = propagate(&source, &mut target);
    assert!(!p.changed);
    assert!(p.unreadable.is_empty());
    assert_eq!(target, before);
}

#[test]
fn test_propagate_reports_unreadable_principals() {
    let source = Sharing::new()
        .with_user("userA", AccessString::READ)
        .with_user("userB", AccessString::DEFAULT)
        .with_user_group("groupA", access("--r-----"));
    let mut target = Sharing::new();

    let p = propagate(&source, &mut target);
    assert!(p.changed);
    assert_eq!(p.unreadable, vec![Principal::user("userB"), Principal::user_group("groupA")]);
    assert!(target.users.contains_key("userA"));
    assert!(!target.users.contains_key("userB"));
    assert!(target.user_groups.is_empty());
}

#[test]
fn test_propagate_is_idempotent() {
    let source = Sharing::new().with_user("userA", AccessString::READ);
    let mut target = Sharing::new();
    assert!(propagate(&source, &mut target).changed);
    let after_first = target.clone();
    assert!(!propagate(&source, &mut target).changed);
    assert_eq!(target, after_first);
}

#[test]
fn test_public_access_on_source_is_not_cascaded() {
    let source = Sharing::new().with_public_access(AccessString::READ);
    let mut target = Sharing::new();
    assert!(!propagate(&source, &mut target).changed);
    assert_eq!(target.public_access, AccessString::DEFAULT);
}
