//! LMDB-backed object store and end-to-end runs against it

use std::sync::OnceLock;

use cascade_sharing::keys::{get_part, object_key, parse_key, type_prefix};
use cascade_sharing::{
    cascade_stored_dashboard, clear_all, count_objects, get_object, get_revision, init, list_objects, list_uids,
    load_graph, save_objects, test_lock, transact, AccessEntry, AccessString, AnalyticalObject, CascadeError,
    CascadeParameters, CascadeSharingService, DashboardItem, Dimension, ItemContent, LmdbStore, MetadataObject,
    ObjectKey, ObjectKind, ObjectType, PrincipalKind, Sharing,
};
use tempfile::TempDir;

static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

fn setup() -> std::sync::MutexGuard<'static, ()> {
    let lock = test_lock();
    let dir = TEST_DIR.get_or_init(|| TempDir::new().unwrap());
    init(dir.path().to_str().unwrap()).unwrap();
    clear_all().unwrap();
    lock
}

fn seed() -> Vec<MetadataObject> {
    let viz = AnalyticalObject::new()
        .with_data_element("deA")
        .with_dimension(Dimension::Category { category: Some("catA".into()), options: vec!["optA".into()] });
    vec![
        MetadataObject::new("deA", "Data element A", ObjectKind::DataElement),
        MetadataObject::new("catA", "Category A", ObjectKind::Category),
        MetadataObject::new("optA", "Option A", ObjectKind::CategoryOption),
        MetadataObject::new("mapA", "Map A", ObjectKind::Map)
            .with_sharing(Sharing::new().with_public_access(AccessString::READ)),
        MetadataObject::new("vizA", "Visualization A", ObjectKind::Visualization(viz)),
        MetadataObject::new(
            "dashA",
            "Dashboard A",
            ObjectKind::Dashboard {
                items: vec![
                    DashboardItem::new("item1", ItemContent::Visualization(Some("vizA".into()))),
                    DashboardItem::new("item2", ItemContent::Map(Some("mapA".into()))),
                ],
            },
        )
        .with_sharing(
            Sharing::new()
                .with_user("userA", AccessString::READ_WRITE)
                .with_user_group("groupA", AccessString::READ),
        ),
    ]
}

fn key(t: ObjectType, uid: &str) -> ObjectKey {
    ObjectKey::new(t, uid)
}

#[test]
fn test_init_twice_same_path() {
    let _l = setup();
    let dir = TEST_DIR.get().unwrap();
    assert!(init(dir.path().to_str().unwrap()).is_ok());
    assert!(init("/definitely/another/path").is_err());
}

#[test]
fn test_save_and_get() {
    let _l = setup();
    save_objects(&seed()).unwrap();

    let viz = get_object(&key(ObjectType::Visualization, "vizA")).unwrap().unwrap();
    assert_eq!(viz.name, "Visualization A");
    assert!(matches!(viz.kind, ObjectKind::Visualization(ref a) if a.data_elements == vec!["deA".to_string()]));
    assert!(get_object(&key(ObjectType::Map, "vizA")).unwrap().is_none());
    assert_eq!(get_revision(&key(ObjectType::Visualization, "vizA")).unwrap(), 1);
    assert_eq!(get_revision(&key(ObjectType::Indicator, "nope")).unwrap(), 0);
}

#[test]
fn test_list_by_type() {
    let _l = setup();
    save_objects(&seed()).unwrap();

    assert_eq!(count_objects(ObjectType::Category).unwrap(), 1);
    assert_eq!(count_objects(ObjectType::CategoryOption).unwrap(), 1);
    assert_eq!(list_uids(ObjectType::Category).unwrap(), vec!["catA".to_string()]);
    let maps = list_objects(ObjectType::Map).unwrap();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].uid, "mapA");
    assert!(list_objects(ObjectType::Indicator).unwrap().is_empty());
}

#[test]
fn test_revision_bumps_per_write() {
    let _l = setup();
    let de = MetadataObject::new("deA", "Data element A", ObjectKind::DataElement);
    save_objects(std::slice::from_ref(&de)).unwrap();
    save_objects(std::slice::from_ref(&de)).unwrap();
    let rev = transact(|tx| tx.put_object(&de)).unwrap();
    assert_eq!(rev, 3);
    assert_eq!(get_revision(&de.key()).unwrap(), 3);
}

#[test]
fn test_transaction_sees_own_writes() {
    let _l = setup();
    let de = MetadataObject::new("deA", "Data element A", ObjectKind::DataElement);
    let seen = transact(|tx| {
        tx.put_object(&de)?;
        tx.get_object(&de.key())
    })
    .unwrap()
    .unwrap();
    assert_eq!(seen.revision, 1);
    assert_eq!(MetadataObject { revision: 0, ..seen }, de);
}

#[test]
fn test_loaded_objects_carry_revision() {
    let _l = setup();
    save_objects(&seed()).unwrap();
    save_objects(&seed()[..1]).unwrap();

    let graph = load_graph().unwrap();
    assert_eq!(graph.get(&key(ObjectType::DataElement, "deA")).unwrap().revision, 2);
    assert_eq!(graph.get(&key(ObjectType::Category, "catA")).unwrap().revision, 1);
    assert_eq!(get_object(&key(ObjectType::DataElement, "deA")).unwrap().unwrap().revision, 2);
    assert!(list_objects(ObjectType::Map).unwrap().iter().all(|o| o.revision == 1));
}

#[test]
fn test_concurrent_write_is_not_overwritten() {
    let _l = setup();
    save_objects(&seed()).unwrap();
    let mut graph = load_graph().unwrap();

    // Another writer renames the category and shares it after the load
    let mut renamed = get_object(&key(ObjectType::Category, "catA")).unwrap().unwrap();
    renamed.name = "Renamed".into();
    renamed.sharing.add(PrincipalKind::User, AccessEntry::new("userV", AccessString::READ_WRITE));
    save_objects(&[renamed]).unwrap();

    let r = CascadeSharingService::new(LmdbStore).cascade_sharing(&mut graph, "dashA", &CascadeParameters::default());
    match r {
        Err(CascadeError::Conflict { key: k, expected, found }) => {
            assert_eq!(k, key(ObjectType::Category, "catA"));
            assert_eq!((expected, found), (1, 2));
        }
        other => panic!("expected a conflict, got {:?}", other),
    }

    let stored = get_object(&key(ObjectType::Category, "catA")).unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.sharing.access(PrincipalKind::User, "userV"), Some(AccessString::READ_WRITE));
    assert_eq!(stored.sharing.access(PrincipalKind::User, "userA"), None);
    // Nothing else in the batch was written either
    assert_eq!(get_revision(&key(ObjectType::Visualization, "vizA")).unwrap(), 1);
    assert_eq!(get_revision(&key(ObjectType::DataElement, "deA")).unwrap(), 1);

    // A fresh load picks up the other writer's state and cascades on top of it
    cascade_stored_dashboard("dashA", &CascadeParameters::default()).unwrap();
    let stored = get_object(&key(ObjectType::Category, "catA")).unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.sharing.access(PrincipalKind::User, "userV"), Some(AccessString::READ_WRITE));
    assert_eq!(stored.sharing.access(PrincipalKind::User, "userA"), Some(AccessString::READ));
    assert_eq!(stored.revision, 3);
}

#[test]
fn test_load_graph_and_cascade() {
    let _l = setup();
    save_objects(&seed()).unwrap();

    let report = cascade_stored_dashboard("dashA", &CascadeParameters::default()).unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(report.total_updated(), 4);
    assert_eq!(report.updated_dashboard_items, 1);

    for (t, uid) in [
        (ObjectType::Visualization, "vizA"),
        (ObjectType::DataElement, "deA"),
        (ObjectType::Category, "catA"),
        (ObjectType::CategoryOption, "optA"),
    ] {
        let stored = get_object(&key(t, uid)).unwrap().unwrap();
        assert_eq!(stored.sharing.access(PrincipalKind::User, "userA"), Some(AccessString::READ));
        assert_eq!(stored.sharing.access(PrincipalKind::UserGroup, "groupA"), Some(AccessString::READ));
        assert_eq!(get_revision(&key(t, uid)).unwrap(), 2);
    }
    // Publicly readable map and the dashboard were not written again
    assert_eq!(get_revision(&key(ObjectType::Map, "mapA")).unwrap(), 1);
    assert_eq!(get_revision(&key(ObjectType::Dashboard, "dashA")).unwrap(), 1);

    let graph = load_graph().unwrap();
    assert_eq!(graph.len(), 6);
}

#[test]
fn test_stored_dry_run_and_atomic() {
    let _l = setup();
    let mut objects = seed();
    if let Some(dash) = objects.iter_mut().find(|o| o.uid == "dashA") {
        dash.sharing.add(
            PrincipalKind::User,
            AccessEntry::new("userB", AccessString::DEFAULT),
        );
    }
    save_objects(&objects).unwrap();

    let dry = cascade_stored_dashboard("dashA", &CascadeParameters::dry_run()).unwrap();
    assert_eq!(dry.total_updated(), 4);
    assert_eq!(get_revision(&key(ObjectType::DataElement, "deA")).unwrap(), 1);

    let atomic = cascade_stored_dashboard("dashA", &CascadeParameters::atomic()).unwrap();
    assert!(atomic.has_errors());
    assert_eq!(get_revision(&key(ObjectType::DataElement, "deA")).unwrap(), 1);
    let de = get_object(&key(ObjectType::DataElement, "deA")).unwrap().unwrap();
    assert!(de.sharing.users.is_empty());

    cascade_stored_dashboard("dashA", &CascadeParameters::default()).unwrap();
    assert_eq!(get_revision(&key(ObjectType::DataElement, "deA")).unwrap(), 2);
}

#[test]
fn test_missing_stored_dashboard() {
    let _l = setup();
    assert!(cascade_stored_dashboard("nope", &CascadeParameters::default()).is_err());
}

#[test]
fn test_object_keys() {
    let k = object_key(&key(ObjectType::Category, "catA")).unwrap();
    assert_eq!(parse_key(&k), vec!["Category", "catA"]);
    assert_eq!(get_part(&k, 1), Some("catA"));
    assert!(k.starts_with(&type_prefix(ObjectType::Category)));
    assert!(!k.starts_with(&type_prefix(ObjectType::CategoryOption)));
    assert!(object_key(&key(ObjectType::Category, "")).is_err());
    assert!(object_key(&key(ObjectType::Category, &"x".repeat(256))).is_err());
}

#[test]
fn test_store_options_defaults() {
    let options: cascade_sharing::StoreOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, cascade_sharing::StoreOptions::default());
    assert_eq!(options.map_size, 1 << 30);
    let options: cascade_sharing::StoreOptions = serde_json::from_str(r#"{"mapSize": 4096}"#).unwrap();
    assert_eq!(options.map_size, 4096);
}
