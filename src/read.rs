//! Read operations (direct LMDB access)

use heed::RoTxn;

use crate::db::{read, Dbs};
use crate::error::{err, Result};
use crate::graph::ObjectGraph;
use crate::keys::{get_part, object_key, type_prefix};
use crate::object::{MetadataObject, ObjectKey, ObjectType, Uid};

/// Decode a stored object and stamp it with its current revision
fn decode(d: &Dbs, tx: &RoTxn, k: &[u8], bytes: &[u8]) -> Result<MetadataObject> {
    let mut object: MetadataObject = serde_json::from_slice(bytes)?;
    object.revision = d.revisions.get(tx, k).map_err(err)?.unwrap_or(0);
    Ok(object)
}

/// Get a stored object
pub fn get_object(key: &ObjectKey) -> Result<Option<MetadataObject>> {
    let k = object_key(key)?;
    read(|d, tx| match d.objects.get(tx, &k).map_err(err)? {
        Some(bytes) => Ok(Some(decode(d, tx, &k, bytes)?)),
        None => Ok(None),
    })
}

/// Number of persisted updates of an object, 0 if never stored
pub fn get_revision(key: &ObjectKey) -> Result<u64> {
    let k = object_key(key)?;
    read(|d, tx| Ok(d.revisions.get(tx, &k).map_err(err)?.unwrap_or(0)))
}

/// List all stored objects of one type, ordered by uid bytes
pub fn list_objects(object_type: ObjectType) -> Result<Vec<MetadataObject>> {
    let pfx = type_prefix(object_type);
    read(|d, tx| {
        let mut r = Vec::new();
        for item in d.objects.prefix_iter(tx, &pfx).map_err(err)? {
            let (k, bytes) = item.map_err(err)?;
            r.push(decode(d, tx, k, bytes)?);
        }
        Ok(r)
    })
}

/// List the uids of all stored objects of one type
pub fn list_uids(object_type: ObjectType) -> Result<Vec<Uid>> {
    let pfx = type_prefix(object_type);
    read(|d, tx| {
        let mut r = Vec::new();
        for item in d.objects.prefix_iter(tx, &pfx).map_err(err)? {
            let (k, _) = item.map_err(err)?;
            if let Some(uid) = get_part(k, 1) {
                r.push(uid.to_string());
            }
        }
        Ok(r)
    })
}

/// Count stored objects of one type
pub fn count_objects(object_type: ObjectType) -> Result<usize> {
    let pfx = type_prefix(object_type);
    read(|d, tx| Ok(d.objects.prefix_iter(tx, &pfx).map_err(err)?.count()))
}

/// Hydrate every stored object into a graph. Each object remembers the
/// revision it was read at, so writing it back detects concurrent writers.
pub fn load_graph() -> Result<ObjectGraph> {
    read(|d, tx| {
        let mut graph = ObjectGraph::new();
        for item in d.objects.iter(tx).map_err(err)? {
            let (k, bytes) = item.map_err(err)?;
            graph.insert(decode(d, tx, k, bytes)?);
        }
        Ok(graph)
    })
}
