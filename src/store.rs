//! Persistence boundary for cascade runs

use tracing::{debug, warn};

use crate::error::Result;
use crate::object::MetadataObject;
use crate::tx::transact;

/// Batch persistence used by the cascade service. Called at most once per
/// run, with every updated object.
pub trait ObjectStore {
    fn update(&mut self, objects: &[MetadataObject]) -> Result<()>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &mut S {
    fn update(&mut self, objects: &[MetadataObject]) -> Result<()> {
        (**self).update(objects)
    }
}

/// [`ObjectStore`] backed by the process-wide LMDB environment (see
/// [`crate::db::init`]). A batch is written in one transaction and fails as
/// a whole with [`crate::CascadeError::Conflict`] if any object changed in
/// the store since it was read.
#[derive(Clone, Copy, Debug, Default)]
pub struct LmdbStore;

impl ObjectStore for LmdbStore {
    fn update(&mut self, objects: &[MetadataObject]) -> Result<()> {
        transact(|tx| {
            for object in objects {
                tx.update_object(object)?;
            }
            Ok(())
        })
        .inspect_err(|e| warn!(error = %e, "batch rejected"))?;
        debug!(count = objects.len(), "batch persisted");
        Ok(())
    }
}

/// Write objects in a single transaction, bumping each revision. Unlike
/// [`LmdbStore`] this overwrites whatever is stored.
pub fn save_objects(objects: &[MetadataObject]) -> Result<()> {
    transact(|tx| {
        for object in objects {
            tx.put_object(object)?;
        }
        Ok(())
    })
}
