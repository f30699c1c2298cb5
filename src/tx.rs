//! Transaction wrapper for batched writes

use heed::RwTxn;

use crate::db::{dbs, env, Dbs};
use crate::error::{err, CascadeError, Result};
use crate::keys::object_key;
use crate::object::{MetadataObject, ObjectKey};

/// Transaction wrapper for batched writes
pub struct Tx {
    txn: Option<RwTxn<'static>>,
    dbs: &'static Dbs,
}

impl Tx {
    #[inline]
    pub(crate) fn new() -> Result<Self> {
        Ok(Tx {
            txn: Some(env()?.write_txn().map_err(err)?),
            dbs: dbs()?,
        })
    }

    #[inline]
    pub(crate) fn tx(&mut self) -> &mut RwTxn<'static> {
        // Only `commit` takes the transaction, and it consumes `self`
        match self.txn.as_mut() {
            Some(txn) => txn,
            None => unreachable!("transaction used after commit"),
        }
    }

    #[inline]
    pub(crate) fn dbs(&self) -> &'static Dbs {
        self.dbs
    }

    #[inline]
    pub(crate) fn commit(mut self) -> Result<()> {
        self.txn
            .take()
            .ok_or_else(|| CascadeError::Store("transaction already committed".into()))?
            .commit()
            .map_err(err)
    }

    /// Write an object and bump its revision. Returns the new revision.
    pub fn put_object(&mut self, object: &MetadataObject) -> Result<u64> {
        let k = object_key(&object.key())?;
        let current = self.dbs.revisions.get(self.tx(), &k).map_err(err)?.unwrap_or(0);
        self.write(&k, object, current + 1)
    }

    /// Write an object only if the store is still at the revision the object
    /// was read at. Returns the new revision.
    pub fn update_object(&mut self, object: &MetadataObject) -> Result<u64> {
        let k = object_key(&object.key())?;
        let current = self.dbs.revisions.get(self.tx(), &k).map_err(err)?.unwrap_or(0);
        if current != object.revision {
            return Err(CascadeError::Conflict {
                key: object.key(),
                expected: object.revision,
                found: current,
            });
        }
        self.write(&k, object, current + 1)
    }

    fn write(&mut self, k: &[u8], object: &MetadataObject, revision: u64) -> Result<u64> {
        let bytes = serde_json::to_vec(object)?;
        self.dbs.objects.put(self.tx(), k, &bytes).map_err(err)?;
        self.dbs.revisions.put(self.tx(), k, &revision).map_err(err)?;
        Ok(revision)
    }

    /// Read an object inside this transaction, seeing its own writes
    pub fn get_object(&mut self, key: &ObjectKey) -> Result<Option<MetadataObject>> {
        let k = object_key(key)?;
        let Some(bytes) = self.dbs.objects.get(self.tx(), &k).map_err(err)? else {
            return Ok(None);
        };
        let mut object: MetadataObject = serde_json::from_slice(bytes)?;
        object.revision = self.dbs.revisions.get(self.tx(), &k).map_err(err)?.unwrap_or(0);
        Ok(Some(object))
    }
}

/// Run multiple operations in a single transaction
#[inline]
pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(f: F) -> Result<T> {
    let mut tx = Tx::new()?;
    let r = f(&mut tx)?;
    tx.commit()?;
    Ok(r)
}
