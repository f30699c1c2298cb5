//! Database types and global state

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use heed::types::{Bytes, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{err, CascadeError, Result};

// Database type aliases
pub type DbObjects = Database<Bytes, Bytes>;
pub type DbRevisions = Database<Bytes, U64<byteorder::BigEndian>>;

/// All database handles
pub struct Dbs {
    /// key -> JSON encoded object
    pub objects: DbObjects,
    /// key -> number of persisted updates
    pub revisions: DbRevisions,
}

/// Options for opening the LMDB environment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// Maximum size of the memory map in bytes
    pub map_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions { map_size: 1 << 30 }
    }
}

// Global state
pub static ENV: OnceLock<Env> = OnceLock::new();
pub static DBS: OnceLock<Dbs> = OnceLock::new();
pub static TEST_LOCK: Mutex<()> = Mutex::new(());
pub static INIT_PATH: OnceLock<String> = OnceLock::new();

/// Get the database handles, or error if not initialized
#[inline]
pub fn dbs() -> Result<&'static Dbs> {
    DBS.get().ok_or(CascadeError::NotInitialized)
}

/// Get the environment, or error if not initialized
#[inline]
pub fn env() -> Result<&'static Env> {
    ENV.get().ok_or(CascadeError::NotInitialized)
}

/// Execute a read-only operation
#[inline]
pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(dbs()?, &env()?.read_txn().map_err(err)?)
}

/// Initialize the database with default options
pub fn init(path: &str) -> Result<()> {
    init_with(path, &StoreOptions::default())
}

/// Initialize the database. Calling again with the same path is a no-op.
pub fn init_with(path: &str, options: &StoreOptions) -> Result<()> {
    if let Some(p) = INIT_PATH.get() {
        return if p == path {
            Ok(())
        } else {
            Err(CascadeError::AlreadyInitialized(p.clone()))
        };
    }
    std::fs::create_dir_all(path).map_err(err)?;
    // SAFETY: LMDB requires no other processes access this path concurrently during open.
    let e = unsafe {
        EnvOpenOptions::new()
            .map_size(options.map_size)
            .max_dbs(2)
            .open(Path::new(path))
            .map_err(err)?
    };
    let mut tx = e.write_txn().map_err(err)?;
    let d = Dbs {
        objects: e.create_database(&mut tx, Some("objects")).map_err(err)?,
        revisions: e.create_database(&mut tx, Some("revisions")).map_err(err)?,
    };
    tx.commit().map_err(err)?;
    let _ = (ENV.set(e), DBS.set(d), INIT_PATH.set(path.to_string()));
    info!(path, map_size = options.map_size, "object store opened");
    Ok(())
}

/// Clear all databases (for testing)
pub fn clear_all() -> Result<()> {
    crate::tx::transact(|tx| {
        tx.dbs().objects.clear(tx.tx()).map_err(err)?;
        tx.dbs().revisions.clear(tx.tx()).map_err(err)
    })
}

/// Get the test lock (for single-threaded tests)
pub fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}
