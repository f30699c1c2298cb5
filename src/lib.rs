//! Cascade sharing - read access that follows a dashboard's references
//!
//! When a dashboard is shared with a user or user group, every object it
//! shows (maps, visualizations, event reports and charts, and the categories,
//! data elements, legend sets, ... behind them) must be readable by the same
//! principals. A cascade run walks the dashboard's items, merges the
//! dashboard's per-user and per-group entries into each referenced object as
//! plain read access, and reports what changed.
//!
//! - Only read access is granted; nothing is revoked or downgraded
//! - Publicly readable objects are left alone
//! - `dry_run` computes the report without touching any object
//! - `atomic` persists nothing if any principal could not be cascaded

pub mod access;
pub mod constants;
pub mod db;
pub mod error;
pub mod graph;
pub mod keys;
pub mod merge;
pub mod object;
pub mod params;
pub mod read;
pub mod report;
pub mod service;
pub mod sharing;
pub mod store;
pub mod tx;
pub mod walk;

pub use access::AccessString;
pub use db::{clear_all, init, init_with, test_lock, StoreOptions};
pub use error::{CascadeError, Result};
pub use graph::ObjectGraph;
pub use merge::{merge_entry, propagate, MergeOutcome, Propagation};
pub use object::{
    AnalyticalObject, DashboardItem, Dimension, EventChart, ItemContent, MetadataObject, ObjectKey,
    ObjectKind, ObjectType, Uid,
};
pub use params::{should_commit, CascadeParameters};
pub use read::{count_objects, get_object, get_revision, list_objects, list_uids, load_graph};
pub use report::{CascadeReport, ErrorCode, ErrorEntry};
pub use service::{cascade_stored_dashboard, CascadeSharingService};
pub use sharing::{AccessEntry, Principal, PrincipalKind, Sharing};
pub use store::{save_objects, LmdbStore, ObjectStore};
pub use tx::{transact, Tx};
pub use walk::{walk, StagedSharing};
