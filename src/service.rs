//! Cascade runs: walk, apply, commit gate, persist

use tracing::info;

use crate::error::Result;
use crate::graph::ObjectGraph;
use crate::object::{MetadataObject, ObjectKey};
use crate::params::{should_commit, CascadeParameters};
use crate::read::load_graph;
use crate::report::CascadeReport;
use crate::store::{LmdbStore, ObjectStore};
use crate::walk::walk;

/// Shares everything a dashboard references with the dashboard's users and
/// user groups.
#[derive(Debug, Default)]
pub struct CascadeSharingService<S> {
    store: S,
}

impl<S: ObjectStore> CascadeSharingService<S> {
    pub fn new(store: S) -> Self {
        CascadeSharingService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Cascade the sharing of dashboard `dashboard_uid` through `graph`.
    ///
    /// Unless this is a dry run the objects in `graph` get their new sharing,
    /// even when the commit gate then keeps them away from the store. The
    /// store sees at most one batch. Only a missing dashboard or a store
    /// failure is returned as an error; everything else is in the report.
    pub fn cascade_sharing(
        &mut self,
        graph: &mut ObjectGraph,
        dashboard_uid: &str,
        parameters: &CascadeParameters,
    ) -> Result<CascadeReport> {
        let dashboard = graph.dashboard(dashboard_uid)?;
        let mut report = CascadeReport::new();
        let staged = walk(graph, dashboard, &mut report);
        let updated: Vec<ObjectKey> = staged.keys().cloned().collect();

        if !parameters.dry_run {
            staged.apply(graph);
        }

        let commit = should_commit(parameters, &report);
        info!(
            dashboard = dashboard_uid,
            updated = updated.len(),
            updated_items = report.updated_dashboard_items,
            errors = report.errors.len(),
            dry_run = parameters.dry_run,
            atomic = parameters.atomic,
            commit,
            "cascade sharing finished"
        );

        if !commit || updated.is_empty() {
            return Ok(report);
        }

        let batch: Vec<MetadataObject> = updated.iter().filter_map(|k| graph.get(k).cloned()).collect();
        self.store.update(&batch)?;
        Ok(report)
    }
}

/// Load every stored object, cascade one dashboard and write the result back
/// to the LMDB store.
pub fn cascade_stored_dashboard(dashboard_uid: &str, parameters: &CascadeParameters) -> Result<CascadeReport> {
    let mut graph = load_graph()?;
    CascadeSharingService::new(LmdbStore).cascade_sharing(&mut graph, dashboard_uid, parameters)
}
