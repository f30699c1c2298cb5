//! Type dispatch over a dashboard's object graph.
//!
//! Each item kind and each dimension kind has its own fan-out function; the
//! depth of the walk is fixed by those functions, there is no general
//! recursion. Targets are never mutated here. Every change is made on a
//! staged copy of the target's sharing, and later visits to the same object
//! start from that copy, so the outcome only depends on which objects are
//! reachable and not on the order they are reached in. A dashboard item
//! counts as updated when anything it reaches needed access before the run,
//! even if another item got there first.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::graph::ObjectGraph;
use crate::merge::propagate;
use crate::object::{
    AnalyticalObject, Dimension, EventChart, ItemContent, MetadataObject, ObjectKey, ObjectKind,
    ObjectType, Uid,
};
use crate::report::{CascadeReport, ErrorEntry};
use crate::sharing::Sharing;

/// Sharing a run intends to give each updated object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagedSharing {
    staged: BTreeMap<ObjectKey, Sharing>,
}

impl StagedSharing {
    pub fn get(&self, key: &ObjectKey) -> Option<&Sharing> {
        self.staged.get(key)
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.staged.keys()
    }

    /// Swap the staged sharing into the live objects. Returns the number of
    /// objects written.
    pub fn apply(self, graph: &mut ObjectGraph) -> usize {
        let mut n = 0;
        for (key, sharing) in self.staged {
            if let Some(object) = graph.get_mut(&key) {
                object.sharing = sharing;
                n += 1;
            }
        }
        n
    }
}

/// Walk every item of `dashboard`, staging read access for each principal on
/// the dashboard's own sharing. Updates and errors go into `report`.
pub fn walk(graph: &ObjectGraph, dashboard: &MetadataObject, report: &mut CascadeReport) -> StagedSharing {
    let ObjectKind::Dashboard { items } = &dashboard.kind else {
        return StagedSharing::default();
    };

    let mut walker = Walker {
        graph,
        container: dashboard.key(),
        source: &dashboard.sharing,
        staged: StagedSharing::default(),
        report,
    };

    for item in items {
        if walker.item(&item.content) {
            trace!(item = %item.uid, "dashboard item updated");
            walker.report.inc_updated_dashboard_item();
        }
    }
    walker.staged
}

struct Walker<'a, 'r> {
    graph: &'a ObjectGraph,
    container: ObjectKey,
    source: &'a Sharing,
    staged: StagedSharing,
    report: &'r mut CascadeReport,
}

impl<'a, 'r> Walker<'a, 'r> {
    fn item(&mut self, content: &ItemContent) -> bool {
        match content {
            ItemContent::Map(uid) => self.reference(ObjectType::Map, uid.as_deref()),
            ItemContent::Visualization(uid) => self.analytical_item(ObjectType::Visualization, uid.as_deref()),
            ItemContent::EventReport(uid) => self.analytical_item(ObjectType::EventReport, uid.as_deref()),
            ItemContent::EventChart(uid) => self.event_chart_item(uid.as_deref()),
            ItemContent::Text(_) | ItemContent::Resources => false,
        }
    }

    fn analytical_item(&mut self, object_type: ObjectType, uid: Option<&str>) -> bool {
        let Some(object) = self.resolve(object_type, uid) else {
            return false;
        };
        let mut changed = self.share(object);
        if let ObjectKind::Visualization(analytics) | ObjectKind::EventReport(analytics) = &object.kind {
            changed |= self.analytical(analytics);
        }
        changed
    }

    fn event_chart_item(&mut self, uid: Option<&str>) -> bool {
        let Some(object) = self.resolve(ObjectType::EventChart, uid) else {
            return false;
        };
        let mut changed = self.share(object);
        if let ObjectKind::EventChart(chart) = &object.kind {
            changed |= self.event_chart(chart);
        }
        changed
    }

    fn event_chart(&mut self, chart: &EventChart) -> bool {
        let mut changed = self.reference(
            ObjectType::TrackedEntityAttribute,
            chart.attribute_value_dimension.as_deref(),
        );
        changed |= self.reference(ObjectType::DataElement, chart.data_element_value_dimension.as_deref());
        changed |= self.analytical(&chart.analytics);
        changed
    }

    fn analytical(&mut self, analytics: &AnalyticalObject) -> bool {
        let mut changed = self.references(ObjectType::DataElement, &analytics.data_elements);
        changed |= self.references(ObjectType::Indicator, &analytics.indicators);
        for dimension in &analytics.dimensions {
            changed |= self.dimension(dimension);
        }
        changed
    }

    fn dimension(&mut self, dimension: &Dimension) -> bool {
        match dimension {
            Dimension::Category { category, options } => {
                let mut changed = self.reference(ObjectType::Category, category.as_deref());
                changed |= self.references(ObjectType::CategoryOption, options);
                changed
            }
            Dimension::DataElementGroupSet { group_set, groups } => {
                let mut changed = false;
                let mut members: Vec<&Uid> = groups.iter().collect();
                if let Some(set) = self.resolve(ObjectType::DataElementGroupSet, group_set.as_deref()) {
                    changed |= self.share(set);
                    members.extend(set.kind.members());
                }
                for uid in members {
                    changed |= self.reference(ObjectType::DataElementGroup, Some(uid.as_str()));
                }
                changed
            }
            Dimension::CategoryOptionGroupSet { group_set, groups } => {
                let mut changed = false;
                let mut members: Vec<&Uid> = groups.iter().collect();
                if let Some(set) = self.resolve(ObjectType::CategoryOptionGroupSet, group_set.as_deref()) {
                    changed |= self.share(set);
                    members.extend(set.kind.members());
                }
                for uid in members {
                    changed |= self.category_option_group(uid);
                }
                changed
            }
            Dimension::TrackedEntityAttribute { attribute, legend_set } => {
                let mut changed = self.reference(ObjectType::TrackedEntityAttribute, attribute.as_deref());
                changed |= self.reference(ObjectType::LegendSet, legend_set.as_deref());
                changed
            }
            Dimension::TrackedEntityDataElement { data_element, legend_set, program_stage } => {
                let mut changed = self.reference(ObjectType::DataElement, data_element.as_deref());
                changed |= self.reference(ObjectType::LegendSet, legend_set.as_deref());
                changed |= self.reference(ObjectType::ProgramStage, program_stage.as_deref());
                changed
            }
        }
    }

    fn category_option_group(&mut self, uid: &str) -> bool {
        let Some(group) = self.resolve(ObjectType::CategoryOptionGroup, Some(uid)) else {
            return false;
        };
        let mut changed = self.share(group);
        changed |= self.references(ObjectType::CategoryOption, group.kind.members());
        changed
    }

    fn references(&mut self, object_type: ObjectType, uids: &[Uid]) -> bool {
        let mut changed = false;
        for uid in uids {
            changed |= self.reference(object_type, Some(uid.as_str()));
        }
        changed
    }

    fn reference(&mut self, object_type: ObjectType, uid: Option<&str>) -> bool {
        match self.resolve(object_type, uid) {
            Some(object) => self.share(object),
            None => false,
        }
    }

    fn resolve(&self, object_type: ObjectType, uid: Option<&str>) -> Option<&'a MetadataObject> {
        let uid = uid?;
        let object = self.graph.resolve(object_type, uid);
        if object.is_none() {
            trace!(%object_type, uid, "skipping unresolved reference");
        }
        object
    }

    /// Merge the dashboard's sharing into the staged copy of `target`.
    ///
    /// Returns true if `target` needed access as it stood before the run,
    /// whether this visit or an earlier one staged the change. Every merge
    /// in a walk uses the same source, so an object needed access before the
    /// run exactly when it is staged.
    fn share(&mut self, target: &MetadataObject) -> bool {
        let key = target.key();
        let mut next = self.staged.get(&key).unwrap_or(&target.sharing).clone();
        let propagation = propagate(self.source, &mut next);

        for principal in propagation.unreadable {
            let entry = ErrorEntry::unreadable(self.container.clone(), principal, key.clone());
            if self.report.add_error(entry.clone()) {
                warn!(%entry, "principal below read level, not cascaded");
            }
        }

        if propagation.changed {
            debug!(object = %key, container = %self.container, "cascading read access");
            self.staged.staged.insert(key.clone(), next);
            self.report.add_updated_object(&key);
        }
        self.staged.staged.contains_key(&key)
    }
}
