//! In-memory arena of hydrated objects

use std::collections::BTreeMap;

use crate::error::{CascadeError, Result};
use crate::object::{MetadataObject, ObjectKey, ObjectType};
use crate::sharing::Sharing;

/// All objects reachable from one or more dashboards, keyed by identity.
///
/// References between objects are uids; a reference whose target is missing
/// from the graph is treated as null.
#[derive(Clone, Debug, Default)]
pub struct ObjectGraph {
    objects: BTreeMap<ObjectKey, MetadataObject>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, replacing any previous object with the same key
    pub fn insert(&mut self, object: MetadataObject) -> Option<MetadataObject> {
        self.objects.insert(object.key(), object)
    }

    pub fn with(mut self, object: MetadataObject) -> Self {
        self.insert(object);
        self
    }

    #[inline]
    pub fn get(&self, key: &ObjectKey) -> Option<&MetadataObject> {
        self.objects.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &ObjectKey) -> Option<&mut MetadataObject> {
        self.objects.get_mut(key)
    }

    /// Look up a typed reference
    pub fn resolve(&self, object_type: ObjectType, uid: &str) -> Option<&MetadataObject> {
        self.objects.get(&ObjectKey::new(object_type, uid))
    }

    pub fn sharing(&self, key: &ObjectKey) -> Option<&Sharing> {
        self.get(key).map(|o| &o.sharing)
    }

    /// Fetch a dashboard, or `NotFound`
    pub fn dashboard(&self, uid: &str) -> Result<&MetadataObject> {
        self.resolve(ObjectType::Dashboard, uid)
            .ok_or_else(|| CascadeError::NotFound(ObjectKey::new(ObjectType::Dashboard, uid)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &MetadataObject> {
        self.objects.values()
    }
}

impl FromIterator<MetadataObject> for ObjectGraph {
    fn from_iter<I: IntoIterator<Item = MetadataObject>>(iter: I) -> Self {
        let mut graph = ObjectGraph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<MetadataObject> for ObjectGraph {
    fn extend<I: IntoIterator<Item = MetadataObject>>(&mut self, iter: I) {
        for object in iter {
            self.insert(object);
        }
    }
}
