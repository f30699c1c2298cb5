//! Sharable metadata objects and the typed references between them.
//!
//! Every object carries a [`Sharing`] and a stable identity ([`ObjectKey`]).
//! The edges an object has are fixed by its type and live in [`ObjectKind`];
//! references are uids whose target type is implied by the field holding them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sharing::Sharing;

pub type Uid = String;

/// Concrete type of a sharable object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    Dashboard,
    Map,
    Visualization,
    EventReport,
    EventChart,
    Category,
    CategoryOption,
    CategoryOptionGroup,
    CategoryOptionGroupSet,
    DataElement,
    DataElementGroup,
    DataElementGroupSet,
    Indicator,
    LegendSet,
    ProgramStage,
    TrackedEntityAttribute,
}

impl ObjectType {
    pub const ALL: [ObjectType; 16] = [
        ObjectType::Dashboard,
        ObjectType::Map,
        ObjectType::Visualization,
        ObjectType::EventReport,
        ObjectType::EventChart,
        ObjectType::Category,
        ObjectType::CategoryOption,
        ObjectType::CategoryOptionGroup,
        ObjectType::CategoryOptionGroupSet,
        ObjectType::DataElement,
        ObjectType::DataElementGroup,
        ObjectType::DataElementGroupSet,
        ObjectType::Indicator,
        ObjectType::LegendSet,
        ObjectType::ProgramStage,
        ObjectType::TrackedEntityAttribute,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Dashboard => "Dashboard",
            ObjectType::Map => "Map",
            ObjectType::Visualization => "Visualization",
            ObjectType::EventReport => "EventReport",
            ObjectType::EventChart => "EventChart",
            ObjectType::Category => "Category",
            ObjectType::CategoryOption => "CategoryOption",
            ObjectType::CategoryOptionGroup => "CategoryOptionGroup",
            ObjectType::CategoryOptionGroupSet => "CategoryOptionGroupSet",
            ObjectType::DataElement => "DataElement",
            ObjectType::DataElementGroup => "DataElementGroup",
            ObjectType::DataElementGroupSet => "DataElementGroupSet",
            ObjectType::Indicator => "Indicator",
            ObjectType::LegendSet => "LegendSet",
            ObjectType::ProgramStage => "ProgramStage",
            ObjectType::TrackedEntityAttribute => "TrackedEntityAttribute",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type plus uid. Uids are only unique within a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectKey {
    pub object_type: ObjectType,
    pub uid: Uid,
}

impl ObjectKey {
    pub fn new(object_type: ObjectType, uid: impl Into<Uid>) -> Self {
        ObjectKey { object_type, uid: uid.into() }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.object_type, self.uid)
    }
}

/// A sharable object as handed over by the persistence layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataObject {
    pub uid: Uid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sharing: Sharing,
    pub kind: ObjectKind,
    /// Store revision this copy was read at, 0 if it never came from a store.
    /// Kept next to the object in the store, not inside it.
    #[serde(skip)]
    pub revision: u64,
}

impl MetadataObject {
    /// Object with empty sharing (no public access, no entries)
    pub fn new(uid: impl Into<Uid>, name: impl Into<String>, kind: ObjectKind) -> Self {
        MetadataObject {
            uid: uid.into(),
            name: name.into(),
            sharing: Sharing::default(),
            kind,
            revision: 0,
        }
    }

    pub fn with_sharing(mut self, sharing: Sharing) -> Self {
        self.sharing = sharing;
        self
    }

    #[inline]
    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.object_type(), self.uid.clone())
    }
}

/// Type tag plus the type-specific outgoing references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    Dashboard {
        #[serde(default)]
        items: Vec<DashboardItem>,
    },
    Map,
    Visualization(AnalyticalObject),
    EventReport(AnalyticalObject),
    EventChart(EventChart),
    Category,
    CategoryOption,
    CategoryOptionGroup {
        /// Category options
        #[serde(default)]
        members: Vec<Uid>,
    },
    CategoryOptionGroupSet {
        /// Category option groups
        #[serde(default)]
        members: Vec<Uid>,
    },
    DataElement,
    DataElementGroup,
    DataElementGroupSet {
        /// Data element groups
        #[serde(default)]
        members: Vec<Uid>,
    },
    Indicator,
    LegendSet,
    ProgramStage,
    TrackedEntityAttribute,
}

impl ObjectKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::Dashboard { .. } => ObjectType::Dashboard,
            ObjectKind::Map => ObjectType::Map,
            ObjectKind::Visualization(_) => ObjectType::Visualization,
            ObjectKind::EventReport(_) => ObjectType::EventReport,
            ObjectKind::EventChart(_) => ObjectType::EventChart,
            ObjectKind::Category => ObjectType::Category,
            ObjectKind::CategoryOption => ObjectType::CategoryOption,
            ObjectKind::CategoryOptionGroup { .. } => ObjectType::CategoryOptionGroup,
            ObjectKind::CategoryOptionGroupSet { .. } => ObjectType::CategoryOptionGroupSet,
            ObjectKind::DataElement => ObjectType::DataElement,
            ObjectKind::DataElementGroup => ObjectType::DataElementGroup,
            ObjectKind::DataElementGroupSet { .. } => ObjectType::DataElementGroupSet,
            ObjectKind::Indicator => ObjectType::Indicator,
            ObjectKind::LegendSet => ObjectType::LegendSet,
            ObjectKind::ProgramStage => ObjectType::ProgramStage,
            ObjectKind::TrackedEntityAttribute => ObjectType::TrackedEntityAttribute,
        }
    }

    /// Members of a group or group set, empty for every other kind
    pub fn members(&self) -> &[Uid] {
        match self {
            ObjectKind::CategoryOptionGroup { members }
            | ObjectKind::CategoryOptionGroupSet { members }
            | ObjectKind::DataElementGroupSet { members } => members,
            _ => &[],
        }
    }
}

/// One entry on a dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardItem {
    pub uid: Uid,
    pub content: ItemContent,
}

impl DashboardItem {
    pub fn new(uid: impl Into<Uid>, content: ItemContent) -> Self {
        DashboardItem { uid: uid.into(), content }
    }
}

/// What a dashboard item shows. Only the four object-backed kinds cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target")]
pub enum ItemContent {
    Map(Option<Uid>),
    Visualization(Option<Uid>),
    EventReport(Option<Uid>),
    EventChart(Option<Uid>),
    Text(String),
    Resources,
}

impl ItemContent {
    /// The referenced object, if this kind references one and it is set
    pub fn target(&self) -> Option<ObjectKey> {
        let (object_type, uid) = match self {
            ItemContent::Map(uid) => (ObjectType::Map, uid),
            ItemContent::Visualization(uid) => (ObjectType::Visualization, uid),
            ItemContent::EventReport(uid) => (ObjectType::EventReport, uid),
            ItemContent::EventChart(uid) => (ObjectType::EventChart, uid),
            ItemContent::Text(_) | ItemContent::Resources => return None,
        };
        uid.as_ref().map(|u| ObjectKey::new(object_type, u.clone()))
    }
}

/// Axes of a visualization, event report or event chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticalObject {
    #[serde(default)]
    pub data_elements: Vec<Uid>,
    #[serde(default)]
    pub indicators: Vec<Uid>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl AnalyticalObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_element(mut self, uid: impl Into<Uid>) -> Self {
        self.data_elements.push(uid.into());
        self
    }

    pub fn with_indicator(mut self, uid: impl Into<Uid>) -> Self {
        self.indicators.push(uid.into());
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChart {
    #[serde(flatten)]
    pub analytics: AnalyticalObject,
    /// Tracked entity attribute used as the value axis
    #[serde(default)]
    pub attribute_value_dimension: Option<Uid>,
    /// Data element used as the value axis
    #[serde(default)]
    pub data_element_value_dimension: Option<Uid>,
}

/// A typed dimension of an analytical object. `None` and dangling references
/// are legal and simply not followed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimensionType", rename_all = "camelCase")]
pub enum Dimension {
    #[serde(rename_all = "camelCase")]
    Category {
        category: Option<Uid>,
        #[serde(default)]
        options: Vec<Uid>,
    },
    #[serde(rename_all = "camelCase")]
    DataElementGroupSet {
        group_set: Option<Uid>,
        #[serde(default)]
        groups: Vec<Uid>,
    },
    #[serde(rename_all = "camelCase")]
    CategoryOptionGroupSet {
        group_set: Option<Uid>,
        #[serde(default)]
        groups: Vec<Uid>,
    },
    #[serde(rename_all = "camelCase")]
    TrackedEntityAttribute {
        attribute: Option<Uid>,
        #[serde(default)]
        legend_set: Option<Uid>,
    },
    #[serde(rename_all = "camelCase")]
    TrackedEntityDataElement {
        data_element: Option<Uid>,
        #[serde(default)]
        legend_set: Option<Uid>,
        #[serde(default)]
        program_stage: Option<Uid>,
    },
}
