//! Element tags carried by nodes, edges and ports.

use crate::geometry::{Point, Size};
use crate::graph::EdgeId;
use serde::{Deserialize, Serialize};

/// BPMN element classification of a node.
///
/// Plain activities (tasks) carry [`ElementType::Undefined`]; only the kinds that the layout
/// treats specially get their own tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Gateway,
    Event,
    SubProcess,
    Pool,
    Lane,
    Artifact,
    Group,
    MessageFlowEndpoint,
    #[default]
    Undefined,
}

impl ElementType {
    /// Default diagram size for the element kind.
    pub fn default_size(self) -> Size {
        match self {
            ElementType::Event => Size::new(30.0, 30.0),
            ElementType::Gateway => Size::new(40.0, 40.0),
            ElementType::Artifact => Size::new(60.0, 80.0),
            _ => Size::new(200.0, 100.0),
        }
    }

    /// Events and gateways keep their symbol size no matter what.
    pub fn has_fixed_size(self) -> bool {
        matches!(self, ElementType::Event | ElementType::Gateway)
    }

    pub fn is_bpmn_container(self) -> bool {
        matches!(self, ElementType::Pool | ElementType::Lane)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    #[default]
    SequenceFlow,
    MessageFlow,
    DataAssociation,
    /// Undirected link to a text annotation.
    Association,
    /// Implicit host activity to boundary event relationship.
    BoundaryAttachment,
    /// Shortcut that bypasses a floating artifact during layering.
    ArtifactDummy,
}

impl EdgeKind {
    pub fn is_undirected(self) -> bool {
        self == EdgeKind::Association
    }
}

/// Structural role of a node inside the layered pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Regular,
    /// Placeholder splitting `origin` across an intermediate layer.
    LongEdge { origin: EdgeId },
}

impl NodeKind {
    pub fn is_dummy(self) -> bool {
        !matches!(self, NodeKind::Regular)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortSide {
    #[default]
    Undefined,
    North,
    East,
    South,
    West,
}

impl PortSide {
    pub fn is_horizontal(self) -> bool {
        matches!(self, PortSide::East | PortSide::West)
    }

    /// Anchor of a centered port on a node of `size`.
    pub fn anchor(self, size: Size) -> Point {
        match self {
            PortSide::North => Point::new(size.width / 2.0, 0.0),
            PortSide::South => Point::new(size.width / 2.0, size.height),
            PortSide::East => Point::new(size.width, size.height / 2.0),
            PortSide::West => Point::new(0.0, size.height / 2.0),
            PortSide::Undefined => Point::new(size.width / 2.0, size.height / 2.0),
        }
    }
}

/// Explicit in-layer ordering group, applied before barycenter sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InLayerConstraint {
    Top,
    #[default]
    None,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPlacement {
    Head,
    #[default]
    Center,
    Tail,
}

/// Edge or node label. `position` is absolute once layout has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub position: Point,
    pub size: Size,
    pub placement: LabelPlacement,
}

impl Label {
    pub fn new(size: Size, placement: LabelPlacement) -> Self {
        Self {
            position: Point::ZERO,
            size,
            placement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    Source,
    Target,
}
