#![forbid(unsafe_code)]

//! Hierarchical layout graph model.
//!
//! A [`LayoutGraph`] holds BPMN flow nodes, containers (pools, lanes, sub-processes) and the
//! edges between them in one arena. The `narwhal` engine mutates it in place; callers build it
//! from their process model and read the result back through [`LayoutGraph::snapshot`].

pub mod element;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod snapshot;
pub mod traverse;

pub use element::{
    EdgeEnd, EdgeKind, ElementType, InLayerConstraint, Label, LabelPlacement, NodeKind, PortSide,
};
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use graph::{
    Edge, EdgeId, Graph, GraphId, Layer, LayerId, LayoutGraph, Node, NodeId, Port, PortId,
};
pub use snapshot::{EdgeGeometry, LayoutSnapshot, NodeGeometry};
pub use traverse::{Ancestors, Visit};
