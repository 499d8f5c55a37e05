//! Read-out of final geometry.

use crate::geometry::Point;
use crate::graph::{EdgeId, LayoutGraph};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeGeometry {
    pub source: String,
    pub target: String,
    pub source_point: Point,
    pub target_point: Point,
    pub bendpoints: Vec<Point>,
    pub labels: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub nodes: BTreeMap<String, NodeGeometry>,
    pub edges: BTreeMap<String, EdgeGeometry>,
}

impl LayoutGraph {
    /// Geometry of every node reachable from the root and every edge linked to one of them.
    ///
    /// Positions are reported as stored, so the caller decides whether they are absolute or
    /// container-relative by the mode the layout ran in. Unreachable nesting is skipped.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::default();
        let Ok(visits) = self.descendants(self.root(), usize::MAX) else {
            return snapshot;
        };
        let mut edges: BTreeSet<EdgeId> = BTreeSet::new();
        for v in &visits {
            let node = self.node(v.node);
            snapshot.nodes.insert(
                node.id.clone(),
                NodeGeometry {
                    x: node.position.x,
                    y: node.position.y,
                    width: node.size.width,
                    height: node.size.height,
                },
            );
            edges.extend(self.connected_edges(v.node));
        }
        for e in edges {
            let edge = self.edge(e);
            snapshot.edges.insert(
                self.edge_name(e),
                EdgeGeometry {
                    source: self.node(self.source_node(e)).id.clone(),
                    target: self.node(self.target_node(e)).id.clone(),
                    source_point: self.port_point(edge.source()),
                    target_point: self.port_point(edge.target()),
                    bendpoints: edge.bendpoints.clone(),
                    labels: edge.labels.iter().map(|l| l.position).collect(),
                },
            );
        }
        snapshot
    }
}
