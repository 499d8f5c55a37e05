//! Placement of labels on ordinary edges once their route is final.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{EPSILON, edge_path};
use narwhal_graph::{EdgeKind, LabelPlacement, LayoutGraph, Point};

pub struct EdgeLabelPlacer;

impl Processor for EdgeLabelPlacer {
    fn name(&self) -> &'static str {
        "edge-label-placer"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let edges: Vec<_> = graph
            .layered_nodes(cx.graph)
            .into_iter()
            .flat_map(|n| graph.outgoing_edges(n))
            .filter(|&e| {
                let edge = graph.edge(e);
                edge.kind != EdgeKind::MessageFlow && !edge.labels.is_empty()
            })
            .collect();
        for e in edges {
            let path = edge_path(graph, e);
            for label in &mut graph.edge_mut(e).labels {
                let (a, b) = segment_for(&path, label.placement);
                let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                label.position = Point::new(
                    mid.x - label.size.width / 2.0,
                    a.y.min(b.y) - label.size.height,
                );
            }
        }
        Ok(())
    }
}

/// Segment a label sits on: first for tail labels, last for head labels, otherwise the first
/// horizontal one.
fn segment_for(path: &[Point], placement: LabelPlacement) -> (Point, Point) {
    let segments: Vec<(Point, Point)> = path.windows(2).map(|w| (w[0], w[1])).collect();
    let fallback = (path[0], path[path.len() - 1]);
    match placement {
        LabelPlacement::Tail => segments.first().copied().unwrap_or(fallback),
        LabelPlacement::Head => segments.last().copied().unwrap_or(fallback),
        LabelPlacement::Center => segments
            .iter()
            .copied()
            .find(|(a, b)| (a.y - b.y).abs() < EPSILON && (a.x - b.x).abs() > EPSILON)
            .unwrap_or(fallback),
    }
}
