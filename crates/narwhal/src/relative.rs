//! Conversion of a finished absolute layout into container-relative coordinates.

use crate::error::Result;
use narwhal_graph::{EdgeEnd, EdgeId, LayoutGraph, NodeId, Point};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeSet;

/// Re-expresses every node position relative to the container that holds it.
///
/// Edge bendpoints and labels end up in the frame of the source node's container. When the
/// target lives in another container, the target port is moved by the difference of the two
/// frames so the route still meets it; a port shared with other edges is split off first.
pub fn make_relative(graph: &mut LayoutGraph, max_depth: usize) -> Result<()> {
    let visits = graph.descendants(graph.root(), max_depth)?;
    let absolute: HashMap<NodeId, Point> = visits
        .iter()
        .map(|v| (v.node, graph.node(v.node).position))
        .collect();
    let mut frame: HashMap<NodeId, (Option<NodeId>, Point)> = HashMap::default();
    for v in &visits {
        let owner = graph.graph(v.graph).owner;
        let origin = owner
            .and_then(|o| absolute.get(&o).copied())
            .unwrap_or(Point::ZERO);
        frame.insert(v.node, (owner, origin));
    }

    let edges: BTreeSet<EdgeId> = visits
        .iter()
        .flat_map(|v| graph.connected_edges(v.node))
        .collect();
    for e in edges {
        let source = graph.source_node(e);
        let target = graph.target_node(e);
        let (Some(&(_, source_origin)), Some(&(_, target_origin))) =
            (frame.get(&source), frame.get(&target))
        else {
            continue;
        };
        if source_origin != target_origin {
            let p = graph.isolate_port(e, EdgeEnd::Target);
            graph.port_mut(p).position -= source_origin - target_origin;
        }
        let edge = graph.edge_mut(e);
        for b in &mut edge.bendpoints {
            *b -= source_origin;
        }
        for label in &mut edge.labels {
            label.position -= source_origin;
        }
    }

    for (n, (owner, origin)) in frame {
        let Some(&position) = absolute.get(&n) else {
            continue;
        };
        let node = graph.node_mut(n);
        node.parent = owner;
        node.position = position - origin;
    }
    tracing::debug!(nodes = visits.len(), "converted to relative coordinates");
    Ok(())
}
