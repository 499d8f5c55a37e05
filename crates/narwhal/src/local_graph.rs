//! Per-container views of the shared layering.
//!
//! After global layering every container is laid out on its own: the shared layers are cut
//! down to the container's nodes and the edges leaving the container are unlinked until all
//! containers are done.

use narwhal_graph::{EdgeId, EdgeKind, GraphId, InLayerConstraint, LayoutGraph, NodeId, PortSide};

/// Restricts the layers of `g` to the children of `container` and unlinks every edge between a
/// child and a node outside, returning the unlinked edges.
///
/// The inside end of an unlinked edge is pinned to the bottom of its layer and the outside end
/// to the top, so the edge meets the container border without crossing its content. Message
/// flows and artifact shortcuts stay linked; crossing minimization ignores them anyway.
pub fn extract(graph: &mut LayoutGraph, g: GraphId, container: NodeId) -> Vec<EdgeId> {
    let is_local = |graph: &LayoutGraph, n: NodeId| graph.node(n).parent == Some(container);
    let mut crossing = Vec::new();
    for l in graph.graph(g).layers.clone() {
        let local: Vec<NodeId> = graph
            .layer(l)
            .nodes
            .iter()
            .copied()
            .filter(|&n| is_local(graph, n))
            .collect();
        graph.layer_mut(l).nodes = local.clone();

        for n in local {
            for e in graph.connected_edges(n) {
                let other = graph.opposite(e, n);
                if is_local(graph, other)
                    || matches!(
                        graph.edge(e).kind,
                        EdgeKind::MessageFlow | EdgeKind::ArtifactDummy
                    )
                {
                    continue;
                }
                graph.unlink_edge(e);
                crossing.push(e);
                graph.node_mut(n).in_layer_constraint = InLayerConstraint::Bottom;
                graph.node_mut(other).in_layer_constraint = InLayerConstraint::Top;
            }
        }
    }
    crossing
}

/// Links edges removed by [`extract`] again, on ports of the side they left.
pub fn restore(graph: &mut LayoutGraph, edges: &[EdgeId]) {
    for &e in edges {
        let (source, target) = (graph.source_node(e), graph.target_node(e));
        let source_side = side_or(graph.port(graph.edge(e).source()).side, PortSide::East);
        let target_side = side_or(graph.port(graph.edge(e).target()).side, PortSide::West);
        let sp = graph.port_on_side(source, source_side);
        let tp = graph.port_on_side(target, target_side);
        graph.set_source(e, sp);
        graph.set_target(e, tp);
    }
}

fn side_or(side: PortSide, fallback: PortSide) -> PortSide {
    if side == PortSide::Undefined {
        fallback
    } else {
        side
    }
}
