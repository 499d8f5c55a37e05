//! Long-edge normalization.
//!
//! An edge spanning several layers is split into a chain of unit-length segments through
//! zero-size dummy nodes, one per intermediate layer. After routing the chain is joined back
//! into the original edge, with the dummies' positions as bendpoints.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{EPSILON, is_collinear};
use narwhal_graph::{EdgeId, LayoutGraph, NodeKind, Point, PortSide};

pub struct LongEdgeSplitter;

impl Processor for LongEdgeSplitter {
    fn name(&self) -> &'static str {
        "long-edge-splitter"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let g = cx.graph;
        let layers = graph.graph(g).layers.clone();
        for (i, &layer) in layers.iter().enumerate() {
            for n in graph.layer(layer).nodes.clone() {
                for e in graph.outgoing_edges(n) {
                    let target = graph.target_node(e);
                    let Some(j) = graph.node_layer_index(target) else {
                        continue;
                    };
                    if graph.node(target).layer.map(|l| graph.layer(l).graph) != Some(g)
                        || j <= i + 1
                    {
                        continue;
                    }
                    let kind = graph.edge(e).kind;
                    let final_target = graph.edge(e).target();
                    let mut current = e;
                    for &mid in &layers[i + 1..j] {
                        let dummy = graph.add_dummy_node(g, NodeKind::LongEdge { origin: e });
                        let west = graph.add_port(dummy, PortSide::West, Point::ZERO);
                        let east = graph.add_port(dummy, PortSide::East, Point::ZERO);
                        let end = graph.layer(mid).nodes.len();
                        graph.insert_into_layer(dummy, mid, end);
                        graph.set_target(current, west);
                        current = graph.connect_ports(east, final_target, kind);
                    }
                }
            }
        }
        Ok(())
    }
}

pub struct LongEdgeJoiner;

impl Processor for LongEdgeJoiner {
    fn name(&self) -> &'static str {
        "long-edge-joiner"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for n in graph.layered_nodes(cx.graph) {
            if !matches!(graph.node(n).kind, NodeKind::LongEdge { .. }) {
                continue;
            }
            let incoming = graph.incoming_edges(n);
            let outgoing = graph.outgoing_edges(n);
            let through = graph.node(n).position;
            match (incoming.first(), outgoing.first()) {
                (Some(&head), Some(&tail)) => join(graph, head, tail, through),
                _ => {
                    for e in incoming.into_iter().chain(outgoing) {
                        graph.unlink_edge(e);
                    }
                }
            }
            graph.remove_from_layer(n);
            graph.remove_from_graph(n);
            graph.node_mut(n).parent = None;
        }
        Ok(())
    }
}

/// Appends `tail`'s route to `head` through `through`, then retargets `head` to `tail`'s end.
fn join(graph: &mut LayoutGraph, head: EdgeId, tail: EdgeId, through: Point) {
    let before = graph
        .edge(head)
        .bendpoints
        .last()
        .copied()
        .unwrap_or_else(|| graph.port_point(graph.edge(head).source()));
    let after = graph
        .edge(tail)
        .bendpoints
        .first()
        .copied()
        .unwrap_or_else(|| graph.port_point(graph.edge(tail).target()));
    let tail_points = std::mem::take(&mut graph.edge_mut(tail).bendpoints);
    let tail_target = graph.edge(tail).target();

    let points = &mut graph.edge_mut(head).bendpoints;
    let duplicate = points
        .last()
        .is_some_and(|p| (p.x - through.x).abs() < EPSILON && (p.y - through.y).abs() < EPSILON);
    if !duplicate && !is_collinear(before, through, after) {
        points.push(through);
    }
    points.extend(tail_points);

    graph.unlink_edge(tail);
    graph.set_target(head, tail_target);
}
