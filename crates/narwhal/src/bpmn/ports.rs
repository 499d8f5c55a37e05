//! Port consolidation before placement and port spreading after it.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::approx_eq;
use narwhal_graph::{EdgeId, ElementType, LayoutGraph, NodeId, Point, PortId, PortSide};
use std::collections::VecDeque;

/// Funnels every east/west edge of a node through one centered port per side, so placement
/// sees each node as a single in-point and a single out-point.
pub struct PortPreProcessor;

impl Processor for PortPreProcessor {
    fn name(&self) -> &'static str {
        "port-pre"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for n in graph.layered_nodes(cx.graph) {
            if graph.node(n).kind.is_dummy() {
                continue;
            }
            let west = centered_port(graph, n, PortSide::West);
            let east = centered_port(graph, n, PortSide::East);
            for e in graph.incoming_edges(n) {
                if side_movable(graph.port(graph.edge(e).target()).side) {
                    graph.set_target(e, west);
                }
            }
            for e in graph.outgoing_edges(n) {
                if side_movable(graph.port(graph.edge(e).source()).side) {
                    graph.set_source(e, east);
                }
            }
        }
        Ok(())
    }
}

fn side_movable(side: PortSide) -> bool {
    side.is_horizontal() || side == PortSide::Undefined
}

fn centered_port(graph: &mut LayoutGraph, n: NodeId, side: PortSide) -> PortId {
    let p = graph.port_on_side(n, side);
    let anchor = side.anchor(graph.node(n).size);
    graph.port_mut(p).position = anchor;
    p
}

/// Gives every east/west edge of an activity its own port.
///
/// Ports on one side are spread evenly over the node height, ordered by the vertical position
/// of the node at the other end so the fan-out does not cross itself. A side with a single edge
/// is lined up with the port at the other end when both nodes share a center line.
pub struct PortPostProcessor;

impl Processor for PortPostProcessor {
    fn name(&self) -> &'static str {
        "port-post"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let mut singles: Vec<(EdgeId, PortSide)> = Vec::new();
        for n in graph.layered_nodes(cx.graph) {
            let node = graph.node(n);
            if node.kind.is_dummy()
                || matches!(node.element, ElementType::Gateway | ElementType::Event)
            {
                continue;
            }
            let mut pool: VecDeque<PortId> = node
                .ports
                .iter()
                .copied()
                .filter(|&p| graph.port(p).side.is_horizontal())
                .collect();

            let incoming: Vec<(EdgeId, f64)> = graph
                .incoming_edges(n)
                .into_iter()
                .filter(|&e| graph.port(graph.edge(e).target()).side.is_horizontal())
                .map(|e| (e, graph.absolute_position(graph.source_node(e)).y))
                .collect();
            let outgoing: Vec<(EdgeId, f64)> = graph
                .outgoing_edges(n)
                .into_iter()
                .filter(|&e| graph.port(graph.edge(e).source()).side.is_horizontal())
                .map(|e| (e, graph.absolute_position(graph.target_node(e)).y))
                .collect();

            let mut west: Vec<(PortId, f64)> = Vec::with_capacity(incoming.len());
            for &(e, y) in &incoming {
                let p = take_port(graph, n, PortSide::West, &mut pool);
                graph.set_target(e, p);
                west.push((p, y));
            }
            let mut east: Vec<(PortId, f64)> = Vec::with_capacity(outgoing.len());
            for &(e, y) in &outgoing {
                let p = take_port(graph, n, PortSide::East, &mut pool);
                graph.set_source(e, p);
                east.push((p, y));
            }

            match incoming.as_slice() {
                [(e, _)] => singles.push((*e, PortSide::West)),
                _ => spread(graph, n, west),
            }
            match outgoing.as_slice() {
                [(e, _)] => singles.push((*e, PortSide::East)),
                _ => spread(graph, n, east),
            }
        }

        for (e, side) in singles {
            let (port, counter) = match side {
                PortSide::West => (graph.edge(e).target(), graph.edge(e).source()),
                _ => (graph.edge(e).source(), graph.edge(e).target()),
            };
            align_single(graph, port, counter);
        }
        Ok(())
    }
}

/// Next reusable east/west port of `n`, or a new one, centered on `side`.
fn take_port(
    graph: &mut LayoutGraph,
    n: NodeId,
    side: PortSide,
    pool: &mut VecDeque<PortId>,
) -> PortId {
    let size = graph.node(n).size;
    let p = match pool.pop_front() {
        Some(p) => p,
        None => graph.add_port(n, side, Point::ZERO),
    };
    let port = graph.port_mut(p);
    port.side = side;
    port.position = side.anchor(size);
    p
}

fn spread(graph: &mut LayoutGraph, n: NodeId, mut ports: Vec<(PortId, f64)>) {
    if ports.is_empty() {
        return;
    }
    ports.sort_by(|a, b| a.1.total_cmp(&b.1));
    let step = graph.node(n).size.height / (ports.len() + 1) as f64;
    for (k, (p, _)) in ports.into_iter().enumerate() {
        graph.port_mut(p).position.y = step * (k + 1) as f64;
    }
}

fn align_single(graph: &mut LayoutGraph, port: PortId, counter: PortId) {
    let node = graph.port(port).node;
    let counter_node = graph.port(counter).node;
    let top = graph.absolute_position(node).y;
    let counter_top = graph.absolute_position(counter_node).y;
    let center = top + graph.node(node).size.height / 2.0;
    let counter_center = counter_top + graph.node(counter_node).size.height / 2.0;
    if approx_eq(center, counter_center) {
        let y = graph.port(counter).position.y + (counter_top - top);
        graph.port_mut(port).position.y = y;
    }
}
