//! Message flows.
//!
//! A message flow connects two participants and says nothing about the order of work inside
//! either one, so it must not pull its source into a later layer. During layering it hangs off
//! the source's predecessor instead (or off nothing at all). Afterwards it is parked on south
//! ports, hidden from its source's edge list, and finally routed through a horizontal shelf
//! halfway between the two nodes.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::approx_eq;
use narwhal_graph::{EdgeKind, LabelPlacement, LayoutGraph, Point, PortSide};

pub struct MessageFlowPreProcessor;

impl Processor for MessageFlowPreProcessor {
    fn name(&self) -> &'static str {
        "message-flow-pre"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let nodes = graph.graph(cx.graph).layerless.clone();
        for &n in &nodes {
            for e in graph.outgoing_edges(n) {
                // flows leaving the working set are left to the enclosing layout
                if graph.edge(e).kind == EdgeKind::MessageFlow
                    && nodes.contains(&graph.target_node(e))
                    && !cx.message_flows.contains(&e)
                {
                    cx.message_flows.push(e);
                }
            }
        }

        for &e in &cx.message_flows {
            let source = graph.source_node(e);
            let surrogate = graph
                .incoming_edges(source)
                .into_iter()
                .find(|&i| graph.edge(i).kind == EdgeKind::SequenceFlow)
                .map(|i| graph.edge(i).source());
            let edge = graph.edge_mut(e);
            edge.original_source = Some(source);
            if let Some(ix) = edge
                .labels
                .iter()
                .position(|l| l.placement == LabelPlacement::Center)
            {
                edge.held_label = Some(edge.labels.remove(ix));
            }
            match surrogate {
                Some(port) => graph.set_source(e, port),
                None => graph.unlink_edge(e),
            }
        }
        Ok(())
    }
}

/// Moves message flows onto south ports and hides them from their source.
pub struct MessageFlowIntermediateProcessor;

impl Processor for MessageFlowIntermediateProcessor {
    fn name(&self) -> &'static str {
        "message-flow-intermediate"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for &e in &cx.message_flows {
            let Some(source) = graph.edge(e).original_source else {
                continue;
            };
            let target = if graph.edge(e).reversed {
                graph.edge_mut(e).reversed = false;
                graph.source_node(e)
            } else {
                graph.target_node(e)
            };
            let sp = graph.port_on_side(source, PortSide::South);
            let tp = graph.port_on_side(target, PortSide::South);
            graph.set_source(e, sp);
            graph.set_target(e, tp);
            graph.detach_from_source_port(e);
        }
        Ok(())
    }
}

/// Final route: south/north ports facing each other, and a two-bendpoint shelf when the ends
/// are not vertically aligned.
pub struct MessageFlowPostProcessor;

impl Processor for MessageFlowPostProcessor {
    fn name(&self) -> &'static str {
        "message-flow-post"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let label_gap = cx.options.message_label_gap;
        for &e in &cx.message_flows {
            let original = graph.edge_mut(e).original_source.take();
            let source = original.unwrap_or_else(|| graph.source_node(e));
            let target = graph.target_node(e);
            let (source_side, target_side) =
                if graph.node(source).position.y > graph.node(target).position.y {
                    (PortSide::North, PortSide::South)
                } else {
                    (PortSide::South, PortSide::North)
                };
            let sp = graph.port_on_side(source, source_side);
            let tp = graph.port_on_side(target, target_side);
            for (p, n, side) in [(sp, source, source_side), (tp, target, target_side)] {
                let anchor = side.anchor(graph.node(n).size);
                graph.port_mut(p).position = anchor;
            }
            graph.set_source(e, sp);
            graph.set_target(e, tp);

            let start = graph.port_point(sp);
            let end = graph.port_point(tp);
            let shelf_y = (start.y + end.y) / 2.0;
            let aligned = approx_eq(start.x, end.x);
            let edge = graph.edge_mut(e);
            edge.bendpoints.clear();
            if !aligned {
                edge.bendpoints = vec![Point::new(start.x, shelf_y), Point::new(end.x, shelf_y)];
            }

            if let Some(mut label) = edge.held_label.take() {
                let w = label.size.width;
                let h = label.size.height;
                let beside = start.x.max(end.x) - w - label_gap;
                label.position = if (start.x - end.x).abs() > w {
                    Point::new((start.x + end.x) / 2.0 - w / 2.0, shelf_y - h)
                } else if aligned {
                    Point::new(beside, shelf_y - h / 2.0)
                } else {
                    Point::new(beside, shelf_y - h - label_gap / 2.0)
                };
                edge.labels.push(label);
            }
        }
        Ok(())
    }
}
