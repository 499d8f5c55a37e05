//! Boundary events.
//!
//! An event attached to an activity's border must not take part in layering as a node of its
//! own. Before layering its outgoing flows are hung off the host, and the event shrinks to a
//! point. After layering it is moved into the host's layer, glued right behind the host, and
//! gets its flows back. Once routing is done it is pinned onto the host's bottom border.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::remove_empty_layers;
use indexmap::IndexMap;
use narwhal_graph::{EdgeKind, LayoutGraph, NodeId, Point, PortSide, Size};

/// Re-anchors the event's flows on the host and shrinks the event.
pub struct BoundaryEventPreProcessor;

impl Processor for BoundaryEventPreProcessor {
    fn name(&self) -> &'static str {
        "boundary-event-pre"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for host in graph.graph(cx.graph).layerless.clone() {
            for e in graph.outgoing_edges(host) {
                if graph.edge(e).kind != EdgeKind::BoundaryAttachment {
                    continue;
                }
                let event = graph.target_node(e);
                if cx.boundary_events.contains(&event) {
                    continue;
                }
                cx.boundary_events.push(event);

                let node = graph.node_mut(event);
                node.attached_to = Some(host);
                let size = std::mem::replace(&mut node.size, Size::ZERO);
                node.original_size = Some(size);

                let event_port = graph.edge(e).target();
                let port = graph.port_mut(event_port);
                port.side = PortSide::East;
                port.position = Point::new(0.0, size.height / 2.0);

                let host_port = graph.port_on_side(host, PortSide::East);
                graph.set_source(e, host_port);
                for out in graph.outgoing_edges(event) {
                    graph.set_source(out, host_port);
                    graph.edge_mut(out).original_source = Some(event);
                }
                tracing::trace!(
                    event = %graph.node(event).id,
                    host = %graph.node(host).id,
                    "boundary event detached"
                );
            }
        }
        Ok(())
    }
}

/// Puts each event into its host's layer and hands its flows back.
pub struct BoundaryEventIntermediateProcessor1;

impl Processor for BoundaryEventIntermediateProcessor1 {
    fn name(&self) -> &'static str {
        "boundary-event-intermediate-1"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for &event in &cx.boundary_events {
            let Some(host) = graph.node(event).attached_to else {
                continue;
            };
            for e in graph.connected_edges(host) {
                if graph.edge(e).original_source != Some(event) {
                    continue;
                }
                graph.edge_mut(e).original_source = None;
                if graph.edge(e).reversed {
                    let p = graph.port_on_side(event, PortSide::West);
                    graph.set_target(e, p);
                } else {
                    let p = graph.port_on_side(event, PortSide::East);
                    graph.set_source(e, p);
                }
            }

            let Some(layer) = graph.node(host).layer else {
                continue;
            };
            let ix = graph
                .layer(layer)
                .nodes
                .iter()
                .position(|&n| n == host)
                .map_or(0, |i| i + 1);
            graph.insert_into_layer(event, layer, ix);
            let successors = &mut graph.node_mut(host).in_layer_successors;
            if !successors.contains(&event) {
                successors.push(event);
            }
        }
        remove_empty_layers(graph, cx.graph);
        Ok(())
    }
}

/// Drops the host-to-event attachment edges before routing.
pub struct BoundaryEventIntermediateProcessor2;

impl Processor for BoundaryEventIntermediateProcessor2 {
    fn name(&self) -> &'static str {
        "boundary-event-intermediate-2"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        for &event in &cx.boundary_events {
            for e in graph.incoming_edges(event) {
                if graph.edge(e).kind == EdgeKind::BoundaryAttachment {
                    graph.unlink_edge(e);
                }
            }
        }
        Ok(())
    }
}

/// Pins events onto their host's border, side by side from the right corner.
pub struct BoundaryEventPostProcessor;

impl Processor for BoundaryEventPostProcessor {
    fn name(&self) -> &'static str {
        "boundary-event-post"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let mut by_host: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();
        for &event in &cx.boundary_events {
            if let Some(host) = graph.node(event).attached_to {
                by_host.entry(host).or_default().push(event);
            }
        }

        let gap = cx.options.boundary_event_gap;
        for (host, mut events) in by_host {
            // successors further up get the events further right, so flows do not cross
            let successor_y = |n: NodeId| {
                graph
                    .outgoing_edges(n)
                    .first()
                    .map_or(0.0, |&e| graph.node(graph.target_node(e)).position.y)
            };
            events.sort_by(|&a, &b| successor_y(a).total_cmp(&successor_y(b)));

            let host_bounds = graph.bounds(host);
            let mut offset_x = 0.0;
            for event in events {
                let node = graph.node_mut(event);
                if let Some(size) = node.original_size.take() {
                    node.size = size;
                }
                let size = node.size;
                offset_x += size.width + gap;
                let bottom = node.position.y >= host_bounds.y;
                let border = if bottom {
                    host_bounds.bottom()
                } else {
                    host_bounds.y
                };
                node.position =
                    Point::new(host_bounds.right() - offset_x, border - size.height / 2.0);

                let center_x = node.position.x + size.width / 2.0;
                let side = if bottom {
                    PortSide::South
                } else {
                    PortSide::North
                };
                let outgoing = graph.outgoing_edges(event);
                if outgoing.is_empty() {
                    continue;
                }
                // the flow leaves from the event center, which sits on the border
                let center = Point::new(size.width / 2.0, size.height / 2.0);
                let port = graph.add_port(event, side, center);
                for e in outgoing {
                    graph.set_source(e, port);
                    let target_y = graph.port_point(graph.edge(e).target()).y;
                    graph.edge_mut(e).bendpoints =
                        vec![Point::new(center_x, border), Point::new(center_x, target_y)];
                }
            }
        }
        Ok(())
    }
}
