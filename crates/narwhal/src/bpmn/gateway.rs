//! Splitting gateways route their branches through the top and bottom corners of the diamond.
//!
//! The router leaves every branch on the gateway's east port with a vertical slot in the gap
//! after the layer. Branches whose target lies above (below) the gateway are moved to the north
//! (south) port, and their slot onto the gateway's center line. The first bendpoint is kept
//! clear of the diamond by the configured clearance.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::approx_eq;
use narwhal_graph::{EdgeKind, ElementType, LayoutGraph, NodeId, Point, PortSide};

pub struct GatewayRouter;

impl Processor for GatewayRouter {
    fn name(&self) -> &'static str {
        "gateway-router"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let gateways: Vec<NodeId> = graph
            .layered_nodes(cx.graph)
            .into_iter()
            .filter(|&n| graph.node(n).element == ElementType::Gateway)
            .collect();
        for gateway in gateways {
            route_gateway(graph, gateway, cx.options.gateway_clearance);
        }
        Ok(())
    }
}

fn route_gateway(graph: &mut LayoutGraph, gateway: NodeId, clearance: f64) {
    let north = graph.port_on_side(gateway, PortSide::North);
    let south = graph.port_on_side(gateway, PortSide::South);

    let edges: Vec<_> = graph
        .outgoing_edges(gateway)
        .into_iter()
        .filter(|&e| graph.edge(e).kind != EdgeKind::MessageFlow)
        .collect();
    if edges.len() < 2 {
        return;
    }

    let bounds = graph.bounds(gateway);
    let center = bounds.center();
    let (top, bottom) = (bounds.y - clearance, bounds.bottom() + clearance);
    for e in edges {
        let target_center = graph.node(graph.target_node(e)).center().y;
        let target_y = graph.port_point(graph.edge(e).target()).y;
        let (port, stub_y) = if approx_eq(target_center, center.y) {
            continue;
        } else if target_center < center.y {
            (north, top)
        } else {
            (south, bottom)
        };
        // a target port level with the diamond cannot be reached with one stub
        if target_y > top && target_y < bottom {
            continue;
        }

        let points = &mut graph.edge_mut(e).bendpoints;
        if let Some(slot_x) = points.first().map(|p| p.x) {
            for p in points.iter_mut().filter(|p| approx_eq(p.x, slot_x)) {
                p.x = center.x;
            }
        }
        match points.first_mut() {
            Some(first) => first.y = stub_y,
            None => points.push(Point::new(center.x, target_y)),
        }
        graph.set_source(e, port);
    }
}
