//! Gives undecided ports a side from their net edge direction.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use narwhal_graph::{LayoutGraph, PortSide};

pub struct PortSideProcessor;

impl Processor for PortSideProcessor {
    fn name(&self) -> &'static str {
        "port-side"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let nodes = graph.graph(cx.graph).layerless.clone();
        for n in nodes {
            let size = graph.node(n).size;
            for p in graph.node(n).ports.clone() {
                let port = graph.port(p);
                if port.side != PortSide::Undefined {
                    continue;
                }
                let side = if port.outgoing().len() > port.incoming().len() {
                    PortSide::East
                } else {
                    PortSide::West
                };
                let port = graph.port_mut(p);
                port.side = side;
                port.position = side.anchor(size);
            }
        }
        Ok(())
    }
}
