use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use narwhal_graph::LayoutGraph;

/// Turns edges reversed by cycle breaking back into their original direction, bendpoints
/// included.
pub struct ReversedEdgeRestorer;

impl Processor for ReversedEdgeRestorer {
    fn name(&self) -> &'static str {
        "reversed-edge-restorer"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let edges: Vec<_> = graph
            .layered_nodes(cx.graph)
            .into_iter()
            .flat_map(|n| graph.outgoing_edges(n))
            .filter(|&e| graph.edge(e).reversed)
            .collect();
        for e in edges {
            graph.reverse_edge(e);
        }
        Ok(())
    }
}
