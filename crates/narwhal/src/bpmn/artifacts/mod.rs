//! Floating artifacts: data objects and text annotations.
//!
//! Artifacts take no part in layering. Before layering an artifact is lifted out of the graph
//! and its neighbours are connected directly by shortcut edges, so crossing minimization still
//! keeps them close. The shortcuts are dropped once the order is fixed, and after routing each
//! artifact is put back at the best scoring free spot next to its neighbours.

mod placement;
mod single_edge;

pub use placement::ArtifactPostProcessor;

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::remove_empty_layers;
use narwhal_graph::{EdgeId, EdgeKind, ElementType, GraphId, LayoutGraph, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edge into the artifact.
    Input,
    /// Edge out of the artifact.
    Output,
}

/// An edge of the artifact as it was before the artifact was lifted out.
///
/// The opposite node is kept separately because port processors may move the edge's ports.
#[derive(Debug, Clone, Copy)]
pub struct OriginalEdge {
    pub edge: EdgeId,
    pub opposite: NodeId,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub node: NodeId,
    /// Graph the artifact was taken out of.
    pub home: GraphId,
    /// Shortcuts still linked in the graph.
    pub dummy_edges: Vec<EdgeId>,
    pub original_edges: Vec<OriginalEdge>,
    /// Containers of the artifact's neighbours with their y, ascending.
    pub containers: Vec<(NodeId, f64)>,
    /// Container the artifact currently counts as placed in.
    pub container: Option<NodeId>,
}

impl Artifact {
    fn new(node: NodeId, home: GraphId) -> Self {
        Self {
            node,
            home,
            dummy_edges: Vec::new(),
            original_edges: Vec::new(),
            containers: Vec::new(),
            container: None,
        }
    }
}

/// Lifts artifacts out of the working graph, leaving shortcuts between their neighbours.
pub struct ArtifactPreProcessor;

impl Processor for ArtifactPreProcessor {
    fn name(&self) -> &'static str {
        "artifact-pre"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let g = cx.graph;
        let nodes: Vec<NodeId> = graph
            .graph(g)
            .layerless
            .iter()
            .copied()
            .filter(|&n| graph.node(n).element == ElementType::Artifact)
            .collect();

        for n in nodes {
            let incoming = graph.incoming_edges(n);
            let outgoing = graph.outgoing_edges(n);
            let mut artifact = Artifact::new(n, graph.node(n).graph);

            for &i in &incoming {
                for &o in &outgoing {
                    let (from, to) = (graph.edge(i).source(), graph.edge(o).target());
                    let shortcut = graph.connect_ports(from, to, EdgeKind::ArtifactDummy);
                    artifact.dummy_edges.push(shortcut);
                }
            }
            for (edges, direction) in [(incoming, Direction::Input), (outgoing, Direction::Output)] {
                for e in edges {
                    artifact.original_edges.push(OriginalEdge {
                        edge: e,
                        opposite: graph.opposite(e, n),
                        direction,
                    });
                    graph.unlink_edge(e);
                }
            }

            graph.graph_mut(g).layerless.retain(|&m| m != n);
            graph.remove_from_graph(n);
            graph.node_mut(n).parent = None;
            tracing::trace!(
                artifact = %graph.node(n).id,
                edges = artifact.original_edges.len(),
                shortcuts = artifact.dummy_edges.len(),
                "artifact lifted"
            );
            cx.artifacts.push(artifact);
        }
        Ok(())
    }
}

/// Drops the shortcuts once crossing minimization is done.
///
/// In a container layout only shortcuts starting in the container being laid out are removed;
/// the rest go when their own container comes up, or in a final sweep without scope.
pub struct ArtifactIntermediateProcessor;

impl Processor for ArtifactIntermediateProcessor {
    fn name(&self) -> &'static str {
        "artifact-intermediate"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let scope = cx.scope;
        let mut removed = 0usize;
        for artifact in &mut cx.artifacts {
            artifact.dummy_edges.retain(|&e| {
                let in_scope = scope.is_none_or(|c| graph.node(graph.source_node(e)).parent == Some(c));
                if in_scope {
                    remove_shortcut(graph, e);
                    removed += 1;
                }
                !in_scope
            });
        }
        if removed > 0 {
            remove_empty_layers(graph, cx.graph);
            tracing::trace!(removed, "artifact shortcuts dropped");
        }
        Ok(())
    }
}

/// Unlinks a shortcut together with the long-edge chain it may have been split into.
fn remove_shortcut(graph: &mut LayoutGraph, e: EdgeId) {
    let mut next = Some(e);
    while let Some(e) = next.take() {
        graph.unlink_edge(e);
        let target = graph.target_node(e);
        if !matches!(graph.node(target).kind, NodeKind::LongEdge { .. }) {
            continue;
        }
        next = graph.outgoing_edges(target).first().copied();
        graph.remove_from_layer(target);
        graph.node_mut(target).parent = None;
    }
}
