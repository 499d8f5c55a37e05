//! Pool and lane geometry around the routing phase.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use narwhal_graph::{EdgeId, LayoutGraph, NodeId, Point};
use rustc_hash::FxHashSet as HashSet;

/// Turns container-relative positions into absolute ones for routing.
///
/// Starting from each top-level container, every descendant gets the accumulated offset of its
/// ancestors added. Sub-processes are moved but not entered: their content stays in the
/// sub-process frame until cleanup.
pub struct ContainerPreProcessor;

impl Processor for ContainerPreProcessor {
    fn name(&self) -> &'static str {
        "container-pre"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let mut tops: Vec<NodeId> = Vec::new();
        for &c in &cx.containers {
            let top = graph.ancestors(c).last().unwrap_or(c);
            if !tops.contains(&top) {
                tops.push(top);
            }
        }

        let limit = cx.options.max_nesting_depth;
        let mut stack: Vec<(NodeId, Point, usize)> = tops
            .into_iter()
            .map(|t| (t, graph.node(t).position, 0))
            .collect();
        while let Some((container, offset, depth)) = stack.pop() {
            let Some(nested) = graph.nested_graph(container) else {
                continue;
            };
            if depth >= limit {
                return Err(narwhal_graph::Error::NestingTooDeep {
                    id: graph.node(container).id.clone(),
                    limit,
                }
                .into());
            }
            for n in graph.graph(nested).nodes.clone() {
                let node = graph.node_mut(n);
                node.position += offset;
                if node.element.is_bpmn_container() {
                    stack.push((n, node.position, depth + 1));
                }
            }
        }
        Ok(())
    }
}

/// Stretches pools and lanes to the diagram width and shifts their content right, clearing the
/// gutter on the left where the container labels go.
pub struct ContainerPostProcessor;

impl Processor for ContainerPostProcessor {
    fn name(&self) -> &'static str {
        "container-post"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        if cx.containers.is_empty() {
            return Ok(());
        }
        let pad = cx.options.container_padding_left_right;

        let mut width = graph.graph(cx.graph).size.width;
        for &c in &cx.containers {
            if let Some(nested) = graph.nested_graph(c) {
                for &n in &graph.graph(nested).nodes {
                    width = width.max(graph.bounds(n).right());
                }
            }
        }

        for &c in &cx.containers {
            match graph.node(c).parent {
                Some(parent) => {
                    graph.node_mut(parent).size.width = width + 3.0 * pad;
                    graph.node_mut(c).size.width = width + 2.0 * pad;
                }
                None => graph.node_mut(c).size.width = width + 3.0 * pad,
            }
        }

        let shift = Point::new(2.0 * pad, 0.0);
        let mut moved: HashSet<EdgeId> = HashSet::default();
        for &c in &cx.containers {
            let Some(nested) = graph.nested_graph(c) else {
                continue;
            };
            for n in graph.graph(nested).nodes.clone() {
                graph.node_mut(n).position += shift;
                for e in graph.outgoing_edges(n) {
                    if !moved.insert(e) {
                        continue;
                    }
                    let edge = graph.edge_mut(e);
                    for p in &mut edge.bendpoints {
                        *p += shift;
                    }
                    for label in &mut edge.labels {
                        label.position += shift;
                    }
                }
            }
        }
        Ok(())
    }
}
