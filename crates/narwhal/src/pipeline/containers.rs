//! Layout of diagrams with pools and lanes.
//!
//! Layering is global so sequence flows between lanes still run left to right. Ordering and
//! vertical placement happen per container on its share of the layers, after which the
//! containers are stacked top to bottom and the shares are merged back for routing.

use super::{PART_ONE, PART_THREE, PART_TWO};
use crate::bpmn::ArtifactIntermediateProcessor;
use crate::context::LayoutContext;
use crate::error::Result;
use crate::local_graph;
use crate::options::LayoutOptions;
use crate::processor::{LayoutStatus, Processor, run_processors};
use crate::util::remove_empty_layers;
use indexmap::{IndexMap, IndexSet};
use narwhal_graph::{GraphId, LayerId, LayoutGraph, NodeId, Point, Size};
use rustc_hash::FxHashSet;

pub(super) fn layout(graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<LayoutStatus> {
    let root = cx.graph;
    let flow_nodes: FxHashSet<NodeId> = graph.graph(root).layerless.iter().copied().collect();

    tracing::debug!(part = 1, containers = cx.containers.len(), "global layering");
    if run_processors(PART_ONE, graph, cx)? == LayoutStatus::Cancelled {
        return Ok(LayoutStatus::Cancelled);
    }
    adopt_dummies(graph, root, &flow_nodes);

    // every layer with its full node list, and the nodes already placed per layer
    let saved: IndexMap<LayerId, Vec<NodeId>> = graph
        .graph(root)
        .layers
        .iter()
        .map(|&l| (l, graph.layer(l).nodes.clone()))
        .collect();
    let mut placed: IndexMap<LayerId, IndexSet<NodeId>> =
        saved.keys().map(|&l| (l, IndexSet::new())).collect();
    let mut crossing = Vec::new();
    let mut stacking = Stacking::default();

    for c in cx.containers.clone() {
        if cx.cancel.is_cancelled() {
            tracing::debug!("layout cancelled between containers");
            return Ok(LayoutStatus::Cancelled);
        }
        tracing::debug!(container = %graph.node(c).id, part = 2, "container layout");
        crossing.extend(local_graph::extract(graph, root, c));
        remove_empty_layers(graph, root);
        cx.scope = Some(c);
        if run_processors(PART_TWO, graph, cx)? == LayoutStatus::Cancelled {
            return Ok(LayoutStatus::Cancelled);
        }

        let content = normalize(graph, root, cx.options.container_padding_top_bottom);
        stacking.place(graph, c, content, cx.options);

        for &l in &graph.graph(root).layers {
            if let Some(done) = placed.get_mut(&l) {
                done.extend(graph.layer(l).nodes.iter().copied());
            }
        }
        merge(graph, root, &saved, &placed);
    }

    cx.scope = None;
    // shortcuts starting outside every container
    ArtifactIntermediateProcessor.process(graph, cx)?;
    local_graph::restore(graph, &crossing);
    remove_empty_layers(graph, root);
    graph.graph_mut(root).layerless.clear();

    tracing::debug!(part = 3, "global routing");
    if run_processors(PART_THREE, graph, cx)? == LayoutStatus::Cancelled {
        return Ok(LayoutStatus::Cancelled);
    }
    let width = graph.graph(root).size.width + cx.options.graph_width_margin;
    // artifacts may have grown a container and pushed the ones below it down
    let height = graph
        .graph(root)
        .nodes
        .iter()
        .filter(|&&n| graph.node(n).is_container())
        .map(|&n| graph.bounds(n).bottom())
        .fold(stacking.pool_y, f64::max);
    graph.graph_mut(root).size = Size::new(width, height);
    Ok(LayoutStatus::Completed)
}

/// Gives the long-edge dummies from layering the container of the nearest real predecessor.
fn adopt_dummies(graph: &mut LayoutGraph, g: GraphId, flow_nodes: &FxHashSet<NodeId>) {
    for n in graph.layered_nodes(g) {
        if flow_nodes.contains(&n) || graph.node(n).parent.is_some() {
            continue;
        }
        let mut current = n;
        let mut parent = None;
        let mut budget = graph.node_count();
        while parent.is_none() && budget > 0 {
            budget -= 1;
            let Some(&e) = graph.incoming_edges(current).first() else {
                break;
            };
            current = graph.source_node(e);
            parent = graph.node(current).parent;
        }
        graph.node_mut(n).parent = parent;
    }
}

/// Moves the local layers to the top of the container's content area and returns the content
/// height.
fn normalize(graph: &mut LayoutGraph, g: GraphId, pad_top_bottom: f64) -> f64 {
    let nodes = graph.layered_nodes(g);
    let Some(top) = nodes
        .iter()
        .map(|&n| graph.node(n).position.y)
        .min_by(f64::total_cmp)
    else {
        return 0.0;
    };
    let mut content: f64 = 0.0;
    for &n in &nodes {
        let node = graph.node_mut(n);
        node.position.y += pad_top_bottom - top;
        content = content.max(node.position.y + node.size.height - pad_top_bottom);
    }
    content
}

/// Restores the full layers: nodes placed so far first, then everyone else in layering order.
fn merge(
    graph: &mut LayoutGraph,
    g: GraphId,
    saved: &IndexMap<LayerId, Vec<NodeId>>,
    placed: &IndexMap<LayerId, IndexSet<NodeId>>,
) {
    graph.graph_mut(g).layers = saved.keys().copied().collect();
    for (&l, all) in saved {
        let mut nodes: IndexSet<NodeId> = placed.get(&l).cloned().unwrap_or_default();
        // shortcut dummies dropped in part 2 no longer belong to any layer
        nodes.extend(all.iter().copied().filter(|&n| graph.node(n).layer == Some(l)));
        graph.layer_mut(l).nodes = nodes.into_iter().collect();
    }
}

/// Running position of the containers stacked so far.
#[derive(Debug, Default)]
struct Stacking {
    pool: Option<NodeId>,
    /// Top of the next lane, relative to its pool.
    lane_y: f64,
    pool_height: f64,
    /// Top of the next pool; the diagram height once all containers are stacked, before any
    /// artifact grows them.
    pool_y: f64,
}

impl Stacking {
    /// Sizes container `c` around `content` and stacks it below the previous one.
    fn place(&mut self, graph: &mut LayoutGraph, c: NodeId, content: f64, options: &LayoutOptions) {
        let parent = graph.node(c).parent;
        let pool = parent.unwrap_or(c);
        let height = content + 2.0 * options.container_padding_top_bottom;

        if self.pool != Some(pool) {
            if self.pool.is_some() {
                self.pool_y += options.container_spacing;
            }
            graph.node_mut(pool).position = Point::new(0.0, self.pool_y);
            self.pool = Some(pool);
            self.lane_y = 0.0;
            self.pool_height = 0.0;
        }

        let node = graph.node_mut(c);
        node.size.height = height;
        if let Some(p) = parent {
            node.position = Point::new(options.container_padding_left_right, self.lane_y);
            self.lane_y += height;
            self.pool_height += height;
            graph.node_mut(p).size.height = self.pool_height;
        }
        self.pool_y += height;
        tracing::trace!(
            container = %graph.node(c).id,
            y = graph.node(c).position.y,
            height,
            "container stacked"
        );
    }
}
