//! Vertical node placement.
//!
//! Each layer is a column; only y is decided here. Starting from a compact stack, nodes are
//! repeatedly pulled toward the mean center of their neighbors in the previous (or next) layer.
//! The pull is a weighted least-squares fit under the separation constraints of the column,
//! which reduces to isotonic regression once the cumulative offsets are subtracted.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{flow_predecessors, flow_successors, isotonic_fit};
use narwhal_graph::{LayoutGraph, NodeId};
use rustc_hash::FxHashMap as HashMap;

pub struct NodePlacer;

impl Processor for NodePlacer {
    fn name(&self) -> &'static str {
        "node-placer"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let layers: Vec<Vec<NodeId>> = graph
            .graph(cx.graph)
            .layers
            .iter()
            .map(|&l| graph.layer(l).nodes.clone())
            .filter(|nodes| !nodes.is_empty())
            .collect();
        if layers.is_empty() {
            return Ok(());
        }
        let spacing = cx.options.spacing;
        let edge_spacing = cx.options.edge_spacing();

        let offsets: Vec<Vec<f64>> = layers
            .iter()
            .map(|nodes| column_offsets(graph, nodes, spacing, edge_spacing))
            .collect();
        let mut top: HashMap<NodeId, f64> = HashMap::default();
        let mut column: HashMap<NodeId, usize> = HashMap::default();
        for (i, (nodes, offs)) in layers.iter().zip(&offsets).enumerate() {
            for (&n, &c) in nodes.iter().zip(offs) {
                top.insert(n, c);
                column.insert(n, i);
            }
        }

        for iteration in 0..cx.options.placement_iterations {
            let forward = iteration % 2 == 0;
            let order: Vec<usize> = if forward {
                (1..layers.len()).collect()
            } else {
                (0..layers.len().saturating_sub(1)).rev().collect()
            };
            for i in order {
                let reference = if forward { i - 1 } else { i + 1 };
                let nodes = &layers[i];
                let mut targets = Vec::with_capacity(nodes.len());
                let mut weights = Vec::with_capacity(nodes.len());
                for (&n, &c) in nodes.iter().zip(&offsets[i]) {
                    let h = graph.node(n).size.height;
                    let neighbors = if forward {
                        flow_predecessors(graph, n)
                    } else {
                        flow_successors(graph, n)
                    };
                    let centers: Vec<f64> = neighbors
                        .iter()
                        .filter(|m| column.get(*m) == Some(&reference))
                        .filter_map(|&m| {
                            top.get(&m).map(|y| y + graph.node(m).size.height / 2.0)
                        })
                        .collect();
                    let current = top.get(&n).copied().unwrap_or(c);
                    let desired = if centers.is_empty() {
                        current
                    } else {
                        centers.iter().sum::<f64>() / centers.len() as f64 - h / 2.0
                    };
                    targets.push(desired - c);
                    weights.push(centers.len().max(1) as f64);
                }
                let fitted = isotonic_fit(&targets, &weights);
                for ((&n, &c), z) in nodes.iter().zip(&offsets[i]).zip(fitted) {
                    top.insert(n, z + c);
                }
            }
        }

        let min = top.values().copied().fold(f64::INFINITY, f64::min);
        let shift = if min.is_finite() { min } else { 0.0 };
        for (n, y) in top {
            graph.node_mut(n).position.y = y - shift;
        }
        Ok(())
    }
}

/// Top offset of every node of a column when stacked as tightly as allowed.
fn column_offsets(
    graph: &LayoutGraph,
    nodes: &[NodeId],
    spacing: f64,
    edge_spacing: f64,
) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(nodes.len());
    let mut y = 0.0;
    for (k, &n) in nodes.iter().enumerate() {
        if k > 0 {
            y += gap(graph, nodes[k - 1], n, spacing, edge_spacing);
        }
        offsets.push(y);
        y += graph.node(n).size.height;
    }
    offsets
}

fn gap(graph: &LayoutGraph, a: NodeId, b: NodeId, spacing: f64, edge_spacing: f64) -> f64 {
    let tight = |n: NodeId| {
        let node = graph.node(n);
        node.kind.is_dummy() || node.size.height <= 0.0
    };
    if tight(a) || tight(b) {
        edge_spacing
    } else {
        spacing
    }
}
