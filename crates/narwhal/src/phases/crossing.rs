//! Layer-sweep crossing minimization.
//!
//! Alternating forward and backward sweeps reorder each layer by the barycenter of its
//! neighbors in the layer just fixed. Explicit [`narwhal_graph::InLayerConstraint`] groups
//! always win over barycenters, and nodes listed in another node's `in_layer_successors` are
//! glued directly behind it. The order with the fewest crossings seen is kept.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{flow_predecessors, flow_successors};
use narwhal_graph::{LayoutGraph, NodeId};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::cmp::Ordering;

pub struct LayerSweepCrossingMinimizer;

#[derive(Clone, Copy)]
enum Sweep {
    Forward,
    Backward,
}

impl Processor for LayerSweepCrossingMinimizer {
    fn name(&self) -> &'static str {
        "layer-sweep-crossing-minimizer"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let layers = graph.graph(cx.graph).layers.clone();
        if layers.is_empty() {
            return Ok(());
        }
        let mut order: Vec<Vec<NodeId>> = layers
            .iter()
            .map(|&l| graph.layer(l).nodes.clone())
            .collect();
        for nodes in &mut order {
            let keep: HashMap<NodeId, f64> = nodes
                .iter()
                .enumerate()
                .map(|(i, &n)| (n, i as f64))
                .collect();
            arrange(graph, nodes, &keep);
        }

        let mut best = order.clone();
        let mut best_crossings = cross_count(graph, &order);
        for sweep in 0..cx.options.crossing_sweeps {
            if best_crossings == 0 {
                break;
            }
            let direction = if sweep % 2 == 0 {
                Sweep::Forward
            } else {
                Sweep::Backward
            };
            sweep_layers(graph, &mut order, direction);
            let crossings = cross_count(graph, &order);
            tracing::trace!(sweep, crossings, "crossing sweep");
            if crossings < best_crossings {
                best_crossings = crossings;
                best = order.clone();
            }
        }

        for (&layer, nodes) in layers.iter().zip(best) {
            graph.layer_mut(layer).nodes = nodes;
        }
        Ok(())
    }
}

fn sweep_layers(graph: &LayoutGraph, order: &mut [Vec<NodeId>], direction: Sweep) {
    let count = order.len();
    let steps: Vec<(usize, usize)> = match direction {
        Sweep::Forward => (1..count).map(|i| (i, i - 1)).collect(),
        Sweep::Backward => (0..count.saturating_sub(1)).rev().map(|i| (i, i + 1)).collect(),
    };
    for (free, fixed) in steps {
        let reference: HashMap<NodeId, f64> = order[fixed]
            .iter()
            .enumerate()
            .map(|(i, &n)| (n, i as f64))
            .collect();
        let keys: HashMap<NodeId, f64> = order[free]
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let neighbors = match direction {
                    Sweep::Forward => flow_predecessors(graph, n),
                    Sweep::Backward => flow_successors(graph, n),
                };
                let positions: Vec<f64> = neighbors
                    .iter()
                    .filter_map(|m| reference.get(m).copied())
                    .collect();
                let key = if positions.is_empty() {
                    i as f64
                } else {
                    positions.iter().sum::<f64>() / positions.len() as f64
                };
                (n, key)
            })
            .collect();
        arrange(graph, &mut order[free], &keys);
    }
}

/// Sorts a layer by constraint group, then `keys`, then current index, and re-glues
/// in-layer successors behind their anchors.
fn arrange(graph: &LayoutGraph, nodes: &mut Vec<NodeId>, keys: &HashMap<NodeId, f64>) {
    let present: HashSet<NodeId> = nodes.iter().copied().collect();
    let glued: HashSet<NodeId> = nodes
        .iter()
        .flat_map(|&n| graph.node(n).in_layer_successors.iter().copied())
        .filter(|m| present.contains(m))
        .collect();

    let mut free: Vec<(usize, NodeId)> = nodes
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, n)| !glued.contains(n))
        .collect();
    free.sort_by(|&(ia, a), &(ib, b)| {
        let group = |n: NodeId| graph.node(n).in_layer_constraint;
        group(a)
            .cmp(&group(b))
            .then_with(|| {
                let ka = keys.get(&a).copied().unwrap_or(ia as f64);
                let kb = keys.get(&b).copied().unwrap_or(ib as f64);
                ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
            })
            .then(ia.cmp(&ib))
    });

    let mut out: Vec<NodeId> = Vec::with_capacity(nodes.len());
    let mut placed: HashSet<NodeId> = HashSet::default();
    for (_, anchor) in free {
        let mut stack = vec![anchor];
        while let Some(n) = stack.pop() {
            if !placed.insert(n) {
                continue;
            }
            out.push(n);
            for &s in graph.node(n).in_layer_successors.iter().rev() {
                if glued.contains(&s) {
                    stack.push(s);
                }
            }
        }
    }
    // glued nodes whose anchor is not in this layer keep their relative order at the end
    for &n in nodes.iter() {
        if placed.insert(n) {
            out.push(n);
        }
    }
    *nodes = out;
}

/// Total number of crossings between consecutive layers.
pub fn cross_count(graph: &LayoutGraph, order: &[Vec<NodeId>]) -> usize {
    order
        .windows(2)
        .map(|w| two_layer_cross_count(graph, &w[0], &w[1]))
        .sum()
}

/// Counts crossings of edges between two adjacent layers with an accumulator tree over the
/// positions in `south`.
fn two_layer_cross_count(graph: &LayoutGraph, north: &[NodeId], south: &[NodeId]) -> usize {
    if south.is_empty() {
        return 0;
    }
    let south_pos: HashMap<NodeId, usize> =
        south.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut entries: Vec<usize> = Vec::new();
    for &v in north {
        let mut positions: Vec<usize> = flow_successors(graph, v)
            .into_iter()
            .filter_map(|w| south_pos.get(&w).copied())
            .collect();
        positions.sort_unstable();
        entries.extend(positions);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0usize; tree_size];

    let mut crossings = 0;
    for pos in entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        crossings += weight_sum;
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use narwhal_graph::{EdgeKind, ElementType, InLayerConstraint, Size};

    #[test]
    fn counts_a_single_crossing() {
        let mut g = LayoutGraph::new();
        let root = g.root();
        let a = g.add_node(root, "a", ElementType::Undefined, Size::new(10.0, 10.0));
        let b = g.add_node(root, "b", ElementType::Undefined, Size::new(10.0, 10.0));
        let c = g.add_node(root, "c", ElementType::Undefined, Size::new(10.0, 10.0));
        let d = g.add_node(root, "d", ElementType::Undefined, Size::new(10.0, 10.0));
        g.connect(a, d, EdgeKind::SequenceFlow);
        g.connect(b, c, EdgeKind::SequenceFlow);
        assert_eq!(cross_count(&g, &[vec![a, b], vec![c, d]]), 1);
        assert_eq!(cross_count(&g, &[vec![a, b], vec![d, c]]), 0);
    }

    #[test]
    fn constraint_groups_override_barycenters() {
        let mut g = LayoutGraph::new();
        let root = g.root();
        let a = g.add_node(root, "a", ElementType::Undefined, Size::ZERO);
        let b = g.add_node(root, "b", ElementType::Undefined, Size::ZERO);
        g.node_mut(b).in_layer_constraint = InLayerConstraint::Top;
        let mut nodes = vec![a, b];
        let keys: HashMap<NodeId, f64> = [(a, 0.0), (b, 5.0)].into_iter().collect();
        arrange(&g, &mut nodes, &keys);
        assert_eq!(nodes, vec![b, a]);
    }

    #[test]
    fn glued_successor_follows_its_anchor() {
        let mut g = LayoutGraph::new();
        let root = g.root();
        let host = g.add_node(root, "host", ElementType::Undefined, Size::ZERO);
        let other = g.add_node(root, "other", ElementType::Undefined, Size::ZERO);
        let event = g.add_node(root, "event", ElementType::Event, Size::ZERO);
        g.node_mut(host).in_layer_successors.push(event);
        let mut nodes = vec![event, host, other];
        let keys: HashMap<NodeId, f64> =
            [(event, 0.0), (host, 2.0), (other, 1.0)].into_iter().collect();
        arrange(&g, &mut nodes, &keys);
        assert_eq!(nodes, vec![other, host, event]);
    }
}
