//! Longest-path layer assignment.
//!
//! Every node is placed one layer after its deepest predecessor. Pure sources are then pulled
//! forward next to their nearest successor, so a start event of a short branch does not sit at
//! the far left of a long process.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::remove_empty_layers;
use narwhal_graph::{LayoutGraph, NodeId};
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

pub struct LongestPathLayerer;

impl Processor for LongestPathLayerer {
    fn name(&self) -> &'static str {
        "longest-path-layerer"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let g = cx.graph;
        let nodes = std::mem::take(&mut graph.graph_mut(g).layerless);
        if nodes.is_empty() {
            return Ok(());
        }
        let ranks = longest_path_ranks(graph, &nodes);
        let layer_count = ranks.iter().copied().max().unwrap_or(0) + 1;
        let layers: Vec<_> = (0..layer_count).map(|_| graph.add_layer(g)).collect();
        for (&n, &rank) in nodes.iter().zip(&ranks) {
            let layer = layers[rank];
            let end = graph.layer(layer).nodes.len();
            graph.insert_into_layer(n, layer, end);
        }
        remove_empty_layers(graph, g);
        Ok(())
    }
}

/// Rank of every node of `nodes`, normalized so the smallest is 0.
pub fn longest_path_ranks(graph: &LayoutGraph, nodes: &[NodeId]) -> Vec<usize> {
    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let n = nodes.len();
    let mut outs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_deg = vec![0usize; n];
    for (u, &node) in nodes.iter().enumerate() {
        for e in graph.outgoing_edges(node) {
            let Some(&v) = index.get(&graph.target_node(e)) else {
                continue;
            };
            if u != v {
                outs[u].push(v);
                in_deg[v] += 1;
            }
        }
    }

    let sources: Vec<bool> = in_deg.iter().map(|&d| d == 0).collect();
    let mut rank = vec![0i64; n];
    let mut pending = in_deg.clone();
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| pending[v] == 0).collect();
    let mut topo: Vec<usize> = Vec::with_capacity(n);
    while let Some(u) = queue.pop_front() {
        topo.push(u);
        for &v in &outs[u] {
            rank[v] = rank[v].max(rank[u] + 1);
            pending[v] -= 1;
            if pending[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    // pull sources towards their successors, latest first so chains of sources follow
    for &u in topo.iter().rev() {
        if !sources[u] || outs[u].is_empty() {
            continue;
        }
        if let Some(min_succ) = outs[u].iter().map(|&v| rank[v]).min() {
            rank[u] = rank[u].max(min_succ - 1);
        }
    }

    let min = rank.iter().copied().min().unwrap_or(0);
    rank.into_iter().map(|r| (r - min) as usize).collect()
}
