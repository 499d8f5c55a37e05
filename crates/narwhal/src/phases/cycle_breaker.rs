//! Cycle breaking by reversing a greedy feedback arc set.
//!
//! Eades-Lin-Smyth ordering: sinks are peeled to the right end, sources to the left end, and
//! when neither exists the node with the largest out-minus-in degree goes left. Edges that point
//! leftwards in the resulting order form the feedback set.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use narwhal_graph::{EdgeId, LayoutGraph, NodeId};
use rustc_hash::FxHashMap as HashMap;

pub struct GreedyCycleBreaker;

impl Processor for GreedyCycleBreaker {
    fn name(&self) -> &'static str {
        "greedy-cycle-breaker"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let nodes = graph.graph(cx.graph).layerless.clone();
        for e in greedy_fas(graph, &nodes) {
            graph.reverse_edge(e);
        }
        Ok(())
    }
}

/// Edges among `nodes` whose reversal makes the induced graph acyclic.
///
/// Self-loops are never part of the result, reversing them would not help.
pub fn greedy_fas(graph: &LayoutGraph, nodes: &[NodeId]) -> Vec<EdgeId> {
    if nodes.len() <= 1 {
        return Vec::new();
    }
    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut edges: Vec<(usize, usize, EdgeId)> = Vec::new();
    for (u, &n) in nodes.iter().enumerate() {
        for e in graph.outgoing_edges(n) {
            let Some(&v) = index.get(&graph.target_node(e)) else {
                continue;
            };
            if u != v {
                edges.push((u, v, e));
            }
        }
    }

    let n = nodes.len();
    let mut outs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ins: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(u, v, _) in &edges {
        outs[u].push(v);
        ins[v].push(u);
    }
    let mut out_deg: Vec<i64> = outs.iter().map(|o| o.len() as i64).collect();
    let mut in_deg: Vec<i64> = ins.iter().map(|i| i.len() as i64).collect();
    let mut alive = vec![true; n];
    let mut remaining = n;

    let mut left: Vec<usize> = Vec::with_capacity(n);
    let mut right: Vec<usize> = Vec::new();

    let remove = |v: usize, alive: &mut Vec<bool>, out_deg: &mut Vec<i64>, in_deg: &mut Vec<i64>| {
        alive[v] = false;
        for &w in &outs[v] {
            if alive[w] {
                in_deg[w] -= 1;
            }
        }
        for &u in &ins[v] {
            if alive[u] {
                out_deg[u] -= 1;
            }
        }
    };

    while remaining > 0 {
        let mut changed = true;
        while changed {
            changed = false;
            for v in 0..n {
                if alive[v] && out_deg[v] == 0 {
                    remove(v, &mut alive, &mut out_deg, &mut in_deg);
                    remaining -= 1;
                    right.push(v);
                    changed = true;
                }
            }
            for v in 0..n {
                if alive[v] && in_deg[v] == 0 {
                    remove(v, &mut alive, &mut out_deg, &mut in_deg);
                    remaining -= 1;
                    left.push(v);
                    changed = true;
                }
            }
        }
        if remaining == 0 {
            break;
        }
        let Some(pick) = (0..n)
            .filter(|&v| alive[v])
            .max_by(|&a, &b| {
                (out_deg[a] - in_deg[a])
                    .cmp(&(out_deg[b] - in_deg[b]))
                    // earlier node wins ties
                    .then(b.cmp(&a))
            })
        else {
            break;
        };
        remove(pick, &mut alive, &mut out_deg, &mut in_deg);
        remaining -= 1;
        left.push(pick);
    }

    right.reverse();
    let mut rank = vec![0usize; n];
    for (i, v) in left.into_iter().chain(right).enumerate() {
        rank[v] = i;
    }
    edges
        .into_iter()
        .filter(|&(u, v, _)| rank[u] > rank[v])
        .map(|(_, _, e)| e)
        .collect()
}
