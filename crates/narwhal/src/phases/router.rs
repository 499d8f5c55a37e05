//! Orthogonal edge routing between consecutive layers.
//!
//! Layers are laid out left to right, each as wide as its widest node. Edges leaving the same
//! port (or entering the same port) form a hyper-edge that shares one vertical routing slot in
//! the gap after the layer. Slots are assigned by interval colouring of the hyper-edges'
//! vertical spans, and the gap grows with the number of slots it needs.

use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{EPSILON, approx_eq};
use narwhal_graph::{EdgeId, EdgeKind, LayerId, LayoutGraph, NodeId, Point, PortId};
use rustc_hash::FxHashMap as HashMap;

pub struct OrthogonalRouter;

impl Processor for OrthogonalRouter {
    fn name(&self) -> &'static str {
        "orthogonal-router"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let layers = graph.graph(cx.graph).layers.clone();
        let spacing = cx.options.spacing;
        let edge_spacing = cx.options.edge_spacing();

        let mut x = 0.0;
        for (i, &layer) in layers.iter().enumerate() {
            let width = graph.layer(layer).size.width;
            for n in graph.layer(layer).nodes.clone() {
                let node = graph.node_mut(n);
                node.position.x = x + (width - node.size.width) / 2.0;
            }
            x += width;
            let Some(&next) = layers.get(i + 1) else {
                continue;
            };

            let edges = edges_between(graph, &graph.layer(layer).nodes, next);
            if edges.is_empty() {
                x += spacing;
                continue;
            }
            let groups = hyper_edges(graph, &edges);
            let spans: Vec<Option<(f64, f64)>> =
                groups.iter().map(|g| vertical_span(graph, g)).collect();
            let (slots, slot_count) = assign_slots(&spans);
            let gap = if slot_count == 0 {
                spacing
            } else {
                spacing.max((slot_count + 1) as f64 * edge_spacing)
            };
            for (group, slot) in groups.iter().zip(slots) {
                let slot_x = slot.map(|k| x + gap * (k + 1) as f64 / (slot_count + 1) as f64);
                for &e in group {
                    let sy = graph.port_point(graph.edge(e).source()).y;
                    let ty = graph.port_point(graph.edge(e).target()).y;
                    let bendpoints = match slot_x {
                        Some(sx) if !approx_eq(sy, ty) => {
                            vec![Point::new(sx, sy), Point::new(sx, ty)]
                        }
                        _ => Vec::new(),
                    };
                    graph.edge_mut(e).bendpoints = bendpoints;
                }
            }
            x += gap;
        }
        graph.graph_mut(cx.graph).size.width = x;
        Ok(())
    }
}

/// Edges from `nodes` into `next`, excluding message flows which get their own route.
fn edges_between(graph: &LayoutGraph, nodes: &[NodeId], next: LayerId) -> Vec<EdgeId> {
    nodes
        .iter()
        .flat_map(|&n| graph.outgoing_edges(n))
        .filter(|&e| {
            graph.edge(e).kind != EdgeKind::MessageFlow
                && graph.node(graph.target_node(e)).layer == Some(next)
        })
        .collect()
}

fn hyper_edges(graph: &LayoutGraph, edges: &[EdgeId]) -> Vec<Vec<EdgeId>> {
    let mut parent: Vec<usize> = (0..edges.len()).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    let mut by_port: HashMap<PortId, usize> = HashMap::default();
    for (i, &e) in edges.iter().enumerate() {
        for p in [graph.edge(e).source(), graph.edge(e).target()] {
            match by_port.get(&p) {
                Some(&j) => {
                    let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                    if a != b {
                        parent[a.max(b)] = a.min(b);
                    }
                }
                None => {
                    by_port.insert(p, i);
                }
            }
        }
    }
    let mut groups: Vec<Vec<EdgeId>> = Vec::new();
    let mut slot_of_root: HashMap<usize, usize> = HashMap::default();
    for (i, &e) in edges.iter().enumerate() {
        let root = find(&mut parent, i);
        let ix = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[ix].push(e);
    }
    groups
}

/// Vertical extent a hyper-edge must cover, `None` when all its ends are level.
fn vertical_span(graph: &LayoutGraph, group: &[EdgeId]) -> Option<(f64, f64)> {
    let ys: Vec<f64> = group
        .iter()
        .flat_map(|&e| {
            let edge = graph.edge(e);
            [graph.port_point(edge.source()).y, graph.port_point(edge.target()).y]
        })
        .collect();
    let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (max - min > EPSILON).then_some((min, max))
}

/// Greedy interval colouring; returns the slot of every span and the number of slots used.
fn assign_slots(spans: &[Option<(f64, f64)>]) -> (Vec<Option<usize>>, usize) {
    let mut order: Vec<usize> = (0..spans.len()).filter(|&i| spans[i].is_some()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (spans[a].unwrap_or_default(), spans[b].unwrap_or_default());
        sa.0.total_cmp(&sb.0).then(sa.1.total_cmp(&sb.1))
    });
    let mut slot_end: Vec<f64> = Vec::new();
    let mut slots = vec![None; spans.len()];
    for i in order {
        let Some((min, max)) = spans[i] else {
            continue;
        };
        let free = slot_end.iter().position(|&end| end + EPSILON < min);
        let k = match free {
            Some(k) => {
                slot_end[k] = max;
                k
            }
            None => {
                slot_end.push(max);
                slot_end.len() - 1
            }
        };
        slots[i] = Some(k);
    }
    (slots, slot_end.len())
}

#[cfg(test)]
mod tests {
    use super::assign_slots;

    #[test]
    fn overlapping_spans_get_distinct_slots() {
        let spans = [
            Some((0.0, 10.0)),
            None,
            Some((5.0, 20.0)),
            Some((30.0, 40.0)),
        ];
        let (slots, count) = assign_slots(&spans);
        assert_eq!(count, 2);
        assert_eq!(slots, vec![Some(0), None, Some(1), Some(0)]);
    }
}
