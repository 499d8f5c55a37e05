//! Small numeric and layer helpers shared by the phases.

use narwhal_graph::{EdgeId, EdgeKind, GraphId, LayoutGraph, NodeId, Point};

/// Coordinates closer than this are treated as equal.
pub const EPSILON: f64 = 1e-6;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Drops layers that lost all their nodes.
pub fn remove_empty_layers(graph: &mut LayoutGraph, g: GraphId) {
    let layers = graph.graph(g).layers.clone();
    let kept: Vec<_> = layers
        .into_iter()
        .filter(|&l| !graph.layer(l).nodes.is_empty())
        .collect();
    graph.graph_mut(g).layers = kept;
}

/// Targets of `n`'s outgoing edges that take part in placement. Message flows are routed on
/// their own and self-loops carry no ordering information.
pub fn flow_successors(graph: &LayoutGraph, n: NodeId) -> Vec<NodeId> {
    graph
        .outgoing_edges(n)
        .into_iter()
        .filter(|&e| graph.edge(e).kind != EdgeKind::MessageFlow)
        .map(|e| graph.target_node(e))
        .filter(|&m| m != n)
        .collect()
}

pub fn flow_predecessors(graph: &LayoutGraph, n: NodeId) -> Vec<NodeId> {
    graph
        .incoming_edges(n)
        .into_iter()
        .filter(|&e| graph.edge(e).kind != EdgeKind::MessageFlow)
        .map(|e| graph.source_node(e))
        .filter(|&m| m != n)
        .collect()
}

/// Route of an edge as a polyline: source anchor, bendpoints, target anchor.
pub fn edge_path(graph: &LayoutGraph, e: EdgeId) -> Vec<Point> {
    let edge = graph.edge(e);
    let mut points = Vec::with_capacity(edge.bendpoints.len() + 2);
    points.push(graph.port_point(edge.source()));
    points.extend(edge.bendpoints.iter().copied());
    points.push(graph.port_point(edge.target()));
    points
}

/// Sum of the segment lengths of a polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
        .sum()
}

/// `true` when `p` lies on the straight orthogonal line through `a` and `b`.
pub fn is_collinear(a: Point, p: Point, b: Point) -> bool {
    (approx_eq(a.x, p.x) && approx_eq(p.x, b.x)) || (approx_eq(a.y, p.y) && approx_eq(p.y, b.y))
}

/// Least-squares fit of a non-decreasing sequence to `targets` (pool adjacent violators).
pub fn isotonic_fit(targets: &[f64], weights: &[f64]) -> Vec<f64> {
    // blocks of (mean, weight, len)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(targets.len());
    for (&t, &w) in targets.iter().zip(weights) {
        let w = w.max(EPSILON);
        blocks.push((t, w, 1));
        while blocks.len() > 1 {
            let (m2, w2, n2) = blocks[blocks.len() - 1];
            let (m1, w1, n1) = blocks[blocks.len() - 2];
            if m1 <= m2 {
                break;
            }
            blocks.pop();
            let merged_w = w1 + w2;
            let last = blocks.len() - 1;
            blocks[last] = ((m1 * w1 + m2 * w2) / merged_w, merged_w, n1 + n2);
        }
    }
    blocks
        .into_iter()
        .flat_map(|(m, _, n)| std::iter::repeat_n(m, n))
        .collect()
}
