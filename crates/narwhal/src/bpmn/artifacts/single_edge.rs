//! Artifacts hanging off a single neighbour.

use super::Artifact;
use super::placement::{Candidate, Placer, in_container};
use narwhal_graph::{EdgeId, LayoutGraph, Point};

/// Above and below the neighbour first, scored only by whether the artifact stays in its
/// container. Beside the neighbour (east for edges into the artifact, west for edges out of
/// it, both for undirected ones) only when neither of those is free of penalty. A position is
/// dropped when it overlaps a node of the layer it falls into.
pub(super) fn candidates(
    placer: &Placer,
    graph: &mut LayoutGraph,
    artifact: &mut Artifact,
    e: EdgeId,
) -> Vec<Candidate> {
    let n = artifact.node;
    let opposite = graph.opposite(e, n);
    let Some(layer) = graph.node_layer_index(opposite) else {
        return Vec::new();
    };
    artifact.container = artifact.containers.first().map(|&(c, _)| c);

    let size = graph.node(n).size;
    let o = graph.bounds(opposite);
    let gap = placer.spacing / 2.0;
    let x = o.center().x - size.width / 2.0;

    let mut out = Vec::new();
    let mut best_vertical: Option<u32> = None;
    for y in [o.y - size.height - gap, o.bottom() + gap] {
        if placer.collides_in_layer(graph, n, layer, y, size.height) {
            continue;
        }
        let position = Point::new(x, y);
        graph.node_mut(n).position = position;
        let penalty = u32::from(!in_container(graph, artifact));
        best_vertical = Some(best_vertical.map_or(penalty, |b| b.min(penalty)));
        out.push(Candidate {
            position,
            score: f64::from(penalty),
        });
    }
    if best_vertical == Some(0) {
        return out;
    }

    let y = o.center().y - size.height / 2.0;
    let undirected = graph.edge(e).kind.is_undirected();
    let artifact_is_source = graph.source_node(e) == n;
    if undirected || !artifact_is_source {
        let east = Point::new(o.right() + gap, y);
        if !placer.collides_in_layer(graph, n, layer + 1, y, size.height) {
            out.push(Candidate {
                position: east,
                score: 0.0,
            });
        }
    }
    if undirected || artifact_is_source {
        let west = Point::new(o.x - size.width - gap, y);
        // never left of the drawing
        let free = match layer.checked_sub(1) {
            Some(before) => !placer.collides_in_layer(graph, n, before, y, size.height),
            None => west.x >= 0.0,
        };
        if free {
            out.push(Candidate {
                position: west,
                score: 0.0,
            });
        }
    }
    out
}
