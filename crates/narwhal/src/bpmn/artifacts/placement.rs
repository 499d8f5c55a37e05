use super::{Artifact, Direction, single_edge};
use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use crate::util::{EPSILON, approx_eq, edge_path, path_length};
use narwhal_graph::{
    EdgeId, EdgeKind, GraphId, LayerId, LayoutGraph, NodeId, Point, PortId, PortSide, Rect,
};
use rustc_hash::FxHashSet as HashSet;

/// A tentative artifact position and what it costs.
#[derive(Debug, Clone, Copy)]
pub(super) struct Candidate {
    pub position: Point,
    pub score: f64,
}

/// Puts every artifact back into the finished drawing.
///
/// Each position tried is scored as total edge length times `1 + penalty`. Penalties are
/// charged for routes that cannot reach the neighbour with a single bend, for detours around a
/// blocking node, for segments shorter than half the spacing, for straight routes lying on top
/// of another edge, and for leaving the container. The cheapest position wins; a container the
/// artifact sticks out of grows, pushing down everything below it.
pub struct ArtifactPostProcessor;

impl Processor for ArtifactPostProcessor {
    fn name(&self) -> &'static str {
        "artifact-post"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        if cx.artifacts.is_empty() {
            return Ok(());
        }
        let mut artifacts = std::mem::take(&mut cx.artifacts);
        let placer = Placer::new(graph, cx);

        for artifact in &mut artifacts {
            for original in &artifact.original_edges {
                let e = original.edge;
                let (source, target) = (graph.edge(e).source(), graph.edge(e).target());
                graph.set_source(e, source);
                graph.set_target(e, target);
            }
            let mut containers: Vec<(NodeId, f64)> = Vec::new();
            for original in &artifact.original_edges {
                let Some(parent) = graph.node(original.opposite).parent else {
                    continue;
                };
                if placer.containers.contains(&parent) && !containers.iter().any(|c| c.0 == parent)
                {
                    containers.push((parent, graph.node(parent).position.y));
                }
            }
            containers.sort_by(|a, b| a.1.total_cmp(&b.1));
            artifact.containers = containers;
        }

        if !placer.containers.is_empty() {
            let lowest = |a: &Artifact| {
                a.original_edges
                    .iter()
                    .map(|o| graph.node(o.opposite).position.y)
                    .fold(f64::NEG_INFINITY, f64::max)
            };
            artifacts.sort_by(|a, b| lowest(a).total_cmp(&lowest(b)));
        }

        for artifact in &mut artifacts {
            placer.place(graph, artifact);
        }
        cx.artifacts = artifacts;
        Ok(())
    }
}

pub(super) struct Placer {
    pub spacing: f64,
    pad_top_bottom: f64,
    working: GraphId,
    layers: Vec<LayerId>,
    /// Right border of every non-empty layer, by layer index.
    layer_right: Vec<(usize, f64)>,
    containers: Vec<NodeId>,
}

impl Placer {
    fn new(graph: &LayoutGraph, cx: &LayoutContext<'_>) -> Self {
        let layers = graph.graph(cx.graph).layers.clone();
        let layer_right = layers
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| {
                graph
                    .layer(l)
                    .nodes
                    .iter()
                    .map(|&n| graph.bounds(n).right())
                    .reduce(f64::max)
                    .map(|right| (i, right))
            })
            .collect();
        Self {
            spacing: cx.options.spacing,
            pad_top_bottom: cx.options.container_padding_top_bottom,
            working: cx.graph,
            layers,
            layer_right,
            containers: cx.containers.clone(),
        }
    }

    fn place(&self, graph: &mut LayoutGraph, artifact: &mut Artifact) {
        let n = artifact.node;
        if artifact.original_edges.is_empty() {
            self.attach(graph, artifact);
            return;
        }

        let single = match artifact.original_edges.as_slice() {
            [only] => Some(only.edge),
            _ => None,
        };
        let candidates = match single {
            Some(e) => single_edge::candidates(self, graph, artifact, e),
            None => self.scan_layers(graph, artifact),
        };
        let position = candidates
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .map_or_else(|| self.fallback(graph, artifact), |c| c.position);

        graph.node_mut(n).position = position;
        self.evaluate(graph, artifact, 0);
        if self.grow_container(graph, artifact) {
            self.evaluate(graph, artifact, 0);
        }
        self.attach(graph, artifact);
        tracing::trace!(
            artifact = %graph.node(n).id,
            x = position.x,
            y = position.y,
            tried = candidates.len(),
            "artifact placed"
        );
    }

    /// Positions around the layers the neighbours live in: above the topmost node of each
    /// layer, in every gap large enough, and below the bottommost node.
    fn scan_layers(&self, graph: &mut LayoutGraph, artifact: &mut Artifact) -> Vec<Candidate> {
        let Some((first, last)) = self.layer_range(graph, artifact) else {
            return Vec::new();
        };
        let n = artifact.node;
        let size = graph.node(n).size;
        let (min_y, max_y) = artifact
            .original_edges
            .iter()
            .map(|o| graph.bounds(o.opposite).center().y)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });

        let mut out = Vec::new();
        for &layer in &self.layers[first..=last] {
            let mut nodes: Vec<Rect> = graph
                .layer(layer)
                .nodes
                .iter()
                .filter(|&&m| {
                    m != n
                        && graph
                            .node(m)
                            .parent
                            .is_none_or(|p| artifact.containers.iter().any(|c| c.0 == p))
                })
                .map(|&m| graph.bounds(m))
                .collect();
            nodes.sort_by(|a, b| a.y.total_cmp(&b.y));
            let (Some(&top), Some(&bottom)) = (nodes.first(), nodes.last()) else {
                continue;
            };
            let centered = |b: &Rect| b.center().x - size.width / 2.0;

            let (y, penalty) = if top.y < min_y {
                (top.y - size.height - self.spacing / 2.0, 1)
            } else {
                (min_y - size.height / 2.0, 0)
            };
            let position = Point::new(centered(&top), y);
            self.try_position(graph, artifact, position, penalty, &mut out);

            for pair in nodes.windows(2) {
                let (above, below) = (pair[0], pair[1]);
                let space = below.y - (above.bottom() + size.height);
                if space > 0.0 {
                    let position = Point::new(centered(&below), above.bottom() + self.spacing / 2.0);
                    let penalty = u32::from(space < 2.0 * self.spacing);
                    self.try_position(graph, artifact, position, penalty, &mut out);
                }
            }

            let (y, penalty) = if bottom.bottom() > max_y {
                (bottom.bottom() + self.spacing / 2.0, 1)
            } else {
                (max_y - size.height / 2.0, 0)
            };
            let position = Point::new(centered(&bottom), y);
            self.try_position(graph, artifact, position, penalty, &mut out);
        }
        out
    }

    fn try_position(
        &self,
        graph: &mut LayoutGraph,
        artifact: &mut Artifact,
        position: Point,
        penalty: u32,
        out: &mut Vec<Candidate>,
    ) {
        let rect = Rect::new(position, graph.node(artifact.node).size);
        if self.collides(graph, artifact.node, &rect) {
            return;
        }
        graph.node_mut(artifact.node).position = position;
        let score = self.evaluate(graph, artifact, penalty);
        out.push(Candidate { position, score });
    }

    /// Layer indices between the latest predecessor and the earliest successor, widened by one
    /// on each side. Undirected edges count both ways.
    fn layer_range(&self, graph: &LayoutGraph, artifact: &Artifact) -> Option<(usize, usize)> {
        let last_layer = self.layers.len().checked_sub(1)?;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for original in &artifact.original_edges {
            let Some(ix) = graph.node_layer_index(original.opposite) else {
                continue;
            };
            let undirected = graph.edge(original.edge).kind.is_undirected();
            if original.direction == Direction::Output || undirected {
                outputs.push(ix);
            }
            if original.direction == Direction::Input || undirected {
                inputs.push(ix);
            }
        }
        let (lo, hi) = match (inputs.iter().max(), outputs.iter().min()) {
            (Some(&i), None) => (i, i),
            (None, Some(&o)) => (o, o),
            (Some(&i), Some(&o)) => (i.min(o), i.max(o)),
            (None, None) => return None,
        };
        Some((lo.saturating_sub(1), (hi + 1).min(last_layer)))
    }

    /// Directly above the first neighbour, whatever is there.
    fn fallback(&self, graph: &LayoutGraph, artifact: &Artifact) -> Point {
        let size = graph.node(artifact.node).size;
        artifact.original_edges.first().map_or(Point::ZERO, |o| {
            let b = graph.bounds(o.opposite);
            Point::new(
                b.center().x - size.width / 2.0,
                b.y - size.height - self.spacing / 2.0,
            )
        })
    }

    fn collides(&self, graph: &LayoutGraph, n: NodeId, rect: &Rect) -> bool {
        graph
            .layered_nodes(self.working)
            .into_iter()
            .any(|m| m != n && graph.bounds(m).intersects(rect))
    }

    /// `true` when a node of the given layer overlaps the vertical span `top..top + height`.
    pub(super) fn collides_in_layer(
        &self,
        graph: &LayoutGraph,
        n: NodeId,
        layer: usize,
        top: f64,
        height: f64,
    ) -> bool {
        let Some(&l) = self.layers.get(layer) else {
            return false;
        };
        graph.layer(l).nodes.iter().any(|&m| {
            let b = graph.bounds(m);
            m != n && top < b.bottom() && top + height > b.y
        })
    }

    /// Routes the artifact's edges for its current position and returns the score.
    pub(super) fn evaluate(&self, graph: &mut LayoutGraph, artifact: &mut Artifact, penalty: u32) -> f64 {
        let n = artifact.node;
        let edges = graph.connected_edges(n);
        let mut penalty = penalty;
        for &e in &edges {
            penalty += route_edge(graph, n, e);
        }

        let mut length = 0.0;
        let mut short = false;
        for &e in &edges {
            penalty += self.avoid_blocker(graph, n, e);
            let path = edge_path(graph, e);
            short |= path
                .windows(2)
                .any(|w| path_length(w) < self.spacing / 2.0);
            length += path_length(&path);
        }

        artifact.container = find_container(graph, artifact);
        if !in_container(graph, artifact) {
            penalty += 1;
        }
        penalty += overlap_penalty(graph, n);
        if short {
            penalty += 1;
        }
        length * f64::from(penalty + 1)
    }

    /// Reroutes the first horizontal segment of `e` that runs through a node, with a jog next
    /// to the artifact. Returns the penalty for the detour.
    fn avoid_blocker(&self, graph: &mut LayoutGraph, artifact: NodeId, e: EdgeId) -> u32 {
        let path = edge_path(graph, e);
        let opposite = graph.opposite(e, artifact);
        let artifact_is_source = graph.source_node(e) == artifact;
        for i in 0..path.len().saturating_sub(1) {
            let (p, q) = (path[i], path[i + 1]);
            if approx_eq(p.x, q.x) {
                continue;
            }
            let Some(blocker) = self.blocker(graph, p, q, &[artifact, opposite]) else {
                continue;
            };
            let a = graph.bounds(artifact);
            let o = graph.node(opposite).position;
            let detour_y = if o.y > blocker.y {
                blocker.bottom() + self.spacing / 2.0
            } else {
                blocker.y - self.spacing / 2.0
            };
            let jog_x = if o.x < a.x {
                a.x - self.spacing / 2.0
            } else {
                a.right() + self.spacing / 2.0
            };
            let detour = if artifact_is_source {
                [
                    Point::new(jog_x, p.y),
                    Point::new(jog_x, detour_y),
                    Point::new(q.x, detour_y),
                ]
            } else {
                [
                    Point::new(p.x, detour_y),
                    Point::new(jog_x, detour_y),
                    Point::new(jog_x, q.y),
                ]
            };
            let mut points = path;
            points.splice(i + 1..i + 1, detour);
            points.dedup_by(|u, v| approx_eq(u.x, v.x) && approx_eq(u.y, v.y));
            let inner = points.len().saturating_sub(1);
            graph.edge_mut(e).bendpoints = points.get(1..inner).map(<[Point]>::to_vec).unwrap_or_default();
            return 1;
        }
        0
    }

    /// First layered node, other than `skip`, that the horizontal segment `p`-`q` runs through.
    fn blocker(&self, graph: &LayoutGraph, p: Point, q: Point, skip: &[NodeId]) -> Option<Rect> {
        let (left, right) = (p.x.min(q.x), p.x.max(q.x));
        graph
            .layered_nodes(self.working)
            .into_iter()
            .filter(|m| !skip.contains(m))
            .map(|m| graph.bounds(m))
            .find(|b| b.x < right && b.right() > left && q.y > b.y && q.y < b.bottom())
    }

    /// Grows the artifact's container when the artifact sticks out above or below it. Returns
    /// whether anything moved.
    fn grow_container(&self, graph: &mut LayoutGraph, artifact: &Artifact) -> bool {
        let Some(container) = artifact.container else {
            return false;
        };
        let a = graph.bounds(artifact.node);
        let c = graph.bounds(container);
        let pad = self.pad_top_bottom;
        let (line, delta, above) = if a.bottom() > c.bottom() {
            (c.bottom(), a.bottom() + pad - c.bottom(), false)
        } else if a.y < c.y {
            (c.y, c.y + pad - a.y, true)
        } else {
            return false;
        };

        let mut fixed: Vec<NodeId> = graph.ancestors(container).collect();
        fixed.push(container);
        self.shift_below(graph, line, delta, &fixed);
        // the artifact is not in any graph yet, so the shift missed it
        if above {
            graph.node_mut(artifact.node).position.y += delta;
        }
        for n in fixed {
            graph.node_mut(n).size.height += delta;
        }
        tracing::debug!(
            container = %graph.node(container).id,
            delta,
            "container grown for artifact"
        );
        true
    }

    /// Moves every node at or below `line` down by `delta`, except `fixed`, together with the
    /// bendpoints and labels below the line. Sub-process content stays in its own frame.
    fn shift_below(&self, graph: &mut LayoutGraph, line: f64, delta: f64, fixed: &[NodeId]) {
        let mut visited: Vec<NodeId> = Vec::new();
        let mut stack = vec![self.working];
        while let Some(g) = stack.pop() {
            for &n in &graph.graph(g).nodes {
                visited.push(n);
                if graph.node(n).element.is_bpmn_container() {
                    if let Some(nested) = graph.nested_graph(n) {
                        stack.push(nested);
                    }
                }
            }
        }

        let mut edges: HashSet<EdgeId> = HashSet::default();
        for &n in &visited {
            edges.extend(graph.outgoing_edges(n));
            let node = graph.node_mut(n);
            if !fixed.contains(&n) && node.position.y >= line - EPSILON {
                node.position.y += delta;
            }
        }
        for e in edges {
            let edge = graph.edge_mut(e);
            for p in edge.bendpoints.iter_mut().filter(|p| p.y > line) {
                p.y += delta;
            }
            for label in edge.labels.iter_mut().filter(|l| l.position.y > line) {
                label.position.y += delta;
            }
        }
    }

    /// Hands the artifact to its container graph (or back to where it came from) and slots it
    /// into the layer under it, so later artifacts see it as an obstacle.
    fn attach(&self, graph: &mut LayoutGraph, artifact: &Artifact) {
        let n = artifact.node;
        let target = artifact
            .container
            .and_then(|c| graph.nested_graph(c))
            .unwrap_or(artifact.home);
        graph.move_to_graph(n, target);
        graph.node_mut(n).parent = graph.graph(target).owner;
        if artifact.original_edges.is_empty() {
            return;
        }

        let position = graph.node(n).position;
        let Some(&(ix, _)) = self
            .layer_right
            .iter()
            .find(|&&(_, right)| position.x < right)
            .or(self.layer_right.last())
        else {
            return;
        };
        let layer = self.layers[ix];
        let slot = graph
            .layer(layer)
            .nodes
            .iter()
            .position(|&m| graph.node(m).position.y > position.y)
            .unwrap_or(graph.layer(layer).nodes.len());
        graph.insert_into_layer(n, layer, slot);
    }
}

/// Straight line when the centers line up, otherwise one bend at the neighbour's center line
/// when the artifact is clear of the neighbour in both directions. Returns 1 when neither works.
fn route_edge(graph: &mut LayoutGraph, artifact: NodeId, e: EdgeId) -> u32 {
    let opposite = graph.opposite(e, artifact);
    let a = graph.bounds(artifact);
    let o = graph.bounds(opposite);
    let (ac, oc) = (a.center(), o.center());

    let mut penalty = 0;
    let mut bend = None;
    if !approx_eq(ac.y, oc.y) && !approx_eq(ac.x, oc.x) {
        let beside = ac.x > o.right() || ac.x < o.x;
        let off_level = ac.y < o.y || ac.y > o.bottom();
        if beside && off_level {
            bend = Some(Point::new(oc.x, ac.y));
        } else {
            penalty = 1;
        }
    }
    graph.edge_mut(e).bendpoints = bend.into_iter().collect();

    let artifact_side = side_towards(&a, bend, &o);
    let opposite_side = side_towards(&o, bend, &a);
    let artifact_is_source = graph.source_node(e) == artifact;
    let (artifact_port, opposite_port) = if artifact_is_source {
        (graph.edge(e).source(), graph.edge(e).target())
    } else {
        (graph.edge(e).target(), graph.edge(e).source())
    };
    let ap = free_port(graph, artifact, artifact_port, artifact_side);
    let op = free_port(graph, opposite, opposite_port, opposite_side);
    if artifact_is_source {
        graph.set_source(e, ap);
        graph.set_target(e, op);
    } else {
        graph.set_source(e, op);
        graph.set_target(e, ap);
    }
    penalty
}

/// Side of `node` facing the bendpoint, or the other node when the route is straight.
fn side_towards(node: &Rect, bend: Option<Point>, other: &Rect) -> PortSide {
    let (below, above, x) = match bend {
        Some(b) => (node.bottom() < b.y, node.y > b.y, b.x),
        None => (
            node.bottom() < other.y,
            node.y > other.bottom(),
            other.center().x,
        ),
    };
    if below {
        PortSide::South
    } else if above {
        PortSide::North
    } else if node.center().x > x {
        PortSide::West
    } else {
        PortSide::East
    }
}

/// A centered port on `side` that no other edge uses: the current one if it qualifies, an idle
/// one, or a new one.
fn free_port(graph: &mut LayoutGraph, node: NodeId, current: PortId, side: PortSide) -> PortId {
    let port = graph.port(current);
    let reusable = port.node == node && port.side == side && port.degree() <= 1;
    let idle = graph
        .node(node)
        .ports
        .iter()
        .copied()
        .find(|&p| graph.port(p).side == side && graph.port(p).degree() == 0);
    let p = match (reusable, idle) {
        (true, _) => current,
        (false, Some(idle)) => idle,
        (false, None) => graph.add_port(node, side, Point::ZERO),
    };
    let anchor = side.anchor(graph.node(node).size);
    graph.port_mut(p).position = anchor;
    p
}

/// Two for every straight artifact edge that leaves its neighbour exactly where another
/// straight edge does.
fn overlap_penalty(graph: &LayoutGraph, artifact: NodeId) -> u32 {
    let mut penalty = 0;
    for e in graph.connected_edges(artifact) {
        if !graph.edge(e).bendpoints.is_empty() {
            continue;
        }
        let opposite = graph.opposite(e, artifact);
        let here = end_at(graph, e, opposite);
        for other in graph.connected_edges(opposite) {
            let edge = graph.edge(other);
            if other == e || !edge.bendpoints.is_empty() || edge.kind == EdgeKind::MessageFlow {
                continue;
            }
            let there = end_at(graph, other, opposite);
            let (a, b) = (graph.port(here), graph.port(there));
            let (pa, pb) = (graph.port_point(here), graph.port_point(there));
            let collinear = if a.side.is_horizontal() {
                approx_eq(pa.y, pb.y)
            } else {
                approx_eq(pa.x, pb.x)
            };
            if a.side == b.side && collinear {
                penalty += 2;
            }
        }
    }
    penalty
}

fn end_at(graph: &LayoutGraph, e: EdgeId, n: NodeId) -> PortId {
    if graph.source_node(e) == n {
        graph.edge(e).source()
    } else {
        graph.edge(e).target()
    }
}

/// The lowest candidate container starting above the artifact, or the topmost one.
fn find_container(graph: &LayoutGraph, artifact: &Artifact) -> Option<NodeId> {
    let y = graph.node(artifact.node).position.y;
    artifact
        .containers
        .iter()
        .rev()
        .find(|&&(c, _)| graph.node(c).position.y <= y)
        .or(artifact.containers.first())
        .map(|&(c, _)| c)
}

pub(super) fn in_container(graph: &LayoutGraph, artifact: &Artifact) -> bool {
    artifact.container.is_none_or(|c| {
        let a = graph.bounds(artifact.node);
        let b = graph.bounds(c);
        a.y >= b.y && a.bottom() <= b.bottom()
    })
}
