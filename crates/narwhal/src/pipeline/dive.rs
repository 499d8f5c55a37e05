//! Discovery pass over the container tree.

use crate::error::Result;
use narwhal_graph::{ElementType, Error, GraphId, LayoutGraph, NodeId};
use std::collections::VecDeque;

/// What the pipeline needs to know about the diagram before laying it out.
#[derive(Debug, Default)]
pub(super) struct Tree {
    /// Nodes laid out by the top-level run, container by container in document order.
    pub flow_nodes: Vec<NodeId>,
    /// Innermost pools and lanes holding flow nodes, ascending by absolute y, then by the
    /// document order of their pool.
    pub containers: Vec<NodeId>,
    /// Sub-processes with content, deepest first.
    pub sub_processes: Vec<NodeId>,
}

/// Sorts the diagram into flow nodes, containers and sub-processes, and makes every node's
/// parent agree with the graph it sits in.
///
/// Pools and lanes are descended into; sub-processes are treated as flow nodes of their
/// surrounding graph and get a layout of their own. Empty pools and lanes take no part.
pub(super) fn dive(graph: &mut LayoutGraph, max_depth: usize) -> Result<Tree> {
    let mut tree = Tree::default();
    // (container, absolute y) before filtering
    let mut containers: Vec<(NodeId, f64)> = Vec::new();
    // (nested graph, depth) of sub-processes still to be searched for nested sub-processes
    let mut pending: Vec<(GraphId, usize)> = Vec::new();

    let mut queue: VecDeque<(GraphId, f64, usize)> = VecDeque::from([(graph.root(), 0.0, 0)]);
    while let Some((g, parent_y, depth)) = queue.pop_front() {
        let owner = graph.graph(g).owner;
        for n in graph.graph(g).nodes.clone() {
            graph.node_mut(n).parent = owner;
            let node = graph.node(n);
            let nested = node.nested.filter(|&ng| !graph.graph(ng).nodes.is_empty());

            match nested {
                Some(ng) if node.element == ElementType::SubProcess => {
                    tree.flow_nodes.push(n);
                    tree.sub_processes.push(n);
                    pending.push((ng, depth + 1));
                    if let Some(o) = owner {
                        containers.push((o, parent_y));
                    }
                }
                Some(ng) => {
                    check_depth(graph, n, depth + 1, max_depth)?;
                    queue.push_back((ng, parent_y + node.position.y, depth + 1));
                }
                None if node.element.is_bpmn_container() => {
                    tracing::trace!(container = %node.id, "empty container skipped");
                }
                None => {
                    tree.flow_nodes.push(n);
                    if let Some(o) = owner {
                        containers.push((o, parent_y));
                    }
                }
            }
        }
    }

    // only the innermost containers get a local layout
    let mut seen = rustc_hash::FxHashSet::default();
    containers.retain(|&(c, _)| seen.insert(c));
    let outer: rustc_hash::FxHashSet<NodeId> = containers
        .iter()
        .filter_map(|&(c, _)| graph.node(c).parent)
        .collect();
    containers.retain(|(c, _)| !outer.contains(c));
    // equal y falls back to the document order of the top-level pool
    let top_level = |c: NodeId| {
        let pool = graph.ancestors(c).last().unwrap_or(c);
        let root = graph.graph(graph.root());
        root.nodes.iter().position(|&n| n == pool).unwrap_or(root.nodes.len())
    };
    containers.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| top_level(a.0).cmp(&top_level(b.0)))
    });
    tree.containers = containers.into_iter().map(|(c, _)| c).collect();

    // any non-empty container below a sub-process is laid out the same way
    let mut depths: Vec<(NodeId, usize)> = tree.sub_processes.iter().map(|&n| (n, 0)).collect();
    while let Some((g, depth)) = pending.pop() {
        let owner = graph.graph(g).owner;
        for n in graph.graph(g).nodes.clone() {
            graph.node_mut(n).parent = owner;
            let Some(ng) = graph.nested_graph(n) else {
                continue;
            };
            if graph.graph(ng).nodes.is_empty() {
                continue;
            }
            check_depth(graph, n, depth + 1, max_depth)?;
            depths.push((n, depth));
            pending.push((ng, depth + 1));
        }
    }
    depths.sort_by(|a, b| b.1.cmp(&a.1));
    tree.sub_processes = depths.into_iter().map(|(n, _)| n).collect();
    Ok(tree)
}

fn check_depth(graph: &LayoutGraph, n: NodeId, depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(Error::NestingTooDeep {
            id: graph.node(n).id.clone(),
            limit: max_depth,
        }
        .into());
    }
    Ok(())
}
