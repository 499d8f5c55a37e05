//! Worklist-based walks over the container tree.
//!
//! Nesting depth comes from user diagrams, so none of these walks recurse; each carries an
//! explicit depth counter and fails with [`Error::NestingTooDeep`] past the configured limit.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::graph::{EdgeId, GraphId, LayoutGraph, NodeId};

/// A node reached by [`LayoutGraph::descendants`], with its nesting depth (0 for children of
/// the start graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub node: NodeId,
    pub graph: GraphId,
    pub depth: usize,
}

impl LayoutGraph {
    /// Pre-order walk of every node below `start`, children in insertion order.
    pub fn descendants(&self, start: GraphId, max_depth: usize) -> Result<Vec<Visit>> {
        let mut out = Vec::new();
        // (graph, next child index, depth)
        let mut stack: Vec<(GraphId, usize, usize)> = vec![(start, 0, 0)];
        while let Some(frame) = stack.last_mut() {
            let (graph, ix, depth) = *frame;
            let Some(&node) = self.graph(graph).nodes.get(ix) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;
            out.push(Visit { node, graph, depth });
            if let Some(nested) = self.node(node).nested {
                if depth + 1 > max_depth {
                    return Err(Error::NestingTooDeep {
                        id: self.node(node).id.clone(),
                        limit: max_depth,
                    });
                }
                stack.push((nested, 0, depth + 1));
            }
        }
        Ok(out)
    }

    /// Parent chain of `n`, nearest container first.
    pub fn ancestors(&self, n: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.node(n).parent,
            budget: self.node_count(),
        }
    }

    /// Sum of the positions along the parent chain, for graphs whose children are stored
    /// relative to their container.
    pub fn absolute_position(&self, n: NodeId) -> Point {
        self.ancestors(n)
            .fold(self.node(n).position, |acc, p| acc + self.node(p).position)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, n: NodeId) -> bool {
        self.ancestors(n).any(|a| a == ancestor)
    }

    /// Structural checks run before layout.
    pub fn validate(&self, max_depth: usize) -> Result<()> {
        let node_count = self.node_count();
        for p in self.port_ids() {
            let port = self.port(p);
            if port.node.index() >= node_count {
                return Err(Error::DanglingEdge {
                    edge: port
                        .incoming()
                        .iter()
                        .chain(port.outgoing())
                        .next()
                        .map(|&e| self.edge_name(e))
                        .unwrap_or_default(),
                });
            }
        }
        for e in self.edge_ids() {
            let edge = self.edge(e);
            if edge.source().index() >= self.port_count()
                || edge.target().index() >= self.port_count()
            {
                return Err(Error::DanglingEdge {
                    edge: self.edge_name(e),
                });
            }
        }
        for n in self.node_ids() {
            if let Some(g) = self.node(n).nested {
                if g.index() >= self.graph_count() || self.graph(g).owner != Some(n) {
                    return Err(Error::OwnershipMismatch {
                        id: self.node(n).id.clone(),
                    });
                }
            }
        }
        self.descendants(self.root(), max_depth)?;
        Ok(())
    }

    /// Identifier used in diagnostics and snapshots.
    pub fn edge_name(&self, e: EdgeId) -> String {
        let edge = self.edge(e);
        if edge.id.is_empty() {
            format!("#{}", e.index())
        } else {
            edge.id.clone()
        }
    }
}

pub struct Ancestors<'a> {
    graph: &'a LayoutGraph,
    next: Option<NodeId>,
    budget: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        // a corrupted parent cycle ends the walk instead of spinning
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.next = self.graph.node(current).parent;
        Some(current)
    }
}
