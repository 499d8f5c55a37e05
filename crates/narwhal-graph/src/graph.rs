//! The arena that every layout pass mutates.
//!
//! Nodes, edges, ports, graphs and layers are stored in flat vectors and addressed by small
//! copyable ids. Containers own their nested graph by id, and every node keeps a non-owning
//! `parent` index to its container so upward walks never need back pointers.
//!
//! Edge endpoints are kept twice: the edge stores its source and target port, and each port
//! stores the edges linked to it. Moving an edge to another port is a swap-remove on the old
//! port's list and a push on the new one.

use crate::element::{
    EdgeEnd, EdgeKind, ElementType, InLayerConstraint, Label, LabelPlacement, NodeKind, PortSide,
};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(ix: usize) -> Self {
                Self(ix as u32)
            }
        }
    };
}

arena_id!(NodeId);
arena_id!(EdgeId);
arena_id!(PortId);
arena_id!(
    /// `GraphId` of the top-level diagram is always [`LayoutGraph::root`].
    GraphId
);
arena_id!(LayerId);

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub element: ElementType,
    pub kind: NodeKind,
    pub position: Point,
    pub size: Size,
    pub fixed_size: bool,
    /// True size of a node that was shrunk while it took part in layering.
    pub original_size: Option<Size>,
    pub nested: Option<GraphId>,
    /// Enclosing container, maintained by the layout passes.
    pub parent: Option<NodeId>,
    /// Graph whose child list holds this node.
    pub graph: GraphId,
    pub ports: Vec<PortId>,
    pub labels: Vec<Label>,
    pub layer: Option<LayerId>,
    pub in_layer_constraint: InLayerConstraint,
    /// Nodes that must directly follow this one inside its layer.
    pub in_layer_successors: Vec<NodeId>,
    /// Host activity of a boundary event.
    pub attached_to: Option<NodeId>,
}

impl Node {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn is_container(&self) -> bool {
        self.nested.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub kind: EdgeKind,
    source: PortId,
    target: PortId,
    pub bendpoints: Vec<Point>,
    pub labels: Vec<Label>,
    /// Set while the edge points against the layering direction.
    pub reversed: bool,
    /// Real source node while the edge is temporarily anchored elsewhere.
    pub original_source: Option<NodeId>,
    /// Center label parked while the edge awaits custom placement.
    pub held_label: Option<Label>,
}

impl Edge {
    pub fn source(&self) -> PortId {
        self.source
    }

    pub fn target(&self) -> PortId {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct Port {
    pub node: NodeId,
    pub side: PortSide,
    /// Relative to the owning node's top-left corner.
    pub position: Point,
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
}

impl Port {
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub owner: Option<NodeId>,
    /// Child nodes, in insertion order.
    pub nodes: Vec<NodeId>,
    /// Working set of the pipeline before layering and after cleanup.
    pub layerless: Vec<NodeId>,
    pub layers: Vec<LayerId>,
    pub size: Size,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub graph: GraphId,
    pub nodes: Vec<NodeId>,
    pub size: Size,
}

#[derive(Debug, Clone)]
pub struct LayoutGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ports: Vec<Port>,
    graphs: Vec<Graph>,
    layers: Vec<Layer>,
    index: HashMap<String, NodeId>,
}

impl Default for LayoutGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            ports: Vec::new(),
            graphs: vec![Graph::default()],
            layers: Vec::new(),
            index: HashMap::default(),
        }
    }

    pub fn root(&self) -> GraphId {
        GraphId(0)
    }

    pub fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n.index()]
    }

    pub fn node_mut(&mut self, n: NodeId) -> &mut Node {
        &mut self.nodes[n.index()]
    }

    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.index()]
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut Edge {
        &mut self.edges[e.index()]
    }

    pub fn port(&self, p: PortId) -> &Port {
        &self.ports[p.index()]
    }

    pub fn port_mut(&mut self, p: PortId) -> &mut Port {
        &mut self.ports[p.index()]
    }

    pub fn graph(&self, g: GraphId) -> &Graph {
        &self.graphs[g.index()]
    }

    pub fn graph_mut(&mut self, g: GraphId) -> &mut Graph {
        &mut self.graphs[g.index()]
    }

    pub fn layer(&self, l: LayerId) -> &Layer {
        &self.layers[l.index()]
    }

    pub fn layer_mut(&mut self, l: LayerId) -> &mut Layer {
        &mut self.layers[l.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId::from_index)
    }

    pub fn port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        (0..self.ports.len()).map(PortId::from_index)
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Adds a flow node to `graph`. Events and gateways are flagged fixed-size.
    pub fn add_node(
        &mut self,
        graph: GraphId,
        id: impl Into<String>,
        element: ElementType,
        size: Size,
    ) -> NodeId {
        let id = id.into();
        let n = NodeId::from_index(self.nodes.len());
        let parent = self.graphs[graph.index()].owner;
        self.nodes.push(Node {
            id: id.clone(),
            element,
            kind: NodeKind::Regular,
            position: Point::ZERO,
            size,
            fixed_size: element.has_fixed_size(),
            original_size: None,
            nested: None,
            parent,
            graph,
            ports: Vec::new(),
            labels: Vec::new(),
            layer: None,
            in_layer_constraint: InLayerConstraint::None,
            in_layer_successors: Vec::new(),
            attached_to: None,
        });
        self.graphs[graph.index()].nodes.push(n);
        if !id.is_empty() {
            self.index.insert(id, n);
        }
        n
    }

    /// Adds a pool, lane or sub-process together with the nested graph it owns.
    pub fn add_container(
        &mut self,
        graph: GraphId,
        id: impl Into<String>,
        element: ElementType,
        size: Size,
    ) -> NodeId {
        let n = self.add_node(graph, id, element, size);
        let nested = GraphId::from_index(self.graphs.len());
        self.graphs.push(Graph {
            owner: Some(n),
            ..Graph::default()
        });
        self.nodes[n.index()].nested = Some(nested);
        n
    }

    /// Adds a structural dummy that is not listed in any graph's children.
    pub fn add_dummy_node(&mut self, graph: GraphId, kind: NodeKind) -> NodeId {
        let n = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            id: String::new(),
            element: ElementType::Undefined,
            kind,
            position: Point::ZERO,
            size: Size::ZERO,
            fixed_size: true,
            original_size: None,
            nested: None,
            parent: None,
            graph,
            ports: Vec::new(),
            labels: Vec::new(),
            layer: None,
            in_layer_constraint: InLayerConstraint::None,
            in_layer_successors: Vec::new(),
            attached_to: None,
        });
        n
    }

    /// Nested graph of a container node.
    pub fn nested_graph(&self, n: NodeId) -> Option<GraphId> {
        self.nodes[n.index()].nested
    }

    /// Moves `n` into `graph`'s child list, dropping it from the previous one.
    pub fn move_to_graph(&mut self, n: NodeId, graph: GraphId) {
        self.remove_from_graph(n);
        self.nodes[n.index()].graph = graph;
        self.graphs[graph.index()].nodes.push(n);
    }

    pub fn remove_from_graph(&mut self, n: NodeId) {
        let g = self.nodes[n.index()].graph;
        self.graphs[g.index()].nodes.retain(|&m| m != n);
    }

    pub fn add_port(&mut self, node: NodeId, side: PortSide, position: Point) -> PortId {
        let p = PortId::from_index(self.ports.len());
        self.ports.push(Port {
            node,
            side,
            position,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        });
        self.nodes[node.index()].ports.push(p);
        p
    }

    pub fn find_port(&self, node: NodeId, side: PortSide) -> Option<PortId> {
        self.nodes[node.index()]
            .ports
            .iter()
            .copied()
            .find(|&p| self.ports[p.index()].side == side)
    }

    /// First port on `side`, or a new one centered on that side.
    pub fn port_on_side(&mut self, node: NodeId, side: PortSide) -> PortId {
        if let Some(p) = self.find_port(node, side) {
            return p;
        }
        let anchor = side.anchor(self.nodes[node.index()].size);
        self.add_port(node, side, anchor)
    }

    /// Connects the east side of `source` to the west side of `target`.
    pub fn connect(&mut self, source: NodeId, target: NodeId, kind: EdgeKind) -> EdgeId {
        let sp = self.port_on_side(source, PortSide::East);
        let tp = self.port_on_side(target, PortSide::West);
        self.connect_ports(sp, tp, kind)
    }

    /// Like [`Self::connect`], resolving both ends by element id.
    pub fn connect_ids(&mut self, source: &str, target: &str, kind: EdgeKind) -> Result<EdgeId> {
        let s = self.node_by_id(source).ok_or_else(|| Error::MissingElement {
            id: source.to_string(),
        })?;
        let t = self.node_by_id(target).ok_or_else(|| Error::MissingElement {
            id: target.to_string(),
        })?;
        let e = self.connect(s, t, kind);
        self.edges[e.index()].id = format!("{source}->{target}");
        Ok(e)
    }

    pub fn connect_ports(&mut self, source: PortId, target: PortId, kind: EdgeKind) -> EdgeId {
        let e = EdgeId::from_index(self.edges.len());
        self.edges.push(Edge {
            id: String::new(),
            kind,
            source,
            target,
            bendpoints: Vec::new(),
            labels: Vec::new(),
            reversed: false,
            original_source: None,
            held_label: None,
        });
        self.ports[source.index()].outgoing.push(e);
        self.ports[target.index()].incoming.push(e);
        e
    }

    /// Tags `event` as attached to the border of `host`.
    pub fn attach_boundary_event(&mut self, host: NodeId, event: NodeId) -> EdgeId {
        self.connect(host, event, EdgeKind::BoundaryAttachment)
    }

    pub fn add_edge_label(&mut self, e: EdgeId, size: Size, placement: LabelPlacement) {
        self.edges[e.index()].labels.push(Label::new(size, placement));
    }

    pub fn source_node(&self, e: EdgeId) -> NodeId {
        self.ports[self.edges[e.index()].source.index()].node
    }

    pub fn target_node(&self, e: EdgeId) -> NodeId {
        self.ports[self.edges[e.index()].target.index()].node
    }

    pub fn opposite(&self, e: EdgeId, n: NodeId) -> NodeId {
        let s = self.source_node(e);
        if s == n { self.target_node(e) } else { s }
    }

    pub fn set_source(&mut self, e: EdgeId, port: PortId) {
        let old = self.edges[e.index()].source;
        self.ports[old.index()].outgoing.retain(|&x| x != e);
        self.edges[e.index()].source = port;
        let list = &mut self.ports[port.index()].outgoing;
        if !list.contains(&e) {
            list.push(e);
        }
    }

    pub fn set_target(&mut self, e: EdgeId, port: PortId) {
        let old = self.edges[e.index()].target;
        self.ports[old.index()].incoming.retain(|&x| x != e);
        self.edges[e.index()].target = port;
        let list = &mut self.ports[port.index()].incoming;
        if !list.contains(&e) {
            list.push(e);
        }
    }

    /// Drops the edge from both port lists. The edge keeps its endpoints so it can be re-linked.
    pub fn unlink_edge(&mut self, e: EdgeId) {
        let Edge { source, target, .. } = self.edges[e.index()];
        self.ports[source.index()].outgoing.retain(|&x| x != e);
        self.ports[target.index()].incoming.retain(|&x| x != e);
    }

    /// Keeps the edge's source but hides it from that port's outgoing list.
    pub fn detach_from_source_port(&mut self, e: EdgeId) {
        let source = self.edges[e.index()].source;
        self.ports[source.index()].outgoing.retain(|&x| x != e);
    }

    pub fn is_linked(&self, e: EdgeId) -> bool {
        let Edge { source, target, .. } = self.edges[e.index()];
        self.ports[source.index()].outgoing.contains(&e)
            || self.ports[target.index()].incoming.contains(&e)
    }

    /// Swaps source and target ports and toggles the `reversed` flag.
    pub fn reverse_edge(&mut self, e: EdgeId) {
        let Edge { source, target, .. } = self.edges[e.index()];
        self.set_source(e, target);
        self.set_target(e, source);
        let edge = &mut self.edges[e.index()];
        edge.reversed = !edge.reversed;
        edge.bendpoints.reverse();
    }

    pub fn outgoing_edges(&self, n: NodeId) -> Vec<EdgeId> {
        self.nodes[n.index()]
            .ports
            .iter()
            .flat_map(|p| self.ports[p.index()].outgoing.iter().copied())
            .collect()
    }

    pub fn incoming_edges(&self, n: NodeId) -> Vec<EdgeId> {
        self.nodes[n.index()]
            .ports
            .iter()
            .flat_map(|p| self.ports[p.index()].incoming.iter().copied())
            .collect()
    }

    pub fn connected_edges(&self, n: NodeId) -> Vec<EdgeId> {
        let mut edges = self.incoming_edges(n);
        edges.extend(self.outgoing_edges(n));
        edges
    }

    /// Gives `e` its own copy of the port at `end` when other edges share it.
    pub fn isolate_port(&mut self, e: EdgeId, end: EdgeEnd) -> PortId {
        let p = match end {
            EdgeEnd::Source => self.edges[e.index()].source,
            EdgeEnd::Target => self.edges[e.index()].target,
        };
        if self.ports[p.index()].degree() <= 1 {
            return p;
        }
        let Port {
            node,
            side,
            position,
            ..
        } = self.ports[p.index()];
        let clone = self.add_port(node, side, position);
        match end {
            EdgeEnd::Source => self.set_source(e, clone),
            EdgeEnd::Target => self.set_target(e, clone),
        }
        clone
    }

    /// Port position in the owning node's coordinate frame.
    pub fn port_point(&self, p: PortId) -> Point {
        let port = &self.ports[p.index()];
        self.nodes[port.node.index()].position + port.position
    }

    pub fn bounds(&self, n: NodeId) -> Rect {
        self.nodes[n.index()].bounds()
    }

    pub fn add_layer(&mut self, graph: GraphId) -> LayerId {
        let l = LayerId::from_index(self.layers.len());
        self.layers.push(Layer {
            graph,
            nodes: Vec::new(),
            size: Size::ZERO,
        });
        self.graphs[graph.index()].layers.push(l);
        l
    }

    /// Position of `layer` inside its graph's layer list.
    pub fn layer_index(&self, layer: LayerId) -> Option<usize> {
        let g = self.layers[layer.index()].graph;
        self.graphs[g.index()].layers.iter().position(|&l| l == layer)
    }

    pub fn node_layer_index(&self, n: NodeId) -> Option<usize> {
        self.nodes[n.index()]
            .layer
            .and_then(|l| self.layer_index(l))
    }

    /// Puts `n` at `index` of `layer`, removing it from its previous layer first.
    pub fn insert_into_layer(&mut self, n: NodeId, layer: LayerId, index: usize) {
        if let Some(old) = self.nodes[n.index()].layer {
            self.layers[old.index()].nodes.retain(|&m| m != n);
        }
        let nodes = &mut self.layers[layer.index()].nodes;
        let index = index.min(nodes.len());
        nodes.insert(index, n);
        self.nodes[n.index()].layer = Some(layer);
    }

    pub fn remove_from_layer(&mut self, n: NodeId) {
        if let Some(old) = self.nodes[n.index()].layer.take() {
            self.layers[old.index()].nodes.retain(|&m| m != n);
        }
    }

    /// All nodes currently held in `graph`'s layers, layer by layer.
    pub fn layered_nodes(&self, graph: GraphId) -> Vec<NodeId> {
        self.graphs[graph.index()]
            .layers
            .iter()
            .flat_map(|l| self.layers[l.index()].nodes.iter().copied())
            .collect()
    }
}
