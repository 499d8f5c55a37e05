use super::dive::Tree;
use crate::options::LayoutOptions;
use narwhal_graph::{GraphId, InLayerConstraint, LayoutGraph, NodeId, Point};

/// Takes every node of `g` out of its layer and drops the layering state, leaving the graph
/// with its original node set and no layers.
pub(super) fn release_layers(graph: &mut LayoutGraph, g: GraphId) {
    let mut touched = graph.layered_nodes(g);
    for &n in &touched {
        graph.remove_from_layer(n);
    }
    // flow nodes of pools and lanes are layered here but listed in their container's graph
    touched.extend(graph.graph(g).nodes.iter().copied());
    for n in touched {
        let node = graph.node_mut(n);
        node.in_layer_constraint = InLayerConstraint::None;
        node.in_layer_successors.clear();
    }
    let graph = graph.graph_mut(g);
    graph.layers.clear();
    graph.layerless = graph.nodes.clone();
}

/// Moves `n` together with the bendpoints and labels of its outgoing edges.
pub(super) fn shift_node(graph: &mut LayoutGraph, n: NodeId, offset: Point) {
    graph.node_mut(n).position += offset;
    for e in graph.outgoing_edges(n) {
        let edge = graph.edge_mut(e);
        for p in &mut edge.bendpoints {
            *p += offset;
        }
        for label in &mut edge.labels {
            label.position += offset;
        }
    }
}

/// Moves sub-process content from its local frame into the diagram's, outermost sub-process
/// first so nested content follows its parent.
pub(super) fn place_sub_process_content(
    graph: &mut LayoutGraph,
    tree: &Tree,
    options: &LayoutOptions,
) {
    let padding = Point::new(
        options.container_padding_left_right,
        options.container_padding_top_bottom,
    );
    for &sp in tree.sub_processes.iter().rev() {
        let Some(g) = graph.nested_graph(sp) else {
            continue;
        };
        let offset = graph.node(sp).position + padding;
        for n in graph.graph(g).nodes.clone() {
            shift_node(graph, n, offset);
        }
    }
}
