use narwhal_graph::{
    EdgeKind, ElementType, Error, LayoutGraph, NodeId, Point, PortSide, Size,
};

fn task(g: &mut LayoutGraph, id: &str) -> NodeId {
    let root = g.root();
    g.add_node(root, id, ElementType::Undefined, Size::new(100.0, 80.0))
}

#[test]
fn connect_uses_east_and_west_ports() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let e = g.connect(a, b, EdgeKind::SequenceFlow);

    assert_eq!(g.port(g.edge(e).source()).side, PortSide::East);
    assert_eq!(g.port(g.edge(e).target()).side, PortSide::West);
    assert_eq!(g.port_point(g.edge(e).source()), Point::new(100.0, 40.0));
    assert_eq!(g.outgoing_edges(a), vec![e]);
    assert_eq!(g.incoming_edges(b), vec![e]);
    assert_eq!(g.opposite(e, a), b);
    assert_eq!(g.opposite(e, b), a);
}

#[test]
fn second_edge_reuses_the_side_port() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let c = task(&mut g, "c");
    let ab = g.connect(a, b, EdgeKind::SequenceFlow);
    let ac = g.connect(a, c, EdgeKind::SequenceFlow);

    assert_eq!(g.edge(ab).source(), g.edge(ac).source());
    assert_eq!(g.port(g.edge(ab).source()).degree(), 2);
}

#[test]
fn connect_ids_reports_unknown_elements() {
    let mut g = LayoutGraph::new();
    task(&mut g, "a");
    let err = g
        .connect_ids("a", "missing", EdgeKind::SequenceFlow)
        .unwrap_err();
    assert!(matches!(err, Error::MissingElement { ref id } if id == "missing"));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn unlinked_edge_keeps_its_ends_and_relinks() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let e = g.connect(a, b, EdgeKind::SequenceFlow);

    g.unlink_edge(e);
    assert!(!g.is_linked(e));
    assert!(g.outgoing_edges(a).is_empty());
    assert_eq!(g.source_node(e), a);
    assert_eq!(g.target_node(e), b);

    let (sp, tp) = (g.edge(e).source(), g.edge(e).target());
    g.set_source(e, sp);
    g.set_target(e, tp);
    assert!(g.is_linked(e));
    assert_eq!(g.outgoing_edges(a), vec![e]);
}

#[test]
fn reversing_twice_restores_the_edge() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let e = g.connect(a, b, EdgeKind::SequenceFlow);
    g.edge_mut(e).bendpoints = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];

    g.reverse_edge(e);
    assert!(g.edge(e).reversed);
    assert_eq!(g.source_node(e), b);
    assert_eq!(g.edge(e).bendpoints[0], Point::new(2.0, 2.0));

    g.reverse_edge(e);
    assert!(!g.edge(e).reversed);
    assert_eq!(g.source_node(e), a);
    assert_eq!(g.edge(e).bendpoints[0], Point::new(1.0, 1.0));
}

#[test]
fn isolate_port_splits_shared_ports_only() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let c = task(&mut g, "c");
    let ac = g.connect(a, c, EdgeKind::SequenceFlow);
    let bc = g.connect(b, c, EdgeKind::SequenceFlow);
    let shared = g.edge(ac).target();

    let own = g.isolate_port(bc, narwhal_graph::EdgeEnd::Target);
    assert_ne!(own, shared);
    assert_eq!(g.port(own).side, PortSide::West);
    assert_eq!(g.port(shared).incoming(), &[ac]);

    // a port with a single edge is returned as is
    assert_eq!(g.isolate_port(ac, narwhal_graph::EdgeEnd::Target), shared);
}

#[test]
fn containers_own_their_nested_graph() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let pool = g.add_container(root, "pool", ElementType::Pool, Size::new(600.0, 200.0));
    let lane_graph = g.nested_graph(pool).unwrap();
    let lane = g.add_container(lane_graph, "lane", ElementType::Lane, Size::new(600.0, 200.0));
    let inner = g.nested_graph(lane).unwrap();
    let t = g.add_node(inner, "t", ElementType::Undefined, Size::new(100.0, 80.0));

    assert_eq!(g.graph(lane_graph).owner, Some(pool));
    assert_eq!(g.node(t).parent, Some(lane));
    assert_eq!(g.ancestors(t).collect::<Vec<_>>(), vec![lane, pool]);
    assert!(g.is_ancestor(pool, t));
    assert!(!g.is_ancestor(t, pool));
    assert_eq!(g.node_by_id("t"), Some(t));
}

#[test]
fn absolute_position_adds_up_container_offsets() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let pool = g.add_container(root, "pool", ElementType::Pool, Size::new(600.0, 200.0));
    g.node_mut(pool).position = Point::new(10.0, 20.0);
    let lane = g.add_container(
        g.nested_graph(pool).unwrap(),
        "lane",
        ElementType::Lane,
        Size::new(600.0, 200.0),
    );
    g.node_mut(lane).position = Point::new(30.0, 0.0);
    let t = g.add_node(
        g.nested_graph(lane).unwrap(),
        "t",
        ElementType::Undefined,
        Size::new(100.0, 80.0),
    );
    g.node_mut(t).position = Point::new(5.0, 5.0);

    assert_eq!(g.absolute_position(t), Point::new(45.0, 25.0));
}

#[test]
fn descendants_walk_in_pre_order_with_depth() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let sp = g.add_container(root, "sp", ElementType::SubProcess, Size::new(300.0, 200.0));
    let inner = g.nested_graph(sp).unwrap();
    let child = g.add_node(inner, "child", ElementType::Undefined, Size::new(100.0, 80.0));
    let after = task(&mut g, "after");

    let visits = g.descendants(root, 8).unwrap();
    let order: Vec<(NodeId, usize)> = visits.iter().map(|v| (v.node, v.depth)).collect();
    assert_eq!(order, vec![(sp, 0), (child, 1), (after, 0)]);
}

#[test]
fn deep_nesting_is_rejected() {
    let mut g = LayoutGraph::new();
    let mut graph = g.root();
    for i in 0..5 {
        let sp = g.add_container(
            graph,
            format!("sp{i}"),
            ElementType::SubProcess,
            Size::new(100.0, 100.0),
        );
        graph = g.nested_graph(sp).unwrap();
    }

    assert!(g.validate(8).is_ok());
    let err = g.validate(3).unwrap_err();
    assert!(matches!(err, Error::NestingTooDeep { limit: 3, .. }));
}

#[test]
fn snapshot_reports_nodes_and_linked_edges() {
    let mut g = LayoutGraph::new();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    g.node_mut(b).position = Point::new(200.0, 0.0);
    g.connect_ids("a", "b", EdgeKind::SequenceFlow).unwrap();
    let hidden = g.connect(b, a, EdgeKind::SequenceFlow);
    g.unlink_edge(hidden);

    let snapshot = g.snapshot();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.nodes["b"].x, 200.0);
    assert_eq!(snapshot.edges.len(), 1);
    let edge = &snapshot.edges["a->b"];
    assert_eq!(edge.source, "a");
    assert_eq!(edge.target_point, Point::new(200.0, 40.0));
}

#[test]
fn layers_track_membership() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let a = task(&mut g, "a");
    let b = task(&mut g, "b");
    let l0 = g.add_layer(root);
    let l1 = g.add_layer(root);
    g.insert_into_layer(a, l0, 0);
    g.insert_into_layer(b, l0, 0);
    assert_eq!(g.layer(l0).nodes, vec![b, a]);

    g.insert_into_layer(b, l1, 0);
    assert_eq!(g.layer(l0).nodes, vec![a]);
    assert_eq!(g.node_layer_index(b), Some(1));
    assert_eq!(g.layered_nodes(root), vec![a, b]);

    g.remove_from_layer(a);
    assert_eq!(g.node(a).layer, None);
    assert!(g.layer(l0).nodes.is_empty());
}
