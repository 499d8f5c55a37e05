use narwhal::graph::{
    EdgeKind, ElementType, GraphId, LabelPlacement, LayoutGraph, NodeId, Point, PortSide, Size,
};
use narwhal::{
    CancelToken, CoordinateMode, Error, LayoutOptions, LayoutStatus, layout, layout_with_options,
};

const TASK: Size = Size::new(100.0, 80.0);
const EVENT: Size = Size::new(30.0, 30.0);
const GATEWAY: Size = Size::new(40.0, 40.0);

fn node(g: &mut LayoutGraph, graph: GraphId, id: &str, element: ElementType) -> NodeId {
    let size = match element {
        ElementType::Event => EVENT,
        ElementType::Gateway => GATEWAY,
        ElementType::Artifact => Size::new(60.0, 80.0),
        _ => TASK,
    };
    g.add_node(graph, id, element, size)
}

fn run(g: &mut LayoutGraph) {
    let status = layout(g, CoordinateMode::Absolute, &CancelToken::new()).unwrap();
    assert_eq!(status, LayoutStatus::Completed);
}

fn center_y(g: &LayoutGraph, n: NodeId) -> f64 {
    g.bounds(n).center().y
}

#[test]
fn chain_runs_left_to_right_on_one_line() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let task = node(&mut g, root, "task", ElementType::Undefined);
    let end = node(&mut g, root, "end", ElementType::Event);
    let e1 = g.connect(start, task, EdgeKind::SequenceFlow);
    let e2 = g.connect(task, end, EdgeKind::SequenceFlow);

    run(&mut g);

    assert_eq!(g.node(start).position, Point::new(0.0, 25.0));
    assert_eq!(g.node(task).position, Point::new(70.0, 0.0));
    assert_eq!(g.node(end).position, Point::new(210.0, 25.0));
    assert_eq!(center_y(&g, start), center_y(&g, end));
    assert!(g.edge(e1).bendpoints.is_empty());
    assert!(g.edge(e2).bendpoints.is_empty());
    // layering state is gone afterwards
    assert!(g.graph(root).layers.is_empty());
    assert_eq!(g.node(task).layer, None);
}

#[test]
fn wider_spacing_moves_layers_apart() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let task = node(&mut g, root, "task", ElementType::Undefined);
    g.connect(start, task, EdgeKind::SequenceFlow);
    let options = LayoutOptions::from_json(r#"{"spacing": 60}"#).unwrap();

    let status =
        layout_with_options(&mut g, CoordinateMode::Absolute, &options, &CancelToken::new())
            .unwrap();

    assert_eq!(status, LayoutStatus::Completed);
    assert_eq!(g.node(task).position.x, 90.0);
}

#[test]
fn splitting_gateway_leaves_through_its_corners() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let gateway = node(&mut g, root, "split", ElementType::Gateway);
    let upper = node(&mut g, root, "upper", ElementType::Undefined);
    let lower = node(&mut g, root, "lower", ElementType::Undefined);
    g.connect(start, gateway, EdgeKind::SequenceFlow);
    let to_upper = g.connect(gateway, upper, EdgeKind::SequenceFlow);
    let to_lower = g.connect(gateway, lower, EdgeKind::SequenceFlow);

    run(&mut g);

    let diamond = g.bounds(gateway);
    assert_eq!(center_y(&g, start), diamond.center().y);
    assert!(center_y(&g, upper) < diamond.center().y);
    assert!(center_y(&g, lower) > diamond.center().y);

    assert_eq!(g.port(g.edge(to_upper).source()).side, PortSide::North);
    assert_eq!(g.port(g.edge(to_lower).source()).side, PortSide::South);
    let up = &g.edge(to_upper).bendpoints;
    let down = &g.edge(to_lower).bendpoints;
    assert!(up.iter().chain(down).all(|p| p.x == diamond.center().x));
    assert!(up[0].y < diamond.y);
    assert!(down[0].y > diamond.bottom());
    assert_eq!(up.last().unwrap().y, g.port_point(g.edge(to_upper).target()).y);
    assert_eq!(down.last().unwrap().y, g.port_point(g.edge(to_lower).target()).y);
}

#[test]
fn cycles_keep_their_original_direction() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let a = node(&mut g, root, "a", ElementType::Undefined);
    let b = node(&mut g, root, "b", ElementType::Undefined);
    let c = node(&mut g, root, "c", ElementType::Undefined);
    g.connect(a, b, EdgeKind::SequenceFlow);
    g.connect(b, c, EdgeKind::SequenceFlow);
    let back = g.connect(c, a, EdgeKind::SequenceFlow);

    run(&mut g);

    assert!(g.node(a).position.x < g.node(b).position.x);
    assert!(g.node(b).position.x < g.node(c).position.x);
    assert_eq!(g.source_node(back), c);
    assert_eq!(g.target_node(back), a);
    assert!(!g.edge(back).reversed);
    assert!(!g.edge(back).bendpoints.is_empty());
    // long-edge dummies never become children
    assert_eq!(g.graph(root).nodes, vec![a, b, c]);
}

#[test]
fn boundary_event_sits_on_the_host_bottom_border() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let host = node(&mut g, root, "host", ElementType::Undefined);
    let end = node(&mut g, root, "end", ElementType::Event);
    let timer = node(&mut g, root, "timer", ElementType::Event);
    let handler = node(&mut g, root, "handler", ElementType::Undefined);
    g.connect(start, host, EdgeKind::SequenceFlow);
    g.connect(host, end, EdgeKind::SequenceFlow);
    g.attach_boundary_event(host, timer);
    let escalation = g.connect(timer, handler, EdgeKind::SequenceFlow);

    run(&mut g);

    let h = g.bounds(host);
    let t = g.bounds(timer);
    assert_eq!(g.node(timer).size, EVENT);
    assert_eq!(t.center().y, h.bottom());
    assert_eq!(t.right(), h.right() - 15.0);
    assert_eq!(g.source_node(escalation), timer);
    assert_eq!(g.port(g.edge(escalation).source()).side, PortSide::South);
    // the flow leaves from the event center on the border, so the first leg stays vertical
    let border = Point::new(t.center().x, h.bottom());
    assert_eq!(g.port_point(g.edge(escalation).source()), border);
    assert_eq!(g.edge(escalation).bendpoints[0], border);
    assert_eq!(g.edge(escalation).bendpoints[1].x, border.x);
    assert!(g.node(handler).position.x > h.right());
}

#[test]
fn sub_process_is_sized_around_its_content() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let sp = g.add_container(root, "sp", ElementType::SubProcess, Size::new(300.0, 200.0));
    let end = node(&mut g, root, "end", ElementType::Event);
    g.connect(start, sp, EdgeKind::SequenceFlow);
    g.connect(sp, end, EdgeKind::SequenceFlow);
    let inner = g.nested_graph(sp).unwrap();
    let first = node(&mut g, inner, "inner-start", ElementType::Event);
    let work = node(&mut g, inner, "inner-task", ElementType::Undefined);
    g.connect(first, work, EdgeKind::SequenceFlow);

    run(&mut g);

    assert_eq!(g.node(sp).size, Size::new(230.0, 110.0));
    assert_eq!(g.node(sp).position, Point::new(70.0, 0.0));
    assert_eq!(g.node(first).position, Point::new(100.0, 40.0));
    assert_eq!(g.node(work).position, Point::new(170.0, 15.0));
    assert!(g.bounds(sp).encloses(&g.bounds(work)));
    assert_eq!(g.node(end).position.x, 340.0);
}

#[test]
fn annotation_goes_above_its_single_neighbour() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let a = node(&mut g, root, "a", ElementType::Undefined);
    let b = node(&mut g, root, "b", ElementType::Undefined);
    let data = node(&mut g, root, "data", ElementType::Artifact);
    g.connect(a, b, EdgeKind::SequenceFlow);
    let link = g.connect(a, data, EdgeKind::DataAssociation);

    run(&mut g);

    assert_eq!(g.node(a).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(data).position, Point::new(20.0, -100.0));
    assert!(g.is_linked(link));
    assert_eq!(g.source_node(link), a);
    assert_eq!(g.port(g.edge(link).source()).side, PortSide::North);
    assert_eq!(g.port(g.edge(link).target()).side, PortSide::South);
    assert!(g.edge(link).bendpoints.is_empty());
    assert!(g.graph(root).nodes.contains(&data));
    assert_eq!(g.node(data).parent, None);
}

struct TwoPools {
    graph: LayoutGraph,
    first: NodeId,
    second: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    message: narwhal::graph::EdgeId,
}

fn two_pools() -> TwoPools {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let first = g.add_container(root, "customer", ElementType::Pool, Size::new(600.0, 200.0));
    let second = g.add_container(root, "shop", ElementType::Pool, Size::new(600.0, 200.0));
    let inner = g.nested_graph(first).unwrap();
    let a = node(&mut g, inner, "order", ElementType::Undefined);
    let b = node(&mut g, inner, "send", ElementType::Undefined);
    let other = g.nested_graph(second).unwrap();
    let c = node(&mut g, other, "receive", ElementType::Undefined);
    g.connect(a, b, EdgeKind::SequenceFlow);
    let message = g.connect(b, c, EdgeKind::MessageFlow);
    TwoPools {
        graph: g,
        first,
        second,
        a,
        b,
        c,
        message,
    }
}

#[test]
fn pools_stack_with_spacing_and_share_a_width() {
    let TwoPools {
        graph: mut g,
        first,
        second,
        a,
        b,
        c,
        message,
    } = two_pools();

    run(&mut g);

    assert_eq!(g.node(first).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(first).size, Size::new(330.0, 110.0));
    assert_eq!(g.node(second).position, Point::new(0.0, 135.0));
    assert_eq!(g.node(second).size, Size::new(330.0, 110.0));
    assert_eq!(g.node(a).position, Point::new(60.0, 15.0));
    assert_eq!(g.node(b).position, Point::new(200.0, 15.0));
    assert_eq!(g.node(c).position, Point::new(200.0, 150.0));
    assert_eq!(g.graph(g.root()).size, Size::new(340.0, 245.0));

    // message flow drops straight down from the sender to the receiver
    assert_eq!(g.source_node(message), b);
    assert_eq!(g.target_node(message), c);
    assert_eq!(g.port(g.edge(message).source()).side, PortSide::South);
    assert_eq!(g.port(g.edge(message).target()).side, PortSide::North);
    assert_eq!(g.port_point(g.edge(message).source()), Point::new(250.0, 95.0));
    assert_eq!(g.port_point(g.edge(message).target()), Point::new(250.0, 150.0));
    assert!(g.edge(message).bendpoints.is_empty());
    assert!(g.outgoing_edges(b).contains(&message));
}

struct Lanes {
    graph: LayoutGraph,
    pool: NodeId,
    top: NodeId,
    bottom: NodeId,
    a: NodeId,
    c: NodeId,
    handover: narwhal::graph::EdgeId,
}

fn lanes() -> Lanes {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let pool = g.add_container(root, "pool", ElementType::Pool, Size::new(600.0, 400.0));
    let pool_graph = g.nested_graph(pool).unwrap();
    let top = g.add_container(pool_graph, "sales", ElementType::Lane, Size::new(570.0, 200.0));
    let bottom = g.add_container(pool_graph, "stock", ElementType::Lane, Size::new(570.0, 200.0));
    let (upper, lower) = (g.nested_graph(top).unwrap(), g.nested_graph(bottom).unwrap());
    let a = node(&mut g, upper, "a", ElementType::Undefined);
    let b = node(&mut g, upper, "b", ElementType::Undefined);
    let c = node(&mut g, lower, "c", ElementType::Undefined);
    g.connect(a, b, EdgeKind::SequenceFlow);
    let handover = g.connect(b, c, EdgeKind::SequenceFlow);
    Lanes {
        graph: g,
        pool,
        top,
        bottom,
        a,
        c,
        handover,
    }
}

#[test]
fn lanes_stack_inside_their_pool() {
    let Lanes {
        graph: mut g,
        pool,
        top,
        bottom,
        a,
        c,
        handover,
    } = lanes();

    run(&mut g);

    assert_eq!(g.node(pool).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(pool).size, Size::new(470.0, 220.0));
    assert_eq!(g.node(top).position, Point::new(30.0, 0.0));
    assert_eq!(g.node(bottom).position, Point::new(30.0, 110.0));
    assert_eq!(g.node(top).size, Size::new(440.0, 110.0));
    assert_eq!(g.node(bottom).size, Size::new(440.0, 110.0));
    assert_eq!(g.node(a).position, Point::new(60.0, 15.0));
    assert_eq!(g.node(c).position, Point::new(340.0, 125.0));
    assert_eq!(
        g.edge(handover).bendpoints,
        vec![Point::new(320.0, 55.0), Point::new(320.0, 165.0)]
    );
    assert!(g.bounds(bottom).encloses(&g.bounds(c)));
}

#[test]
fn relative_mode_expresses_positions_in_the_container_frame() {
    let Lanes {
        graph: mut g,
        bottom,
        a,
        c,
        handover,
        ..
    } = lanes();

    let status = layout(&mut g, CoordinateMode::Relative, &CancelToken::new()).unwrap();

    assert_eq!(status, LayoutStatus::Completed);
    assert_eq!(g.node(a).position, Point::new(30.0, 15.0));
    assert_eq!(g.node(c).position, Point::new(310.0, 15.0));
    assert_eq!(g.node(bottom).position, Point::new(30.0, 110.0));
    assert_eq!(g.node(c).parent, Some(bottom));
    // routes live in the frame of the source's lane
    assert_eq!(
        g.edge(handover).bendpoints,
        vec![Point::new(290.0, 55.0), Point::new(290.0, 165.0)]
    );
    assert_eq!(g.port_point(g.edge(handover).target()), Point::new(310.0, 165.0));
}

#[test]
fn cancelled_layout_reports_and_leaves_no_layers() {
    let TwoPools { graph: mut g, a, .. } = two_pools();
    let cancel = CancelToken::new();
    cancel.cancel();

    let status = layout(&mut g, CoordinateMode::Absolute, &cancel).unwrap();

    assert_eq!(status, LayoutStatus::Cancelled);
    assert!(g.graph(g.root()).layers.is_empty());
    assert_eq!(g.node(a).layer, None);
}

#[test]
fn nesting_beyond_the_limit_is_an_error() {
    let mut g = LayoutGraph::new();
    let mut graph = g.root();
    for i in 0..3 {
        let sp = g.add_container(
            graph,
            format!("sp{i}"),
            ElementType::SubProcess,
            Size::new(300.0, 200.0),
        );
        graph = g.nested_graph(sp).unwrap();
    }
    node(&mut g, graph, "deep", ElementType::Undefined);
    let options = LayoutOptions {
        max_nesting_depth: 1,
        ..LayoutOptions::default()
    };

    let err = layout_with_options(&mut g, CoordinateMode::Absolute, &options, &CancelToken::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Graph(narwhal::graph::Error::NestingTooDeep { limit: 1, .. })
    ));
}

#[test]
fn invalid_options_are_rejected() {
    let err = LayoutOptions::from_json(r#"{"spacing": "wide"}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));

    let partial = LayoutOptions::from_json(r#"{"containerSpacing": 50}"#).unwrap();
    assert_eq!(partial.container_spacing, 50.0);
    assert_eq!(partial.spacing, LayoutOptions::default().spacing);
}

#[test]
fn artifact_between_two_neighbours_goes_above_the_first() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let a = node(&mut g, root, "a", ElementType::Undefined);
    let b = node(&mut g, root, "b", ElementType::Undefined);
    let data = node(&mut g, root, "data", ElementType::Artifact);
    g.connect(a, b, EdgeKind::SequenceFlow);
    let read = g.connect(a, data, EdgeKind::DataAssociation);
    let write = g.connect(data, b, EdgeKind::DataAssociation);

    run(&mut g);

    assert_eq!(g.node(b).position, Point::new(140.0, 0.0));
    assert_eq!(g.node(data).position, Point::new(20.0, -100.0));
    assert!(g.edge(read).bendpoints.is_empty());
    assert_eq!(g.port(g.edge(read).source()).side, PortSide::North);
    assert_eq!(g.port(g.edge(write).source()).side, PortSide::East);
    assert_eq!(g.port(g.edge(write).target()).side, PortSide::North);
    assert_eq!(g.edge(write).bendpoints, vec![Point::new(190.0, -60.0)]);
}

#[test]
fn annotation_moves_beside_a_boxed_in_neighbour() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let first = node(&mut g, root, "first", ElementType::Undefined);
    let middle = node(&mut g, root, "middle", ElementType::Undefined);
    let last = node(&mut g, root, "last", ElementType::Undefined);
    let note = node(&mut g, root, "note", ElementType::Artifact);
    let link = g.connect(middle, note, EdgeKind::Association);

    run(&mut g);

    assert_eq!(g.node(first).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(middle).position, Point::new(0.0, 120.0));
    assert_eq!(g.node(last).position, Point::new(0.0, 240.0));
    // above and below are taken, and there is no room left of the drawing
    assert_eq!(g.node(note).position, Point::new(120.0, 120.0));
    assert!(g.edge(link).bendpoints.is_empty());
    assert_eq!(g.port(g.edge(link).source()).side, PortSide::East);
    assert_eq!(g.port(g.edge(link).target()).side, PortSide::West);
}

#[test]
fn artifact_grows_its_lane_and_pushes_the_next_pool_down() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let pool = g.add_container(root, "pool", ElementType::Pool, Size::new(600.0, 400.0));
    let other = g.add_container(root, "other", ElementType::Pool, Size::new(600.0, 200.0));
    let pool_graph = g.nested_graph(pool).unwrap();
    let top = g.add_container(pool_graph, "office", ElementType::Lane, Size::new(570.0, 200.0));
    let bottom = g.add_container(pool_graph, "store", ElementType::Lane, Size::new(570.0, 200.0));
    let (upper, lower) = (g.nested_graph(top).unwrap(), g.nested_graph(bottom).unwrap());
    let a = node(&mut g, upper, "a", ElementType::Undefined);
    let b = node(&mut g, upper, "b", ElementType::Undefined);
    let data = node(&mut g, upper, "data", ElementType::Artifact);
    let c = node(&mut g, lower, "c", ElementType::Undefined);
    let other_graph = g.nested_graph(other).unwrap();
    let d = node(&mut g, other_graph, "d", ElementType::Undefined);
    g.connect(a, b, EdgeKind::SequenceFlow);
    g.connect(a, data, EdgeKind::DataAssociation);
    g.connect(data, b, EdgeKind::DataAssociation);

    run(&mut g);

    // the best spot is above `a`, so the upper lane grows by the artifact plus padding
    assert_eq!(g.node(top).position, Point::new(30.0, 0.0));
    assert_eq!(g.node(top).size.height, 210.0);
    assert_eq!(g.node(data).position, Point::new(80.0, 15.0));
    assert_eq!(g.node(data).parent, Some(top));
    assert!(g.bounds(top).encloses(&g.bounds(data)));
    assert_eq!(g.node(a).position.y, 115.0);

    assert_eq!(g.node(bottom).position.y, 210.0);
    assert_eq!(g.node(c).position.y, 225.0);
    assert_eq!(g.node(pool).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(pool).size.height, 320.0);
    assert_eq!(g.node(other).position.y, 345.0);
    assert_eq!(g.node(d).position.y, 360.0);
    assert_eq!(g.graph(root).size.height, g.bounds(other).bottom());
    assert_eq!(g.graph(root).size.height, 455.0);
}

#[test]
fn pools_keep_document_order_when_their_y_ties() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let first = g.add_container(root, "first", ElementType::Pool, Size::new(600.0, 400.0));
    let second = g.add_container(root, "second", ElementType::Pool, Size::new(600.0, 200.0));
    let pool_graph = g.nested_graph(first).unwrap();
    let top = g.add_container(pool_graph, "top", ElementType::Lane, Size::new(570.0, 200.0));
    let bottom = g.add_container(pool_graph, "bottom", ElementType::Lane, Size::new(570.0, 200.0));
    let (upper, lower) = (g.nested_graph(top).unwrap(), g.nested_graph(bottom).unwrap());
    let second_graph = g.nested_graph(second).unwrap();
    let a = node(&mut g, upper, "a", ElementType::Undefined);
    let b = node(&mut g, lower, "b", ElementType::Undefined);
    node(&mut g, second_graph, "c", ElementType::Undefined);
    g.connect(a, b, EdgeKind::SequenceFlow);

    run(&mut g);

    assert_eq!(g.node(first).position, Point::new(0.0, 0.0));
    assert_eq!(g.node(first).size.height, 220.0);
    assert_eq!(g.node(second).position, Point::new(0.0, 245.0));
    assert_eq!(g.graph(root).size.height, 355.0);
}

#[test]
fn message_label_sits_beside_a_straight_flow() {
    let TwoPools {
        graph: mut g,
        message,
        ..
    } = two_pools();
    g.add_edge_label(message, Size::new(40.0, 20.0), LabelPlacement::Center);

    run(&mut g);

    let edge = g.edge(message);
    assert!(edge.bendpoints.is_empty());
    assert!(edge.held_label.is_none());
    assert_eq!(edge.labels.len(), 1);
    // left of the flow, centered on the halfway shelf between 95 and 150
    assert_eq!(edge.labels[0].position, Point::new(200.0, 112.5));
}

#[test]
fn pools_with_lanes_and_a_message_flow_stay_apart() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let buyer = g.add_container(root, "buyer", ElementType::Pool, Size::new(600.0, 400.0));
    let seller = g.add_container(root, "seller", ElementType::Pool, Size::new(600.0, 200.0));
    let buyer_graph = g.nested_graph(buyer).unwrap();
    let main = g.add_container(buyer_graph, "main", ElementType::Lane, Size::new(570.0, 200.0));
    let side = g.add_container(buyer_graph, "side", ElementType::Lane, Size::new(570.0, 200.0));
    let (upper, lower) = (g.nested_graph(main).unwrap(), g.nested_graph(side).unwrap());
    let start = node(&mut g, upper, "start", ElementType::Event);
    let task = node(&mut g, upper, "task", ElementType::Undefined);
    let end = node(&mut g, upper, "end", ElementType::Event);
    let branch = node(&mut g, lower, "branch", ElementType::Undefined);
    let seller_graph = g.nested_graph(seller).unwrap();
    let reply = node(&mut g, seller_graph, "reply", ElementType::Undefined);
    g.connect(start, task, EdgeKind::SequenceFlow);
    g.connect(task, end, EdgeKind::SequenceFlow);
    g.connect(start, branch, EdgeKind::SequenceFlow);
    g.connect(branch, end, EdgeKind::SequenceFlow);
    let message = g.connect(task, reply, EdgeKind::MessageFlow);

    run(&mut g);

    assert_eq!(g.node(side).position.y, g.bounds(main).bottom());
    for (lane, children) in [(main, vec![start, task, end]), (side, vec![branch])] {
        for n in children {
            assert!(g.bounds(lane).encloses(&g.bounds(n)));
        }
    }
    assert!(g.bounds(seller).encloses(&g.bounds(reply)));
    assert!(!g.bounds(buyer).intersects(&g.bounds(seller)));
    assert!(g.node(seller).position.y > g.bounds(buyer).bottom());

    assert_eq!(g.source_node(message), task);
    assert_eq!(g.target_node(message), reply);
    let start_x = g.port_point(g.edge(message).source()).x;
    let end_x = g.port_point(g.edge(message).target()).x;
    let expected = if start_x == end_x { 0 } else { 2 };
    assert_eq!(g.edge(message).bendpoints.len(), expected);
}

#[test]
fn task_with_boundary_event_and_data_object() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let task = node(&mut g, root, "task", ElementType::Undefined);
    let end = node(&mut g, root, "end", ElementType::Event);
    let timer = node(&mut g, root, "timer", ElementType::Event);
    let handler = node(&mut g, root, "handler", ElementType::Undefined);
    let data = node(&mut g, root, "data", ElementType::Artifact);
    g.connect(start, task, EdgeKind::SequenceFlow);
    g.connect(task, end, EdgeKind::SequenceFlow);
    g.attach_boundary_event(task, timer);
    g.connect(timer, handler, EdgeKind::SequenceFlow);
    g.connect(task, data, EdgeKind::DataAssociation);

    run(&mut g);

    let t = g.bounds(task);
    let d = g.bounds(data);
    assert_eq!(d.center().x, t.center().x);
    assert_eq!(d.bottom(), t.y - 20.0);
    assert_eq!(g.bounds(timer).center().y, t.bottom());
    assert!(!d.intersects(&g.bounds(timer)));
}

#[test]
fn three_branches_split_over_both_corners() {
    let mut g = LayoutGraph::new();
    let root = g.root();
    let start = node(&mut g, root, "start", ElementType::Event);
    let split = node(&mut g, root, "split", ElementType::Gateway);
    let join = node(&mut g, root, "join", ElementType::Gateway);
    let end = node(&mut g, root, "end", ElementType::Event);
    g.connect(start, split, EdgeKind::SequenceFlow);
    let mut branches = Vec::new();
    for id in ["upper", "level", "lower"] {
        let task = node(&mut g, root, id, ElementType::Undefined);
        branches.push(g.connect(split, task, EdgeKind::SequenceFlow));
        g.connect(task, join, EdgeKind::SequenceFlow);
    }
    g.connect(join, end, EdgeKind::SequenceFlow);

    run(&mut g);

    let diamond = g.bounds(split);
    let targets: Vec<f64> = branches.iter().map(|&e| center_y(&g, g.target_node(e))).collect();
    assert!(targets[0] < diamond.center().y);
    assert_eq!(targets[1], diamond.center().y);
    assert!(targets[2] > diamond.center().y);
    assert_eq!(center_y(&g, join), diamond.center().y);

    let sides: Vec<PortSide> = branches
        .iter()
        .map(|&e| g.port(g.edge(e).source()).side)
        .collect();
    assert_eq!(sides, vec![PortSide::North, PortSide::East, PortSide::South]);
    // the level branch runs straight across
    assert!(g.edge(branches[1]).bendpoints.is_empty());
    for &e in [branches[0], branches[2]].iter() {
        let points = &g.edge(e).bendpoints;
        assert!(points.iter().all(|p| p.x == diamond.center().x));
        assert!(points.iter().all(|p| p.y <= diamond.y || p.y >= diamond.bottom()));
    }
}
