//! Layout entry points.
//!
//! A layout runs the same three processor sequences everywhere: part 1 breaks cycles and
//! assigns layers, part 2 orders the layers and places nodes vertically, part 3 routes edges and
//! runs the BPMN post-processing. Diagrams without pools or lanes run them once over all flow
//! nodes. With pools and lanes, part 1 runs over all flow nodes, part 2 once per container on
//! its local share of the layers, and part 3 once more over everything.

mod cleanup;
mod containers;
mod dive;
mod sub_processes;

use crate::bpmn::{
    ArtifactIntermediateProcessor, ArtifactPostProcessor, ArtifactPreProcessor,
    BoundaryEventIntermediateProcessor1, BoundaryEventIntermediateProcessor2,
    BoundaryEventPostProcessor, BoundaryEventPreProcessor, ContainerPostProcessor,
    ContainerPreProcessor, GatewayRouter, MessageFlowIntermediateProcessor,
    MessageFlowPostProcessor, MessageFlowPreProcessor, PortPostProcessor, PortPreProcessor,
};
use crate::cancel::CancelToken;
use crate::context::LayoutContext;
use crate::error::Result;
use crate::options::LayoutOptions;
use crate::phases::{
    EdgeLabelPlacer, GreedyCycleBreaker, LayerSizeCalculator, LayerSweepCrossingMinimizer,
    LongEdgeJoiner, LongEdgeSplitter, LongestPathLayerer, NodePlacer, OrthogonalRouter,
    PortSideProcessor, ReversedEdgeRestorer,
};
use crate::processor::{LayoutStatus, Processor, run_processors};
use crate::relative::make_relative;
use narwhal_graph::LayoutGraph;

/// Coordinate system of the finished layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateMode {
    /// Every position in the diagram's frame.
    #[default]
    Absolute,
    /// Every position relative to the container holding the node.
    Relative,
}

// The order matters: the boundary-event and message-flow processors rely on the state the
// processors before them leave behind.
const PART_ONE: &[&dyn Processor] = &[
    &ArtifactPreProcessor,
    &MessageFlowPreProcessor,
    &BoundaryEventPreProcessor,
    &GreedyCycleBreaker,
    &PortSideProcessor,
    &LongestPathLayerer,
    &MessageFlowIntermediateProcessor,
    &BoundaryEventIntermediateProcessor1,
    &LongEdgeSplitter,
];

// Must not move nodes between layers.
const PART_TWO: &[&dyn Processor] = &[
    &LayerSweepCrossingMinimizer,
    &ArtifactIntermediateProcessor,
    &PortPreProcessor,
    &NodePlacer,
    &LayerSizeCalculator,
    &BoundaryEventIntermediateProcessor2,
];

const PART_THREE: &[&dyn Processor] = &[
    &PortPostProcessor,
    &ContainerPreProcessor,
    // positions are absolute from here on
    &LayerSizeCalculator,
    &OrthogonalRouter,
    &LongEdgeJoiner,
    &ReversedEdgeRestorer,
    &EdgeLabelPlacer,
    &BoundaryEventPostProcessor,
    &ArtifactPostProcessor,
    &ContainerPostProcessor,
    // nodes are final from here on
    &GatewayRouter,
    &MessageFlowPostProcessor,
];

/// Lays out `graph` in place with the default options.
pub fn layout(
    graph: &mut LayoutGraph,
    mode: CoordinateMode,
    cancel: &CancelToken,
) -> Result<LayoutStatus> {
    layout_with_options(graph, mode, &LayoutOptions::default(), cancel)
}

/// Lays out `graph` in place.
///
/// A cancelled run returns [`LayoutStatus::Cancelled`]; the graph is then left layerless but
/// its geometry is partial.
pub fn layout_with_options(
    graph: &mut LayoutGraph,
    mode: CoordinateMode,
    options: &LayoutOptions,
    cancel: &CancelToken,
) -> Result<LayoutStatus> {
    graph.validate(options.max_nesting_depth)?;
    let tree = dive::dive(graph, options.max_nesting_depth)?;
    tracing::debug!(
        flow_nodes = tree.flow_nodes.len(),
        containers = tree.containers.len(),
        sub_processes = tree.sub_processes.len(),
        ?mode,
        "layout start"
    );

    let root = graph.root();
    let status = match sub_processes::layout_all(graph, &tree, options, cancel)? {
        LayoutStatus::Cancelled => LayoutStatus::Cancelled,
        LayoutStatus::Completed => {
            graph.graph_mut(root).layerless = tree.flow_nodes.clone();
            let mut cx = LayoutContext::new(root, options, cancel);
            if tree.containers.is_empty() {
                run_parts(graph, &mut cx)?
            } else {
                cx.containers = tree.containers.clone();
                containers::layout(graph, &mut cx)?
            }
        }
    };

    cleanup::release_layers(graph, root);
    if status == LayoutStatus::Cancelled {
        tracing::debug!("layout cancelled, geometry is partial");
        return Ok(status);
    }
    cleanup::place_sub_process_content(graph, &tree, options);
    if mode == CoordinateMode::Relative {
        make_relative(graph, options.max_nesting_depth)?;
    }
    tracing::debug!("layout done");
    Ok(LayoutStatus::Completed)
}

/// Runs all three parts over the working graph of `cx`.
fn run_parts(graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<LayoutStatus> {
    for (part, processors) in [(1, PART_ONE), (2, PART_TWO), (3, PART_THREE)] {
        tracing::debug!(part, graph = cx.graph.index(), "layout part");
        if run_processors(processors, graph, cx)? == LayoutStatus::Cancelled {
            return Ok(LayoutStatus::Cancelled);
        }
    }
    Ok(LayoutStatus::Completed)
}
