//! Per-run pipeline state.

use crate::bpmn::artifacts::Artifact;
use crate::cancel::CancelToken;
use crate::options::LayoutOptions;
use narwhal_graph::{EdgeId, GraphId, NodeId};

/// Everything the processors share during one pass of the three-part pipeline over `graph`.
///
/// Sub-process layouts get a fresh context; the top-level diagram keeps one context for all
/// three parts so state collected by a pre-processor is still there for its post-processor.
#[derive(Debug)]
pub struct LayoutContext<'a> {
    /// Graph whose layerless nodes and layers the processors work on.
    pub graph: GraphId,
    pub options: &'a LayoutOptions,
    pub cancel: &'a CancelToken,
    pub message_flows: Vec<EdgeId>,
    pub boundary_events: Vec<NodeId>,
    pub artifacts: Vec<Artifact>,
    /// Pools and lanes holding flow nodes, in ascending y. Empty on the simple path.
    pub containers: Vec<NodeId>,
    /// Container whose local graph is currently laid out in part 2.
    pub scope: Option<NodeId>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(graph: GraphId, options: &'a LayoutOptions, cancel: &'a CancelToken) -> Self {
        Self {
            graph,
            options,
            cancel,
            message_flows: Vec::new(),
            boundary_events: Vec::new(),
            artifacts: Vec::new(),
            containers: Vec::new(),
            scope: None,
        }
    }
}
