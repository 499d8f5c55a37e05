use crate::context::LayoutContext;
use crate::error::Result;
use narwhal_graph::LayoutGraph;

/// One step of the layered pipeline.
///
/// Processors are stateless; anything that must survive between steps lives in the
/// [`LayoutContext`].
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
    Completed,
    /// Stopped early on request; the geometry is partial and should be discarded.
    Cancelled,
}

/// Runs `processors` in order, checking the cancellation token before each one.
pub fn run_processors(
    processors: &[&dyn Processor],
    graph: &mut LayoutGraph,
    cx: &mut LayoutContext<'_>,
) -> Result<LayoutStatus> {
    for p in processors {
        if cx.cancel.is_cancelled() {
            tracing::debug!(before = p.name(), "layout cancelled");
            return Ok(LayoutStatus::Cancelled);
        }
        tracing::trace!(processor = p.name(), graph = cx.graph.index(), "run");
        p.process(graph, cx)?;
    }
    Ok(LayoutStatus::Completed)
}
