//! Default implementations of the classic layered-layout phases.

mod crossing;
mod cycle_breaker;
mod edge_labels;
mod layer_size;
mod layerer;
mod long_edge;
mod placer;
mod port_side;
mod reversed;
mod router;

pub use crossing::{LayerSweepCrossingMinimizer, cross_count};
pub use cycle_breaker::{GreedyCycleBreaker, greedy_fas};
pub use edge_labels::EdgeLabelPlacer;
pub use layer_size::LayerSizeCalculator;
pub use layerer::{LongestPathLayerer, longest_path_ranks};
pub use long_edge::{LongEdgeJoiner, LongEdgeSplitter};
pub use placer::NodePlacer;
pub use port_side::PortSideProcessor;
pub use reversed::ReversedEdgeRestorer;
pub use router::OrthogonalRouter;
