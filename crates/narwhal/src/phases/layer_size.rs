use crate::context::LayoutContext;
use crate::error::Result;
use crate::processor::Processor;
use narwhal_graph::{LayoutGraph, Size};

/// Records each layer's width (its widest node) and the height of the laid-out column stack.
pub struct LayerSizeCalculator;

impl Processor for LayerSizeCalculator {
    fn name(&self) -> &'static str {
        "layer-size-calculator"
    }

    fn process(&self, graph: &mut LayoutGraph, cx: &mut LayoutContext<'_>) -> Result<()> {
        let mut top = f64::INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for l in graph.graph(cx.graph).layers.clone() {
            let mut size = Size::ZERO;
            let (mut layer_top, mut layer_bottom) = (f64::INFINITY, f64::NEG_INFINITY);
            for &n in &graph.layer(l).nodes {
                let b = graph.bounds(n);
                size.width = size.width.max(b.width);
                layer_top = layer_top.min(b.y);
                layer_bottom = layer_bottom.max(b.bottom());
            }
            if layer_top.is_finite() {
                size.height = layer_bottom - layer_top;
                top = top.min(layer_top);
                bottom = bottom.max(layer_bottom);
            }
            graph.layer_mut(l).size = size;
        }
        if top.is_finite() {
            graph.graph_mut(cx.graph).size.height = bottom - top;
        }
        Ok(())
    }
}
