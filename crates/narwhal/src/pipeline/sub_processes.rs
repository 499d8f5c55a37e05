//! Independent layouts of expanded sub-processes.

use super::cleanup::{release_layers, shift_node};
use super::dive::Tree;
use super::run_parts;
use crate::cancel::CancelToken;
use crate::context::LayoutContext;
use crate::error::Result;
use crate::options::LayoutOptions;
use crate::processor::LayoutStatus;
use narwhal_graph::{LayoutGraph, Point, Size};

/// Lays out the content of every sub-process, innermost first, and sizes each sub-process to
/// its content's bounding box plus padding.
///
/// Content coordinates stay relative to the sub-process's content area until the surrounding
/// layout is done.
pub(super) fn layout_all(
    graph: &mut LayoutGraph,
    tree: &Tree,
    options: &LayoutOptions,
    cancel: &CancelToken,
) -> Result<LayoutStatus> {
    for &sp in &tree.sub_processes {
        if cancel.is_cancelled() {
            tracing::debug!("layout cancelled between sub-processes");
            return Ok(LayoutStatus::Cancelled);
        }
        let Some(g) = graph.nested_graph(sp) else {
            continue;
        };
        tracing::debug!(sub_process = %graph.node(sp).id, "sub-process layout");

        graph.graph_mut(g).layerless = graph.graph(g).nodes.clone();
        let mut cx = LayoutContext::new(g, options, cancel);
        let status = run_parts(graph, &mut cx)?;
        release_layers(graph, g);
        if status == LayoutStatus::Cancelled {
            return Ok(status);
        }

        // artifacts may sit above or left of the layered content
        let children = graph.graph(g).nodes.clone();
        let Some(bbox) = children
            .iter()
            .map(|&n| graph.bounds(n))
            .reduce(|a, b| a.union(&b))
        else {
            continue;
        };
        let offset = Point::new(-bbox.x, -bbox.y);
        if offset != Point::ZERO {
            for &n in &children {
                shift_node(graph, n, offset);
            }
        }
        graph.graph_mut(g).size = Size::new(bbox.width, bbox.height);
        graph.node_mut(sp).size = Size::new(
            bbox.width + 2.0 * options.container_padding_left_right,
            bbox.height + 2.0 * options.container_padding_top_bottom,
        );
    }
    Ok(LayoutStatus::Completed)
}
