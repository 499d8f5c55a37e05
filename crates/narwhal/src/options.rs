//! Layout configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Tunables for one layout run. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Base distance between nodes, and between layers.
    pub spacing: f64,
    /// Edge-to-edge distance as a fraction of `spacing`.
    pub edge_spacing_factor: f64,
    pub container_padding_top_bottom: f64,
    pub container_padding_left_right: f64,
    /// Vertical gap between pools.
    pub container_spacing: f64,
    /// Horizontal gap between boundary events sharing a host.
    pub boundary_event_gap: f64,
    /// Minimum distance of gateway stub bendpoints from the gateway symbol.
    pub gateway_clearance: f64,
    /// Gap between a message-flow label and its route.
    pub message_label_gap: f64,
    /// Extra width added to diagrams with pools or lanes after layout.
    pub graph_width_margin: f64,
    pub crossing_sweeps: usize,
    pub placement_iterations: usize,
    pub max_nesting_depth: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            spacing: 40.0,
            edge_spacing_factor: 0.5,
            container_padding_top_bottom: 15.0,
            container_padding_left_right: 30.0,
            container_spacing: 25.0,
            boundary_event_gap: 15.0,
            gateway_clearance: 5.0,
            message_label_gap: 10.0,
            graph_width_margin: 100.0,
            crossing_sweeps: 4,
            placement_iterations: 8,
            max_nesting_depth: 32,
        }
    }
}

/// Edge spacing never drops below this, whatever the factor.
const MIN_EDGE_SPACING: f64 = 2.0;

impl LayoutOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn edge_spacing(&self) -> f64 {
        (self.spacing * self.edge_spacing_factor).max(MIN_EDGE_SPACING)
    }
}
