#![forbid(unsafe_code)]

//! Layered auto-layout for BPMN process diagrams.
//!
//! Sequence flow runs left to right through layers; pools and lanes are stacked vertically and
//! sized around their content; expanded sub-processes are laid out on their own and placed as
//! single nodes. Boundary events, message flows and artifacts (data objects, text annotations)
//! get dedicated handling around the classic layered phases.
//!
//! ```no_run
//! use narwhal::graph::{EdgeKind, ElementType, LayoutGraph, Size};
//! use narwhal::{CancelToken, CoordinateMode, layout};
//!
//! let mut g = LayoutGraph::new();
//! let root = g.root();
//! let start = g.add_node(root, "start", ElementType::Event, ElementType::Event.default_size());
//! let task = g.add_node(root, "task", ElementType::Undefined, Size::new(100.0, 80.0));
//! g.connect(start, task, EdgeKind::SequenceFlow);
//! layout(&mut g, CoordinateMode::Absolute, &CancelToken::new())?;
//! # Ok::<(), narwhal::Error>(())
//! ```

pub use narwhal_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bpmn;
pub mod cancel;
pub mod context;
pub mod error;
pub mod local_graph;
pub mod options;
pub mod phases;
pub mod pipeline;
pub mod processor;
pub mod relative;
mod util;

pub use cancel::CancelToken;
pub use context::LayoutContext;
pub use error::{Error, Result};
pub use options::LayoutOptions;
pub use pipeline::{CoordinateMode, layout, layout_with_options};
pub use processor::{LayoutStatus, Processor, run_processors};
