//! BPMN-specific processors wrapped around the classic phases.

pub mod artifacts;
mod boundary_events;
mod containers;
mod gateway;
mod message_flows;
mod ports;

pub use artifacts::{
    Artifact, ArtifactIntermediateProcessor, ArtifactPostProcessor, ArtifactPreProcessor,
};
pub use boundary_events::{
    BoundaryEventIntermediateProcessor1, BoundaryEventIntermediateProcessor2,
    BoundaryEventPostProcessor, BoundaryEventPreProcessor,
};
pub use containers::{ContainerPostProcessor, ContainerPreProcessor};
pub use gateway::GatewayRouter;
pub use message_flows::{
    MessageFlowIntermediateProcessor, MessageFlowPostProcessor, MessageFlowPreProcessor,
};
pub use ports::{PortPostProcessor, PortPreProcessor};
