//! Rejection reasons for structurally ill-formed BPMN input.

use thiserror::Error;

use crate::dto::ElementId;

/// A structural rule the submitted BPMN graph violates.
///
/// Validation stops at the first violated rule, checked in a fixed order, so
/// one submission yields one error. All of these mean the input must be fixed
/// by the caller; none are retryable and none indicate a fault in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("BPMN must have at least one end event")]
    MissingEndEvent,

    #[error("ids within a single BPMN should all be unique, but {id} appears more than once")]
    DuplicateId { id: ElementId },

    #[error("names within a single BPMN should all be unique, but '{name}' appears more than once")]
    DuplicateName { name: String },

    #[error("more than one sequence flow connects node {source_id} to node {target_id}")]
    DuplicateFlow {
        source_id: ElementId,
        target_id: ElementId,
    },

    #[error("sequence flow {flow_id} references node id {node_id}, which does not exist")]
    DanglingFlowEndpoint {
        flow_id: ElementId,
        node_id: ElementId,
    },

    #[error("sequence flow {flow_id} has identical source and target ids")]
    SelfLoopFlow { flow_id: ElementId },

    #[error("sequence flow {flow_id} targets the start event")]
    FlowIntoStart { flow_id: ElementId },

    #[error("sequence flow {flow_id} leaves an end event")]
    FlowOutOfEnd { flow_id: ElementId },

    #[error("node {node_id} has no incoming sequence flow; every node except the start event needs at least one")]
    UnreachableOrUnderconnectedNode { node_id: ElementId },

    #[error("node {node_id} has no outgoing sequence flow; every node except end events needs at least one")]
    MissingOutgoing { node_id: ElementId },

    #[error("node {node_id} has more than one incoming sequence flow but is not a gateway")]
    IllegalMultiIncoming { node_id: ElementId },

    #[error("node {node_id} has more than one outgoing sequence flow but is not a gateway")]
    IllegalMultiOutgoing { node_id: ElementId },
}
