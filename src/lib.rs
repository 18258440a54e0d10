//! Rewrites a validated BPMN-style process graph into an equivalent Petri
//! net whose firing semantics preserve the source's control flow: sequencing,
//! parallel fork/join, exclusive choice/merge, and loops.
//!
//! The pipeline is a one-shot, pure transformation:
//!
//! ```text
//! BpmnDto ── validate ──> ProcessGraph ── transform ──> PetriNet
//! ```
//!
//! Validation proves the structural invariants (unique ids, gateway-only
//! forks and merges, no dangling flows, ...) before any graph object exists;
//! the transformer relies on them and does no defensive re-checking. Each
//! call owns its own state, so concurrent calls need no coordination.
//!
//! ```
//! use bpmn_petri::{transform_bpmn_to_petri_net, BpmnDto};
//!
//! let dto: BpmnDto = serde_json::from_str(
//!     r#"{
//!         "id": 0, "name": "hello",
//!         "startEvent": { "id": 1 },
//!         "endEvents": [{ "id": 2 }],
//!         "tasks": [{ "id": 3, "name": "greet" }],
//!         "sequenceFlows": [
//!             { "id": 4, "sourceId": 1, "targetId": 3 },
//!             { "id": 5, "sourceId": 3, "targetId": 2 }
//!         ]
//!     }"#,
//! )
//! .unwrap();
//! let net = transform_bpmn_to_petri_net(&dto).unwrap();
//! assert_eq!(net.start_place().unwrap().number_of_tokens, 1);
//! ```

pub mod dto;
pub mod error;
pub mod petri;
pub mod process;
pub mod transform;
pub mod validate;

pub use dto::{BpmnDto, ElementId, SequenceFlowDto};
pub use error::ValidationError;
pub use petri::{Arc, PetriNet, Place, Transition};
pub use process::{NodeKind, ProcessGraph, ProcessNode};

/// Validate a raw BPMN description, build the process graph, and lower it to
/// a Petri net.
///
/// Fails with the first violated structural rule; the caller must fix the
/// input, retrying unchanged cannot succeed. On success the returned net is
/// complete and owned by the caller.
pub fn transform_bpmn_to_petri_net(dto: &BpmnDto) -> Result<PetriNet, ValidationError> {
    validate::validate(dto)?;
    let graph = ProcessGraph::from_dto(dto);
    Ok(transform::transform(&graph))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_accepts_json_and_produces_the_wire_shape() {
        let dto: BpmnDto = serde_json::from_str(
            r#"{
                "id": 0, "name": "order",
                "startEvent": { "id": 1 },
                "endEvents": [{ "id": 2 }],
                "tasks": [{ "id": 3, "name": "ship" }],
                "sequenceFlows": [
                    { "id": 4, "sourceId": 1, "targetId": 3 },
                    { "id": 5, "sourceId": 3, "targetId": 2 }
                ]
            }"#,
        )
        .unwrap();

        let net = transform_bpmn_to_petri_net(&dto).unwrap();
        assert_eq!(net.name, "order_From-BPMN-To-Petri-Net");
        assert!(net.transitions.iter().any(|t| t.name == "ship"));

        let json = serde_json::to_value(&net).unwrap();
        assert!(json["places"][0]["numberOfTokens"].is_number());
        assert!(json["arcs"][0]["sourceNode"].is_number());
    }

    #[test]
    fn pipeline_rejects_before_building_anything() {
        let dto: BpmnDto = serde_json::from_str(
            r#"{
                "id": 0, "name": "broken",
                "startEvent": { "id": 1 },
                "endEvents": [],
                "sequenceFlows": []
            }"#,
        )
        .unwrap();
        assert_eq!(
            transform_bpmn_to_petri_net(&dto),
            Err(ValidationError::MissingEndEvent)
        );
    }

    #[test]
    fn rejection_reason_is_human_readable() {
        let err = ValidationError::DanglingFlowEndpoint {
            flow_id: 7,
            node_id: 99,
        };
        assert_eq!(
            err.to_string(),
            "sequence flow 7 references node id 99, which does not exist"
        );
    }
}
