//! Wire shape of a BPMN process graph as submitted by callers.
//!
//! The transport that carries these is out of scope here; this module only
//! pins the JSON contract. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::process::NodeKind;

/// Identifier shared by every BPMN element and every Petri-net node.
pub type ElementId = i64;

// ─── Top-level DTO ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmnDto {
    pub id: ElementId,
    pub name: String,
    pub start_event: StartEventDto,
    pub end_events: Vec<EndEventDto>,
    #[serde(default)]
    pub intermediate_events: Vec<IntermediateEventDto>,
    #[serde(default)]
    pub tasks: Vec<TaskDto>,
    #[serde(default)]
    pub parallel_gateways: Vec<ParallelGatewayDto>,
    #[serde(default)]
    pub exclusive_gateways: Vec<ExclusiveGatewayDto>,
    pub sequence_flows: Vec<SequenceFlowDto>,
}

// ─── Nodes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEventDto {
    pub id: ElementId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndEventDto {
    pub id: ElementId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateEventDto {
    pub id: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: ElementId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelGatewayDto {
    pub id: ElementId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusiveGatewayDto {
    pub id: ElementId,
}

// ─── Flows ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceFlowDto {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_id: ElementId,
    pub target_id: ElementId,
}

// ─── Helpers ──────────────────────────────────────────────────

impl BpmnDto {
    /// All node ids with their kind, in the fixed section order of the wire
    /// shape (start, ends, intermediates, tasks, parallel, exclusive). The
    /// validator relies on this order being deterministic.
    pub fn nodes(&self) -> impl Iterator<Item = (ElementId, NodeKind)> + '_ {
        std::iter::once((self.start_event.id, NodeKind::StartEvent))
            .chain(self.end_events.iter().map(|e| (e.id, NodeKind::EndEvent)))
            .chain(
                self.intermediate_events
                    .iter()
                    .map(|e| (e.id, NodeKind::IntermediateEvent)),
            )
            .chain(self.tasks.iter().map(|t| (t.id, NodeKind::Task)))
            .chain(
                self.parallel_gateways
                    .iter()
                    .map(|g| (g.id, NodeKind::ParallelGateway)),
            )
            .chain(
                self.exclusive_gateways
                    .iter()
                    .map(|g| (g.id, NodeKind::ExclusiveGateway)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names_are_camel_case() {
        let json = r#"{
            "id": 0,
            "name": "order",
            "startEvent": { "id": 1 },
            "endEvents": [{ "id": 2 }],
            "intermediateEvents": [],
            "tasks": [{ "id": 3, "name": "ship" }],
            "parallelGateways": [],
            "exclusiveGateways": [],
            "sequenceFlows": [
                { "id": 4, "name": "f4", "sourceId": 1, "targetId": 3 },
                { "id": 5, "sourceId": 3, "targetId": 2 }
            ]
        }"#;
        let dto: BpmnDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.start_event.id, 1);
        assert_eq!(dto.tasks[0].name, "ship");
        assert_eq!(dto.sequence_flows[1].name, None);
        assert_eq!(dto.sequence_flows[0].source_id, 1);

        let back = serde_json::to_string(&dto).unwrap();
        assert!(back.contains("\"startEvent\""));
        assert!(back.contains("\"sequenceFlows\""));
        assert!(back.contains("\"sourceId\""));
        // Absent flow names are omitted, not serialized as null.
        assert!(!back.contains("null"));
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let json = r#"{
            "id": 0,
            "name": "minimal",
            "startEvent": { "id": 1 },
            "endEvents": [{ "id": 2 }],
            "sequenceFlows": [{ "id": 3, "sourceId": 1, "targetId": 2 }]
        }"#;
        let dto: BpmnDto = serde_json::from_str(json).unwrap();
        assert!(dto.tasks.is_empty());
        assert!(dto.parallel_gateways.is_empty());
        assert_eq!(dto.nodes().count(), 2);
    }

    #[test]
    fn nodes_iterates_in_section_order() {
        let dto = BpmnDto {
            id: 0,
            name: "g".into(),
            start_event: StartEventDto { id: 1 },
            end_events: vec![EndEventDto { id: 2 }],
            intermediate_events: vec![IntermediateEventDto { id: 3 }],
            tasks: vec![TaskDto {
                id: 4,
                name: "t".into(),
            }],
            parallel_gateways: vec![ParallelGatewayDto { id: 5 }],
            exclusive_gateways: vec![ExclusiveGatewayDto { id: 6 }],
            sequence_flows: vec![],
        };
        let ids: Vec<ElementId> = dto.nodes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            dto.nodes().map(|(_, k)| k).collect::<Vec<_>>(),
            vec![
                NodeKind::StartEvent,
                NodeKind::EndEvent,
                NodeKind::IntermediateEvent,
                NodeKind::Task,
                NodeKind::ParallelGateway,
                NodeKind::ExclusiveGateway,
            ]
        );
    }
}
