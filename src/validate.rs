//! Structural validation of a submitted BPMN graph.
//!
//! Runs before any model object is constructed; the transformer assumes every
//! rule here holds and performs no redundant checks of its own. The checks
//! run in a fixed order and the first violation is returned, so a given bad
//! input always produces the same rejection.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::dto::{BpmnDto, ElementId};
use crate::error::ValidationError;
use crate::process::NodeKind;

/// Check every structural rule against the raw dto.
///
/// Rules, in order:
/// 1. at least one end event
/// 2. ids unique across graph, nodes, and flows
/// 3. non-empty names unique across graph name and task names
/// 4. no two flows share a (source, target) pair
/// 5. flow endpoints exist and are distinct (no self-loops)
/// 6. no flow targets the start event
/// 7. no flow leaves an end event
/// 8. every node but the start has an incoming flow
/// 9. every node but the ends has an outgoing flow
/// 10. only gateways merge (more than one incoming flow)
/// 11. only gateways fork (more than one outgoing flow)
pub fn validate(dto: &BpmnDto) -> Result<(), ValidationError> {
    if dto.end_events.is_empty() {
        return Err(ValidationError::MissingEndEvent);
    }

    let mut seen_ids = HashSet::new();
    let all_ids = dto
        .nodes()
        .map(|(id, _)| id)
        .chain(std::iter::once(dto.id))
        .chain(dto.sequence_flows.iter().map(|f| f.id));
    for id in all_ids {
        if !seen_ids.insert(id) {
            return Err(ValidationError::DuplicateId { id });
        }
    }

    let mut seen_names = HashSet::new();
    let names = std::iter::once(dto.name.as_str()).chain(dto.tasks.iter().map(|t| t.name.as_str()));
    for name in names.filter(|n| !n.is_empty()) {
        if !seen_names.insert(name) {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            });
        }
    }

    let mut seen_pairs = HashSet::new();
    for flow in &dto.sequence_flows {
        if !seen_pairs.insert((flow.source_id, flow.target_id)) {
            return Err(ValidationError::DuplicateFlow {
                source_id: flow.source_id,
                target_id: flow.target_id,
            });
        }
    }

    let kinds: HashMap<ElementId, NodeKind> = dto.nodes().collect();
    for flow in &dto.sequence_flows {
        for endpoint in [flow.source_id, flow.target_id] {
            if !kinds.contains_key(&endpoint) {
                return Err(ValidationError::DanglingFlowEndpoint {
                    flow_id: flow.id,
                    node_id: endpoint,
                });
            }
        }
        if flow.source_id == flow.target_id {
            return Err(ValidationError::SelfLoopFlow { flow_id: flow.id });
        }
    }

    for flow in &dto.sequence_flows {
        if flow.target_id == dto.start_event.id {
            return Err(ValidationError::FlowIntoStart { flow_id: flow.id });
        }
    }
    let end_ids: HashSet<ElementId> = dto.end_events.iter().map(|e| e.id).collect();
    for flow in &dto.sequence_flows {
        if end_ids.contains(&flow.source_id) {
            return Err(ValidationError::FlowOutOfEnd { flow_id: flow.id });
        }
    }

    // Degree counting per node, so the error can name the violating node.
    let mut incoming: HashMap<ElementId, usize> = HashMap::new();
    let mut outgoing: HashMap<ElementId, usize> = HashMap::new();
    for flow in &dto.sequence_flows {
        *outgoing.entry(flow.source_id).or_default() += 1;
        *incoming.entry(flow.target_id).or_default() += 1;
    }

    for (node_id, kind) in dto.nodes() {
        if kind != NodeKind::StartEvent && !incoming.contains_key(&node_id) {
            return Err(ValidationError::UnreachableOrUnderconnectedNode { node_id });
        }
    }
    for (node_id, kind) in dto.nodes() {
        if kind != NodeKind::EndEvent && !outgoing.contains_key(&node_id) {
            return Err(ValidationError::MissingOutgoing { node_id });
        }
    }
    for (node_id, kind) in dto.nodes() {
        if !kind.allows_multiple_incoming() && incoming.get(&node_id).copied().unwrap_or(0) > 1 {
            return Err(ValidationError::IllegalMultiIncoming { node_id });
        }
    }
    for (node_id, kind) in dto.nodes() {
        if !kind.allows_multiple_outgoing() && outgoing.get(&node_id).copied().unwrap_or(0) > 1 {
            return Err(ValidationError::IllegalMultiOutgoing { node_id });
        }
    }

    debug!(
        bpmn = dto.id,
        nodes = kinds.len(),
        flows = dto.sequence_flows.len(),
        "BPMN graph passed structural validation"
    );
    Ok(())
}
