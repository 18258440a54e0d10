//! In-memory process graph: typed nodes connected by sequence flows.
//!
//! Built from a [`BpmnDto`] that already passed [`crate::validate::validate`].
//! Nodes and flows live in a [`petgraph`] graph, so adjacency is held as
//! dense indices rather than owned references; loops through exclusive
//! gateways are plain back-edges.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::dto::{
    BpmnDto, ElementId, EndEventDto, ExclusiveGatewayDto, IntermediateEventDto,
    ParallelGatewayDto, SequenceFlowDto, StartEventDto, TaskDto,
};

// ─── Node variants ────────────────────────────────────────────

/// The closed set of node kinds, without per-variant payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    IntermediateEvent,
    Task,
    ParallelGateway,
    ExclusiveGateway,
}

impl NodeKind {
    /// Whether more than one incoming flow is allowed. Only gateways may act
    /// as merge points.
    pub fn allows_multiple_incoming(self) -> bool {
        self.is_gateway()
    }

    /// Whether more than one outgoing flow is allowed. Only gateways may act
    /// as fork points.
    pub fn allows_multiple_outgoing(self) -> bool {
        self.is_gateway()
    }

    pub fn is_gateway(self) -> bool {
        matches!(self, NodeKind::ParallelGateway | NodeKind::ExclusiveGateway)
    }
}

/// A node of the process graph. Tasks carry their display name; every other
/// variant is identified by id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessNode {
    StartEvent { id: ElementId },
    EndEvent { id: ElementId },
    IntermediateEvent { id: ElementId },
    Task { id: ElementId, name: String },
    ParallelGateway { id: ElementId },
    ExclusiveGateway { id: ElementId },
}

impl ProcessNode {
    pub fn id(&self) -> ElementId {
        match self {
            ProcessNode::StartEvent { id }
            | ProcessNode::EndEvent { id }
            | ProcessNode::IntermediateEvent { id }
            | ProcessNode::Task { id, .. }
            | ProcessNode::ParallelGateway { id }
            | ProcessNode::ExclusiveGateway { id } => *id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ProcessNode::StartEvent { .. } => NodeKind::StartEvent,
            ProcessNode::EndEvent { .. } => NodeKind::EndEvent,
            ProcessNode::IntermediateEvent { .. } => NodeKind::IntermediateEvent,
            ProcessNode::Task { .. } => NodeKind::Task,
            ProcessNode::ParallelGateway { .. } => NodeKind::ParallelGateway,
            ProcessNode::ExclusiveGateway { .. } => NodeKind::ExclusiveGateway,
        }
    }
}

// ─── Flows ────────────────────────────────────────────────────

/// Edge payload; the endpoints are the petgraph edge itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFlow {
    pub id: ElementId,
    pub name: Option<String>,
}

// ─── Graph ────────────────────────────────────────────────────

/// One complete process graph, owned for the duration of a single
/// validate-and-transform call.
#[derive(Debug, Clone)]
pub struct ProcessGraph {
    pub id: ElementId,
    pub name: String,
    graph: DiGraph<ProcessNode, SequenceFlow>,
    start: NodeIndex,
}

impl ProcessGraph {
    /// Build the model from a dto that passed validation.
    ///
    /// This is the one place the wire shape is resolved into adjacency.
    /// The arity rules are re-checked with `debug_assert!` only; a dto that
    /// never went through the validator is a caller bug, and flows that
    /// reference unknown node ids abort rather than produce a broken graph.
    pub fn from_dto(dto: &BpmnDto) -> Self {
        let mut graph = DiGraph::with_capacity(
            dto.end_events.len()
                + dto.intermediate_events.len()
                + dto.tasks.len()
                + dto.parallel_gateways.len()
                + dto.exclusive_gateways.len()
                + 1,
            dto.sequence_flows.len(),
        );
        let mut index: HashMap<ElementId, NodeIndex> = HashMap::new();

        let start = graph.add_node(ProcessNode::StartEvent {
            id: dto.start_event.id,
        });
        index.insert(dto.start_event.id, start);
        for e in &dto.end_events {
            index.insert(e.id, graph.add_node(ProcessNode::EndEvent { id: e.id }));
        }
        for e in &dto.intermediate_events {
            index.insert(
                e.id,
                graph.add_node(ProcessNode::IntermediateEvent { id: e.id }),
            );
        }
        for t in &dto.tasks {
            index.insert(
                t.id,
                graph.add_node(ProcessNode::Task {
                    id: t.id,
                    name: t.name.clone(),
                }),
            );
        }
        for g in &dto.parallel_gateways {
            index.insert(
                g.id,
                graph.add_node(ProcessNode::ParallelGateway { id: g.id }),
            );
        }
        for g in &dto.exclusive_gateways {
            index.insert(
                g.id,
                graph.add_node(ProcessNode::ExclusiveGateway { id: g.id }),
            );
        }

        for flow in &dto.sequence_flows {
            let Some(&source) = index.get(&flow.source_id) else {
                panic!(
                    "unvalidated BPMN: flow {} references unknown source node {}",
                    flow.id, flow.source_id
                );
            };
            let Some(&target) = index.get(&flow.target_id) else {
                panic!(
                    "unvalidated BPMN: flow {} references unknown target node {}",
                    flow.id, flow.target_id
                );
            };
            graph.add_edge(
                source,
                target,
                SequenceFlow {
                    id: flow.id,
                    name: flow.name.clone(),
                },
            );
            debug_assert!(
                graph.edges_connecting(source, target).count() == 1,
                "duplicate flow {} -> {}",
                flow.source_id,
                flow.target_id
            );
            debug_assert!(
                graph[source].kind().allows_multiple_outgoing()
                    || graph.edges_directed(source, Direction::Outgoing).count() == 1,
                "node {} cannot have multiple outgoing flows",
                flow.source_id
            );
            debug_assert!(
                graph[target].kind().allows_multiple_incoming()
                    || graph.edges_directed(target, Direction::Incoming).count() == 1,
                "node {} cannot have multiple incoming flows",
                flow.target_id
            );
        }

        ProcessGraph {
            id: dto.id,
            name: dto.name.clone(),
            graph,
            start,
        }
    }

    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn node(&self, ix: NodeIndex) -> &ProcessNode {
        &self.graph[ix]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn flow_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing flows of a node in the order the flows were declared.
    /// petgraph iterates adjacency newest-first, so restore insertion order.
    pub fn outgoing(&self, ix: NodeIndex) -> Vec<(&SequenceFlow, NodeIndex)> {
        let mut out: Vec<(&SequenceFlow, NodeIndex)> = self
            .graph
            .edges(ix)
            .map(|e| (e.weight(), e.target()))
            .collect();
        out.reverse();
        out
    }

    /// Depth-first enumeration of every node reachable from the start event.
    /// Each node is yielded exactly once, converging paths and loops included.
    pub fn iter_reachable(&self) -> ReachableNodes<'_> {
        let mut visited = HashSet::new();
        visited.insert(self.start);
        ReachableNodes {
            graph: self,
            visited,
            frontier: vec![self.start],
        }
    }

    /// Reconstruct the wire shape from the model, covering exactly the
    /// reachable part of the graph. Flows are emitted per node in traversal
    /// order, so relabeled round-trips compare after sorting.
    pub fn to_dto(&self) -> BpmnDto {
        let mut dto = BpmnDto {
            id: self.id,
            name: self.name.clone(),
            start_event: StartEventDto {
                id: self.graph[self.start].id(),
            },
            end_events: Vec::new(),
            intermediate_events: Vec::new(),
            tasks: Vec::new(),
            parallel_gateways: Vec::new(),
            exclusive_gateways: Vec::new(),
            sequence_flows: Vec::new(),
        };
        for ix in self.iter_reachable() {
            for (flow, target) in self.outgoing(ix) {
                dto.sequence_flows.push(SequenceFlowDto {
                    id: flow.id,
                    name: flow.name.clone(),
                    source_id: self.graph[ix].id(),
                    target_id: self.graph[target].id(),
                });
            }
            match &self.graph[ix] {
                ProcessNode::StartEvent { .. } => {}
                ProcessNode::EndEvent { id } => dto.end_events.push(EndEventDto { id: *id }),
                ProcessNode::IntermediateEvent { id } => dto
                    .intermediate_events
                    .push(IntermediateEventDto { id: *id }),
                ProcessNode::Task { id, name } => dto.tasks.push(TaskDto {
                    id: *id,
                    name: name.clone(),
                }),
                ProcessNode::ParallelGateway { id } => {
                    dto.parallel_gateways.push(ParallelGatewayDto { id: *id })
                }
                ProcessNode::ExclusiveGateway { id } => {
                    dto.exclusive_gateways.push(ExclusiveGatewayDto { id: *id })
                }
            }
        }
        dto
    }
}

/// Iterator behind [`ProcessGraph::iter_reachable`].
pub struct ReachableNodes<'a> {
    graph: &'a ProcessGraph,
    visited: HashSet<NodeIndex>,
    frontier: Vec<NodeIndex>,
}

impl Iterator for ReachableNodes<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let cur = self.frontier.pop()?;
        for (_, target) in self.graph.outgoing(cur) {
            if self.visited.insert(target) {
                self.frontier.push(target);
            }
        }
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::*;

    /// start -> xor -> task -> xor (loop) and xor -> end.
    fn looping_dto() -> BpmnDto {
        BpmnDto {
            id: 0,
            name: "loop".into(),
            start_event: StartEventDto { id: 1 },
            end_events: vec![EndEventDto { id: 2 }],
            intermediate_events: vec![],
            tasks: vec![TaskDto {
                id: 3,
                name: "work".into(),
            }],
            parallel_gateways: vec![],
            exclusive_gateways: vec![ExclusiveGatewayDto { id: 4 }],
            sequence_flows: vec![
                SequenceFlowDto {
                    id: 5,
                    name: None,
                    source_id: 1,
                    target_id: 4,
                },
                SequenceFlowDto {
                    id: 6,
                    name: None,
                    source_id: 4,
                    target_id: 3,
                },
                SequenceFlowDto {
                    id: 7,
                    name: None,
                    source_id: 3,
                    target_id: 4,
                },
                SequenceFlowDto {
                    id: 8,
                    name: None,
                    source_id: 4,
                    target_id: 2,
                },
            ],
        }
    }

    #[test]
    fn builder_wires_adjacency_in_declaration_order() {
        let graph = ProcessGraph::from_dto(&looping_dto());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.flow_count(), 4);

        let start = graph.start();
        assert_eq!(graph.node(start).id(), 1);
        let out = graph.outgoing(start);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0.id, 5);

        let xor = out[0].1;
        let ids: Vec<ElementId> = graph.outgoing(xor).iter().map(|(f, _)| f.id).collect();
        assert_eq!(ids, vec![6, 8], "flow declaration order must be preserved");
    }

    #[test]
    fn reachable_iteration_visits_loop_nodes_once() {
        let graph = ProcessGraph::from_dto(&looping_dto());
        let visited: Vec<ElementId> = graph
            .iter_reachable()
            .map(|ix| graph.node(ix).id())
            .collect();
        assert_eq!(visited.len(), 4);
        let unique: HashSet<ElementId> = visited.iter().copied().collect();
        assert_eq!(unique, HashSet::from([1, 2, 3, 4]));
        assert_eq!(visited[0], 1, "traversal starts at the start event");
    }

    #[test]
    fn to_dto_round_trips_the_reachable_graph() {
        let dto = looping_dto();
        let graph = ProcessGraph::from_dto(&dto);
        let mut back = graph.to_dto();
        back.sequence_flows.sort_by_key(|f| f.id);

        assert_eq!(back.id, dto.id);
        assert_eq!(back.name, dto.name);
        assert_eq!(back.start_event.id, 1);
        assert_eq!(back.end_events.len(), 1);
        assert_eq!(back.tasks, dto.tasks);
        assert_eq!(back.exclusive_gateways.len(), 1);
        assert_eq!(back.sequence_flows, dto.sequence_flows);
    }

    #[test]
    #[should_panic(expected = "unvalidated BPMN")]
    fn builder_aborts_on_dangling_flow_endpoint() {
        let mut dto = looping_dto();
        dto.sequence_flows.push(SequenceFlowDto {
            id: 9,
            name: None,
            source_id: 4,
            target_id: 99,
        });
        let _ = ProcessGraph::from_dto(&dto);
    }

    #[test]
    fn capability_pair_is_gateway_only() {
        for kind in [
            NodeKind::StartEvent,
            NodeKind::EndEvent,
            NodeKind::IntermediateEvent,
            NodeKind::Task,
        ] {
            assert!(!kind.allows_multiple_incoming());
            assert!(!kind.allows_multiple_outgoing());
        }
        for kind in [NodeKind::ParallelGateway, NodeKind::ExclusiveGateway] {
            assert!(kind.allows_multiple_incoming());
            assert!(kind.allows_multiple_outgoing());
        }
    }
}
