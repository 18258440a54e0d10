//! Lowering of a process graph into a Petri net.
//!
//! One depth-first pass over the process graph. Every node's place or
//! transition is emitted exactly once, when the node is popped off the
//! frontier; ids are minted earlier, at discovery, which is what lets merge
//! points and loop back-edges wire arcs into nodes that are already (or not
//! yet) processed.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::dto::ElementId;
use crate::petri::{Arc, PetriNet, Place, Transition};
use crate::process::{ProcessGraph, ProcessNode};

/// Sequential id generator scoped to one transform call.
///
/// Ids are handed out in request order, so the literal numbering depends on
/// traversal order. Callers must treat it as an implementation detail and
/// reason about net shape, not id values.
#[derive(Debug, Default)]
struct IdGen {
    next: ElementId,
}

impl IdGen {
    fn mint(&mut self) -> ElementId {
        let id = self.next;
        self.next += 1;
        id
    }
}

fn add_place(net: &mut PetriNet, id: ElementId, name: String, tokens: u32) {
    net.places.push(Place {
        id,
        name,
        number_of_tokens: tokens,
    });
}

fn add_transition(net: &mut PetriNet, id: ElementId, name: String) {
    net.transitions.push(Transition { id, name });
}

fn connect(net: &mut PetriNet, source_node: ElementId, target_node: ElementId) {
    net.arcs.push(Arc {
        source_node,
        target_node,
    });
}

/// Lower a validated process graph into an equivalent Petri net.
///
/// The start node's place carries the single initial token. Sequencing,
/// parallel fork/join and exclusive choice/merge (loops included) come out of
/// the firing structure; see the per-variant rules inline.
pub fn transform(process: &ProcessGraph) -> PetriNet {
    let mut ids = IdGen::default();
    let mut net = PetriNet {
        id: ids.mint(),
        name: format!("{}_From-BPMN-To-Petri-Net", process.name),
        places: Vec::new(),
        transitions: Vec::new(),
        arcs: Vec::new(),
    };

    // Maps a process node to its minted net id: the id of its place, or of
    // its transition for parallel gateways. An entry exists from the moment
    // a node is discovered, before the node itself is processed.
    let mut discovered: HashMap<NodeIndex, ElementId> = HashMap::new();
    let mut frontier: Vec<NodeIndex> = Vec::new();
    discovered.insert(process.start(), ids.mint());
    frontier.push(process.start());

    while let Some(cur) = frontier.pop() {
        let nid = discovered[&cur];
        let node = process.node(cur);

        // A parallel gateway is purely a synchronizing firing point and gets
        // no place of its own; every other variant gets a control place.
        match node {
            ProcessNode::ParallelGateway { .. } => {}
            ProcessNode::StartEvent { .. } => add_place(&mut net, nid, "start".to_string(), 1),
            ProcessNode::ExclusiveGateway { .. } => {
                add_place(&mut net, nid, format!("exclusive{nid}"), 0)
            }
            _ => add_place(&mut net, nid, format!("p{nid}"), 0),
        }

        // An exclusive gateway defers its transitions to the flow loop below:
        // one per alternative, all competing for the token in the shared
        // place. Everything else fires through a single transition.
        let firing = match node {
            ProcessNode::ExclusiveGateway { .. } => None,
            ProcessNode::ParallelGateway { .. } => {
                add_transition(&mut net, nid, format!("parallel{nid}"));
                Some(nid)
            }
            _ => {
                let tid = ids.mint();
                let name = match node {
                    ProcessNode::EndEvent { .. } => "end".to_string(),
                    ProcessNode::Task { name, .. } => name.clone(),
                    _ => format!("t{tid}"),
                };
                add_transition(&mut net, tid, name);
                connect(&mut net, nid, tid);
                Some(tid)
            }
        };

        for (_flow, target) in process.outgoing(cur) {
            let target_id = match discovered.get(&target) {
                Some(&id) => id,
                None => {
                    let id = ids.mint();
                    discovered.insert(target, id);
                    frontier.push(target);
                    id
                }
            };

            let tid = match firing {
                Some(tid) => tid,
                None => {
                    let tid = ids.mint();
                    add_transition(&mut net, tid, format!("t{tid}"));
                    connect(&mut net, nid, tid);
                    tid
                }
            };

            if matches!(process.node(target), ProcessNode::ParallelGateway { .. }) {
                // A parallel join must see one token per incoming branch, so
                // each branch is routed through its own buffering place
                // instead of into the gateway's transition directly.
                let buffer = ids.mint();
                add_place(&mut net, buffer, format!("p{buffer}"), 0);
                connect(&mut net, tid, buffer);
                connect(&mut net, buffer, target_id);
            } else {
                connect(&mut net, tid, target_id);
            }
        }
    }

    debug!(
        bpmn = process.id,
        net = net.id,
        places = net.places.len(),
        transitions = net.transitions.len(),
        arcs = net.arcs.len(),
        "lowered BPMN graph to Petri net"
    );
    net
}
