//! The token-flow graph produced by one transform call: places, transitions,
//! and directed arcs between them.
//!
//! Places and transitions share one id namespace; an arc endpoint is a place
//! or a transition depending on which list its id appears in. The net is the
//! sole output artifact and is never mutated after it is returned.

use serde::{Deserialize, Serialize};

use crate::dto::ElementId;

/// A control-state buffer holding zero or more tokens. At construction time
/// only the start place holds a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: ElementId,
    pub name: String,
    pub number_of_tokens: u32,
}

/// An atomic firing point: consumes one token from every input place,
/// deposits one token into every output place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: ElementId,
    pub name: String,
}

/// Directed edge between a place and a transition, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub source_node: ElementId,
    pub target_node: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetriNet {
    pub id: ElementId,
    pub name: String,
    pub places: Vec<Place>,
    pub transitions: Vec<Transition>,
    pub arcs: Vec<Arc>,
}

impl PetriNet {
    pub fn place(&self, id: ElementId) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn transition(&self, id: ElementId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    /// The unique initially-marked place. `None` only on a net that did not
    /// come out of the transformer.
    pub fn start_place(&self) -> Option<&Place> {
        self.places.iter().find(|p| p.name == "start")
    }

    /// Target ids of all arcs leaving `id`, in arc insertion order.
    pub fn outgoing(&self, id: ElementId) -> Vec<ElementId> {
        self.arcs
            .iter()
            .filter(|a| a.source_node == id)
            .map(|a| a.target_node)
            .collect()
    }

    /// Source ids of all arcs entering `id`, in arc insertion order.
    pub fn incoming(&self, id: ElementId) -> Vec<ElementId> {
        self.arcs
            .iter()
            .filter(|a| a.target_node == id)
            .map(|a| a.source_node)
            .collect()
    }
}
