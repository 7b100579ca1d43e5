//! Circuit graphs and links.
//!
//! A graph is a named collection of gates and links. It may be a top-level
//! circuit or the body of a subcircuit gate, in which case it carries a
//! back-pointer to the gate that embeds it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::gate::Gate;
use crate::types::{GateId, GraphId, LinkId, PortId};

/// One end of a link: a gate and one of its ports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// The gate id.
    pub gate: GateId,
    /// The port id on that gate.
    pub port: PortId,
}

impl Endpoint {
    /// Creates a new endpoint.
    pub fn new(gate: impl Into<GateId>, port: impl Into<PortId>) -> Self {
        Self {
            gate: gate.into(),
            port: port.into(),
        }
    }
}

/// A directed connection from a gate's out-port to a gate's in-port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The driving end; must be an out-port.
    pub source: Endpoint,
    /// The driven end; must be an in-port.
    pub target: Endpoint,
}

impl Link {
    /// Creates a new link.
    pub fn new(source: Endpoint, target: Endpoint) -> Self {
        Self { source, target }
    }
}

/// A named directed multigraph of gates and links.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// Gates by id.
    pub gates: HashMap<GateId, Gate>,
    /// Links by id.
    pub links: HashMap<LinkId, Link>,
    /// Whether output transitions in this graph are reported to the host.
    pub observed: bool,
    /// The subcircuit gate instantiating this graph, if it is not top-level.
    pub subcircuit: Option<(GraphId, GateId)>,
}

impl Graph {
    /// Creates a new empty, unobserved graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gate with the given id, if any.
    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.gates.get(id)
    }

    /// Returns a mutable reference to the gate with the given id, if any.
    pub fn gate_mut(&mut self, id: &str) -> Option<&mut Gate> {
        self.gates.get_mut(id)
    }

    /// Returns the number of gates in the graph.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of links in the graph.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
