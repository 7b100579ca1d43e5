//! The host-to-engine command surface.
//!
//! Each command names an engine operation and its arguments. Commands are
//! plain serde values so a transport can deliver them as JSON messages;
//! they are applied strictly in arrival order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::gate::{Port, SignalMap};
use crate::graph::Endpoint;
use crate::signal::Signal;
use crate::types::{GateId, GraphId, LinkId, PortId};

/// Payload of `addGate`: the cell binding and initial state of a new gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateInit {
    /// The cell type name, resolved against the engine's registry.
    #[serde(rename = "type")]
    pub cell_type: String,
    /// The gate's ports.
    pub ports: Vec<Port>,
    /// Free-form cell parameters (`propagation`, `net`, ...).
    #[serde(default)]
    pub params: serde_json::Value,
    /// Initial input signals; unnamed in-ports start all-X.
    #[serde(default)]
    pub input_signals: SignalMap,
    /// Initial output signals; unnamed out-ports start all-X.
    #[serde(default)]
    pub output_signals: SignalMap,
}

/// A command delivered from the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Set the normal-mode tick interval in milliseconds.
    Interval { ms: u64 },
    /// Install the normal tick driver.
    Start,
    /// Install the fast tick driver.
    StartFast,
    /// Uninstall the driver.
    Stop,
    /// One manual slow step.
    UpdateGates,
    /// One manual event step.
    UpdateGatesNext,
    /// Create an empty graph.
    AddGraph { graph: GraphId },
    /// Create a gate and enqueue it for evaluation.
    AddGate {
        graph: GraphId,
        gate: GateId,
        init: GateInit,
    },
    /// Create a link and deliver the source's current output to the target.
    AddLink {
        graph: GraphId,
        link: LinkId,
        source: Endpoint,
        target: Endpoint,
    },
    /// Bind a subcircuit gate to its body graph and initialize the boundary.
    AddSubcircuit {
        graph: GraphId,
        gate: GateId,
        subgraph: GraphId,
        iomap: HashMap<PortId, GateId>,
    },
    /// Remove a gate and all links incident on it.
    RemoveGate { graph: GraphId, gate: GateId },
    /// Remove a link, delivering all-X to its target.
    RemoveLink { graph: GraphId, link: LinkId },
    /// Enable update emission for a graph and resynchronize the observer.
    ObserveGraph { graph: GraphId },
    /// Disable update emission for a graph.
    UnobserveGraph { graph: GraphId },
    /// Drive the output of an Input-type gate.
    ChangeInput {
        graph: GraphId,
        gate: GateId,
        value: Signal,
    },
}
