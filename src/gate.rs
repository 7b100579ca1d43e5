//! Gate and port definitions.
//!
//! A gate is a node in a circuit graph bound to a cell type. It carries the
//! signals currently present on its ports, the downstream adjacency used by
//! propagation, and whatever private state its cell keeps in `params`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::cell::CellKind;
use crate::graph::Endpoint;
use crate::signal::Signal;
use crate::types::{GateId, GraphId, LinkId, PortId, Tick};

/// Direction of a gate port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDir {
    /// Input pin: receives a signal from a driving link.
    In,
    /// Output pin: drives zero or more links.
    Out,
}

/// A named pin of a gate with direction and bit width.
///
/// Ports belong to exactly one gate for the gate's lifetime and are
/// immutable after gate creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Name of the port (e.g., "in1", "out", "clk").
    pub id: PortId,
    /// Direction of the port.
    pub dir: PortDir,
    /// Bit width of signals on this port.
    pub bits: u32,
}

impl Port {
    /// Creates a new port.
    pub fn new(id: impl Into<PortId>, dir: PortDir, bits: u32) -> Self {
        Self {
            id: id.into(),
            dir,
            bits,
        }
    }

    /// Creates an input port.
    pub fn input(id: impl Into<PortId>, bits: u32) -> Self {
        Self::new(id, PortDir::In, bits)
    }

    /// Creates an output port.
    pub fn output(id: impl Into<PortId>, bits: u32) -> Self {
        Self::new(id, PortDir::Out, bits)
    }
}

/// Mapping from port id to the signal currently on that port.
pub type SignalMap = HashMap<PortId, Signal>;

/// A gate instance in a circuit graph.
///
/// Construction establishes the signal-map invariant: every in-port has an
/// entry in `input_signals` and every out-port one in `output_signals`,
/// defaulting to all-X until an initial value or propagation overwrites it.
#[derive(Clone, Debug)]
pub struct Gate {
    /// Gate identifier, unique within its graph.
    pub id: GateId,
    /// Back-reference to the owning graph.
    ///
    /// Cleared on removal; a queued gate with no graph is a stale
    /// reference the scheduler drain silently skips.
    pub graph: Option<GraphId>,
    /// Name of the cell type this gate is bound to.
    pub cell_type: String,
    /// Behavioral classification derived from the cell.
    pub kind: CellKind,
    /// Port table, keyed by port id.
    pub ports: HashMap<PortId, Port>,
    /// Current signal on each in-port.
    pub input_signals: SignalMap,
    /// Current signal on each out-port.
    pub output_signals: SignalMap,
    /// For each out-port, the input endpoints it currently drives.
    pub links_by_output: HashMap<PortId, Vec<Endpoint>>,
    /// Ids of all links incident on this gate.
    pub links: HashSet<LinkId>,
    /// Delay in ticks between inputs changing and outputs recomputing.
    pub propagation: Tick,
    /// Free-form cell-private state.
    pub params: serde_json::Value,
    /// Body graph, for subcircuit gates.
    pub subgraph: Option<GraphId>,
    /// External port id → inner IO gate id, for subcircuit gates.
    pub io_map: Option<HashMap<PortId, GateId>>,
    /// Enclosing-subcircuit port driven by this sink gate.
    pub net: Option<PortId>,
}

impl Gate {
    /// Creates a gate bound to the given cell type.
    ///
    /// `propagation` and `net` are extracted from `params` when present;
    /// propagation defaults to 1 tick.
    pub fn new(
        id: impl Into<GateId>,
        graph: impl Into<GraphId>,
        cell_type: impl Into<String>,
        kind: CellKind,
        ports: Vec<Port>,
        params: serde_json::Value,
    ) -> Self {
        let mut port_map = HashMap::new();
        let mut input_signals = HashMap::new();
        let mut output_signals = HashMap::new();
        let mut links_by_output = HashMap::new();

        for port in ports {
            match port.dir {
                PortDir::In => {
                    input_signals.insert(port.id.clone(), Signal::undefined(port.bits));
                }
                PortDir::Out => {
                    output_signals.insert(port.id.clone(), Signal::undefined(port.bits));
                    links_by_output.insert(port.id.clone(), Vec::new());
                }
            }
            port_map.insert(port.id.clone(), port);
        }

        let propagation = params
            .get("propagation")
            .and_then(|v| v.as_u64())
            .unwrap_or(1);
        let net = params
            .get("net")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Self {
            id: id.into(),
            graph: Some(graph.into()),
            cell_type: cell_type.into(),
            kind,
            ports: port_map,
            input_signals,
            output_signals,
            links_by_output,
            links: HashSet::new(),
            propagation,
            params,
            subgraph: None,
            io_map: None,
            net,
        }
    }

    /// Returns the port with the given id, if any.
    pub fn port(&self, id: &str) -> Option<&Port> {
        self.ports.get(id)
    }

    /// True for gates whose outputs are driven externally and which the
    /// scheduler never evaluates.
    pub fn special(&self) -> bool {
        self.kind.is_special()
    }

    /// True for gates that embed a subgraph.
    pub fn is_subcircuit(&self) -> bool {
        self.kind == CellKind::Subcircuit
    }

    /// True for sink gates (Output, Lamp, NumDisplay).
    pub fn is_output(&self) -> bool {
        self.kind == CellKind::Sink
    }

    /// Registers `target` as driven by this gate's out-port `port`.
    pub fn add_target(&mut self, port: &str, target: Endpoint) {
        self.links_by_output
            .entry(port.to_string())
            .or_default()
            .push(target);
    }

    /// Unregisters `target` from this gate's out-port `port`.
    pub fn remove_target(&mut self, port: &str, target: &Endpoint) {
        if let Some(targets) = self.links_by_output.get_mut(port) {
            if let Some(pos) = targets.iter().position(|t| t == target) {
                targets.remove(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Logic;

    fn not_gate() -> Gate {
        Gate::new(
            "n1",
            "g",
            "Not",
            CellKind::Combinational,
            vec![Port::input("in", 1), Port::output("out", 1)],
            serde_json::json!({ "propagation": 3 }),
        )
    }

    #[test]
    fn construction_fills_signal_maps() {
        let gate = not_gate();
        assert_eq!(gate.input_signals["in"], Signal::undefined(1));
        assert_eq!(gate.output_signals["out"], Signal::undefined(1));
        assert_eq!(gate.input_signals["in"].get(0), Logic::X);
        assert_eq!(gate.propagation, 3);
        assert_eq!(gate.graph.as_deref(), Some("g"));
    }

    #[test]
    fn propagation_defaults_to_one() {
        let gate = Gate::new(
            "n1",
            "g",
            "Not",
            CellKind::Combinational,
            vec![Port::input("in", 1), Port::output("out", 1)],
            serde_json::json!({}),
        );
        assert_eq!(gate.propagation, 1);
    }

    #[test]
    fn net_extracted_from_params() {
        let gate = Gate::new(
            "out0",
            "sub",
            "Output",
            CellKind::Sink,
            vec![Port::input("in", 4)],
            serde_json::json!({ "net": "result" }),
        );
        assert!(gate.is_output());
        assert!(gate.special());
        assert_eq!(gate.net.as_deref(), Some("result"));
    }

    #[test]
    fn adjacency_add_remove() {
        let mut gate = not_gate();
        let target = Endpoint::new("n2", "in");
        gate.add_target("out", target.clone());
        assert_eq!(gate.links_by_output["out"], vec![target.clone()]);

        gate.remove_target("out", &target);
        assert!(gate.links_by_output["out"].is_empty());
    }
}
