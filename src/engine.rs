//! The simulation engine.
//!
//! The `Engine` owns every graph, the event scheduler, the update batcher
//! and the cell registry, and is the single execution context all state
//! lives in. Hosts mutate it exclusively through [`Command`]s and read
//! results exclusively through the batched update stream.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::cell::{CellContext, CellRegistry};
use crate::command::{Command, GateInit};
use crate::config::EngineConfig;
use crate::driver::{Driver, DriverMode};
use crate::error::EngineError;
use crate::gate::{Gate, PortDir, SignalMap};
use crate::graph::{Endpoint, Graph, Link};
use crate::scheduler::Scheduler;
use crate::signal::Signal;
use crate::types::{GateId, GraphId, LinkId, PortId, Tick};
use crate::update::{GateUpdate, UpdateBatcher, UpdateMessage};

/// Statistics collected by the engine.
#[derive(Clone, Debug, Default)]
pub struct EngineStats {
    /// Total commands applied
    pub commands_applied: u64,
    /// Total gate evaluations performed by drains
    pub gates_evaluated: u64,
    /// Total enqueues into the event queue
    pub events_enqueued: u64,
    /// Idle ticks advanced by slow stepping
    pub idle_ticks: u64,
    /// Update messages emitted
    pub updates_emitted: u64,
}

/// The simulation engine.
///
/// # Example
///
/// ```
/// use gatesim::cells::default_registry;
/// use gatesim::command::Command;
/// use gatesim::engine::Engine;
///
/// let mut engine = Engine::new(default_registry());
/// engine.execute(Command::AddGraph { graph: "top".into() }).unwrap();
/// assert_eq!(engine.tick(), 0);
/// ```
pub struct Engine {
    /// All graphs, top-level and subcircuit bodies alike.
    graphs: HashMap<GraphId, Graph>,
    /// The tick-ordered event queue.
    scheduler: Scheduler,
    /// Dirty-mark tracking for observed graphs.
    batcher: UpdateBatcher,
    /// Cell types resolvable by `addGate`.
    registry: CellRegistry,
    /// Stepping and flush cadence.
    driver: Driver,
    /// Statistics.
    stats: EngineStats,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new(registry: CellRegistry) -> Self {
        Self::with_config(registry, &EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(registry: CellRegistry, config: &EngineConfig) -> Self {
        Self {
            graphs: HashMap::new(),
            scheduler: Scheduler::new(),
            batcher: UpdateBatcher::new(),
            registry,
            driver: Driver::new(&config.engine),
            stats: EngineStats::default(),
        }
    }

    /// Returns the current simulated tick.
    pub fn tick(&self) -> Tick {
        self.scheduler.tick()
    }

    /// True iff the event queue holds pending work.
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_pending_events()
    }

    /// Returns a graph by id.
    pub fn graph(&self, id: &str) -> Option<&Graph> {
        self.graphs.get(id)
    }

    /// Returns a gate by graph and id.
    pub fn gate(&self, graph: &str, gate: &str) -> Option<&Gate> {
        self.graphs.get(graph)?.gates.get(gate)
    }

    /// Returns the signal on a gate's in-port.
    pub fn input_signal(&self, graph: &str, gate: &str, port: &str) -> Option<&Signal> {
        self.gate(graph, gate)?.input_signals.get(port)
    }

    /// Returns the signal on a gate's out-port.
    pub fn output_signal(&self, graph: &str, gate: &str, port: &str) -> Option<&Signal> {
        self.gate(graph, gate)?.output_signals.get(port)
    }

    /// Returns the installed driver mode.
    pub fn driver_mode(&self) -> DriverMode {
        self.driver.mode()
    }

    /// Returns the engine statistics.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Applies a single command.
    ///
    /// Commands are applied in arrival order; a failed command leaves the
    /// engine in a state the host should consider unrecoverable.
    pub fn execute(&mut self, command: Command) -> Result<(), EngineError> {
        self.stats.commands_applied += 1;
        match command {
            Command::Interval { ms } => {
                self.driver.set_interval(ms);
                Ok(())
            }
            Command::Start => {
                self.driver.start(Instant::now());
                Ok(())
            }
            Command::StartFast => {
                self.driver.start_fast(Instant::now());
                Ok(())
            }
            Command::Stop => {
                self.driver.stop();
                Ok(())
            }
            Command::UpdateGates => {
                self.update_gates();
                Ok(())
            }
            Command::UpdateGatesNext => {
                self.update_gates_next();
                Ok(())
            }
            Command::AddGraph { graph } => self.add_graph(graph),
            Command::AddGate { graph, gate, init } => self.add_gate(&graph, gate, init),
            Command::AddLink {
                graph,
                link,
                source,
                target,
            } => self.add_link(&graph, link, source, target),
            Command::AddSubcircuit {
                graph,
                gate,
                subgraph,
                iomap,
            } => self.add_subcircuit(&graph, &gate, subgraph, iomap),
            Command::RemoveGate { graph, gate } => self.remove_gate(&graph, &gate),
            Command::RemoveLink { graph, link } => self.remove_link(&graph, &link),
            Command::ObserveGraph { graph } => self.observe_graph(&graph),
            Command::UnobserveGraph { graph } => self.unobserve_graph(&graph),
            Command::ChangeInput { graph, gate, value } => {
                self.change_input(&graph, &gate, value)
            }
        }
    }

    /// Creates an empty graph.
    pub fn add_graph(&mut self, id: GraphId) -> Result<(), EngineError> {
        if self.graphs.contains_key(&id) {
            return Err(EngineError::DuplicateGraph(id));
        }
        debug!(graph = %id, "add graph");
        self.graphs.insert(id, Graph::new());
        Ok(())
    }

    /// Creates a gate and enqueues it for evaluation at
    /// `tick + propagation`.
    pub fn add_gate(
        &mut self,
        graph_id: &str,
        gate_id: GateId,
        init: GateInit,
    ) -> Result<(), EngineError> {
        let cell = self
            .registry
            .get(&init.cell_type)
            .ok_or_else(|| EngineError::UnknownCellType(init.cell_type.clone()))?;

        let graph = self
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        if graph.gates.contains_key(&gate_id) {
            return Err(EngineError::DuplicateGate {
                graph: graph_id.to_string(),
                gate: gate_id,
            });
        }

        debug!(graph = %graph_id, gate = %gate_id, cell = %init.cell_type, "add gate");
        let ports = init.ports.clone();
        let mut gate = Gate::new(
            gate_id.clone(),
            graph_id,
            init.cell_type,
            cell.kind(),
            init.ports,
            init.params,
        );
        cell.prepare(&mut gate.params, &ports);

        for (port, sig) in init.input_signals {
            let ok = gate
                .input_signals
                .get(&port)
                .map_or(false, |cur| cur.width() == sig.width());
            debug_assert!(ok, "bad initial input signal on {port}");
            if ok {
                gate.input_signals.insert(port, sig);
            }
        }
        for (port, sig) in init.output_signals {
            let ok = gate
                .output_signals
                .get(&port)
                .map_or(false, |cur| cur.width() == sig.width());
            debug_assert!(ok, "bad initial output signal on {port}");
            if ok {
                gate.output_signals.insert(port, sig);
            }
        }

        let propagation = gate.propagation;
        graph.gates.insert(gate_id.clone(), gate);
        self.enqueue(graph_id, &gate_id, propagation);
        Ok(())
    }

    /// Creates a link and delivers the source's current output signal to
    /// the target input.
    pub fn add_link(
        &mut self,
        graph_id: &str,
        link_id: LinkId,
        source: Endpoint,
        target: Endpoint,
    ) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        if graph.links.contains_key(&link_id) {
            return Err(EngineError::DuplicateLink {
                graph: graph_id.to_string(),
                link: link_id,
            });
        }

        let source_gate = graph.gates.get(&source.gate).ok_or_else(|| {
            EngineError::UnknownGate {
                graph: graph_id.to_string(),
                gate: source.gate.clone(),
            }
        })?;
        let source_port = source_gate
            .port(&source.port)
            .ok_or_else(|| EngineError::UnknownPort {
                gate: source.gate.clone(),
                port: source.port.clone(),
            })?;
        if source_port.dir != PortDir::Out {
            return Err(EngineError::DirectionMismatch {
                gate: source.gate.clone(),
                port: source.port.clone(),
            });
        }

        let target_gate = graph.gates.get(&target.gate).ok_or_else(|| {
            EngineError::UnknownGate {
                graph: graph_id.to_string(),
                gate: target.gate.clone(),
            }
        })?;
        let target_port = target_gate
            .port(&target.port)
            .ok_or_else(|| EngineError::UnknownPort {
                gate: target.gate.clone(),
                port: target.port.clone(),
            })?;
        if target_port.dir != PortDir::In {
            return Err(EngineError::DirectionMismatch {
                gate: target.gate.clone(),
                port: target.port.clone(),
            });
        }

        debug!(graph = %graph_id, link = %link_id, "add link");
        let sig = source_gate.output_signals[&source.port].clone();

        let graph = self.graphs.get_mut(graph_id).expect("checked above");
        graph
            .links
            .insert(link_id.clone(), Link::new(source.clone(), target.clone()));
        {
            let source_gate = graph.gates.get_mut(&source.gate).expect("checked above");
            source_gate.add_target(&source.port, target.clone());
            source_gate.links.insert(link_id.clone());
        }
        {
            let target_gate = graph.gates.get_mut(&target.gate).expect("checked above");
            target_gate.links.insert(link_id);
        }

        self.set_gate_input_signal(graph_id, &target.gate, &target.port, sig);
        Ok(())
    }

    /// Removes a link, delivering an all-X signal of the target port's
    /// declared width to the still-living target input.
    pub fn remove_link(&mut self, graph_id: &str, link_id: &str) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        let link = graph
            .links
            .remove(link_id)
            .ok_or_else(|| EngineError::UnknownLink {
                graph: graph_id.to_string(),
                link: link_id.to_string(),
            })?;

        debug!(graph = %graph_id, link = %link_id, "remove link");
        if let Some(source_gate) = graph.gates.get_mut(&link.source.gate) {
            source_gate.remove_target(&link.source.port, &link.target);
            source_gate.links.remove(link_id);
        }

        let mut undriven = None;
        if let Some(target_gate) = graph.gates.get_mut(&link.target.gate) {
            target_gate.links.remove(link_id);
            if let Some(port) = target_gate.port(&link.target.port) {
                undriven = Some(Signal::undefined(port.bits));
            }
        }

        if let Some(sig) = undriven {
            self.set_gate_input_signal(graph_id, &link.target.gate, &link.target.port, sig);
        }
        Ok(())
    }

    /// Removes a gate: every incident link first (which delivers all-X to
    /// surviving peers), then the gate itself. Pending queue entries for
    /// the gate become no-ops.
    pub fn remove_gate(&mut self, graph_id: &str, gate_id: &str) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        let gate = graph.gates.get(gate_id).ok_or_else(|| EngineError::UnknownGate {
            graph: graph_id.to_string(),
            gate: gate_id.to_string(),
        })?;

        debug!(graph = %graph_id, gate = %gate_id, "remove gate");
        let incident: Vec<LinkId> = gate.links.iter().cloned().collect();
        for link_id in incident {
            // Already-gone ids are fine: removing link A may have detached B.
            let _ = self.remove_link(graph_id, &link_id);
        }

        let graph = self.graphs.get_mut(graph_id).expect("checked above");
        if let Some(mut gate) = graph.gates.remove(gate_id) {
            gate.graph = None;
        }
        Ok(())
    }

    /// Binds a subcircuit gate to its body graph and initializes the
    /// boundary so inputs and outputs agree before any evaluation.
    pub fn add_subcircuit(
        &mut self,
        graph_id: &str,
        gate_id: &str,
        subgraph_id: GraphId,
        iomap: HashMap<PortId, GateId>,
    ) -> Result<(), EngineError> {
        if !self.graphs.contains_key(&subgraph_id) {
            return Err(EngineError::UnknownGraph(subgraph_id));
        }
        let graph = self
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        let gate = graph.gates.get_mut(gate_id).ok_or_else(|| EngineError::UnknownGate {
            graph: graph_id.to_string(),
            gate: gate_id.to_string(),
        })?;
        if !gate.is_subcircuit() {
            return Err(EngineError::NotASubcircuit {
                gate: gate_id.to_string(),
            });
        }
        for port in iomap.keys() {
            if gate.port(port).is_none() {
                return Err(EngineError::UnknownPort {
                    gate: gate_id.to_string(),
                    port: port.clone(),
                });
            }
        }

        debug!(graph = %graph_id, gate = %gate_id, subgraph = %subgraph_id, "bind subcircuit");
        gate.subgraph = Some(subgraph_id.clone());
        gate.io_map = Some(iomap.clone());

        let subgraph = self.graphs.get_mut(&subgraph_id).expect("checked above");
        subgraph.subcircuit = Some((graph_id.to_string(), gate_id.to_string()));

        // Boundary initialization: pull each side into agreement.
        for (port, inner_id) in iomap {
            let gate = &self.graphs[graph_id].gates[gate_id];
            match gate.port(&port).map(|p| p.dir) {
                Some(PortDir::In) => {
                    let sig = gate.input_signals[&port].clone();
                    let mut outputs = SignalMap::new();
                    outputs.insert("out".to_string(), sig);
                    self.set_gate_output_signals(&subgraph_id, &inner_id, outputs);
                }
                Some(PortDir::Out) => {
                    let inner = self.graphs[&subgraph_id].gates.get(&inner_id);
                    if let Some(sig) =
                        inner.and_then(|g| g.input_signals.get("in")).cloned()
                    {
                        self.set_gate_output_signal(graph_id, gate_id, &port, sig);
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Enables update emission for a graph and marks every out-port of
    /// every gate dirty so late observers resynchronize.
    pub fn observe_graph(&mut self, graph_id: &str) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        graph.observed = true;
        for (gate_id, gate) in &graph.gates {
            for port in gate.output_signals.keys() {
                self.batcher.mark(graph_id, gate_id, port);
            }
        }
        Ok(())
    }

    /// Disables update emission for a graph. Marks queued before this
    /// point still flush on the next interval.
    pub fn unobserve_graph(&mut self, graph_id: &str) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        graph.observed = false;
        Ok(())
    }

    /// Drives the output of an Input-type gate, relying on propagation to
    /// fan the value out.
    pub fn change_input(
        &mut self,
        graph_id: &str,
        gate_id: &str,
        value: Signal,
    ) -> Result<(), EngineError> {
        let graph = self
            .graphs
            .get(graph_id)
            .ok_or_else(|| EngineError::UnknownGraph(graph_id.to_string()))?;
        let gate = graph.gates.get(gate_id).ok_or_else(|| EngineError::UnknownGate {
            graph: graph_id.to_string(),
            gate: gate_id.to_string(),
        })?;
        if gate.kind != crate::cell::CellKind::Source {
            return Err(EngineError::NotAnInput {
                gate: gate_id.to_string(),
            });
        }

        let mut outputs = SignalMap::new();
        outputs.insert("out".to_string(), value);
        self.set_gate_output_signals(graph_id, gate_id, outputs);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// One slow step: evaluate the next ready tick if it is due now,
    /// otherwise advance one idle tick.
    ///
    /// Driving this on a fixed interval moves simulated time forward even
    /// when nothing is pending, so time-based cells observe ticks passing.
    pub fn update_gates(&mut self) {
        if self.scheduler.peek_next() == Some(self.scheduler.tick()) {
            self.update_gates_next();
        } else {
            self.scheduler.advance_idle();
            self.stats.idle_ticks += 1;
        }
    }

    /// One event step: jump to the earliest pending tick and drain it.
    ///
    /// Gates enqueued at the draining tick by the propagator join the same
    /// drain; the loop ends when the per-tick set is empty.
    pub fn update_gates_next(&mut self) {
        let Some(at) = self.scheduler.begin_drain() else {
            return;
        };
        trace!(tick = at, "drain");

        while let Some((graph_id, gate_id)) = self.scheduler.pop_due(at) {
            let output = {
                let Some(graph) = self.graphs.get_mut(&graph_id) else {
                    continue; // graph removed mid-flight
                };
                let Some(gate) = graph.gates.get_mut(&gate_id) else {
                    continue; // gate removed mid-flight
                };
                if gate.graph.is_none() || gate.special() {
                    continue;
                }
                let Some(cell) = self.registry.get(&gate.cell_type) else {
                    continue;
                };
                let out = cell.operation(CellContext {
                    inputs: &gate.input_signals,
                    params: &mut gate.params,
                });
                self.stats.gates_evaluated += 1;
                (out, gate.propagation)
            };
            let (out, propagation) = output;

            if out.reenqueue {
                self.enqueue(&graph_id, &gate_id, propagation);
            }
            self.set_gate_output_signals(&graph_id, &gate_id, out.outputs);
        }

        self.scheduler.finish_drain(at);
    }

    /// Polls the installed driver: runs any due stepping and returns a
    /// flush message if one is owed and anything is dirty.
    pub fn poll(&mut self, now: Instant) -> Option<UpdateMessage> {
        match self.driver.mode() {
            DriverMode::Normal => {
                if self.driver.step_due(now) {
                    self.update_gates();
                    self.driver.step_done(now);
                }
            }
            DriverMode::Fast => {
                if self.driver.step_due(now) {
                    let burst = self.driver.fast_burst();
                    let started = Instant::now();
                    while self.has_pending_events() && started.elapsed() < burst {
                        self.update_gates_next();
                    }
                    self.driver.step_done(now);
                }
            }
            DriverMode::Stopped => {}
        }

        if self.driver.flush_due(now) {
            let message = self.flush_updates();
            self.driver.flush_done(now);
            return message;
        }
        None
    }

    /// Assembles and clears the pending update batch.
    ///
    /// Returns `None` when nothing is dirty. Ports that transitioned
    /// several times since the last flush report only their final value.
    pub fn flush_updates(&mut self) -> Option<UpdateMessage> {
        if !self.batcher.is_dirty() {
            return None;
        }

        let marks = self.batcher.take();
        let mut updates = Vec::new();
        for ((graph_id, gate_id), ports) in marks {
            let Some(gate) = self.gate(&graph_id, &gate_id) else {
                continue; // removed after marking
            };
            let mut outputs = SignalMap::new();
            for port in ports {
                if let Some(sig) = gate.output_signals.get(&port) {
                    outputs.insert(port, sig.clone());
                }
            }
            if !outputs.is_empty() {
                updates.push(GateUpdate {
                    graph: graph_id,
                    gate: gate_id,
                    outputs,
                });
            }
        }
        updates.sort_by(|a, b| (&a.graph, &a.gate).cmp(&(&b.graph, &b.gate)));

        self.stats.updates_emitted += 1;
        Some(UpdateMessage {
            tick: self.scheduler.tick(),
            has_pending_events: self.scheduler.has_pending_events(),
            updates,
        })
    }

    /// Exports statistics as a JSON value.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "engine": {
                "tick": self.scheduler.tick(),
                "pending_ticks": self.scheduler.pending_tick_count(),
                "graph_count": self.graphs.len(),
                "commands_applied": self.stats.commands_applied,
                "gates_evaluated": self.stats.gates_evaluated,
                "events_enqueued": self.stats.events_enqueued,
                "idle_ticks": self.stats.idle_ticks,
                "updates_emitted": self.stats.updates_emitted,
            },
        })
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// Applies a set of new output signals to a gate, propagating each.
    pub fn set_gate_output_signals(&mut self, graph_id: &str, gate_id: &str, outputs: SignalMap) {
        for (port, sig) in outputs {
            self.set_gate_output_signal(graph_id, gate_id, &port, sig);
        }
    }

    /// Applies one new output signal: short-circuits on equality, records
    /// the dirty mark, and fans the value out to every linked input.
    pub fn set_gate_output_signal(
        &mut self,
        graph_id: &str,
        gate_id: &str,
        port: &str,
        sig: Signal,
    ) {
        let targets = {
            let Some(graph) = self.graphs.get_mut(graph_id) else {
                return;
            };
            let observed = graph.observed;
            let Some(gate) = graph.gates.get_mut(gate_id) else {
                return;
            };
            let Some(current) = gate.output_signals.get(port) else {
                debug_assert!(false, "cell drove undeclared port {gate_id}.{port}");
                warn!(gate = %gate_id, port = %port, "ignoring signal for undeclared out-port");
                return;
            };
            if current.width() != sig.width() {
                debug_assert!(
                    false,
                    "width mismatch on {gate_id}.{port}: {} vs {}",
                    current.width(),
                    sig.width()
                );
                warn!(gate = %gate_id, port = %port, "ignoring signal of mismatched width");
                return;
            }
            if *current == sig {
                return;
            }
            gate.output_signals.insert(port.to_string(), sig.clone());
            // Snapshot the fan-out list: a propagation step downstream may
            // remove links on this very port.
            let targets = gate.links_by_output.get(port).cloned().unwrap_or_default();
            if observed {
                self.batcher.mark(graph_id, gate_id, port);
            }
            targets
        };

        for target in targets {
            self.set_gate_input_signal(graph_id, &target.gate, &target.port, sig.clone());
        }
    }

    /// Applies one new input signal and dispatches on the target: descend
    /// into a subcircuit, ascend out of one, or enqueue the gate.
    ///
    /// Subcircuit boundary crossings bypass the event queue, so a
    /// subcircuit is combinationally transparent at tick granularity;
    /// ordinary gates pay their declared propagation delay.
    pub fn set_gate_input_signal(
        &mut self,
        graph_id: &str,
        gate_id: &str,
        port: &str,
        sig: Signal,
    ) {
        enum Dispatch {
            Descend(GraphId, GateId),
            Ascend(GraphId, GateId, PortId),
            Enqueue(Tick),
            Nothing,
        }

        let dispatch = {
            let Some(graph) = self.graphs.get(graph_id) else {
                return;
            };
            let Some(gate) = graph.gates.get(gate_id) else {
                return;
            };
            let Some(current) = gate.input_signals.get(port) else {
                debug_assert!(false, "signal for undeclared in-port {gate_id}.{port}");
                return;
            };
            if *current == sig {
                return;
            }

            if gate.is_subcircuit() {
                match (&gate.subgraph, &gate.io_map) {
                    (Some(subgraph), Some(iomap)) => match iomap.get(port) {
                        Some(inner) => Dispatch::Descend(subgraph.clone(), inner.clone()),
                        None => Dispatch::Nothing,
                    },
                    // Not yet bound; the boundary init will reconcile.
                    _ => Dispatch::Nothing,
                }
            } else if gate.is_output() {
                match (&graph.subcircuit, &gate.net) {
                    (Some((parent_graph, parent_gate)), Some(net)) => Dispatch::Ascend(
                        parent_graph.clone(),
                        parent_gate.clone(),
                        net.clone(),
                    ),
                    // Top-level sink: the value is terminal.
                    _ => Dispatch::Nothing,
                }
            } else {
                Dispatch::Enqueue(gate.propagation)
            }
        };

        let gate = self
            .graphs
            .get_mut(graph_id)
            .and_then(|g| g.gates.get_mut(gate_id))
            .expect("checked above");
        gate.input_signals.insert(port.to_string(), sig.clone());

        match dispatch {
            Dispatch::Descend(subgraph, inner) => {
                let mut outputs = SignalMap::new();
                outputs.insert("out".to_string(), sig);
                self.set_gate_output_signals(&subgraph, &inner, outputs);
            }
            Dispatch::Ascend(parent_graph, parent_gate, net) => {
                self.set_gate_output_signal(&parent_graph, &parent_gate, &net, sig);
            }
            Dispatch::Enqueue(propagation) => {
                self.enqueue(graph_id, gate_id, propagation);
            }
            Dispatch::Nothing => {}
        }
    }

    fn enqueue(&mut self, graph_id: &str, gate_id: &str, delay: Tick) {
        let at = self
            .scheduler
            .schedule((graph_id.to_string(), gate_id.to_string()), delay);
        self.stats.events_enqueued += 1;
        trace!(graph = %graph_id, gate = %gate_id, tick = at, "enqueue");
    }
}
