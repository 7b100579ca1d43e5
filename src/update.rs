//! Observation and update batching.
//!
//! Output transitions in observed graphs are recorded as dirty
//! `(gate, port)` marks and periodically flushed to the host as a single
//! update message. Multiple transitions of one port within a flush interval
//! coalesce into the last-seen value; hosts receive final values, not full
//! transition histories.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::gate::SignalMap;
use crate::types::{GateId, GraphId, PortId, Tick};

/// One gate's coalesced output changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateUpdate {
    /// The graph containing the gate.
    pub graph: GraphId,
    /// The gate whose outputs changed.
    pub gate: GateId,
    /// Final values of the changed out-ports.
    pub outputs: SignalMap,
}

/// A batched update message emitted to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "update")]
pub struct UpdateMessage {
    /// The engine's tick at flush time (may be later than the tick at
    /// which any individual change occurred).
    pub tick: Tick,
    /// Whether the event queue still holds pending work.
    pub has_pending_events: bool,
    /// The coalesced per-gate changes.
    pub updates: Vec<GateUpdate>,
}

/// Tracks dirty `(gate, port)` pairs for observed graphs.
#[derive(Debug, Default)]
pub struct UpdateBatcher {
    pending: HashMap<(GraphId, GateId), HashSet<PortId>>,
}

impl UpdateBatcher {
    /// Creates an empty batcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an out-port dirty.
    ///
    /// The caller is responsible for checking that the gate's graph is
    /// observed; unobserved graphs never produce marks.
    pub fn mark(&mut self, graph: &str, gate: &str, port: &str) {
        self.pending
            .entry((graph.to_string(), gate.to_string()))
            .or_default()
            .insert(port.to_string());
    }

    /// True if any mark is waiting to be flushed.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of gates with dirty ports.
    pub fn dirty_gate_count(&self) -> usize {
        self.pending.len()
    }

    /// Takes and clears the pending marks.
    ///
    /// The engine resolves each mark against current `output_signals` when
    /// assembling the message, which is what makes flushes coalescing.
    pub fn take(&mut self) -> HashMap<(GraphId, GateId), HashSet<PortId>> {
        std::mem::take(&mut self.pending)
    }
}
