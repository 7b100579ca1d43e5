//! The cell contract and the cell type registry.
//!
//! A cell is the implementation behind a gate type: a combinational
//! `operation` over the gate's input signals, an optional `prepare` hook run
//! once at gate construction, and a behavioral classification. Cells are
//! registered by name, enabling command-driven gate creation.
//!
//! # Example
//!
//! ```
//! use gatesim::cell::{Cell, CellContext, CellOutput, CellRegistry};
//! use gatesim::gate::SignalMap;
//!
//! struct Const;
//!
//! impl Cell for Const {
//!     fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
//!         let _ = ctx;
//!         CellOutput::new(SignalMap::new())
//!     }
//! }
//!
//! let mut registry = CellRegistry::new();
//! registry.register("Const", Const);
//! assert!(registry.contains("Const"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::gate::{Port, SignalMap};

/// Behavioral classification of a cell type.
///
/// Everything except `Combinational` is "special": its outputs are driven
/// externally and the scheduler never evaluates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Evaluated by the scheduler; outputs are a function of inputs.
    Combinational,
    /// Externally driven source (Input, Button, NumEntry).
    Source,
    /// Signal sink (Output, Lamp, NumDisplay); may forward to an enclosing
    /// subcircuit port via its `net` binding.
    Sink,
    /// Wraps an embedded graph.
    Subcircuit,
}

impl CellKind {
    /// True for every kind the scheduler must skip.
    pub fn is_special(self) -> bool {
        self != CellKind::Combinational
    }
}

/// What a cell's `operation` sees: the gate's current input signals and its
/// private state.
///
/// Operations must be pure over this view. They must not reach into graph
/// state; requesting re-evaluation goes through [`CellOutput::reenqueue`].
pub struct CellContext<'a> {
    /// The gate's current input signals.
    pub inputs: &'a SignalMap,
    /// The gate's private state, initialized by `prepare`.
    pub params: &'a mut serde_json::Value,
}

/// The result of evaluating a cell.
#[derive(Clone, Debug, Default)]
pub struct CellOutput {
    /// New signals for (a subset of) the gate's out-ports.
    pub outputs: SignalMap,
    /// Request re-evaluation after another propagation delay.
    ///
    /// This is the only scheduling channel available to a cell; it is how
    /// self-oscillating cells such as clocks keep running.
    pub reenqueue: bool,
}

impl CellOutput {
    /// Creates an output set without a re-enqueue request.
    pub fn new(outputs: SignalMap) -> Self {
        Self {
            outputs,
            reenqueue: false,
        }
    }

    /// Requests re-evaluation after the gate's propagation delay.
    pub fn and_reenqueue(mut self) -> Self {
        self.reenqueue = true;
        self
    }
}

/// The implementation of a gate type.
pub trait Cell: Send + Sync {
    /// Behavioral classification; defaults to scheduler-evaluated.
    fn kind(&self) -> CellKind {
        CellKind::Combinational
    }

    /// Called once at gate construction to initialize cell-private state.
    fn prepare(&self, params: &mut serde_json::Value, ports: &[Port]) {
        let _ = (params, ports);
    }

    /// Computes new output signals from the gate's inputs and private state.
    fn operation(&self, ctx: CellContext<'_>) -> CellOutput;
}

/// A registry of cell types by name.
///
/// The engine resolves the `cell_type` of every `addGate` command against
/// this table.
#[derive(Clone, Default)]
pub struct CellRegistry {
    cells: HashMap<String, Arc<dyn Cell>>,
}

impl CellRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cell type with the given name.
    pub fn register(&mut self, name: impl Into<String>, cell: impl Cell + 'static) {
        self.cells.insert(name.into(), Arc::new(cell));
    }

    /// Returns the cell registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Cell>> {
        self.cells.get(name).cloned()
    }

    /// Returns true if a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns an iterator over registered type names.
    pub fn type_names(&self) -> impl Iterator<Item = &String> {
        self.cells.keys()
    }

    /// Unregisters a cell type.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.cells.remove(name).is_some()
    }
}

impl std::fmt::Debug for CellRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellRegistry")
            .field("registered_types", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    struct Echo;

    impl Cell for Echo {
        fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
            let mut outputs = SignalMap::new();
            if let Some(sig) = ctx.inputs.get("in") {
                outputs.insert("out".to_string(), sig.clone());
            }
            CellOutput::new(outputs)
        }
    }

    #[test]
    fn registry_basic() {
        let mut registry = CellRegistry::new();
        assert!(registry.is_empty());

        registry.register("Echo", Echo);
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Echo"));
        assert!(registry.get("Echo").is_some());
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn registry_unregister() {
        let mut registry = CellRegistry::new();
        registry.register("Echo", Echo);

        assert!(registry.unregister("Echo"));
        assert!(!registry.contains("Echo"));
        assert!(!registry.unregister("Echo"));
    }

    #[test]
    fn cell_kind_special() {
        assert!(!CellKind::Combinational.is_special());
        assert!(CellKind::Source.is_special());
        assert!(CellKind::Sink.is_special());
        assert!(CellKind::Subcircuit.is_special());
    }

    #[test]
    fn operation_sees_inputs() {
        let cell = Echo;
        let mut inputs = SignalMap::new();
        inputs.insert("in".to_string(), Signal::from_bool(true));
        let mut params = serde_json::json!({});

        let out = cell.operation(CellContext {
            inputs: &inputs,
            params: &mut params,
        });
        assert_eq!(out.outputs["out"], Signal::from_bool(true));
        assert!(!out.reenqueue);
    }

    #[test]
    fn reenqueue_builder() {
        let out = CellOutput::new(SignalMap::new()).and_reenqueue();
        assert!(out.reenqueue);
    }
}
