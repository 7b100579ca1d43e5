//! Special IO cells.
//!
//! These classify gates the scheduler never evaluates: sources are driven
//! externally via `changeInput`, sinks absorb signals (and forward them to
//! an enclosing subcircuit port when bound to a `net`).

use crate::cell::{Cell, CellContext, CellKind, CellOutput};

/// An externally driven source gate with a single out-port `out`.
///
/// Registered as `Input`, `Button` and `NumEntry`.
#[derive(Clone, Copy, Debug)]
pub struct Input;

impl Cell for Input {
    fn kind(&self) -> CellKind {
        CellKind::Source
    }

    fn operation(&self, _ctx: CellContext<'_>) -> CellOutput {
        // Never scheduled; outputs are set through changeInput.
        CellOutput::default()
    }
}

/// A sink gate with a single in-port `in`.
///
/// Registered as `Output`, `Lamp` and `NumDisplay`. Inside a subcircuit
/// body, an `Output` carries a `net` param naming the enclosing gate's
/// out-port it drives; at top level it is terminal.
#[derive(Clone, Copy, Debug)]
pub struct Output;

impl Cell for Output {
    fn kind(&self) -> CellKind {
        CellKind::Sink
    }

    fn operation(&self, _ctx: CellContext<'_>) -> CellOutput {
        CellOutput::default()
    }
}
