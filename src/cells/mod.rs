//! Built-in cell library.
//!
//! A small set of standard cell types covering combinational gates, a
//! self-rescheduling clock, and the special IO cells. Hosts with richer
//! libraries register their own types on top of (or instead of) these.

pub mod clock;
pub mod gates;
pub mod io;

use crate::cell::{Cell, CellContext, CellKind, CellOutput, CellRegistry};

/// A gate whose behavior is defined by an embedded graph.
///
/// Never evaluated; signals cross its boundary through the IO map bound by
/// `addSubcircuit`.
#[derive(Clone, Copy, Debug)]
pub struct Subcircuit;

impl Cell for Subcircuit {
    fn kind(&self) -> CellKind {
        CellKind::Subcircuit
    }

    fn operation(&self, _ctx: CellContext<'_>) -> CellOutput {
        CellOutput::default()
    }
}

/// Creates a registry with the built-in cell types.
///
/// Includes:
/// - `Not`, `Repeater` — unary gates over `in`
/// - `And`, `Or`, `Xor`, `Nand`, `Nor` — binary gates over `in1`/`in2`
/// - `Clock` — free-running oscillator
/// - `Input`, `Button`, `NumEntry` — externally driven sources
/// - `Output`, `Lamp`, `NumDisplay` — sinks
/// - `Subcircuit` — embedded-graph wrapper
pub fn default_registry() -> CellRegistry {
    use gates::{BinaryGate, BinaryOp, UnaryGate, UnaryOp};

    let mut registry = CellRegistry::new();

    registry.register("Not", UnaryGate::new(UnaryOp::Not));
    registry.register("Repeater", UnaryGate::new(UnaryOp::Repeat));
    registry.register("And", BinaryGate::new(BinaryOp::And));
    registry.register("Or", BinaryGate::new(BinaryOp::Or));
    registry.register("Xor", BinaryGate::new(BinaryOp::Xor));
    registry.register("Nand", BinaryGate::new(BinaryOp::Nand));
    registry.register("Nor", BinaryGate::new(BinaryOp::Nor));
    registry.register("Clock", clock::Clock);
    registry.register("Input", io::Input);
    registry.register("Button", io::Input);
    registry.register("NumEntry", io::Input);
    registry.register("Output", io::Output);
    registry.register("Lamp", io::Output);
    registry.register("NumDisplay", io::Output);
    registry.register("Subcircuit", Subcircuit);

    registry
}
