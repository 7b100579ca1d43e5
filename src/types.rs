//! Core type definitions for the simulation engine.
//!
//! This module defines the fundamental identifier and time types used
//! throughout the engine.

/// Discrete simulation time unit (one scheduler step).
///
/// Ticks are monotonic and 64-bit wide, so the tick-keyed event queue
/// never reorders over the lifetime of a realistic run.
pub type Tick = u64;

/// Unique identifier for a graph (a top-level circuit or a subcircuit body).
pub type GraphId = String;

/// Identifier for a gate, unique within its graph.
pub type GateId = String;

/// Identifier for a link, unique within its graph.
pub type LinkId = String;

/// Port identifier type.
///
/// Used to identify a named input/output pin on a gate.
pub type PortId = String;
