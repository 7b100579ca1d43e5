//! Integration tests for the observation and update-batching pipeline.

use gatesim::cells::default_registry;
use gatesim::command::GateInit;
use gatesim::engine::Engine;
use gatesim::gate::{Port, SignalMap};
use gatesim::graph::Endpoint;
use gatesim::signal::Signal;

// ============================================================================
// Helpers
// ============================================================================

fn engine_with_input(observed: bool) -> Engine {
    let mut engine = Engine::new(default_registry());
    engine.add_graph("g".to_string()).unwrap();
    engine
        .add_gate(
            "g",
            "i".to_string(),
            GateInit {
                cell_type: "Input".to_string(),
                ports: vec![Port::output("out", 1)],
                params: serde_json::json!({}),
                input_signals: SignalMap::new(),
                output_signals: {
                    let mut m = SignalMap::new();
                    m.insert("out".to_string(), Signal::from_bool(false));
                    m
                },
            },
        )
        .unwrap();
    if observed {
        engine.observe_graph("g").unwrap();
        engine.flush_updates();
    }
    engine
}

// ============================================================================
// Coalescing
// ============================================================================

#[test]
fn transitions_coalesce_to_last_value() {
    let mut engine = engine_with_input(true);

    engine.change_input("g", "i", Signal::from_bool(true)).unwrap();
    engine.change_input("g", "i", Signal::from_bool(false)).unwrap();
    engine.change_input("g", "i", Signal::from_bool(true)).unwrap();

    let msg = engine.flush_updates().unwrap();
    assert_eq!(msg.updates.len(), 1);
    assert_eq!(msg.updates[0].gate, "i");
    assert_eq!(msg.updates[0].outputs.len(), 1);
    assert_eq!(msg.updates[0].outputs["out"], Signal::from_bool(true));

    // Nothing left after the flush.
    assert!(engine.flush_updates().is_none());
}

#[test]
fn message_carries_tick_and_pending_flag() {
    let mut engine = engine_with_input(true);
    engine.update_gates();
    engine.update_gates();

    engine.change_input("g", "i", Signal::from_bool(true)).unwrap();
    let msg = engine.flush_updates().unwrap();
    assert_eq!(msg.tick, 2);
    assert!(!msg.has_pending_events);
}

// ============================================================================
// Observation lifecycle
// ============================================================================

#[test]
fn observe_resyncs_all_outputs() {
    let mut engine = Engine::new(default_registry());
    engine.add_graph("g".to_string()).unwrap();
    engine
        .add_gate(
            "g",
            "n".to_string(),
            GateInit {
                cell_type: "Not".to_string(),
                ports: vec![Port::input("in", 1), Port::output("out", 1)],
                params: serde_json::json!({}),
                input_signals: SignalMap::new(),
                output_signals: SignalMap::new(),
            },
        )
        .unwrap();
    while engine.has_pending_events() {
        engine.update_gates_next();
    }

    // Churn happened before the observer attached; observing reports the
    // current outputs anyway.
    engine.observe_graph("g").unwrap();
    let msg = engine.flush_updates().unwrap();
    assert_eq!(msg.updates.len(), 1);
    assert_eq!(msg.updates[0].gate, "n");
    assert!(msg.updates[0].outputs.contains_key("out"));
}

#[test]
fn unobserve_flushes_pending_then_goes_quiet() {
    let mut engine = engine_with_input(true);

    engine.change_input("g", "i", Signal::from_bool(true)).unwrap();
    engine.unobserve_graph("g").unwrap();

    // The mark queued before unobservation still flushes once.
    let msg = engine.flush_updates().unwrap();
    assert_eq!(msg.updates[0].outputs["out"], Signal::from_bool(true));

    // New transitions no longer produce marks.
    engine.change_input("g", "i", Signal::from_bool(false)).unwrap();
    assert!(engine.flush_updates().is_none());
}

#[test]
fn per_graph_observation_is_independent() {
    let mut engine = Engine::new(default_registry());
    for name in ["a", "b"] {
        engine.add_graph(name.to_string()).unwrap();
        engine
            .add_gate(
                name,
                "i".to_string(),
                GateInit {
                    cell_type: "Input".to_string(),
                    ports: vec![Port::output("out", 1)],
                    params: serde_json::json!({}),
                    input_signals: SignalMap::new(),
                    output_signals: SignalMap::new(),
                },
            )
            .unwrap();
    }
    engine.observe_graph("a").unwrap();
    engine.flush_updates();

    engine.change_input("a", "i", Signal::from_bool(true)).unwrap();
    engine.change_input("b", "i", Signal::from_bool(true)).unwrap();

    let msg = engine.flush_updates().unwrap();
    assert_eq!(msg.updates.len(), 1);
    assert_eq!(msg.updates[0].graph, "a");
}

// ============================================================================
// Update/gate removal interaction
// ============================================================================

#[test]
fn marks_for_removed_gates_are_dropped_at_flush() {
    let mut engine = engine_with_input(true);
    engine
        .add_gate(
            "g",
            "n".to_string(),
            GateInit {
                cell_type: "Not".to_string(),
                ports: vec![Port::input("in", 1), Port::output("out", 1)],
                params: serde_json::json!({}),
                input_signals: SignalMap::new(),
                output_signals: SignalMap::new(),
            },
        )
        .unwrap();
    engine
        .add_link(
            "g",
            "l1".to_string(),
            Endpoint::new("i", "out"),
            Endpoint::new("n", "in"),
        )
        .unwrap();
    while engine.has_pending_events() {
        engine.update_gates_next();
    }
    engine.flush_updates();

    engine.change_input("g", "i", Signal::from_bool(true)).unwrap();
    while engine.has_pending_events() {
        engine.update_gates_next();
    }
    // Both i and n are dirty; n disappears before the flush.
    engine.remove_gate("g", "n").unwrap();

    let msg = engine.flush_updates().unwrap();
    assert!(msg.updates.iter().all(|u| u.gate != "n"));
    assert!(msg.updates.iter().any(|u| u.gate == "i"));
}
