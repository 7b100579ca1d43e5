//! Integration tests for scheduler ordering and stepping.
//!
//! These pin down tie-breaking within a tick, same-tick re-entry, idle
//! advancement under slow stepping, and the self-rescheduling oscillator
//! contract.

use std::sync::{Arc, Mutex};

use gatesim::cell::{Cell, CellContext, CellOutput};
use gatesim::cells::default_registry;
use gatesim::command::GateInit;
use gatesim::engine::Engine;
use gatesim::gate::{Port, SignalMap};
use gatesim::signal::Signal;

// ============================================================================
// Test cells
// ============================================================================

/// A cell that appends its gate's `tag` param to a shared log on every
/// evaluation, optionally re-enqueueing itself once.
struct RecorderCell {
    log: Arc<Mutex<Vec<String>>>,
}

impl Cell for RecorderCell {
    fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
        let tag = ctx.params["tag"].as_str().unwrap_or("?").to_string();
        self.log.lock().unwrap().push(tag);

        let again = ctx.params["again"].as_bool().unwrap_or(false);
        if again {
            ctx.params["again"] = serde_json::Value::Bool(false);
            CellOutput::new(SignalMap::new()).and_reenqueue()
        } else {
            CellOutput::new(SignalMap::new())
        }
    }
}

fn recorder_engine(log: &Arc<Mutex<Vec<String>>>) -> Engine {
    let mut registry = default_registry();
    registry.register(
        "Recorder",
        RecorderCell {
            log: Arc::clone(log),
        },
    );
    let mut engine = Engine::new(registry);
    engine.add_graph("g".to_string()).unwrap();
    engine
}

fn recorder_init(tag: &str, propagation: u64, again: bool) -> GateInit {
    GateInit {
        cell_type: "Recorder".to_string(),
        ports: vec![Port::input("in", 1), Port::output("out", 1)],
        params: serde_json::json!({
            "tag": tag,
            "propagation": propagation,
            "again": again,
        }),
        input_signals: SignalMap::new(),
        output_signals: SignalMap::new(),
    }
}

// ============================================================================
// Ordering within a tick
// ============================================================================

#[test]
fn gates_evaluate_in_first_enqueue_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = recorder_engine(&log);

    engine.add_gate("g", "a".to_string(), recorder_init("a", 1, false)).unwrap();
    engine.add_gate("g", "b".to_string(), recorder_init("b", 1, false)).unwrap();
    engine.add_gate("g", "c".to_string(), recorder_init("c", 1, false)).unwrap();

    engine.update_gates_next();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn same_tick_reentry_joins_the_drain_tail() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = recorder_engine(&log);

    // `a` re-enqueues itself once with zero propagation: it lands at the
    // draining tick, behind `b`.
    engine.add_gate("g", "a".to_string(), recorder_init("a", 0, true)).unwrap();
    engine.add_gate("g", "b".to_string(), recorder_init("b", 0, false)).unwrap();

    engine.update_gates_next();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a"]);
    assert!(!engine.has_pending_events());
}

#[test]
fn reenqueue_with_delay_lands_on_a_later_tick() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = recorder_engine(&log);

    engine.add_gate("g", "a".to_string(), recorder_init("a", 2, true)).unwrap();

    engine.update_gates_next();
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
    assert!(engine.has_pending_events());

    engine.update_gates_next();
    assert_eq!(*log.lock().unwrap(), vec!["a", "a"]);
    assert!(!engine.has_pending_events());
    // First drain at tick 2, second at 2 + 2.
    assert_eq!(engine.tick(), 5);
}

// ============================================================================
// Slow stepping
// ============================================================================

#[test]
fn slow_steps_advance_idle_ticks_between_events() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = recorder_engine(&log);

    engine.add_gate("g", "a".to_string(), recorder_init("a", 4, false)).unwrap();

    // Scheduled at tick 4: three idle steps first, then the drain.
    for _ in 0..3 {
        engine.update_gates();
    }
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(engine.tick(), 3);

    engine.update_gates();
    assert_eq!(engine.tick(), 4);
    engine.update_gates();
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
    assert_eq!(engine.tick(), 5);
}

// ============================================================================
// Oscillator
// ============================================================================

#[test]
fn clock_toggles_every_propagation_ticks() {
    let mut engine = Engine::new(default_registry());
    engine.add_graph("g".to_string()).unwrap();
    engine
        .add_gate(
            "g",
            "clk".to_string(),
            GateInit {
                cell_type: "Clock".to_string(),
                ports: vec![Port::output("out", 1)],
                params: serde_json::json!({ "propagation": 5 }),
                input_signals: SignalMap::new(),
                output_signals: SignalMap::new(),
            },
        )
        .unwrap();

    let mut toggles = 0u64;
    let mut last = engine.output_signal("g", "clk", "out").unwrap().clone();
    while engine.tick() <= 1000 {
        engine.update_gates();
        // The queue must never run dry: the clock always re-enqueues.
        assert!(engine.has_pending_events());
        let current = engine.output_signal("g", "clk", "out").unwrap().clone();
        if current != last {
            toggles += 1;
            last = current;
        }
    }

    assert_eq!(toggles, 1000 / 5);
    assert_eq!(
        engine.output_signal("g", "clk", "out"),
        Some(&Signal::from_bool(1000 / 5 % 2 == 1))
    );
}
