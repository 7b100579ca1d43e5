//! Free-running clock cell.

use crate::cell::{Cell, CellContext, CellOutput};
use crate::gate::{Port, SignalMap};
use crate::signal::Signal;

/// A self-oscillating clock driving `out`.
///
/// The clock keeps its current level in cell-private state and flips it on
/// every evaluation, requesting re-enqueue each time. With propagation `p`
/// the output therefore toggles every `p` ticks for as long as the gate
/// lives, and the event queue never runs dry.
#[derive(Clone, Copy, Debug)]
pub struct Clock;

impl Cell for Clock {
    fn prepare(&self, params: &mut serde_json::Value, _ports: &[Port]) {
        params["level"] = serde_json::Value::Bool(false);
    }

    fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
        let level = !ctx.params["level"].as_bool().unwrap_or(false);
        ctx.params["level"] = serde_json::Value::Bool(level);

        let mut outputs = SignalMap::new();
        outputs.insert("out".to_string(), Signal::from_bool(level));
        CellOutput::new(outputs).and_reenqueue()
    }
}
