//! Tick-ordered event scheduler.
//!
//! The scheduler maintains a discrete-event queue keyed by integer ticks:
//! a min-heap of tick keys over per-tick worklists of gates. Within a tick,
//! gates are evaluated in first-enqueue order; gates enqueued while a tick
//! is draining join the tail of the same drain.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::types::{GateId, GraphId, Tick};

/// A gate reference as stored in the queue.
pub type GateKey = (GraphId, GateId);

/// The set of gates pending at one tick.
///
/// Insertion-ordered and deduplicated by gate identity: re-enqueueing a
/// gate already pending at this tick keeps its original position. Supports
/// head removal while new gates are appended, which is what lets a drain
/// absorb same-tick re-entries from the propagator.
#[derive(Clone, Debug, Default)]
pub struct TickQueue {
    order: VecDeque<GateKey>,
    members: HashSet<GateKey>,
}

impl TickQueue {
    /// Adds a gate to the tail unless it is already pending.
    pub fn insert(&mut self, key: GateKey) {
        if self.members.insert(key.clone()) {
            self.order.push_back(key);
        }
    }

    /// Removes and returns the gate at the head.
    pub fn pop_front(&mut self) -> Option<GateKey> {
        let key = self.order.pop_front()?;
        self.members.remove(&key);
        Some(key)
    }

    /// Returns true if no gates are pending.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the number of pending gates.
    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// The tick-ordered event queue.
///
/// `heap` is a min-heap over the tick keys present in `queue`; it may hold
/// duplicates of a key (one per insert while the bucket looked new), which
/// the pop path skips past.
#[derive(Debug, Default)]
pub struct Scheduler {
    tick: Tick,
    queue: HashMap<Tick, TickQueue>,
    heap: BinaryHeap<Reverse<Tick>>,
}

impl Scheduler {
    /// Creates a scheduler at tick 0 with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current simulated tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Schedules `key` for evaluation `delay` ticks from now.
    ///
    /// Returns the absolute tick the gate was scheduled at.
    pub fn schedule(&mut self, key: GateKey, delay: Tick) -> Tick {
        let at = self.tick + delay;
        let bucket = self.queue.entry(at).or_default();
        if bucket.is_empty() {
            self.heap.push(Reverse(at));
        }
        bucket.insert(key);
        at
    }

    /// Returns the earliest tick with pending gates, without removing it.
    pub fn peek_next(&mut self) -> Option<Tick> {
        while let Some(&Reverse(at)) = self.heap.peek() {
            if self.queue.contains_key(&at) {
                return Some(at);
            }
            // Stale duplicate key left behind by an earlier drain.
            self.heap.pop();
        }
        None
    }

    /// True iff any gate is pending at any tick.
    pub fn has_pending_events(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Advances the current tick by one without evaluating anything.
    ///
    /// Used by the slow stepping mode so time-based cells observe idle
    /// ticks passing.
    pub fn advance_idle(&mut self) {
        self.tick += 1;
    }

    /// Begins draining the next ready tick: pops the earliest key, asserts
    /// it has not fallen behind the clock, and makes it the current tick.
    ///
    /// Returns `None` if the queue is empty.
    pub fn begin_drain(&mut self) -> Option<Tick> {
        let at = self.peek_next()?;
        self.heap.pop();
        debug_assert!(at >= self.tick, "scheduler key {at} behind tick {}", self.tick);
        self.tick = at;
        Some(at)
    }

    /// Takes the next pending gate at `at`, if any.
    ///
    /// The propagator may schedule more gates at `at` between calls; they
    /// are returned by subsequent calls in arrival order.
    pub fn pop_due(&mut self, at: Tick) -> Option<GateKey> {
        self.queue.get_mut(&at)?.pop_front()
    }

    /// Finishes a drain: drops the (now empty) bucket and moves the clock
    /// past the drained tick.
    pub fn finish_drain(&mut self, at: Tick) {
        debug_assert!(self.queue.get(&at).map_or(true, |b| b.is_empty()));
        self.queue.remove(&at);
        self.tick = at + 1;
    }

    /// Number of ticks currently holding pending gates.
    pub fn pending_tick_count(&self) -> usize {
        self.queue.len()
    }
}
