//! Event representation (§3 "Event", §4.7).
//!
//! Struct shape (`Queued<T>`-style wrapper with an explicit tie-break key)
//! is grounded in
//! `examples/19h-ftsim/crates/ftsim-engine/src/events.rs::Queued`; the
//! `EventKind` set is taken from §3 verbatim.

use crate::particle::ParticleId;
use std::cmp::Ordering;

/// What produced an event, dispatched back to the right subsystem on pop
/// (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    Interaction,
    Local,
    Global,
    System,
    Virtual,
    None,
}

/// `(time, kind, target-id, source-id, counter)` (§3). `counter` is the
/// target's `event_counter` at prediction time, used for stale-event
/// detection at pop (§4.10). `source_counter` is the interaction partner's
/// `event_counter` at the same prediction time, if any: a pair prediction
/// goes stale not only when the target changes but also when the partner
/// does, and checking only `counter` misses that case.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub target: ParticleId,
    pub source: Option<ParticleId>,
    /// Index into the owning subsystem's list (which Interaction/Local/
    /// Global/System produced this), resolved by the scheduler on pop.
    pub subsystem_id: u32,
    pub counter: u64,
    pub source_counter: Option<u64>,
}

impl Event {
    pub fn new(
        time: f64,
        kind: EventKind,
        target: ParticleId,
        source: Option<ParticleId>,
        subsystem_id: u32,
        counter: u64,
        source_counter: Option<u64>,
    ) -> Self {
        Event {
            time,
            kind,
            target,
            source,
            subsystem_id,
            counter,
            source_counter,
        }
    }
}

/// A queue entry: an [`Event`] plus a monotonic insertion sequence number
/// used to break exact time ties deterministically (§8 property 6), the way
/// `Queued<T>::insert_seq` does in the ftsim-engine scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEvent {
    pub event: Event,
    pub insert_seq: u64,
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    /// Min-heap ordering for use inside a `BinaryHeap` (which is a max-heap):
    /// the comparison is reversed so the earliest time, then the earliest
    /// insertion, sorts first when popped via `Reverse` or a wrapping min-heap
    /// adapter.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .time
            .partial_cmp(&self.event.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.insert_seq.cmp(&self.insert_seq))
    }
}
