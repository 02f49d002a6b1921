//! # Scheduler (C10, §4.7)
//!
//! Owns the event sorter (calendar queue by default, `BinaryHeap` sorter as
//! a diagnostic alternative) plus a per-particle cache of each particle's
//! next predicted event. Detects stale events at pop time by comparing the
//! cached event's `counter` against the target particle's live
//! `event_counter` (§4.10): if they differ, the particle has moved since
//! the event was predicted, and the event is discarded rather than acted
//! on.

pub mod binary_heap_sorter;
pub mod calendar;
pub mod event;

pub use binary_heap_sorter::BinaryHeapSorter;
pub use calendar::CalendarQueue;
pub use event::{Event, EventKind, QueuedEvent};

use crate::particle::ParticleId;

/// Which concrete sorter backs a [`Scheduler`] (§4.7's "two interchangeable
/// sorters").
#[derive(Debug)]
pub enum Sorter {
    Calendar(CalendarQueue),
    BinaryHeap(BinaryHeapSorter),
}

impl Sorter {
    pub fn push(&mut self, entry: QueuedEvent) {
        match self {
            Sorter::Calendar(q) => q.push(entry),
            Sorter::BinaryHeap(q) => q.push(entry),
        }
    }

    pub fn pop(&mut self) -> Option<QueuedEvent> {
        match self {
            Sorter::Calendar(q) => q.pop(),
            Sorter::BinaryHeap(q) => q.pop(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Sorter::Calendar(q) => q.len(),
            Sorter::BinaryHeap(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of [`Scheduler::pop_live`]: the popped event, if any, plus any
/// particles whose cached prediction was found stale (because their
/// interaction partner's counter had moved on) and so now need a fresh call
/// to `predict_for_particle` — nothing else will trigger one for them, since
/// their own state did not change.
#[derive(Debug, Default)]
pub struct PopOutcome {
    pub event: Option<Event>,
    pub needs_repredict: Vec<ParticleId>,
}

/// The event scheduler: one sorter, one monotonic insertion counter, and a
/// per-particle "next event" cache used to re-predict a single particle's
/// event without re-scanning the whole system (§4.7).
#[derive(Debug)]
pub struct Scheduler {
    sorter: Sorter,
    next_seq: u64,
    /// `next_event[particle.index()]` is the most recently pushed event
    /// whose target is that particle, if any is still outstanding.
    next_event: Vec<Option<Event>>,
}

impl Scheduler {
    pub fn new(sorter: Sorter, n_particles: usize) -> Self {
        Scheduler {
            sorter,
            next_seq: 0,
            next_event: vec![None; n_particles],
        }
    }

    /// Schedules `event`, recording it as `event.target`'s current next
    /// event.
    pub fn push(&mut self, event: Event) {
        self.next_event[event.target.index()] = Some(event.clone());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.sorter.push(QueuedEvent { event, insert_seq: seq });
    }

    /// Invalidates `id`'s outstanding event without touching the sorter: the
    /// stale entry is discarded lazily when it is eventually popped and its
    /// counter no longer matches (§4.10). This avoids an `O(log n)` removal
    /// from the middle of the sorter on every single event execution.
    pub fn invalidate(&mut self, id: ParticleId) {
        self.next_event[id.index()] = None;
    }

    /// Pops the earliest event that is still live: an event is live if it is
    /// still recorded as its target's `next_event`, its `counter` matches the
    /// `live_counter` supplied by the caller for the target, and (for pair
    /// events) its `source_counter` matches the live counter of the source
    /// (§4.10 — a pair prediction goes stale when either participant
    /// changes, not just the target). Entries that fail the `next_event`
    /// identity check are plain duplicates of an already-superseded
    /// prediction and are just dropped. Entries that fail the counter check
    /// while still being the target's current prediction mean the target
    /// itself has not re-predicted since its partner changed — nothing else
    /// will notice this, so the target is added to `needs_repredict` for the
    /// caller to re-run `predict_for_particle` on.
    pub fn pop_live<F>(&mut self, live_counter: F, diagnostics: &mut crate::diagnostics::Diagnostics) -> PopOutcome
    where
        F: Fn(ParticleId) -> u64,
    {
        let mut needs_repredict = Vec::new();
        loop {
            let queued = match self.sorter.pop() {
                Some(q) => q,
                None => return PopOutcome { event: None, needs_repredict },
            };
            let target = queued.event.target;
            let is_current = self.next_event[target.index()]
                .as_ref()
                .map(|e| e.counter == queued.event.counter && e.time == queued.event.time)
                .unwrap_or(false);
            if !is_current {
                diagnostics.record_stale_event();
                continue;
            }
            let source_live_ok = queued
                .event
                .source
                .map(|s| queued.event.source_counter == Some(live_counter(s)))
                .unwrap_or(true);
            if queued.event.counter != live_counter(target) || !source_live_ok {
                diagnostics.record_stale_event();
                self.next_event[target.index()] = None;
                needs_repredict.push(target);
                continue;
            }
            self.next_event[target.index()] = None;
            diagnostics.record_event_executed();
            return PopOutcome {
                event: Some(queued.event),
                needs_repredict,
            };
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sorter.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.sorter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(time: f64, target: ParticleId, counter: u64) -> Event {
        Event::new(time, EventKind::Interaction, target, None, 0, counter, None)
    }

    fn pair_event(time: f64, target: ParticleId, counter: u64, source: ParticleId, source_counter: u64) -> Event {
        Event::new(time, EventKind::Interaction, target, Some(source), 0, counter, Some(source_counter))
    }

    #[test]
    fn pop_live_returns_current_event() {
        let mut sched = Scheduler::new(Sorter::Calendar(CalendarQueue::new(1.0, 8)), 2);
        sched.push(sample_event(1.0, ParticleId(0), 0));
        let mut diag = crate::diagnostics::Diagnostics::new();
        let outcome = sched.pop_live(|_| 0, &mut diag);
        assert!(outcome.event.is_some());
        assert!(outcome.needs_repredict.is_empty());
        assert_eq!(diag.events_executed, 1);
    }

    #[test]
    fn pop_live_skips_stale_event_after_invalidate() {
        let mut sched = Scheduler::new(Sorter::Calendar(CalendarQueue::new(1.0, 8)), 2);
        sched.push(sample_event(1.0, ParticleId(0), 0));
        sched.invalidate(ParticleId(0));
        sched.push(sample_event(2.0, ParticleId(0), 1));
        let mut diag = crate::diagnostics::Diagnostics::new();
        let outcome = sched.pop_live(|_| 1, &mut diag);
        let ev = outcome.event.unwrap();
        assert_eq!(ev.time, 2.0);
        assert_eq!(diag.stale_events, 1);
    }

    #[test]
    fn binary_heap_sorter_variant_also_works() {
        let mut sched = Scheduler::new(Sorter::BinaryHeap(BinaryHeapSorter::new()), 1);
        sched.push(sample_event(5.0, ParticleId(0), 0));
        let mut diag = crate::diagnostics::Diagnostics::new();
        assert!(sched.pop_live(|_| 0, &mut diag).event.is_some());
    }

    #[test]
    fn pop_live_flags_target_for_repredict_when_only_source_counter_moved() {
        let mut sched = Scheduler::new(Sorter::Calendar(CalendarQueue::new(1.0, 8)), 2);
        // Particle 0's cached prediction references particle 1 at counter 0,
        // but particle 1 has since moved on to counter 1 (e.g. it collided
        // with something else) without particle 0's own counter changing.
        sched.push(pair_event(1.0, ParticleId(0), 0, ParticleId(1), 0));
        let live = |id: ParticleId| if id == ParticleId(1) { 1 } else { 0 };
        let mut diag = crate::diagnostics::Diagnostics::new();
        let outcome = sched.pop_live(live, &mut diag);
        assert!(outcome.event.is_none());
        assert_eq!(outcome.needs_repredict, vec![ParticleId(0)]);
        assert_eq!(diag.stale_events, 1);
    }
}
