//! # Diagnostics (§4.10, §8)
//!
//! Non-fatal run-time counters. §7 draws a hard line between these and
//! [`crate::error::DynamoError`]: an overlap, a prediction-precision fault or
//! a stale event is logged and counted, never propagated as an error, since
//! EDMD runs routinely encounter a handful of each without being wrong.

use log::warn;

/// Accumulated counters for one simulation run (§4.10).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Diagnostics {
    /// Pairs found overlapping their hard core beyond tolerance, §8 invariant 3.
    pub overlap_count: u64,
    /// Times a predicted event time failed to reproduce on re-check within
    /// tolerance (floating point drift in root-finding).
    pub prediction_precision_faults: u64,
    /// Events popped from the scheduler whose target's event counter had
    /// already advanced (§4.7, §4.10): discarded and silently re-predicted.
    pub stale_events: u64,
    /// Total events executed.
    pub events_executed: u64,
    /// tc-model activations (§4.2): a re-collision inside the tc-interval
    /// had its post-collision speed clamped to the floor.
    pub tc_model_activations: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn record_overlap(&mut self) {
        self.overlap_count += 1;
        if self.overlap_count % 1000 == 1 {
            warn!("overlap count reached {}", self.overlap_count);
        }
    }

    pub fn record_prediction_precision_fault(&mut self) {
        self.prediction_precision_faults += 1;
    }

    pub fn record_stale_event(&mut self) {
        self.stale_events += 1;
    }

    pub fn record_event_executed(&mut self) {
        self.events_executed += 1;
    }

    pub fn record_tc_model_activation(&mut self) {
        self.tc_model_activations += 1;
    }

    /// Fraction of popped events that turned out to be stale; a run with a
    /// high ratio usually indicates the scheduler is thrashing (e.g. a cell
    /// list with too few particles per cell).
    pub fn stale_event_ratio(&self) -> f64 {
        let total = self.events_executed + self.stale_events;
        if total == 0 {
            0.0
        } else {
            self.stale_events as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let d = Diagnostics::new();
        assert_eq!(d.overlap_count, 0);
        assert_eq!(d.events_executed, 0);
    }

    #[test]
    fn stale_event_ratio_is_zero_with_no_events() {
        let d = Diagnostics::new();
        assert_eq!(d.stale_event_ratio(), 0.0);
    }

    #[test]
    fn stale_event_ratio_divides_correctly() {
        let mut d = Diagnostics::new();
        d.record_event_executed();
        d.record_event_executed();
        d.record_event_executed();
        d.record_stale_event();
        assert!((d.stale_event_ratio() - 0.25).abs() < 1e-12);
    }
}
