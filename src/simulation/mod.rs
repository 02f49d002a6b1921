//! # Simulation facade (C11, §4.7-§4.9)
//!
//! Owns every subsystem and drives the event loop: pop the scheduler's next
//! live event, stream every particle up to that time, dispatch to the
//! owning subsystem's `execute`, invalidate and re-predict the affected
//! particles, repeat. Struct shape (one top-level struct owning params,
//! particle state and a step/run entry point) follows
//! `examples/a-samea-vicseksim-rs/src/simulation/mod.rs`'s `Simulation`;
//! the loop body itself has no teacher analogue (time-stepped vs
//! event-driven) and is built from §4.7-§4.9 directly.

pub mod tests;

use crate::boundary::{BoundaryCondition, BoxDimensions};
use crate::capture::CaptureStore;
use crate::diagnostics::Diagnostics;
use crate::error::{DynamoError, SetupError};
use crate::globals::Global;
use crate::interactions::InteractionList;
use crate::liouvillean::{Liouvillean, RelativeState};
use crate::locals::Local;
use crate::particle::{ParticleId, ParticleStore};
use crate::rng::DynamoRng;
use crate::scheduler::{CalendarQueue, Event, EventKind, Scheduler, Sorter};
use crate::species::Species;
use crate::systems::System;

/// The running state of one simulation replica (§4.7-§4.9).
pub struct Simulation {
    pub particles: ParticleStore,
    pub box_dimensions: BoxDimensions,
    pub boundary: BoundaryCondition,
    pub liouvillean: Liouvillean,
    pub species: Vec<Species>,
    pub interactions: InteractionList,
    pub locals: Vec<Local>,
    pub globals: Vec<Global>,
    pub systems: Vec<System>,
    pub capture: CaptureStore,
    pub diagnostics: Diagnostics,
    pub rng: DynamoRng,
    pub global_time: f64,
    scheduler: Scheduler,
    overlap_tolerance: f64,
}

impl Simulation {
    /// §4.9's five-step setup sequence: validate species partition, validate
    /// box size against the longest interaction distance, seed every
    /// particle's neighbour-cell global, predict every particle's first
    /// event, and schedule every System's first firing.
    pub fn initialise(
        particles: ParticleStore,
        box_dimensions: BoxDimensions,
        boundary: BoundaryCondition,
        liouvillean: Liouvillean,
        species: Vec<Species>,
        interactions: InteractionList,
        locals: Vec<Local>,
        mut globals: Vec<Global>,
        systems: Vec<System>,
        seed: u64,
    ) -> Result<Self, DynamoError> {
        crate::species::validate_partition(&species, particles.len()).map_err(DynamoError::Setup)?;

        let longest = interactions.longest_interaction_distance();
        for (axis, length) in [
            (0usize, box_dimensions.lengths.x),
            (1, box_dimensions.lengths.y),
            (2, box_dimensions.lengths.z),
        ] {
            if boundary.is_periodic_axis(axis) && longest > 0.0 && length <= 2.0 * longest {
                return Err(DynamoError::Setup(SetupError::BoxTooSmall {
                    axis,
                    box_length: length,
                    required: 2.0 * longest,
                }));
            }
        }

        for p in particles.iter() {
            for global in globals.iter_mut() {
                if let Global::Cells { list, .. } | Global::ShearingCells { list, .. } | Global::SOCells { list, .. } =
                    global
                {
                    list.insert(p.id(), p.position);
                }
            }
        }

        let mut sim = Simulation {
            scheduler: Scheduler::new(Sorter::Calendar(CalendarQueue::new(1.0, 64)), particles.len()),
            particles,
            box_dimensions,
            boundary,
            liouvillean,
            species,
            interactions,
            locals,
            globals,
            systems,
            capture: CaptureStore::new(),
            diagnostics: Diagnostics::new(),
            rng: DynamoRng::new(seed),
            global_time: 0.0,
            overlap_tolerance: 1e-8,
        };

        // Seed capture state: a pair whose initial separation already falls
        // inside a well/bond is captured from t=0, not just from the first
        // in-root event it happens to generate (§4.5).
        let ids: Vec<ParticleId> = sim.particles.iter().map(|p| p.id()).collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = (ids[i], ids[j]);
                if let Some(interaction) = sim.interactions.find_for_pair(a, b) {
                    let state = RelativeState::of(sim.particles.get(a), sim.particles.get(b));
                    if interaction.potential.capture_test(&state) {
                        sim.capture.capture(a, b, 1);
                    }
                }
            }
        }

        for id in ids {
            sim.predict_for_particle(id);
        }
        for (idx, system) in sim.systems.iter().enumerate() {
            sim.scheduler.push(Event::new(
                system.next_fire_time(),
                EventKind::System,
                ParticleId(0),
                None,
                idx as u32,
                0,
                None,
            ));
        }

        Ok(sim)
    }

    fn mass_of(&self, id: ParticleId) -> f64 {
        self.species
            .iter()
            .find(|s| s.contains(id))
            .map(|s| s.mass_of(id))
            .unwrap_or(1.0)
    }

    /// Candidate interaction partners for `id`: every other particle, unless
    /// a fully periodic boundary and a cell-based Global whose cell width
    /// covers the longest interaction distance let us narrow the search to
    /// the 27-cell neighbourhood instead (§4.4's neighbour-list fast path).
    /// Both conditions are required for correctness: a cell narrower than
    /// the interaction range can miss a neighbour two cells away, and a
    /// non-periodic boundary means the cell list's wraparound stencil does
    /// not correspond to the simulation's actual topology.
    fn candidate_partners(&self, id: ParticleId) -> Vec<ParticleId> {
        if self.interactions.iter().next().is_none() {
            return Vec::new();
        }
        let longest = self.interactions.longest_interaction_distance();
        let fully_periodic = (0..3).all(|axis| self.boundary.is_periodic_axis(axis));
        if fully_periodic && longest > 0.0 {
            for global in &self.globals {
                if let Some(list) = global.cell_list() {
                    if list.min_cell_width() >= longest {
                        let mut candidates = Vec::new();
                        global.for_each_neighbour(self.particles.get(id), |pid| {
                            if pid != id {
                                candidates.push(pid);
                            }
                        });
                        return candidates;
                    }
                }
            }
        }
        self.particles.iter().map(|p| p.id()).filter(|&pid| pid != id).collect()
    }

    /// Predicts the soonest event for `id` across every Interaction partner,
    /// Local and Global, and pushes the winner onto the scheduler.
    fn predict_for_particle(&mut self, id: ParticleId) {
        let counter = self.particles.get(id).event_counter;
        let mut best: Option<Event> = None;

        for partner in self.candidate_partners(id) {
            if let Some(interaction) = self.interactions.find_for_pair(id, partner) {
                let state = RelativeState::of(self.particles.get(id), self.particles.get(partner));
                let inside = self.capture.is_captured(id, partner);
                if let Some(t) = interaction.potential.predict_event_time(&state, inside) {
                    let partner_counter = self.particles.get(partner).event_counter;
                    let candidate = Event::new(
                        self.global_time + t,
                        EventKind::Interaction,
                        id,
                        Some(partner),
                        interaction.id.0,
                        counter,
                        Some(partner_counter),
                    );
                    best = earliest(best, Some(candidate));
                }
            }
        }

        for (idx, local) in self.locals.iter().enumerate() {
            if let Some(t) = local.predict(self.particles.get(id)) {
                best = earliest(
                    best,
                    Some(Event::new(
                        self.global_time + t,
                        EventKind::Local,
                        id,
                        None,
                        idx as u32,
                        counter,
                        None,
                    )),
                );
            }
        }

        for (idx, global) in self.globals.iter().enumerate() {
            if let Some(ge) = global.predict(self.particles.get(id)) {
                best = earliest(
                    best,
                    Some(Event::new(
                        self.global_time + ge.time,
                        EventKind::Global,
                        id,
                        None,
                        idx as u32,
                        counter,
                        None,
                    )),
                );
            }
        }

        if best.is_none() {
            if let Some(t) = crate::globals::pbc_sentinel_time(self.particles.get(id), &self.box_dimensions) {
                best = Some(Event::new(
                    self.global_time + t,
                    EventKind::Virtual,
                    id,
                    None,
                    0,
                    counter,
                    None,
                ));
            }
        }

        if let Some(event) = best {
            self.scheduler.push(event);
        }
    }

    fn stream_all(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for p in self.particles.iter_mut() {
            self.liouvillean.stream(p, dt);
        }
        self.boundary.stream(dt);
        self.global_time += dt;
    }

    /// Runs one scheduler pop-to-execute cycle: advances the clock to the
    /// next live event, applies its effect, and re-predicts every particle
    /// whose state changed. Returns `false` once the scheduler is empty.
    pub fn run_simulation_step(&mut self) -> Result<bool, DynamoError> {
        let counters: Vec<u64> = self.particles.iter().map(|p| p.event_counter).collect();
        let outcome = self.scheduler.pop_live(|id| counters[id.index()], &mut self.diagnostics);
        for id in outcome.needs_repredict {
            self.predict_for_particle(id);
        }
        let event = match outcome.event {
            Some(e) => e,
            None => return Ok(false),
        };
        log::trace!("dequeued {:?} for {} at t={}", event.kind, event.target, event.time);

        if event.time < self.global_time - 1e-9 {
            log::error!(
                "invariant breach: popped event at t={} but global time is already t={}",
                event.time,
                self.global_time
            );
            return Err(DynamoError::InvariantBreach {
                event_time: event.time,
                global_time: self.global_time,
            });
        }
        let dt = (event.time - self.global_time).max(0.0);
        self.stream_all(dt);

        let mut touched = vec![event.target];
        match event.kind {
            EventKind::Interaction => {
                if let Some(partner) = event.source {
                    let interaction = self.interactions.get(crate::interactions::InteractionId(event.subsystem_id));
                    let potential = interaction.potential.clone();
                    let inside_before = self.capture.is_captured(event.target, partner);
                    let (m1, m2) = (self.mass_of(event.target), self.mass_of(partner));
                    let (p1, p2) = self.particles.get_pair_mut(event.target, partner);
                    let outcome = potential.execute(p1, p2, m1, m2, inside_before, &mut self.rng);
                    if outcome.inside_after {
                        self.capture.capture(event.target, partner, 1);
                    } else {
                        self.capture.release(event.target, partner);
                    }
                    touched.push(partner);
                }
            }
            EventKind::Local => {
                let mass = self.mass_of(event.target);
                let local = &mut self.locals[event.subsystem_id as usize];
                let p = self.particles.get_mut(event.target);
                local.execute(p, mass, event.time, &mut self.rng);
            }
            EventKind::Global => {
                let global = &mut self.globals[event.subsystem_id as usize];
                let p = self.particles.get(event.target);
                global.execute(p);
            }
            EventKind::Virtual => {
                let wrapped = self
                    .boundary
                    .apply_position(self.particles.get(event.target).position, &self.box_dimensions);
                self.particles.get_mut(event.target).position = wrapped;
                self.particles.get_mut(event.target).touch();
            }
            EventKind::System => {
                let mass_table: Vec<f64> = (0..self.particles.len())
                    .map(|i| self.mass_of(ParticleId(i as u32)))
                    .collect();
                let mass_of = move |id: ParticleId| mass_table[id.index()];
                let system = &mut self.systems[event.subsystem_id as usize];
                system.fire(&mut self.particles, mass_of, &mut self.rng);
                let next_time = system.next_fire_time();
                let idx = event.subsystem_id;
                self.scheduler
                    .push(Event::new(next_time, EventKind::System, ParticleId(0), None, idx, 0, None));
                touched.clear();
            }
            EventKind::None => {}
        }

        for id in touched {
            log::debug!("invalidating and re-predicting {id}");
            self.scheduler.invalidate(id);
            self.predict_for_particle(id);
        }

        Ok(true)
    }

    /// Runs until `max_events` executed or the scheduler drains, whichever
    /// comes first.
    pub fn run(&mut self, max_events: u64) -> Result<u64, DynamoError> {
        let mut executed = 0;
        while executed < max_events {
            if !self.run_simulation_step()? {
                break;
            }
            executed += 1;
        }
        Ok(executed)
    }

    /// Total energy of the system (§8 energy invariant): kinetic energy of
    /// every dynamic particle plus the internal (well/step) energy of every
    /// currently-captured pair. NVE scenarios with exclusively hard-core
    /// potentials (no wells) see the internal term vanish and this equal the
    /// kinetic energy alone.
    pub fn total_energy(&self) -> f64 {
        let kinetic: f64 = self
            .particles
            .iter()
            .filter(|p| p.is_dynamic())
            .map(|p| 0.5 * self.mass_of(p.id()) * p.velocity.norm_squared())
            .sum();
        kinetic + self.interactions.internal_energy(&self.capture)
    }

    /// Checks the no-overlap invariant (§8 property 3) across every
    /// Interaction-matched pair, incrementing diagnostics for each
    /// violation found and returning the violation count.
    pub fn check_overlaps(&mut self) -> u64 {
        let ids: Vec<ParticleId> = self.particles.iter().map(|p| p.id()).collect();
        let mut violations = 0;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = (ids[i], ids[j]);
                if let Some(interaction) = self.interactions.find_for_pair(a, b) {
                    let state = RelativeState::of(self.particles.get(a), self.particles.get(b));
                    if interaction.potential.check_overlap(&state, self.overlap_tolerance) {
                        violations += 1;
                        self.diagnostics.record_overlap();
                    }
                }
            }
        }
        violations
    }

    /// Swaps the velocity scale of this replica with `other` by the ratio of
    /// their target temperatures, the momentum-conserving move used by
    /// replica exchange (§4.8): both replicas' velocities are rescaled by
    /// `sqrt(t_other / t_self)` and `sqrt(t_self / t_other)` respectively,
    /// leaving positions untouched.
    pub fn replica_exchange(&mut self, other: &mut Simulation, self_temperature: f64, other_temperature: f64) {
        let ratio_self = (other_temperature / self_temperature).sqrt();
        let ratio_other = (self_temperature / other_temperature).sqrt();
        for p in self.particles.iter_mut() {
            if p.is_dynamic() {
                p.velocity = p.velocity * ratio_self;
                p.touch();
            }
        }
        for p in other.particles.iter_mut() {
            if p.is_dynamic() {
                p.velocity = p.velocity * ratio_other;
                p.touch();
            }
        }
    }
}

fn earliest(a: Option<Event>, b: Option<Event>) -> Option<Event> {
    match (a, b) {
        (Some(x), Some(y)) => {
            if x.time <= y.time {
                Some(x)
            } else {
                Some(y)
            }
        }
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}
