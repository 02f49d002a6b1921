//! # Particle store (C2)
//!
//! Owns positions, velocities, per-particle state bits and the peculiar-time
//! offset described in §3. The struct/derive shape (`Copy`, `serde`
//! (de)serialization, a `Display` impl) follows `bird::Bird` in
//! `examples/a-samea-vicseksim-rs/src/bird/mod.rs`; the fields themselves are
//! the DYNAMO data model, not the teacher's.

use crate::vector::Vec3;
use bitflags::bitflags;
use std::fmt::Display;

/// A stable, contiguous particle identifier. IDs always form the range
/// `[0, N)` for a store of `N` particles (§3 invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ParticleId(pub u32);

impl ParticleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Per-particle state bits (§3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct ParticleFlags: u8 {
        /// Trajectory integrates in time; a particle without this flag has
        /// velocity identically zero and is never streamed.
        const DYNAMIC = 0b001;
        /// Event-producing: scheduled against interactions/locals/globals.
        const ALIVE = 0b010;
        /// Frozen at rest by a sleeper system event (§4.6); excluded from
        /// prediction until woken.
        const SLEEPING = 0b100;
    }
}

impl Default for ParticleFlags {
    fn default() -> Self {
        ParticleFlags::DYNAMIC | ParticleFlags::ALIVE
    }
}

/// A single discrete particle (§3).
///
/// Mutated only by the liouvillean's `stream` and `execute` paths (§3
/// lifecycle); never destroyed over the life of a run.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Particle {
    id: ParticleId,
    /// Position in simulation units.
    pub position: Vec3,
    /// Velocity in simulation units; identically zero for non-`DYNAMIC`
    /// particles.
    pub velocity: Vec3,
    /// Orientation unit vector, used only by line/needle species; left at
    /// zero for particles with no orientational degrees of freedom.
    pub orientation: Vec3,
    /// Angular velocity paired with `orientation`.
    pub angular_velocity: Vec3,
    /// Simulation time at which this particle's stored state is valid.
    /// Never exceeds the global simulation time (§3 invariant 3).
    pub peculiar_time: f64,
    pub flags: ParticleFlags,
    /// Incremented on every change to position, velocity or state; used by
    /// the scheduler's stale-event protocol (§4.7, §4.10).
    pub event_counter: u64,
}

impl Particle {
    /// Creates a new dynamic, alive particle at `peculiar_time = 0`.
    pub fn new(id: ParticleId, position: Vec3, velocity: Vec3) -> Self {
        Particle {
            id,
            position,
            velocity,
            orientation: Vec3::zero(),
            angular_velocity: Vec3::zero(),
            peculiar_time: 0.0,
            flags: ParticleFlags::default(),
            event_counter: 0,
        }
    }

    /// Creates a static (non-`DYNAMIC`) particle fixed at `position`, e.g. a
    /// tethered obstacle. Velocity is forced to zero.
    pub fn new_static(id: ParticleId, position: Vec3) -> Self {
        Particle {
            id,
            position,
            velocity: Vec3::zero(),
            orientation: Vec3::zero(),
            angular_velocity: Vec3::zero(),
            peculiar_time: 0.0,
            flags: ParticleFlags::ALIVE,
            event_counter: 0,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(ParticleFlags::DYNAMIC)
    }

    pub fn is_alive(&self) -> bool {
        self.flags.contains(ParticleFlags::ALIVE)
    }

    pub fn is_sleeping(&self) -> bool {
        self.flags.contains(ParticleFlags::SLEEPING)
    }

    /// Marks every field change as having happened, bumping the event
    /// counter used for stale-event detection (§4.7). Every mutation path in
    /// the liouvillean must call this exactly once per logical change.
    pub fn touch(&mut self) {
        self.event_counter = self.event_counter.wrapping_add(1);
    }

    /// Puts the particle to sleep: velocity and angular velocity are zeroed
    /// and the `SLEEPING` flag is set. Called by the sleeper system event
    /// (§4.6).
    pub fn sleep(&mut self) {
        self.velocity = Vec3::zero();
        self.angular_velocity = Vec3::zero();
        self.flags.insert(ParticleFlags::SLEEPING);
        self.touch();
    }

    /// Wakes a sleeping particle, restoring the given velocity. Called by the
    /// waker system event (§4.6).
    pub fn wake(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.flags.remove(ParticleFlags::SLEEPING);
        self.touch();
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Particle {{ id: {}, pos: ({:.3}, {:.3}, {:.3}), vel: ({:.3}, {:.3}, {:.3}), t: {:.6}, flags: {:?} }}",
            self.id,
            self.position.x, self.position.y, self.position.z,
            self.velocity.x, self.velocity.y, self.velocity.z,
            self.peculiar_time,
            self.flags,
        )
    }
}

/// Owns the full particle array and enforces the §3 invariants: contiguous
/// IDs, zero velocity for non-dynamic particles, and non-decreasing peculiar
/// time relative to the simulation clock.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new(particles: Vec<Particle>) -> Self {
        debug_assert!(
            particles.iter().enumerate().all(|(i, p)| p.id().index() == i),
            "particle IDs must be contiguous starting at 0",
        );
        ParticleStore { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: ParticleId) -> &Particle {
        &self.particles[id.index()]
    }

    pub fn get_mut(&mut self, id: ParticleId) -> &mut Particle {
        &mut self.particles[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Fetches two distinct particles mutably, as every pairwise interaction
    /// event needs. Panics if `a == b`.
    pub fn get_pair_mut(&mut self, a: ParticleId, b: ParticleId) -> (&mut Particle, &mut Particle) {
        assert_ne!(a, b, "cannot borrow the same particle twice");
        let (ia, ib) = (a.index(), b.index());
        if ia < ib {
            let (left, right) = self.particles.split_at_mut(ib);
            (&mut left[ia], &mut right[0])
        } else {
            let (left, right) = self.particles.split_at_mut(ia);
            (&mut right[0], &mut left[ib])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_is_dynamic_and_alive() {
        let p = Particle::new(ParticleId(0), Vec3::zero(), Vec3::zero());
        assert!(p.is_dynamic());
        assert!(p.is_alive());
        assert!(!p.is_sleeping());
    }

    #[test]
    fn static_particle_has_zero_velocity_and_is_not_dynamic() {
        let p = Particle::new_static(ParticleId(1), Vec3::new(1.0, 0.0, 0.0));
        assert!(!p.is_dynamic());
        assert_eq!(p.velocity, Vec3::zero());
    }

    #[test]
    fn sleep_then_wake_round_trips_velocity() {
        let mut p = Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(1.0, 2.0, 3.0));
        let counter_before = p.event_counter;
        p.sleep();
        assert!(p.is_sleeping());
        assert_eq!(p.velocity, Vec3::zero());
        p.wake(Vec3::new(1.0, 2.0, 3.0));
        assert!(!p.is_sleeping());
        assert_eq!(p.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert!(p.event_counter > counter_before);
    }

    #[test]
    fn get_pair_mut_returns_distinct_particles() {
        let mut store = ParticleStore::new(vec![
            Particle::new(ParticleId(0), Vec3::zero(), Vec3::zero()),
            Particle::new(ParticleId(1), Vec3::new(1.0, 0.0, 0.0), Vec3::zero()),
        ]);
        let (a, b) = store.get_pair_mut(ParticleId(0), ParticleId(1));
        a.touch();
        b.touch();
        assert_eq!(store.get(ParticleId(0)).event_counter, 1);
        assert_eq!(store.get(ParticleId(1)).event_counter, 1);
    }

    #[test]
    #[should_panic]
    fn get_pair_mut_rejects_same_id() {
        let mut store = ParticleStore::new(vec![Particle::new(
            ParticleId(0),
            Vec3::zero(),
            Vec3::zero(),
        )]);
        store.get_pair_mut(ParticleId(0), ParticleId(0));
    }
}
