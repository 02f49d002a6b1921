//! # Systems (C9, §4.6)
//!
//! A System event is not tied to any particle pair or geometry; it fires on
//! its own clock and acts on the whole population (a thermostat tick, a
//! rescale, a DSMC virtual collision draw, a sleeper/waker sweep). Each
//! variant owns the state needed to predict its own next firing time.

use crate::particle::{Particle, ParticleId, ParticleStore};
use crate::rng::DynamoRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SystemId(pub u32);

/// System variants named in §4.6 / the packer mode list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum System {
    /// Fires at Poisson-distributed intervals with mean rate
    /// `collision_rate`, picks a uniformly random particle and redraws its
    /// velocity from Maxwell-Boltzmann at `temperature` (a global, rather
    /// than wall-local, Andersen thermostat).
    AndersenThermostat {
        id: SystemId,
        collision_rate: f64,
        temperature: f64,
        next_fire: f64,
    },
    /// Periodically (every `period`) rescales every dynamic particle's
    /// velocity so the instantaneous kinetic temperature matches `target`
    /// exactly.
    Rescaler {
        id: SystemId,
        period: f64,
        target_temperature: f64,
        next_fire: f64,
    },
    /// DSMC: at Poisson intervals, picks a uniformly random pair of
    /// particles (not necessarily close) and, with acceptance probability
    /// `chi * approach_speed / max_relative_speed` (the standard DSMC
    /// collision kernel), applies a stochastic hard-sphere collision between
    /// them, approximating dense-gas transport without tracking real
    /// contacts.
    DsmcSphereCollider {
        id: SystemId,
        collision_rate: f64,
        diameter: f64,
        chi: f64,
        max_relative_speed: f64,
        next_fire: f64,
    },
    /// As `DsmcSphereCollider`, restricted to picking pairs that are
    /// adjacent on a ring topology (used with `PairRange::Ring` species to
    /// thermalize a polymer ring without per-bond interactions). Each draw
    /// picks a same-ring pair with probability `1 - fraction` (using
    /// `chi_same`) or a cross-ring pair with probability `fraction` (using
    /// `chi_cross`), the two-chi branching the ring topology needs since
    /// intra-ring and inter-ring contact densities differ.
    RingDsmc {
        id: SystemId,
        collision_rate: f64,
        ring_len: u32,
        chi_same: f64,
        chi_cross: f64,
        fraction: f64,
        max_relative_speed: f64,
        next_fire: f64,
    },
    /// A bare periodic tick with no state effect beyond advancing its own
    /// clock; used to force periodic checkpoint/output hooks at a fixed
    /// wall-clock-independent simulation-time cadence.
    Ticker { id: SystemId, period: f64, next_fire: f64 },
    /// Puts particles whose speed has stayed below `speed_threshold` for
    /// longer than `patience` to sleep (§4.6); the complementary waker is a
    /// separate `System` instance with its own trigger condition.
    Sleeper {
        id: SystemId,
        check_period: f64,
        speed_threshold: f64,
        next_fire: f64,
    },
    /// Wakes sleeping particles within `wake_radius` of any awake, moving
    /// particle, reassigning a fresh Maxwell-Boltzmann velocity at
    /// `temperature`.
    Waker {
        id: SystemId,
        check_period: f64,
        wake_radius: f64,
        temperature: f64,
        next_fire: f64,
    },
}

impl System {
    pub fn id(&self) -> SystemId {
        match self {
            System::AndersenThermostat { id, .. }
            | System::Rescaler { id, .. }
            | System::DsmcSphereCollider { id, .. }
            | System::RingDsmc { id, .. }
            | System::Ticker { id, .. }
            | System::Sleeper { id, .. }
            | System::Waker { id, .. } => *id,
        }
    }

    pub fn next_fire_time(&self) -> f64 {
        match self {
            System::AndersenThermostat { next_fire, .. }
            | System::Rescaler { next_fire, .. }
            | System::DsmcSphereCollider { next_fire, .. }
            | System::RingDsmc { next_fire, .. }
            | System::Ticker { next_fire, .. }
            | System::Sleeper { next_fire, .. }
            | System::Waker { next_fire, .. } => *next_fire,
        }
    }

    /// Executes this system's effect and schedules its next firing.
    pub fn fire(&mut self, store: &mut ParticleStore, mass_of: impl Fn(ParticleId) -> f64, rng: &mut DynamoRng) {
        match self {
            System::AndersenThermostat {
                collision_rate,
                temperature,
                next_fire,
                ..
            } => {
                let idx = rng.uniform_index(store.len());
                let id = ParticleId(idx as u32);
                let mass = mass_of(id);
                let p = store.get_mut(id);
                crate::liouvillean::impulse::gaussian_resample(p, mass, *temperature, rng);
                *next_fire += rng.exponential_interval(*collision_rate);
            }
            System::Rescaler {
                period,
                target_temperature,
                next_fire,
                ..
            } => {
                rescale_to_temperature(store, *target_temperature);
                *next_fire += *period;
            }
            System::DsmcSphereCollider {
                collision_rate,
                diameter,
                chi,
                max_relative_speed,
                next_fire,
                ..
            } => {
                let n = store.len();
                if n >= 2 {
                    let a = ParticleId(rng.uniform_index(n) as u32);
                    let mut b = ParticleId(rng.uniform_index(n) as u32);
                    while b == a {
                        b = ParticleId(rng.uniform_index(n) as u32);
                    }
                    dsmc_collide(store, a, b, &mass_of, *diameter, *chi, *max_relative_speed, rng);
                }
                *next_fire += rng.exponential_interval(*collision_rate);
            }
            System::RingDsmc {
                collision_rate,
                ring_len,
                chi_same,
                chi_cross,
                fraction,
                max_relative_speed,
                next_fire,
                ..
            } => {
                let n = store.len() as u32;
                if *ring_len > 1 && n >= *ring_len {
                    let base = (rng.uniform_index(n as usize) as u32 / *ring_len) * *ring_len;
                    let offset = rng.uniform_index(*ring_len as usize) as u32;
                    let a = ParticleId(base + offset);
                    let use_cross = *fraction > 0.0 && n > *ring_len && rng.uniform_unit() < *fraction;
                    let (b, chi) = if use_cross {
                        let mut b = ParticleId(rng.uniform_index(n as usize) as u32);
                        while b.0 >= base && b.0 < base + *ring_len {
                            b = ParticleId(rng.uniform_index(n as usize) as u32);
                        }
                        (b, *chi_cross)
                    } else {
                        (ParticleId(base + (offset + 1) % *ring_len), *chi_same)
                    };
                    dsmc_collide(store, a, b, &mass_of, 1.0, chi, *max_relative_speed, rng);
                }
                *next_fire += rng.exponential_interval(*collision_rate);
            }
            System::Ticker { period, next_fire, .. } => {
                *next_fire += *period;
            }
            System::Sleeper {
                check_period,
                speed_threshold,
                next_fire,
                ..
            } => {
                for p in store.iter_mut() {
                    if p.is_dynamic() && !p.is_sleeping() && p.velocity.norm() < *speed_threshold {
                        p.sleep();
                    }
                }
                *next_fire += *check_period;
            }
            System::Waker {
                check_period,
                wake_radius,
                temperature,
                next_fire,
                ..
            } => {
                let awake_positions: Vec<_> = store
                    .iter()
                    .filter(|p| p.is_dynamic() && !p.is_sleeping())
                    .map(|p| p.position)
                    .collect();
                let wake_radius_sq = wake_radius * wake_radius;
                let ids: Vec<ParticleId> = store.iter().map(|p| p.id()).collect();
                for id in ids {
                    let should_wake = {
                        let p = store.get(id);
                        p.is_sleeping()
                            && awake_positions
                                .iter()
                                .any(|pos| (p.position - *pos).norm_squared() < wake_radius_sq)
                    };
                    if should_wake {
                        let mass = mass_of(id);
                        let velocity = crate::vector::Vec3::new(
                            rng.maxwell_boltzmann_component(*temperature, mass),
                            rng.maxwell_boltzmann_component(*temperature, mass),
                            rng.maxwell_boltzmann_component(*temperature, mass),
                        );
                        store.get_mut(id).wake(velocity);
                    }
                }
                *next_fire += *check_period;
            }
        }
    }
}

/// One DSMC trial: draws a contact normal (random, since the pair is not
/// necessarily geometrically close) and accepts the collision with
/// probability `chi * approach_speed / max_relative_speed` (the standard
/// DSMC acceptance kernel), clamped to `[0, 1]`. Returns whether the
/// collision was accepted.
fn dsmc_collide(
    store: &mut ParticleStore,
    a: ParticleId,
    b: ParticleId,
    mass_of: &impl Fn(ParticleId) -> f64,
    diameter: f64,
    chi: f64,
    max_relative_speed: f64,
    rng: &mut DynamoRng,
) -> bool {
    let (m1, m2) = (mass_of(a), mass_of(b));
    let (p1, p2) = store.get_pair_mut(a, b);
    let separation = p1.position - p2.position;
    let normal = if separation.norm_squared() > 1e-12 {
        separation.normalize()
    } else {
        crate::vector::Vec3::new(
            rng.uniform_range(-1.0, 1.0),
            rng.uniform_range(-1.0, 1.0),
            rng.uniform_range(-1.0, 1.0),
        )
        .normalize()
    };
    let rel_vel = p1.velocity - p2.velocity;
    let vn = rel_vel.dot(&normal);
    if vn >= 0.0 {
        return false;
    }
    let approach_speed = -vn;
    let acceptance = (chi * approach_speed / max_relative_speed.max(1e-12)).clamp(0.0, 1.0);
    if rng.uniform_unit() >= acceptance {
        return false;
    }
    let _ = diameter;
    crate::liouvillean::impulse::hard_sphere_collision(p1, p2, m1, m2, 1.0);
    true
}

fn rescale_to_temperature(store: &mut ParticleStore, target_temperature: f64) {
    let dynamic: Vec<ParticleId> = store.iter().filter(|p| p.is_dynamic()).map(|p| p.id()).collect();
    if dynamic.is_empty() {
        return;
    }
    let current_ke: f64 = dynamic.iter().map(|&id| store.get(id).velocity.norm_squared()).sum();
    if current_ke <= 0.0 {
        return;
    }
    let dof = 3.0 * dynamic.len() as f64;
    let current_temperature = current_ke / dof;
    let scale = (target_temperature / current_temperature).sqrt();
    for id in dynamic {
        let p = store.get_mut(id);
        p.velocity = p.velocity * scale;
        p.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use crate::vector::Vec3;

    fn sample_store() -> ParticleStore {
        ParticleStore::new(vec![
            Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)),
            Particle::new(ParticleId(1), Vec3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn rescaler_matches_target_temperature() {
        let mut store = sample_store();
        let mut sys = System::Rescaler {
            id: SystemId(0),
            period: 1.0,
            target_temperature: 4.0,
            next_fire: 0.0,
        };
        let mut rng = DynamoRng::new(1);
        sys.fire(&mut store, |_| 1.0, &mut rng);
        let ke: f64 = store.iter().map(|p| p.velocity.norm_squared()).sum();
        let temp = ke / (3.0 * store.len() as f64);
        assert!((temp - 4.0).abs() < 1e-8);
    }

    #[test]
    fn sleeper_puts_slow_particles_to_sleep() {
        let mut store = ParticleStore::new(vec![Particle::new(
            ParticleId(0),
            Vec3::zero(),
            Vec3::new(0.0001, 0.0, 0.0),
        )]);
        let mut sys = System::Sleeper {
            id: SystemId(0),
            check_period: 1.0,
            speed_threshold: 0.01,
            next_fire: 0.0,
        };
        let mut rng = DynamoRng::new(1);
        sys.fire(&mut store, |_| 1.0, &mut rng);
        assert!(store.get(ParticleId(0)).is_sleeping());
    }

    #[test]
    fn dsmc_collide_rejects_when_acceptance_probability_is_zero() {
        let mut store = sample_store();
        let mut rng = DynamoRng::new(1);
        let accepted = dsmc_collide(&mut store, ParticleId(0), ParticleId(1), &|_| 1.0, 1.0, 0.0, 2.0, &mut rng);
        assert!(!accepted);
        assert_eq!(store.get(ParticleId(0)).velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn dsmc_collide_accepts_head_on_approach_with_full_chi() {
        let mut store = sample_store();
        let mut rng = DynamoRng::new(1);
        let accepted = dsmc_collide(&mut store, ParticleId(0), ParticleId(1), &|_| 1.0, 1.0, 1.0, 2.0, &mut rng);
        assert!(accepted);
    }

    #[test]
    fn dsmc_collide_rejects_a_receding_pair() {
        let mut store = ParticleStore::new(vec![
            Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(-1.0, 0.0, 0.0)),
            Particle::new(ParticleId(1), Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        ]);
        let mut rng = DynamoRng::new(1);
        let accepted = dsmc_collide(&mut store, ParticleId(0), ParticleId(1), &|_| 1.0, 1.0, 1.0, 2.0, &mut rng);
        assert!(!accepted);
    }

    #[test]
    fn ticker_advances_only_its_own_clock() {
        let mut store = sample_store();
        let mut sys = System::Ticker {
            id: SystemId(0),
            period: 2.5,
            next_fire: 0.0,
        };
        let mut rng = DynamoRng::new(1);
        sys.fire(&mut store, |_| 1.0, &mut rng);
        assert_eq!(sys.next_fire_time(), 2.5);
    }
}
