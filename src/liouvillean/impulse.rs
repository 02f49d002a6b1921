//! Post-event state updates ("impulses"), §4.2.
//!
//! Each function mutates the two particles' velocities in place and returns
//! the energy change delivered to/from the well (used by
//! `Interaction::internal_energy`, §4.3). Elastic/inelastic hard-sphere
//! algebra follows the standard EDMD momentum-conserving impulse (Allen &
//! Tildesley §2.3); no teacher analogue.

use crate::particle::Particle;
use crate::rng::DynamoRng;
use crate::vector::Vec3;

/// Reduced mass of a pair with masses `m1`, `m2`.
fn reduced_mass(m1: f64, m2: f64) -> f64 {
    (m1 * m2) / (m1 + m2)
}

/// Smooth hard-sphere collision with restitution coefficient `e` (1.0 =
/// elastic). Returns the kinetic energy lost (always `>= 0`).
pub fn hard_sphere_collision(p1: &mut Particle, p2: &mut Particle, m1: f64, m2: f64, restitution: f64) -> f64 {
    let normal = (p1.position - p2.position).normalize();
    collision_along_normal(p1, p2, m1, m2, normal, restitution)
}

/// Impulsive collision along an explicit contact `normal`, rather than one
/// derived from the centre-to-centre separation — needed for oriented
/// contacts (line/needle, parallel cube) where the normal is the contact
/// direction, not the particles' separation direction. Returns the kinetic
/// energy lost (always `>= 0`).
pub fn collision_along_normal(
    p1: &mut Particle,
    p2: &mut Particle,
    m1: f64,
    m2: f64,
    normal: Vec3,
    restitution: f64,
) -> f64 {
    let rel_vel = p1.velocity - p2.velocity;
    let vn = rel_vel.dot(&normal);
    if vn >= 0.0 {
        return 0.0;
    }
    let mu = reduced_mass(m1, m2);
    let impulse_mag = -(1.0 + restitution) * mu * vn;
    let impulse = normal * impulse_mag;
    p1.velocity = p1.velocity + impulse * (1.0 / m1);
    p2.velocity = p2.velocity - impulse * (1.0 / m2);
    p1.touch();
    p2.touch();
    0.5 * mu * (1.0 - restitution * restitution) * vn * vn
}

/// Square-well capture: an elastic bounce at the outer shoulder if the pair
/// lacks the kinetic energy to overcome the well depth `well_depth`,
/// otherwise an inward impulse that adds `well_depth` to their relative
/// kinetic energy and flips the capture flag to "inside" (the caller updates
/// [`crate::capture::CaptureStore`]). Returns `(captured, energy_delta)`.
pub fn square_well_capture(p1: &mut Particle, p2: &mut Particle, m1: f64, m2: f64, well_depth: f64) -> (bool, f64) {
    let normal = (p1.position - p2.position).normalize();
    let rel_vel = p1.velocity - p2.velocity;
    let vn = rel_vel.dot(&normal);
    let mu = reduced_mass(m1, m2);
    let available = 0.5 * mu * vn * vn;
    if available < well_depth {
        // Not enough energy to enter the well: elastic bounce off the shoulder.
        let impulse_mag = -2.0 * mu * vn;
        let impulse = normal * impulse_mag;
        p1.velocity = p1.velocity + impulse * (1.0 / m1);
        p2.velocity = p2.velocity - impulse * (1.0 / m2);
        p1.touch();
        p2.touch();
        (false, 0.0)
    } else {
        let new_vn = -(vn.abs().powi(2) - 2.0 * well_depth / mu).max(0.0).sqrt() * vn.signum();
        let impulse_mag = mu * (new_vn - vn);
        let impulse = normal * impulse_mag;
        p1.velocity = p1.velocity + impulse * (1.0 / m1);
        p2.velocity = p2.velocity - impulse * (1.0 / m2);
        p1.touch();
        p2.touch();
        (true, -well_depth)
    }
}

/// Square-well release: the pair separates past the outer shoulder, paying
/// `well_depth` out of their relative kinetic energy. Returns `(released,
/// energy_delta)`; `released = false` if there is not enough kinetic energy
/// to escape (the pair instead bounces back inward, remaining captured).
pub fn square_well_release(p1: &mut Particle, p2: &mut Particle, m1: f64, m2: f64, well_depth: f64) -> (bool, f64) {
    let normal = (p1.position - p2.position).normalize();
    let rel_vel = p1.velocity - p2.velocity;
    let vn = rel_vel.dot(&normal);
    let mu = reduced_mass(m1, m2);
    let available = 0.5 * mu * vn * vn;
    if available < well_depth {
        let impulse_mag = -2.0 * mu * vn;
        let impulse = normal * impulse_mag;
        p1.velocity = p1.velocity + impulse * (1.0 / m1);
        p2.velocity = p2.velocity - impulse * (1.0 / m2);
        p1.touch();
        p2.touch();
        (false, 0.0)
    } else {
        let new_vn = (vn.abs().powi(2) - 2.0 * well_depth / mu).max(0.0).sqrt() * vn.signum();
        let impulse_mag = mu * (new_vn - vn);
        let impulse = normal * impulse_mag;
        p1.velocity = p1.velocity + impulse * (1.0 / m1);
        p2.velocity = p2.velocity - impulse * (1.0 / m2);
        p1.touch();
        p2.touch();
        (true, well_depth)
    }
}

/// Stepped potential transition: identical impulse shape to
/// [`square_well_capture`]/[`square_well_release`] but parameterised by the
/// signed energy jump `delta_e` of the step being crossed (positive =
/// climbing to a higher-energy step, consuming kinetic energy).
pub fn stepped_transition(p1: &mut Particle, p2: &mut Particle, m1: f64, m2: f64, delta_e: f64) -> Option<f64> {
    if delta_e >= 0.0 {
        Some(square_well_capture(p1, p2, m1, m2, delta_e).1.abs() * -1.0)
    } else {
        let (released, energy) = square_well_release(p1, p2, m1, m2, -delta_e);
        if released {
            Some(energy)
        } else {
            None
        }
    }
}

/// Rigid bond limit: an inelastic reflection that keeps the pair separation
/// pinned at the bond length (used for the square-bond backbone potential).
pub fn hard_core_bond_collision(p1: &mut Particle, p2: &mut Particle, m1: f64, m2: f64) -> f64 {
    hard_sphere_collision(p1, p2, m1, m2, 1.0)
}

/// Reflects a particle off a stationary wall with unit normal `normal` and
/// restitution `e`.
pub fn wall_reflect(p: &mut Particle, normal: Vec3, restitution: f64) {
    let vn = p.velocity.dot(&normal);
    if vn < 0.0 {
        p.velocity = p.velocity - normal * ((1.0 + restitution) * vn);
        p.touch();
    }
}

/// Reflects a particle off a wall with finite mass `wall_mass` moving at
/// `wall_velocity` along `normal`, exchanging momentum (the "plate" case).
/// Returns the updated wall velocity component along `normal`.
pub fn wall_reflect_with_mass(
    p: &mut Particle,
    particle_mass: f64,
    wall_mass: f64,
    normal: Vec3,
    wall_velocity: f64,
    restitution: f64,
) -> f64 {
    let vn = p.velocity.dot(&normal) - wall_velocity;
    if vn >= 0.0 {
        return wall_velocity;
    }
    let mu = reduced_mass(particle_mass, wall_mass);
    let impulse = -(1.0 + restitution) * mu * vn;
    p.velocity = p.velocity + normal * (impulse / particle_mass);
    p.touch();
    wall_velocity - impulse / wall_mass
}

/// Andersen thermostatting wall: redraws the reflected particle's velocity
/// from a Maxwell-Boltzmann distribution at `temperature`, conditioned on
/// moving away from the wall along `normal`.
pub fn andersen_wall(p: &mut Particle, mass: f64, normal: Vec3, temperature: f64, rng: &mut DynamoRng) {
    let normal_speed = rng.maxwell_boltzmann_component(temperature, mass).abs();
    let tangent1 = if normal.x.abs() < 0.9 {
        Vec3::x_hat().cross(&normal).normalize()
    } else {
        Vec3::y_hat().cross(&normal).normalize()
    };
    let tangent2 = normal.cross(&tangent1).normalize();
    let v_t1 = rng.maxwell_boltzmann_component(temperature, mass);
    let v_t2 = rng.maxwell_boltzmann_component(temperature, mass);
    p.velocity = normal * normal_speed + tangent1 * v_t1 + tangent2 * v_t2;
    p.touch();
}

/// Whole-velocity Gaussian resample at `temperature` (the "Gaussian random
/// velocity" system event of §4.2).
pub fn gaussian_resample(p: &mut Particle, mass: f64, temperature: f64, rng: &mut DynamoRng) {
    p.velocity = Vec3::new(
        rng.maxwell_boltzmann_component(temperature, mass),
        rng.maxwell_boltzmann_component(temperature, mass),
        rng.maxwell_boltzmann_component(temperature, mass),
    );
    p.touch();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleId;

    fn head_on_pair() -> (Particle, Particle) {
        let mut p1 = Particle::new(ParticleId(0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let mut p2 = Particle::new(ParticleId(1), Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        p1.velocity = Vec3::new(1.0, 0.0, 0.0);
        p2.velocity = Vec3::new(-1.0, 0.0, 0.0);
        (p1, p2)
    }

    #[test]
    fn elastic_equal_mass_head_on_collision_swaps_velocities() {
        let (mut p1, mut p2) = head_on_pair();
        let lost = hard_sphere_collision(&mut p1, &mut p2, 1.0, 1.0, 1.0);
        assert!(lost.abs() < 1e-10);
        assert!((p1.velocity.x - (-1.0)).abs() < 1e-10);
        assert!((p2.velocity.x - 1.0).abs() < 1e-10);
    }

    #[test]
    fn fully_inelastic_collision_brings_normal_velocity_to_zero() {
        let (mut p1, mut p2) = head_on_pair();
        hard_sphere_collision(&mut p1, &mut p2, 1.0, 1.0, 0.0);
        assert!((p1.velocity.x - 0.0).abs() < 1e-10);
        assert!((p2.velocity.x - 0.0).abs() < 1e-10);
    }

    #[test]
    fn square_well_capture_with_sufficient_energy_lowers_potential_energy() {
        let (mut p1, mut p2) = head_on_pair();
        let (captured, delta) = square_well_capture(&mut p1, &mut p2, 1.0, 1.0, 0.1);
        assert!(captured);
        assert!(delta < 0.0);
    }

    #[test]
    fn square_well_capture_without_enough_energy_bounces() {
        let (mut p1, mut p2) = head_on_pair();
        let (captured, delta) = square_well_capture(&mut p1, &mut p2, 1.0, 1.0, 100.0);
        assert!(!captured);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn wall_reflect_flips_normal_component() {
        let mut p = Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(0.0, -2.0, 0.0));
        wall_reflect(&mut p, Vec3::y_hat(), 1.0);
        assert!((p.velocity.y - 2.0).abs() < 1e-10);
    }
}
