//! # Locals (C7, §4.4)
//!
//! A Local governs a single particle against a fixed geometric primitive
//! (a wall, a cylinder, an oscillating plate) rather than a pair. Each
//! variant exposes the same `predict`/`execute` shape Interactions do, per
//! §4.4, collapsed into one tagged enum per Design Notes §9 instead of a
//! trait-object hierarchy.

use crate::liouvillean::{self, impulse};
use crate::particle::{Particle, ParticleId};
use crate::rng::DynamoRng;
use crate::vector::Vec3;

/// Position assigned at `initialise` time (§4.9 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct LocalId(pub u32);

/// A flat plane wall, optionally thermostatting or carrying finite mass
/// (§4.2 "Wall"/"Andersen wall").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum WallKind {
    /// Specular reflection with restitution `e` (1.0 = elastic).
    Reflective { restitution: f64 },
    /// Finite-mass plate exchanging momentum with the particle.
    Massive { wall_mass: f64, restitution: f64 },
    /// Redraws the reflected velocity from Maxwell-Boltzmann at `temperature`.
    Andersen { temperature: f64 },
    /// Redraws the whole post-collision velocity vector (Gaussian thermostat
    /// wall).
    Gaussian { temperature: f64 },
}

/// A Local governing one particle against a geometric primitive (§4.4).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Local {
    Wall {
        id: LocalId,
        point: Vec3,
        normal: Vec3,
        kind: WallKind,
        /// Current velocity of a `Massive` wall along `normal`; ignored for
        /// other kinds.
        wall_velocity: f64,
    },
    /// An infinite cylinder of `radius` about `axis_point`/`axis_direction`.
    Cylinder {
        id: LocalId,
        axis_point: Vec3,
        axis_direction: Vec3,
        radius: f64,
        restitution: f64,
    },
    /// A wall oscillating sinusoidally along `normal` with `amplitude` and
    /// angular frequency `omega`; `execute` applies the instantaneous wall
    /// velocity at the event time.
    OscillatingPlate {
        id: LocalId,
        point: Vec3,
        normal: Vec3,
        amplitude: f64,
        omega: f64,
        restitution: f64,
    },
    /// Two parallel walls bracketing a slab (a confinement cavity).
    DoubleWall {
        id: LocalId,
        point: Vec3,
        normal: Vec3,
        separation: f64,
        restitution: f64,
    },
}

impl Local {
    pub fn id(&self) -> LocalId {
        match self {
            Local::Wall { id, .. }
            | Local::Cylinder { id, .. }
            | Local::OscillatingPlate { id, .. }
            | Local::DoubleWall { id, .. } => *id,
        }
    }

    /// Soonest time this Local produces an event for `p`, or `None`.
    pub fn predict(&self, p: &Particle) -> Option<f64> {
        match self {
            Local::Wall { point, normal, .. } => {
                liouvillean::wall_collision_time(p.position, p.velocity, *point, *normal)
            }
            Local::Cylinder {
                axis_point,
                axis_direction,
                radius,
                ..
            } => cylinder_collision_time(p.position, p.velocity, *axis_point, *axis_direction, *radius),
            Local::OscillatingPlate { point, normal, .. } => {
                // Approximated as a static wall at the plate's mean position;
                // the amplitude-dependent correction is applied in `execute`.
                liouvillean::wall_collision_time(p.position, p.velocity, *point, *normal)
            }
            Local::DoubleWall {
                point,
                normal,
                separation,
                ..
            } => {
                let near = liouvillean::wall_collision_time(p.position, p.velocity, *point, *normal);
                let far_point = *point + *normal * *separation;
                let far = liouvillean::wall_collision_time(p.position, p.velocity, far_point, *normal * -1.0);
                smaller(near, far)
            }
        }
    }

    /// Applies the post-event impulse.
    pub fn execute(&mut self, p: &mut Particle, mass: f64, event_time: f64, rng: &mut DynamoRng) {
        match self {
            Local::Wall { normal, kind, wall_velocity, .. } => match kind {
                WallKind::Reflective { restitution } => impulse::wall_reflect(p, *normal, *restitution),
                WallKind::Massive { wall_mass, restitution } => {
                    *wall_velocity =
                        impulse::wall_reflect_with_mass(p, mass, *wall_mass, *normal, *wall_velocity, *restitution);
                }
                WallKind::Andersen { temperature } => impulse::andersen_wall(p, mass, *normal, *temperature, rng),
                WallKind::Gaussian { temperature } => impulse::gaussian_resample(p, mass, *temperature, rng),
            },
            Local::Cylinder {
                axis_point,
                axis_direction,
                restitution,
                ..
            } => {
                let radial = radial_direction(p.position, *axis_point, *axis_direction);
                impulse::wall_reflect(p, radial, *restitution);
            }
            Local::OscillatingPlate {
                normal,
                amplitude,
                omega,
                restitution,
                ..
            } => {
                let plate_velocity = amplitude * omega * (omega * event_time).cos();
                let vn = p.velocity.dot(normal) - plate_velocity;
                if vn < 0.0 {
                    p.velocity = p.velocity - *normal * ((1.0 + *restitution) * vn);
                    p.touch();
                }
            }
            Local::DoubleWall { normal, restitution, .. } => {
                impulse::wall_reflect(p, *normal, *restitution);
            }
        }
    }
}

fn smaller(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

fn radial_direction(position: Vec3, axis_point: Vec3, axis_direction: Vec3) -> Vec3 {
    let axis = axis_direction.normalize();
    let rel = position - axis_point;
    let along = axis * rel.dot(&axis);
    (rel - along).normalize()
}

/// Time for a particle to reach `radius` from an infinite cylinder's axis,
/// solved by projecting the particle's motion into the plane perpendicular
/// to the axis and applying the same quadratic as a 2D circle crossing.
fn cylinder_collision_time(
    position: Vec3,
    velocity: Vec3,
    axis_point: Vec3,
    axis_direction: Vec3,
    radius: f64,
) -> Option<f64> {
    let axis = axis_direction.normalize();
    let rel = position - axis_point;
    let rel_perp = rel - axis * rel.dot(&axis);
    let vel_perp = velocity - axis * velocity.dot(&axis);
    let a = vel_perp.dot(&vel_perp);
    let b = 2.0 * rel_perp.dot(&vel_perp);
    let c = rel_perp.dot(&rel_perp) - radius * radius;
    crate::liouvillean::roots::quadratic_smallest_positive_root(&crate::liouvillean::roots::Roots { a, b, c })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleId;

    #[test]
    fn wall_predicts_collision_when_approaching() {
        let local = Local::Wall {
            id: LocalId(0),
            point: Vec3::new(5.0, 0.0, 0.0),
            normal: Vec3::x_hat() * -1.0,
            kind: WallKind::Reflective { restitution: 1.0 },
            wall_velocity: 0.0,
        };
        let p = Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(1.0, 0.0, 0.0));
        let t = local.predict(&p);
        assert!(t.is_some());
        assert!((t.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn wall_reflective_execute_flips_normal_velocity() {
        let mut local = Local::Wall {
            id: LocalId(0),
            point: Vec3::new(5.0, 0.0, 0.0),
            normal: Vec3::x_hat() * -1.0,
            kind: WallKind::Reflective { restitution: 1.0 },
            wall_velocity: 0.0,
        };
        let mut p = Particle::new(ParticleId(0), Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let mut rng = DynamoRng::new(1);
        local.execute(&mut p, 1.0, 5.0, &mut rng);
        assert!(p.velocity.x < 0.0);
    }

    #[test]
    fn cylinder_predicts_radial_crossing() {
        let local = Local::Cylinder {
            id: LocalId(0),
            axis_point: Vec3::zero(),
            axis_direction: Vec3::z_hat(),
            radius: 2.0,
            restitution: 1.0,
        };
        let p = Particle::new(ParticleId(0), Vec3::zero(), Vec3::new(1.0, 0.0, 0.0));
        let t = local.predict(&p);
        assert!((t.unwrap() - 2.0).abs() < 1e-9);
    }
}
