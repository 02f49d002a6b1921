//! Pair potentials (§4.2/§4.3).
//!
//! Tagged-variant dispatch (Design Notes §9) over the potentials named in the
//! spec's overview table: hard sphere, square well/shoulder, square bond,
//! stepped, lines, parallel cubes, null. Null and hard-sphere are grounded
//! directly in the Allen & Tildesley algebra already factored into
//! [`crate::liouvillean`]; square well/shoulder and stepped share the same
//! in-root/out-root/capture-bit machinery described in §4.3.

use crate::liouvillean::{self, impulse, RelativeState};
use crate::particle::Particle;
use crate::rng::DynamoRng;

/// A single rung of a stepped potential: step outer radius and the energy of
/// the well/shoulder interior to it.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub radius: f64,
    pub energy: f64,
}

/// The pair potentials named in §4.2.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Potential {
    /// No interaction at all; used for species that interact only through
    /// bonded potentials or not at all.
    Null,
    /// Elastic or inelastic hard sphere of diameter `diameter`.
    HardSphere { diameter: f64, restitution: f64 },
    /// Square well/shoulder: hard core `core_diameter`, attractive (or
    /// repulsive, if `well_depth < 0`) shell out to `well_diameter`.
    SquareWell {
        core_diameter: f64,
        well_diameter: f64,
        well_depth: f64,
    },
    /// Rigid bond: hard core plus an outer limit beyond which the bond
    /// snaps back inelastically (modelled as an infinite well wall).
    SquareBond { min_diameter: f64, max_diameter: f64 },
    /// A sequence of concentric steps out from a hard core, each with its own
    /// energy; approximates a continuous potential (e.g. LJ) piecewise.
    Stepped { core_diameter: f64, steps: Vec<Step> },
    /// Rigid line segments of length `length` and thickness `diameter`,
    /// interacting through their oriented envelope (orientation-dependent
    /// predict/execute, §4.2).
    Line { length: f64, diameter: f64 },
    /// Axis-aligned cubes of half-width `half_width`; penetration is
    /// resolved as the axis-aligned analogue of hard-sphere contact.
    ParallelCube { half_width: f64 },
}

impl Potential {
    /// The largest separation at which this potential can still produce an
    /// event (§4.3).
    pub fn max_interaction_distance(&self) -> f64 {
        match self {
            Potential::Null => 0.0,
            Potential::HardSphere { diameter, .. } => *diameter,
            Potential::SquareWell { well_diameter, .. } => *well_diameter,
            Potential::SquareBond { max_diameter, .. } => *max_diameter,
            Potential::Stepped { steps, .. } => steps.iter().map(|s| s.radius).fold(0.0, f64::max),
            Potential::Line { length, .. } => *length,
            Potential::ParallelCube { half_width } => *half_width * 2.0,
        }
    }

    /// Excluded-volume reference length (§4.3).
    pub fn hard_core_diameter(&self) -> f64 {
        match self {
            Potential::Null => 0.0,
            Potential::HardSphere { diameter, .. } => *diameter,
            Potential::SquareWell { core_diameter, .. } => *core_diameter,
            Potential::SquareBond { min_diameter, .. } => *min_diameter,
            Potential::Stepped { core_diameter, .. } => *core_diameter,
            Potential::Line { diameter, .. } => *diameter,
            Potential::ParallelCube { half_width } => *half_width * 2.0,
        }
    }

    /// Depth of the attractive/bonded well this potential contributes to the
    /// internal energy while a pair occupies it (§4.3/§8 energy invariant).
    /// Zero for potentials with no bound state.
    pub fn well_energy(&self) -> f64 {
        match self {
            Potential::SquareWell { well_depth, .. } => *well_depth,
            Potential::Stepped { steps, .. } => steps.first().map(|s| s.energy).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Whether the pair's current separation (ignoring approach direction)
    /// already sits inside this potential's attractive/bonded region — used
    /// to seed [`crate::capture::CaptureStore`] at start-up for pairs that
    /// begin captured (§4.5).
    pub fn capture_test(&self, state: &RelativeState) -> bool {
        let sep = state.separation.norm();
        match self {
            Potential::SquareWell {
                core_diameter,
                well_diameter,
                ..
            } => sep > *core_diameter && sep <= *well_diameter,
            Potential::SquareBond { min_diameter, max_diameter } => sep > *min_diameter && sep <= *max_diameter,
            Potential::Stepped { core_diameter, steps } => {
                let outer = steps.iter().map(|s| s.radius).fold(0.0, f64::max);
                sep > *core_diameter && sep <= outer
            }
            _ => false,
        }
    }

    /// Whether the pair, at its current capture-bit `inside`, is predicted to
    /// approach (`true`) or recede (`false`) next; used by `predict` to pick
    /// in-root vs out-root.
    pub fn predict_event_time(&self, state: &RelativeState, inside: bool) -> Option<f64> {
        match self {
            Potential::Null => None,
            Potential::HardSphere { diameter, .. } => liouvillean::sphere_sphere_in_root(state, *diameter),
            Potential::SquareWell {
                core_diameter,
                well_diameter,
                ..
            } => {
                let core = liouvillean::sphere_sphere_in_root(state, *core_diameter);
                if inside {
                    let out = liouvillean::sphere_sphere_out_root(state, *well_diameter);
                    smaller(core, out)
                } else {
                    let well_in = liouvillean::sphere_sphere_in_root(state, *well_diameter);
                    smaller(core, well_in)
                }
            }
            Potential::SquareBond { min_diameter, max_diameter } => {
                let inner = liouvillean::sphere_sphere_in_root(state, *min_diameter);
                let outer = liouvillean::sphere_sphere_out_root(state, *max_diameter);
                smaller(inner, outer)
            }
            Potential::Stepped { core_diameter, steps } => {
                let core = liouvillean::sphere_sphere_in_root(state, *core_diameter);
                let mut best = core;
                for step in steps {
                    let in_root = liouvillean::sphere_sphere_in_root(state, step.radius);
                    let out_root = liouvillean::sphere_sphere_out_root(state, step.radius);
                    best = smaller(best, in_root);
                    best = smaller(best, out_root);
                }
                best
            }
            Potential::Line { length, diameter } => liouvillean::line_line_collision_time(state, *length, *diameter),
            Potential::ParallelCube { half_width } => liouvillean::parallel_cube_in_root(state, *half_width * 2.0),
        }
    }

    /// Applies the post-event impulse. `inside_before`/`inside_after` track
    /// the capture-state transition for welled potentials so the caller can
    /// update [`crate::capture::CaptureStore`].
    pub fn execute(
        &self,
        p1: &mut Particle,
        p2: &mut Particle,
        m1: f64,
        m2: f64,
        inside_before: bool,
        rng: &mut DynamoRng,
    ) -> ExecuteOutcome {
        match self {
            Potential::Null => ExecuteOutcome {
                energy_delta: 0.0,
                inside_after: inside_before,
            },
            Potential::HardSphere { restitution, .. } => {
                let lost = impulse::hard_sphere_collision(p1, p2, m1, m2, *restitution);
                ExecuteOutcome {
                    energy_delta: -lost,
                    inside_after: inside_before,
                }
            }
            Potential::SquareWell {
                core_diameter,
                well_diameter,
                well_depth,
            } => {
                let _ = rng;
                // `inside_before` alone cannot tell an inner-core bounce
                // (still captured, hits the hard core from within the well)
                // apart from an outer-boundary approach/release attempt;
                // disambiguate from which wall the current separation is
                // closest to.
                let sep = (p1.position - p2.position).norm();
                let hit_core = (sep - core_diameter).abs() <= (sep - well_diameter).abs();
                if hit_core {
                    let lost = impulse::hard_sphere_collision(p1, p2, m1, m2, 1.0);
                    ExecuteOutcome {
                        energy_delta: -lost,
                        inside_after: inside_before,
                    }
                } else if !inside_before {
                    let (captured, delta) = impulse::square_well_capture(p1, p2, m1, m2, *well_depth);
                    ExecuteOutcome {
                        energy_delta: delta,
                        inside_after: captured,
                    }
                } else {
                    let (released, delta) = impulse::square_well_release(p1, p2, m1, m2, *well_depth);
                    ExecuteOutcome {
                        energy_delta: delta,
                        inside_after: !released,
                    }
                }
            }
            Potential::SquareBond { .. } => {
                let lost = impulse::hard_core_bond_collision(p1, p2, m1, m2);
                ExecuteOutcome {
                    energy_delta: -lost,
                    inside_after: inside_before,
                }
            }
            Potential::Stepped { steps, .. } => {
                let depth = steps.first().map(|s| s.energy).unwrap_or(0.0);
                let delta_e = if inside_before { -depth } else { depth };
                match impulse::stepped_transition(p1, p2, m1, m2, delta_e) {
                    Some(energy) => ExecuteOutcome {
                        energy_delta: energy,
                        inside_after: !inside_before,
                    },
                    None => ExecuteOutcome {
                        energy_delta: 0.0,
                        inside_after: inside_before,
                    },
                }
            }
            Potential::Line { .. } => {
                let separation = p1.position - p2.position;
                let normal = liouvillean::line_contact_normal(p1.orientation, p2.orientation, separation);
                let lost = impulse::collision_along_normal(p1, p2, m1, m2, normal, 1.0);
                ExecuteOutcome {
                    energy_delta: -lost,
                    inside_after: inside_before,
                }
            }
            Potential::ParallelCube { half_width } => {
                let separation = p1.position - p2.position;
                let normal = liouvillean::cube_contact_normal(separation, *half_width * 2.0);
                let lost = impulse::collision_along_normal(p1, p2, m1, m2, normal, 1.0);
                ExecuteOutcome {
                    energy_delta: -lost,
                    inside_after: inside_before,
                }
            }
        }
    }

    /// Whether the pair currently violates the hard-core exclusion by more
    /// than `tolerance` (§4.3 `check_overlaps`).
    pub fn check_overlap(&self, state: &RelativeState, tolerance: f64) -> bool {
        if let Potential::Line { length, diameter } = self {
            return liouvillean::line_overlap(state, *length, *diameter, tolerance);
        }
        let core = self.hard_core_diameter();
        if core <= 0.0 {
            return false;
        }
        liouvillean::sphere_overlap(state, core, tolerance)
    }
}

fn smaller(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

/// Result of [`Potential::execute`].
pub struct ExecuteOutcome {
    pub energy_delta: f64,
    pub inside_after: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec3;

    fn approaching(separation: f64) -> RelativeState {
        RelativeState {
            separation: Vec3::new(separation, 0.0, 0.0),
            relative_velocity: Vec3::new(-1.0, 0.0, 0.0),
            orientation1: Vec3::zero(),
            angular_velocity1: Vec3::zero(),
            orientation2: Vec3::zero(),
            angular_velocity2: Vec3::zero(),
        }
    }

    #[test]
    fn hard_sphere_predicts_in_root_when_approaching() {
        let pot = Potential::HardSphere { diameter: 1.0, restitution: 1.0 };
        let t = pot.predict_event_time(&approaching(5.0), false);
        assert!(t.is_some());
    }

    #[test]
    fn null_potential_never_predicts() {
        let pot = Potential::Null;
        assert!(pot.predict_event_time(&approaching(5.0), false).is_none());
    }

    #[test]
    fn max_interaction_distance_matches_well_diameter() {
        let pot = Potential::SquareWell {
            core_diameter: 1.0,
            well_diameter: 1.5,
            well_depth: 1.0,
        };
        assert_eq!(pot.max_interaction_distance(), 1.5);
    }

    #[test]
    fn stepped_distance_is_outermost_step() {
        let pot = Potential::Stepped {
            core_diameter: 1.0,
            steps: vec![Step { radius: 1.2, energy: 0.5 }, Step { radius: 1.8, energy: 0.2 }],
        };
        assert_eq!(pot.max_interaction_distance(), 1.8);
    }

    #[test]
    fn well_energy_matches_well_depth() {
        let pot = Potential::SquareWell {
            core_diameter: 1.0,
            well_diameter: 1.5,
            well_depth: 2.0,
        };
        assert_eq!(pot.well_energy(), 2.0);
        assert_eq!(Potential::HardSphere { diameter: 1.0, restitution: 1.0 }.well_energy(), 0.0);
    }

    #[test]
    fn capture_test_detects_pair_already_inside_the_well() {
        let pot = Potential::SquareWell {
            core_diameter: 1.0,
            well_diameter: 1.5,
            well_depth: 1.0,
        };
        assert!(pot.capture_test(&approaching(1.4)));
        assert!(!pot.capture_test(&approaching(0.9)));
        assert!(!pot.capture_test(&approaching(2.0)));
    }
}
