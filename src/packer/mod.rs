//! # Packer (§4.9 step 1, `pack` subcommand)
//!
//! Generates a starting particle layout plus the matching
//! Interaction/Species set and writes a [`crate::config::Configuration`]
//! plus an initial [`ParticleStore`] checkpoint (§6.1). Structurally this
//! replaces `examples/a-samea-vicseksim-rs/src/ensemble/mod.rs`'s
//! rejection-sampling generator: same "sample a candidate, reject on
//! minimum-distance violation, retry" loop, generalized from points on a
//! sphere's surface to points inside a periodic box, and from a single
//! species to the packer's supported layout modes.
//!
//! Only a representative subset of the original DynamO packer's mode list
//! (§4.9/"packer modes", SPEC_FULL.md §C) is implemented: monocomponent
//! hard spheres on an FCC lattice, a random (rejection-sampled) hard-sphere
//! gas, and a monocomponent square-well fluid. The remaining modes listed in
//! the overview (binary mixtures, polymer chains/rings, lines, sheared
//! configurations, DSMC variants, wall-confined slabs, ...) compose from the
//! same `Lattice`/`random_gas`/`Species`/`Interaction` primitives defined
//! here and in [`crate::interactions`]; they are not each given their own
//! packer mode yet.

use crate::boundary::BoxDimensions;
use crate::interactions::{Interaction, InteractionId, InteractionList, PairRange};
use crate::particle::{Particle, ParticleId, ParticleStore};
use crate::rng::DynamoRng;
use crate::vector::Vec3;

/// The packer modes implemented so far.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum PackMode {
    /// Monocomponent hard spheres placed on an FCC lattice at the given
    /// reduced number density.
    FccHardSpheres { n_particles: usize, density: f64, diameter: f64 },
    /// Monocomponent hard-sphere gas, placed by rejection sampling with a
    /// minimum centre-to-centre separation of `diameter`.
    RandomHardSpheres {
        n_particles: usize,
        box_side: f64,
        diameter: f64,
        seed: u64,
    },
    /// Monocomponent square well fluid: hard core `diameter`, well extending
    /// to `diameter * lambda`, well depth `epsilon`.
    SquareWellFluid {
        n_particles: usize,
        box_side: f64,
        diameter: f64,
        lambda: f64,
        epsilon: f64,
        seed: u64,
    },
}

/// The result of packing: a starting particle layout, box, and matching
/// Interaction list. The caller wraps these in a
/// [`crate::config::Configuration`] to persist (§6.1).
pub struct Packing {
    pub particles: ParticleStore,
    pub box_dimensions: BoxDimensions,
    pub interactions: InteractionList,
}

/// Generates the FCC lattice positions for `n_particles` at `density`,
/// rounding up to the nearest multiple of 4 (an FCC unit cell holds 4
/// lattice points) and returning however many of those points are needed.
fn fcc_positions(n_particles: usize, density: f64) -> (Vec<Vec3>, f64) {
    let cells_needed = (n_particles as f64 / 4.0).ceil() as usize;
    let cells_per_axis = (cells_needed as f64).cbrt().ceil() as usize;
    let n_cells = cells_per_axis.pow(3);
    let total_sites = n_cells * 4;
    let volume = total_sites as f64 / density;
    let box_side = volume.cbrt();
    let cell_side = box_side / cells_per_axis as f64;

    let basis = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(0.0, 0.5, 0.5),
    ];

    let mut positions = Vec::with_capacity(total_sites);
    'outer: for ix in 0..cells_per_axis {
        for iy in 0..cells_per_axis {
            for iz in 0..cells_per_axis {
                for b in &basis {
                    if positions.len() >= n_particles {
                        break 'outer;
                    }
                    let cell_origin = Vec3::new(ix as f64, iy as f64, iz as f64) * cell_side;
                    let site = cell_origin + *b * cell_side - Vec3::new(box_side, box_side, box_side) * 0.5;
                    positions.push(site);
                }
            }
        }
    }
    (positions, box_side)
}

fn random_gas_positions(n_particles: usize, box_side: f64, min_separation: f64, rng: &mut DynamoRng) -> Vec<Vec3> {
    let half = box_side / 2.0;
    let mut positions: Vec<Vec3> = Vec::with_capacity(n_particles);
    let mut attempts = 0u64;
    let max_attempts = 200_000u64 * n_particles.max(1) as u64;
    while positions.len() < n_particles && attempts < max_attempts {
        attempts += 1;
        let candidate = Vec3::new(
            rng.uniform_range(-half, half),
            rng.uniform_range(-half, half),
            rng.uniform_range(-half, half),
        );
        if positions.iter().all(|p| (candidate - *p).norm() >= min_separation) {
            positions.push(candidate);
        }
    }
    positions
}

fn thermalized_particles(positions: Vec<Vec3>, temperature: f64, rng: &mut DynamoRng) -> Vec<Particle> {
    positions
        .into_iter()
        .enumerate()
        .map(|(i, pos)| {
            let velocity = Vec3::new(
                rng.maxwell_boltzmann_component(temperature, 1.0),
                rng.maxwell_boltzmann_component(temperature, 1.0),
                rng.maxwell_boltzmann_component(temperature, 1.0),
            );
            Particle::new(ParticleId(i as u32), pos, velocity)
        })
        .collect()
}

/// Runs a [`PackMode`] to completion, returning the resulting [`Packing`].
/// `temperature` seeds the initial Maxwell-Boltzmann velocity distribution
/// (§4.9 step 3).
pub fn pack(mode: &PackMode, temperature: f64) -> Result<Packing, crate::error::SetupError> {
    match mode {
        PackMode::FccHardSpheres { n_particles, density, diameter } => {
            let (positions, box_side) = fcc_positions(*n_particles, *density);
            let mut rng = DynamoRng::new(0);
            let particles = thermalized_particles(positions, temperature, &mut rng);
            let interactions = InteractionList::new(vec![Interaction::new(
                InteractionId(0),
                "bulk",
                PairRange::All,
                crate::interactions::Potential::HardSphere {
                    diameter: *diameter,
                    restitution: 1.0,
                },
            )]);
            validate_box_size(box_side, interactions.longest_interaction_distance())?;
            Ok(Packing {
                particles: ParticleStore::new(particles),
                box_dimensions: BoxDimensions::cubic(box_side),
                interactions,
            })
        }
        PackMode::RandomHardSpheres { n_particles, box_side, diameter, seed } => {
            let mut rng = DynamoRng::new(*seed);
            let positions = random_gas_positions(*n_particles, *box_side, *diameter, &mut rng);
            if positions.len() < *n_particles {
                return Err(crate::error::SetupError::SpeciesCountMismatch {
                    found: positions.len(),
                    expected: *n_particles,
                });
            }
            let particles = thermalized_particles(positions, temperature, &mut rng);
            let interactions = InteractionList::new(vec![Interaction::new(
                InteractionId(0),
                "bulk",
                PairRange::All,
                crate::interactions::Potential::HardSphere {
                    diameter: *diameter,
                    restitution: 1.0,
                },
            )]);
            validate_box_size(*box_side, interactions.longest_interaction_distance())?;
            Ok(Packing {
                particles: ParticleStore::new(particles),
                box_dimensions: BoxDimensions::cubic(*box_side),
                interactions,
            })
        }
        PackMode::SquareWellFluid {
            n_particles,
            box_side,
            diameter,
            lambda,
            epsilon,
            seed,
        } => {
            let mut rng = DynamoRng::new(*seed);
            let positions = random_gas_positions(*n_particles, *box_side, *diameter, &mut rng);
            if positions.len() < *n_particles {
                return Err(crate::error::SetupError::SpeciesCountMismatch {
                    found: positions.len(),
                    expected: *n_particles,
                });
            }
            let particles = thermalized_particles(positions, temperature, &mut rng);
            let interactions = InteractionList::new(vec![Interaction::new(
                InteractionId(0),
                "bulk",
                PairRange::All,
                crate::interactions::Potential::SquareWell {
                    core_diameter: *diameter,
                    well_diameter: *diameter * *lambda,
                    well_depth: *epsilon,
                },
            )]);
            validate_box_size(*box_side, interactions.longest_interaction_distance())?;
            Ok(Packing {
                particles: ParticleStore::new(particles),
                box_dimensions: BoxDimensions::cubic(*box_side),
                interactions,
            })
        }
    }
}

fn validate_box_size(box_side: f64, longest_interaction: f64) -> Result<(), crate::error::SetupError> {
    let required = 2.0 * longest_interaction;
    if longest_interaction > 0.0 && box_side <= required {
        return Err(crate::error::SetupError::BoxTooSmall {
            axis: 0,
            box_length: box_side,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fcc_lattice_produces_requested_particle_count() {
        let mode = PackMode::FccHardSpheres {
            n_particles: 32,
            density: 0.5,
            diameter: 1.0,
        };
        let packing = pack(&mode, 1.0).unwrap();
        assert_eq!(packing.particles.len(), 32);
    }

    #[test]
    fn random_gas_respects_minimum_separation() {
        let mode = PackMode::RandomHardSpheres {
            n_particles: 10,
            box_side: 20.0,
            diameter: 1.0,
            seed: 7,
        };
        let packing = pack(&mode, 1.0).unwrap();
        let particles: Vec<_> = packing.particles.iter().collect();
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let d = (particles[i].position - particles[j].position).norm();
                assert!(d >= 1.0 - 1e-9);
            }
        }
    }

    #[test]
    fn square_well_fluid_uses_well_potential() {
        let mode = PackMode::SquareWellFluid {
            n_particles: 8,
            box_side: 20.0,
            diameter: 1.0,
            lambda: 1.5,
            epsilon: 1.0,
            seed: 3,
        };
        let packing = pack(&mode, 1.0).unwrap();
        assert_eq!(packing.interactions.longest_interaction_distance(), 1.5);
    }

    #[test]
    fn box_too_small_is_rejected() {
        let mode = PackMode::FccHardSpheres {
            n_particles: 4,
            density: 1000.0,
            diameter: 1000.0,
        };
        assert!(pack(&mode, 1.0).is_err());
    }
}
