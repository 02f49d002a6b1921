//! # Species (§3)
//!
//! A named, disjoint partition of particle IDs carrying mass and a reference
//! to one self-Interaction used for excluded-volume, drawing, and default
//! pair dispatch.

use crate::interactions::InteractionId;
use crate::particle::ParticleId;

/// Per-particle or uniform mass assignment for a species.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Mass {
    Uniform(f64),
    PerParticle(Vec<f64>),
}

impl Mass {
    pub fn of(&self, local_index: usize) -> f64 {
        match self {
            Mass::Uniform(m) => *m,
            Mass::PerParticle(masses) => masses[local_index],
        }
    }
}

/// A disjoint partition of particle IDs (§3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Species {
    pub name: String,
    pub members: Vec<ParticleId>,
    pub mass: Mass,
    /// The self-Interaction used for excluded volume and default dispatch.
    pub interaction: InteractionId,
}

impl Species {
    pub fn new(name: impl Into<String>, members: Vec<ParticleId>, mass: Mass, interaction: InteractionId) -> Self {
        Species {
            name: name.into(),
            members,
            mass,
            interaction,
        }
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.members.contains(&id)
    }

    pub fn mass_of(&self, id: ParticleId) -> f64 {
        let local = self
            .members
            .iter()
            .position(|&m| m == id)
            .expect("particle must be a member of this species to query its mass");
        self.mass.of(local)
    }
}

/// Validates the §4.9 step-2 species invariant: every particle belongs to
/// exactly one species and the species counts sum to `n_particles`.
pub fn validate_partition(species: &[Species], n_particles: usize) -> Result<(), crate::error::SetupError> {
    let mut owner = vec![None; n_particles];
    for (species_index, s) in species.iter().enumerate() {
        for &id in &s.members {
            let slot = owner
                .get_mut(id.index())
                .ok_or(crate::error::SetupError::ParticleIdOutOfRange { id })?;
            if let Some(existing) = slot {
                return Err(crate::error::SetupError::ParticleInMultipleSpecies {
                    id,
                    first: species[*existing].name.clone(),
                    second: s.name.clone(),
                });
            }
            *slot = Some(species_index);
        }
    }
    if let Some(missing) = owner.iter().position(|o| o.is_none()) {
        return Err(crate::error::SetupError::ParticleWithoutSpecies {
            id: ParticleId(missing as u32),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::InteractionId;

    fn pid(n: u32) -> ParticleId {
        ParticleId(n)
    }

    #[test]
    fn partition_covering_all_particles_is_valid() {
        let species = vec![
            Species::new("a", vec![pid(0), pid(1)], Mass::Uniform(1.0), InteractionId(0)),
            Species::new("b", vec![pid(2)], Mass::Uniform(2.0), InteractionId(0)),
        ];
        assert!(validate_partition(&species, 3).is_ok());
    }

    #[test]
    fn particle_without_species_is_rejected() {
        let species = vec![Species::new("a", vec![pid(0)], Mass::Uniform(1.0), InteractionId(0))];
        assert!(validate_partition(&species, 2).is_err());
    }

    #[test]
    fn particle_in_two_species_is_rejected() {
        let species = vec![
            Species::new("a", vec![pid(0)], Mass::Uniform(1.0), InteractionId(0)),
            Species::new("b", vec![pid(0)], Mass::Uniform(1.0), InteractionId(0)),
        ];
        assert!(validate_partition(&species, 1).is_err());
    }

    #[test]
    fn per_particle_mass_looks_up_local_index() {
        let species = Species::new(
            "poly",
            vec![pid(0), pid(1)],
            Mass::PerParticle(vec![1.0, 2.0]),
            InteractionId(0),
        );
        assert_eq!(species.mass_of(pid(1)), 2.0);
    }
}
