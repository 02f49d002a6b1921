//! # Interactions (C6, §4.3)
//!
//! An `Interaction` pairs a [`PairRange`] predicate with a [`Potential`].
//! The ordered [`InteractionList`] is walked front-to-back on lookup so that
//! bond potentials listed first override the bulk potential for bonded
//! pairs, per §4.3's matching-order invariant.

pub mod pair_range;
pub mod potential;

pub use pair_range::{IdRange, PairRange};
pub use potential::{ExecuteOutcome, Potential, Step};

use crate::capture::CaptureStore;
use crate::particle::ParticleId;

/// Position of an [`Interaction`] within a simulation's interaction list;
/// assigned by list position at `initialise` time (§4.9 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct InteractionId(pub u32);

/// One `(pair-range, potential, id)` triple (§3, §4.3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub name: String,
    pub range: PairRange,
    pub potential: Potential,
}

impl Interaction {
    pub fn new(id: InteractionId, name: impl Into<String>, range: PairRange, potential: Potential) -> Self {
        Interaction {
            id,
            name: name.into(),
            range,
            potential,
        }
    }

    pub fn matches(&self, a: ParticleId, b: ParticleId) -> bool {
        self.range.matches(a, b)
    }

    /// Sum of this Interaction's well energy over every pair in `capture`
    /// that it claims (§4.3/§8 energy invariant: captured pairs contribute
    /// their well depth to the system's internal energy).
    pub fn internal_energy(&self, capture: &CaptureStore) -> f64 {
        let depth = self.potential.well_energy();
        if depth == 0.0 {
            return 0.0;
        }
        capture
            .iter()
            .filter(|((a, b), _)| self.matches(*a, *b))
            .map(|_| depth)
            .sum()
    }
}

/// The ordered list of Interactions for a simulation (§3, §4.3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InteractionList {
    interactions: Vec<Interaction>,
}

impl InteractionList {
    pub fn new(interactions: Vec<Interaction>) -> Self {
        InteractionList { interactions }
    }

    pub fn get(&self, id: InteractionId) -> &Interaction {
        &self.interactions[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.interactions.iter()
    }

    /// The first Interaction in list order whose pair-range matches `(a,
    /// b)`, or `None` if no Interaction claims the pair (§3 invariant: such a
    /// pair produces no events).
    pub fn find_for_pair(&self, a: ParticleId, b: ParticleId) -> Option<&Interaction> {
        self.interactions.iter().find(|i| i.matches(a, b))
    }

    /// The longest `max_interaction_distance` over every Interaction in the
    /// list; used by the §4.9 step-4 box-size validity check.
    pub fn longest_interaction_distance(&self) -> f64 {
        self.interactions
            .iter()
            .map(|i| i.potential.max_interaction_distance())
            .fold(0.0, f64::max)
    }

    /// Total internal (well) energy across every captured pair, given the
    /// current capture state (§4.3/§8 energy invariant). Each pair's energy
    /// is attributed to the single Interaction that would claim it under
    /// the list's first-match-wins rule, so a pair never double-counts even
    /// if a later Interaction in the list would also structurally match it.
    pub fn internal_energy(&self, capture: &CaptureStore) -> f64 {
        capture
            .iter()
            .filter_map(|((a, b), _)| self.find_for_pair(*a, *b))
            .map(|interaction| interaction.potential.well_energy())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u32) -> ParticleId {
        ParticleId(n)
    }

    fn bulk_hard_sphere() -> Interaction {
        Interaction::new(
            InteractionId(0),
            "bulk",
            PairRange::All,
            Potential::HardSphere { diameter: 1.0, restitution: 1.0 },
        )
    }

    fn backbone_bond() -> Interaction {
        Interaction::new(
            InteractionId(1),
            "backbone",
            PairRange::Chain(IdRange::new(0, 9)),
            Potential::SquareBond { min_diameter: 0.8, max_diameter: 1.2 },
        )
    }

    #[test]
    fn first_match_wins_when_bond_precedes_bulk() {
        let list = InteractionList::new(vec![backbone_bond(), bulk_hard_sphere()]);
        let hit = list.find_for_pair(pid(3), pid(4)).unwrap();
        assert_eq!(hit.id, InteractionId(1));
    }

    #[test]
    fn non_bonded_pair_falls_through_to_bulk() {
        let list = InteractionList::new(vec![backbone_bond(), bulk_hard_sphere()]);
        let hit = list.find_for_pair(pid(3), pid(7)).unwrap();
        assert_eq!(hit.id, InteractionId(0));
    }

    #[test]
    fn unmatched_pair_returns_none() {
        let list = InteractionList::new(vec![Interaction::new(
            InteractionId(0),
            "bonded-only",
            PairRange::Chain(IdRange::new(0, 1)),
            Potential::SquareBond { min_diameter: 0.8, max_diameter: 1.2 },
        )]);
        assert!(list.find_for_pair(pid(5), pid(6)).is_none());
    }

    #[test]
    fn longest_interaction_distance_is_the_max_across_the_list() {
        let list = InteractionList::new(vec![bulk_hard_sphere(), backbone_bond()]);
        assert_eq!(list.longest_interaction_distance(), 1.2);
    }

    #[test]
    fn internal_energy_sums_well_depth_over_captured_pairs() {
        let well = Interaction::new(
            InteractionId(0),
            "well",
            PairRange::All,
            Potential::SquareWell {
                core_diameter: 1.0,
                well_diameter: 1.5,
                well_depth: 2.0,
            },
        );
        let list = InteractionList::new(vec![well]);
        let mut capture = CaptureStore::new();
        assert_eq!(list.internal_energy(&capture), 0.0);
        capture.capture(pid(0), pid(1), 1);
        assert_eq!(list.internal_energy(&capture), 2.0);
        capture.capture(pid(2), pid(3), 1);
        assert_eq!(list.internal_energy(&capture), 4.0);
    }
}
