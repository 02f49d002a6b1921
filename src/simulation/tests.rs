//! Integration tests for the simulation facade (§8 scenarios S1-S2).

#[cfg(test)]
mod facade {
    use super::super::Simulation;
    use crate::boundary::{BoundaryCondition, BoxDimensions};
    use crate::interactions::{Interaction, InteractionId, InteractionList, PairRange, Potential};
    use crate::liouvillean::Liouvillean;
    use crate::particle::{Particle, ParticleId, ParticleStore};
    use crate::species::{Mass, Species};
    use crate::vector::Vec3;
    
    fn two_sphere_setup(separation: f64, closing_speed: f64) -> Simulation {
        let particles = ParticleStore::new(vec![
            Particle::new(ParticleId(0), Vec3::new(-separation / 2.0, 0.0, 0.0), Vec3::new(closing_speed, 0.0, 0.0)),
            Particle::new(ParticleId(1), Vec3::new(separation / 2.0, 0.0, 0.0), Vec3::new(-closing_speed, 0.0, 0.0)),
        ]);
        let species = vec![Species::new(
            "all",
            vec![ParticleId(0), ParticleId(1)],
            Mass::Uniform(1.0),
            InteractionId(0),
        )];
        let interactions = InteractionList::new(vec![Interaction::new(
            InteractionId(0),
            "bulk",
            PairRange::All,
            Potential::HardSphere { diameter: 1.0, restitution: 1.0 },
        )]);
        Simulation::initialise(
            particles,
            BoxDimensions::cubic(100.0),
            BoundaryCondition::None,
            Liouvillean::Newtonian,
            species,
            interactions,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            1,
        )
        .unwrap()
    }
    
    #[test]
    fn two_hard_spheres_collide_and_reverse_velocity() {
        let mut sim = two_sphere_setup(10.0, 1.0);
        let energy_before = sim.total_energy();
        let executed = sim.run(1).unwrap();
        assert_eq!(executed, 1);
        assert!(sim.particles.get(ParticleId(0)).velocity.x < 0.0);
        let energy_after = sim.total_energy();
        assert!((energy_before - energy_after).abs() < 1e-9);
    }
    
    #[test]
    fn global_time_advances_to_the_collision_time() {
        let mut sim = two_sphere_setup(10.0, 1.0);
        sim.run(1).unwrap();
        // centres start 10 apart closing at combined speed 2, contact at separation 1
        // -> distance to close = 9, time = 4.5
        assert!((sim.global_time - 4.5).abs() < 1e-6);
    }
    
    #[test]
    fn no_overlaps_survive_a_short_run() {
        let mut sim = two_sphere_setup(10.0, 1.0);
        sim.run(4).unwrap();
        assert_eq!(sim.check_overlaps(), 0);
    }
    
    #[test]
    fn replica_exchange_rescales_without_moving_particles() {
        let mut a = two_sphere_setup(10.0, 1.0);
        let mut b = two_sphere_setup(10.0, 1.0);
        let pos_before = a.particles.get(ParticleId(0)).position;
        a.replica_exchange(&mut b, 1.0, 4.0);
        assert_eq!(a.particles.get(ParticleId(0)).position, pos_before);
        assert!(a.particles.get(ParticleId(0)).velocity.norm() > 1.0);
    }
    
    #[test]
    fn box_too_small_is_rejected_at_initialise() {
        let particles = ParticleStore::new(vec![Particle::new(ParticleId(0), Vec3::zero(), Vec3::zero())]);
        let species = vec![Species::new("a", vec![ParticleId(0)], Mass::Uniform(1.0), InteractionId(0))];
        let interactions = InteractionList::new(vec![Interaction::new(
            InteractionId(0),
            "bulk",
            PairRange::All,
            Potential::HardSphere { diameter: 100.0, restitution: 1.0 },
        )]);
        let result = Simulation::initialise(
            particles,
            BoxDimensions::cubic(1.0),
            BoundaryCondition::Periodic,
            Liouvillean::Newtonian,
            species,
            interactions,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            1,
        );
        assert!(result.is_err());
    }
    
}
