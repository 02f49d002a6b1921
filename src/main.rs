use clap::Parser;
use dynamo_core::cli::{Cli, Commands, PackModeArg};
use dynamo_core::config::Configuration;
use dynamo_core::error::DynamoError;
use dynamo_core::liouvillean::Liouvillean;
use dynamo_core::packer::{self, PackMode};
use dynamo_core::particle::ParticleStore;
use dynamo_core::simulation::Simulation;
use dynamo_core::species::{Mass, Species};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pack {
            mode,
            n_particles,
            density,
            box_side,
            diameter,
            lambda,
            epsilon,
            temperature,
            seed,
            output,
            checkpoint,
        } => run_pack(
            mode, n_particles, density, box_side, diameter, lambda, epsilon, temperature, seed, &output, &checkpoint,
        ),
        Commands::Run {
            config,
            checkpoint,
            max_events,
            output,
        } => run_run(&config, &checkpoint, max_events, &output),
        Commands::Check { config, checkpoint } => run_check(&config, &checkpoint),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pack(
    mode: PackModeArg,
    n_particles: usize,
    density: f64,
    box_side: f64,
    diameter: f64,
    lambda: f64,
    epsilon: f64,
    temperature: f64,
    seed: u64,
    output: &std::path::Path,
    checkpoint: &std::path::Path,
) -> Result<(), DynamoError> {
    let pack_mode = match mode {
        PackModeArg::FccHardSpheres => PackMode::FccHardSpheres { n_particles, density, diameter },
        PackModeArg::RandomHardSpheres => PackMode::RandomHardSpheres { n_particles, box_side, diameter, seed },
        PackModeArg::SquareWellFluid => PackMode::SquareWellFluid {
            n_particles,
            box_side,
            diameter,
            lambda,
            epsilon,
            seed,
        },
    };

    let packing = packer::pack(&pack_mode, temperature).map_err(DynamoError::Setup)?;
    log::info!("packed {} particles into a box of side {}", packing.particles.len(), packing.box_dimensions.lengths.x);

    let bulk_interaction = packing
        .interactions
        .iter()
        .next()
        .expect("packer always produces at least one interaction")
        .id;
    let species = vec![Species::new(
        "bulk",
        (0..packing.particles.len() as u32).map(dynamo_core::particle::ParticleId).collect(),
        Mass::Uniform(1.0),
        bulk_interaction,
    )];

    let config = Configuration {
        version: dynamo_core::config::CONFIG_VERSION,
        box_dimensions: packing.box_dimensions,
        boundary: dynamo_core::boundary::BoundaryCondition::Periodic,
        liouvillean: Liouvillean::Newtonian,
        species,
        interactions: packing.interactions,
        seed,
        round_output: false,
    };

    config.save_to_file(output)?;
    dynamo_core::config::save_checkpoint(&packing.particles, checkpoint)?;
    log::info!("wrote configuration to {} and checkpoint to {}", output.display(), checkpoint.display());
    Ok(())
}

fn load_simulation(config_path: &std::path::Path, checkpoint_path: &std::path::Path) -> Result<Simulation, DynamoError> {
    let config = Configuration::load_from_file(config_path)?;
    let particles: ParticleStore = dynamo_core::config::load_checkpoint(checkpoint_path)?;
    Simulation::initialise(
        particles,
        config.box_dimensions,
        config.boundary,
        config.liouvillean,
        config.species,
        config.interactions,
        Vec::new(),
        Vec::new(),
        Vec::new(),
        config.seed,
    )
}

fn run_run(config: &std::path::Path, checkpoint: &std::path::Path, max_events: u64, output: &std::path::Path) -> Result<(), DynamoError> {
    let mut sim = load_simulation(config, checkpoint)?;
    let executed = sim.run(max_events)?;
    log::info!("executed {executed} events, global time now {}", sim.global_time);
    dynamo_core::config::save_checkpoint(&sim.particles, output)?;
    Ok(())
}

fn run_check(config: &std::path::Path, checkpoint: &std::path::Path) -> Result<(), DynamoError> {
    let mut sim = load_simulation(config, checkpoint)?;
    let violations = sim.check_overlaps();
    println!("overlap violations: {violations}");
    println!("stale events so far: {}", sim.diagnostics.stale_events);
    println!("events executed so far: {}", sim.diagnostics.events_executed);
    if violations > 0 {
        return Err(DynamoError::NumericBlowup(format!("{violations} overlapping pairs detected")));
    }
    Ok(())
}
