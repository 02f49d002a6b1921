//! # CLI Module - Command Line Interface for the DYNAMO pipeline
//!
//! This module provides a command-line interface for the three-stage
//! event-driven molecular dynamics pipeline:
//!
//! ## Stage 1: Packing (`pack`)
//!
//! Generates a starting particle layout and matching Interaction/Species set
//! from one of the supported [`crate::packer::PackMode`]s and writes it out
//! as a [`crate::config::Configuration`] document plus an initial particle
//! checkpoint.
//!
//! **Usage**:
//! ```bash
//! dynamo pack --mode fcc-hard-spheres --n-particles 500 --density 0.5 --diameter 1.0 --output config.toml
//! ```
//!
//! ## Stage 2: Running (`run`)
//!
//! Loads a configuration and its particle checkpoint, runs a bounded number
//! of events, and writes the resulting state back out.
//!
//! **Usage**:
//! ```bash
//! dynamo run --config config.toml --checkpoint state.bin --max-events 100000 --output state.bin
//! ```
//!
//! ## Stage 3: Checking (`check`)
//!
//! Loads a configuration and checkpoint and reports invariant violations
//! (overlaps, stale-event counts) without advancing the simulation.
//!
//! **Usage**:
//! ```bash
//! dynamo check --config config.toml --checkpoint state.bin
//! ```
//!
//! ## Design Philosophy
//!
//! The CLI is designed around a pipeline approach where each stage operates
//! on the outputs of the previous stage. This enables reproducible runs
//! (the configuration records the PRNG seed), intermediate checkpoint
//! inspection, and cheap re-runs from any saved state.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage 1: Generate a starting configuration from a packer mode
    Pack {
        /// Packer mode to run
        #[arg(long, value_enum)]
        mode: PackModeArg,

        /// Number of particles to place
        #[arg(long, default_value_t = 500)]
        n_particles: usize,

        /// Reduced number density (FCC mode only)
        #[arg(long, default_value_t = 0.5)]
        density: f64,

        /// Box side length (random/square-well modes only)
        #[arg(long, default_value_t = 20.0)]
        box_side: f64,

        /// Hard-core diameter
        #[arg(long, default_value_t = 1.0)]
        diameter: f64,

        /// Square-well range as a multiple of the core diameter
        #[arg(long, default_value_t = 1.5)]
        lambda: f64,

        /// Square-well depth
        #[arg(long, default_value_t = 1.0)]
        epsilon: f64,

        /// Initial Maxwell-Boltzmann temperature
        #[arg(long, default_value_t = 1.0)]
        temperature: f64,

        /// PRNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Configuration document to write
        #[arg(long, default_value = "config.toml")]
        output: PathBuf,

        /// Particle checkpoint to write
        #[arg(long, default_value = "state.bin")]
        checkpoint: PathBuf,
    },

    /// Stage 2: Run a simulation from a configuration and checkpoint
    Run {
        /// Configuration document to load
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,

        /// Particle checkpoint to load
        #[arg(long, default_value = "state.bin")]
        checkpoint: PathBuf,

        /// Maximum number of events to execute
        #[arg(long, default_value_t = 100_000)]
        max_events: u64,

        /// Particle checkpoint to write after the run
        #[arg(long, default_value = "state.bin")]
        output: PathBuf,
    },

    /// Stage 3: Check a configuration and checkpoint for invariant violations
    Check {
        /// Configuration document to load
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,

        /// Particle checkpoint to load
        #[arg(long, default_value = "state.bin")]
        checkpoint: PathBuf,
    },
}

/// `clap`-facing mirror of [`crate::packer::PackMode`]'s variants; kept
/// separate so the on-disk/config enum doesn't need to derive `ValueEnum`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PackModeArg {
    FccHardSpheres,
    RandomHardSpheres,
    SquareWellFluid,
}
