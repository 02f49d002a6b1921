//! # Error handling (§7)
//!
//! The teacher mixes `Result<_, Box<dyn Error>>` and `Result<_, String>` with
//! no typed error enum. §7 calls for explicit, sum-typed results instead, so
//! this module defines one `thiserror`-derived enum per fatal-error kind plus
//! a top-level aggregate, grounded in
//! `examples/19h-ftsim/crates/ftsim-engine/src/errors.rs` (a `thiserror::Error`
//! enum is already a workspace dependency there).
//!
//! Non-fatal conditions (overlap, prediction-precision fault, stale event)
//! are **not** modeled as errors here — per §4.10/§7 they are counted on
//! [`crate::diagnostics::Diagnostics`] and the run continues.

use crate::particle::ParticleId;
use thiserror::Error;

/// Errors from loading a configuration document (§6.1, §7). Fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("configuration version mismatch: file has {found}, this build expects {expected}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("missing required configuration element: {0}")]
    MissingElement(String),

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Errors raised during `Simulation::initialise` (§4.9, §7). Fatal.
#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("particle {id} does not belong to any species")]
    ParticleWithoutSpecies { id: ParticleId },

    #[error("particle {id} belongs to both species '{first}' and '{second}'")]
    ParticleInMultipleSpecies {
        id: ParticleId,
        first: String,
        second: String,
    },

    #[error("particle id {id} is out of range for this particle store")]
    ParticleIdOutOfRange { id: ParticleId },

    #[error(
        "box dimension {axis} ({box_length}) is not greater than 2x the longest interaction \
         distance ({required}); a particle could interact with two periodic images"
    )]
    BoxTooSmall {
        axis: usize,
        box_length: f64,
        required: f64,
    },

    #[error("duplicate species name '{0}'")]
    DuplicateSpeciesName(String),

    #[error("species counts do not sum to the particle count: {found} != {expected}")]
    SpeciesCountMismatch { found: usize, expected: usize },
}

/// The top-level result type returned at the event-loop boundary (§7).
/// Internal recovery never swallows information: this is reserved for the
/// handful of conditions that are genuinely unrecoverable.
#[derive(Debug, Error)]
pub enum DynamoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    /// §7 "Invariant breach (scheduler)": an event was popped with
    /// `time < global_time`. Indicates a bug in prediction or invalidation.
    #[error("scheduler invariant breach: popped event at t={event_time} but global time is already t={global_time}")]
    InvariantBreach { event_time: f64, global_time: f64 },

    /// §7 "Numeric blowup": non-finite energy or position.
    #[error("numeric blowup: {0}")]
    NumericBlowup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
