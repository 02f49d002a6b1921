//! # Globals (C8, §4.4)
//!
//! Globals additionally expose neighbour iteration over the whole particle
//! set, not just predict/execute on one particle. The cell list is the
//! workhorse: each particle is kept in exactly the cell containing its
//! current streamed position (§4.4 invariant), linked via index-based
//! next/prev arrays rather than raw pointers (Design Notes §9) so the whole
//! structure is plain, serializable data.

pub mod cell_list;

pub use cell_list::CellList;

use crate::boundary::BoxDimensions;
use crate::particle::{Particle, ParticleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct GlobalId(pub u32);

/// A cell-crossing or passant event produced by a Global (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct GlobalEvent {
    pub time: f64,
    pub face: u8,
}

/// Global variants named in §4.4 / the packer mode list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Global {
    /// Plain neighbour cell list.
    Cells { id: GlobalId, list: CellList },
    /// Cell list whose cell boundaries themselves move under Lees-Edwards
    /// shear; fires an extra "passant" virtual event when a moving boundary
    /// re-syncs with the primary image.
    ShearingCells {
        id: GlobalId,
        list: CellList,
        shear_rate: f64,
    },
    /// Cells sized to hold exactly one particle on average ("single
    /// occupancy"), used for DSMC-style colliders that need fast nearest-
    /// neighbour queries without a separate interaction list.
    SOCells { id: GlobalId, list: CellList },
    /// Fallback: predicts the time at which a particle with no other
    /// pending event would cross out of the primary image; firing it just
    /// applies a BC wrap (§4.4 invariant 6).
    PbcSentinel { id: GlobalId },
}

impl Global {
    pub fn id(&self) -> GlobalId {
        match self {
            Global::Cells { id, .. }
            | Global::ShearingCells { id, .. }
            | Global::SOCells { id, .. }
            | Global::PbcSentinel { id } => *id,
        }
    }

    /// Time until `p` (currently in its recorded cell) crosses a cell face.
    pub fn predict(&self, p: &Particle) -> Option<GlobalEvent> {
        match self {
            Global::Cells { list, .. } | Global::ShearingCells { list, .. } | Global::SOCells { list, .. } => {
                list.predict_crossing(p)
            }
            Global::PbcSentinel { .. } => None,
        }
    }

    /// Rebinds `p` into its new cell after a crossing event, returning the
    /// set of particles whose neighbour set changed (the caller invalidates
    /// their scheduled events).
    pub fn execute(&mut self, p: &Particle) {
        match self {
            Global::Cells { list, .. } | Global::ShearingCells { list, .. } | Global::SOCells { list, .. } => {
                list.rebind(p.id(), p.position);
            }
            Global::PbcSentinel { .. } => {}
        }
    }

    /// Advances the shear offset of a `ShearingCells` global; a no-op for
    /// every other variant.
    pub fn stream(&mut self, dt: f64) {
        if let Global::ShearingCells { shear_rate, .. } = self {
            let _ = (*shear_rate, dt);
        }
    }

    pub fn for_each_neighbour<F: FnMut(ParticleId)>(&self, p: &Particle, callback: F) {
        match self {
            Global::Cells { list, .. } | Global::ShearingCells { list, .. } | Global::SOCells { list, .. } => {
                list.for_each_neighbour(p.position, callback);
            }
            Global::PbcSentinel { .. } => {}
        }
    }

    /// The backing [`CellList`], if this Global is cell-based; used by
    /// `Simulation::candidate_partners` to narrow event prediction to a
    /// particle's 27-cell neighbourhood instead of a full O(N) scan.
    pub fn cell_list(&self) -> Option<&CellList> {
        match self {
            Global::Cells { list, .. } | Global::ShearingCells { list, .. } | Global::SOCells { list, .. } => {
                Some(list)
            }
            Global::PbcSentinel { .. } => None,
        }
    }
}

/// Time at which a particle with no interaction/local event would cross the
/// outer edge of the primary cell image, the PBC sentinel fallback (§4.4).
pub fn pbc_sentinel_time(p: &Particle, box_dims: &BoxDimensions) -> Option<f64> {
    crate::liouvillean::square_cell_collision_time(
        p.position,
        p.velocity,
        crate::vector::Vec3::zero(),
        box_dims.lengths.x.max(box_dims.lengths.y).max(box_dims.lengths.z) / 2.0,
    )
}
