//! # Boundary conditions (C3, §4.1)
//!
//! New relative to the teacher (whose particles are constrained to a sphere
//! surface, a different kind of boundary entirely). Dispatch follows the
//! "polymorphic hierarchy -> tagged variant with a small shared capability"
//! guidance of Design Notes §9: one enum, one `apply_position` /
//! `apply_position_velocity` / `stream` per variant instead of a trait object
//! hierarchy.

use crate::vector::Vec3;

/// The simulation box's edge lengths along each axis.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BoxDimensions {
    pub lengths: Vec3,
}

impl BoxDimensions {
    pub fn cubic(side: f64) -> Self {
        BoxDimensions {
            lengths: Vec3::new(side, side, side),
        }
    }
}

/// Boundary condition variants (§4.1).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum BoundaryCondition {
    /// Unbounded; no wrapping is performed.
    None,
    /// Fully periodic in all three axes.
    Periodic,
    /// Periodic in y/z, open along x (walled channels).
    PeriodicExceptX,
    /// Periodic along x only.
    PeriodicXOnly,
    /// Shear-adapted periodic boundary: the y-image of the box slides in x at
    /// `shear_rate`, accumulating `shear_offset` over time.
    LeesEdwards {
        shear_rate: f64,
        shear_offset: f64,
    },
}

/// Rounds `x` to the nearest multiple of `period` away from zero, i.e. the
/// minimum-image displacement subtracted from `x`.
fn nearest_image_component(x: f64, period: f64) -> f64 {
    if period <= 0.0 {
        return x;
    }
    x - period * (x / period).round()
}

impl BoundaryCondition {
    /// Wraps a position back into the primary cell by subtracting the
    /// nearest integer multiple of the box vector component-wise.
    pub fn apply_position(&self, pos: Vec3, box_dims: &BoxDimensions) -> Vec3 {
        let l = box_dims.lengths;
        match self {
            BoundaryCondition::None => pos,
            BoundaryCondition::Periodic => Vec3::new(
                nearest_image_component(pos.x, l.x),
                nearest_image_component(pos.y, l.y),
                nearest_image_component(pos.z, l.z),
            ),
            BoundaryCondition::PeriodicExceptX => Vec3::new(
                pos.x,
                nearest_image_component(pos.y, l.y),
                nearest_image_component(pos.z, l.z),
            ),
            BoundaryCondition::PeriodicXOnly => {
                Vec3::new(nearest_image_component(pos.x, l.x), pos.y, pos.z)
            }
            BoundaryCondition::LeesEdwards { shear_offset, .. } => {
                let y_images = (pos.y / l.y).round();
                let sheared_x = pos.x - y_images * shear_offset;
                Vec3::new(
                    nearest_image_component(sheared_x, l.x),
                    nearest_image_component(pos.y, l.y),
                    nearest_image_component(pos.z, l.z),
                )
            }
        }
    }

    /// As [`Self::apply_position`], but under Lees-Edwards also adjusts
    /// `vel.x` by the shear-time-dependent boundary velocity whenever the
    /// y-image index changes.
    pub fn apply_position_velocity(&self, pos: Vec3, vel: Vec3, box_dims: &BoxDimensions) -> (Vec3, Vec3) {
        match self {
            BoundaryCondition::LeesEdwards { shear_rate, .. } => {
                let l = box_dims.lengths;
                let y_images_before = (pos.y / l.y).round();
                let wrapped = self.apply_position(pos, box_dims);
                let y_images_after = (wrapped.y / l.y).round();
                if (y_images_after - y_images_before).abs() > 0.5 {
                    let crossings = y_images_before - y_images_after;
                    let dvx = crossings * shear_rate * l.y;
                    (wrapped, Vec3::new(vel.x + dvx, vel.y, vel.z))
                } else {
                    (wrapped, vel)
                }
            }
            other => (other.apply_position(pos, box_dims), vel),
        }
    }

    /// Advances the image lattice (Lees-Edwards only) by `dt * shear_rate`.
    pub fn stream(&mut self, dt: f64) {
        if let BoundaryCondition::LeesEdwards {
            shear_rate,
            shear_offset,
        } = self
        {
            *shear_offset += dt * *shear_rate;
        }
    }

    /// Whether this boundary is periodic along the given axis (0=x,1=y,2=z);
    /// used by the §4.9 step-4 box-size check.
    pub fn is_periodic_axis(&self, axis: usize) -> bool {
        match self {
            BoundaryCondition::None => false,
            BoundaryCondition::Periodic => true,
            BoundaryCondition::PeriodicExceptX => axis != 0,
            BoundaryCondition::PeriodicXOnly => axis == 0,
            BoundaryCondition::LeesEdwards { .. } => true,
        }
    }
}
