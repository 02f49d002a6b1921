//! Fixed 3x3 matrices for orientation frames and rotations.
//!
//! Needed by the oriented-line liouvillean and the parallel-cube interaction,
//! neither of which has an analogue in a flat vector-only model. Kept as a
//! bespoke fixed-dimension type, in the same style as [`super::Vec3`], rather
//! than pulling in a general-purpose linear algebra crate.

use super::Vec3;
use std::ops::Mul;

/// A row-major 3x3 matrix of `f64`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mat3 {
    pub rows: [[f64; 3]; 3],
}

impl Mat3 {
    /// The 3x3 identity matrix.
    pub fn identity() -> Self {
        Mat3 {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Builds the rotation matrix for a right-handed rotation of `angle`
    /// radians around a normalized `axis`, via Rodrigues' formula in matrix
    /// form: `R = I*cos(θ) + sin(θ)*[axis]_x + (1-cos(θ)) axis⊗axis`.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let axis = axis.normalize();
        let (c, s) = (angle.cos(), angle.sin());
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        Mat3 {
            rows: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
            ],
        }
    }

    /// Transposes the matrix (equal to its inverse for a rotation matrix).
    pub fn transpose(&self) -> Self {
        let r = &self.rows;
        Mat3 {
            rows: [
                [r[0][0], r[1][0], r[2][0]],
                [r[0][1], r[1][1], r[2][1]],
                [r[0][2], r[1][2], r[2][2]],
            ],
        }
    }

    /// Applies the matrix to a column vector.
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// Matrix-matrix product `self * rhs`.
    pub fn mul_mat(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += self.rows[i][k] * rhs.rows[k][j];
                }
                out[i][j] = acc;
            }
        }
        Mat3 { rows: out }
    }

    /// The determinant, via cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        let r = &self.rows;
        r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0])
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.mul_vec(&rhs)
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Mat3::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn identity_is_noop() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Mat3::identity().mul_vec(&v), v);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let rot = Mat3::from_axis_angle(&Vec3::z_hat(), PI / 2.0);
        let rotated = rot.mul_vec(&Vec3::x_hat());
        assert!(rotated.approx_eq(&Vec3::y_hat(), 1e-10));
    }

    #[test]
    fn transpose_is_inverse_for_rotation() {
        let rot = Mat3::from_axis_angle(&Vec3::new(0.3, 0.5, 0.8).normalize(), 1.1);
        let should_be_identity = rot.mul_mat(&rot.transpose());
        let id = Mat3::identity();
        for i in 0..3 {
            for j in 0..3 {
                assert!((should_be_identity.rows[i][j] - id.rows[i][j]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rotation_matrix_determinant_is_one() {
        let rot = Mat3::from_axis_angle(&Vec3::new(1.0, 1.0, 1.0).normalize(), 2.4);
        assert!((rot.determinant() - 1.0).abs() < 1e-9);
    }
}
