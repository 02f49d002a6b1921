//! Shared polynomial root-finding for collision-time prediction.
//!
//! New relative to the teacher; grounded in the same Allen & Tildesley
//! hard-sphere algebra referenced by `sphere_sphere_in_root`, factored out so
//! line and cell-crossing predictions reuse one quadratic solver instead of
//! duplicating the discriminant test.

/// Coefficients of `a*t^2 + b*t + c = 0`.
pub struct Roots {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Smallest strictly-positive real root, or `None` if both roots are
/// non-positive, complex, or the equation is degenerate (`a == 0`).
pub fn quadratic_smallest_positive_root(r: &Roots) -> Option<f64> {
    if r.a.abs() < 1e-14 {
        if r.b.abs() < 1e-14 {
            return None;
        }
        let t = -r.c / r.b;
        return if t > 0.0 { Some(t) } else { None };
    }
    let disc = r.b * r.b - 4.0 * r.a * r.c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t1 = (-r.b - sqrt_disc) / (2.0 * r.a);
    let t2 = (-r.b + sqrt_disc) / (2.0 * r.a);
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    if lo > 0.0 {
        Some(lo)
    } else if hi > 0.0 {
        Some(hi)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_roots_positive_returns_smaller() {
        // (t-2)(t-5) = t^2 -7t +10
        let root = quadratic_smallest_positive_root(&Roots { a: 1.0, b: -7.0, c: 10.0 });
        assert!((root.unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn one_root_negative_returns_positive_one() {
        // (t+2)(t-5) = t^2 -3t -10
        let root = quadratic_smallest_positive_root(&Roots { a: 1.0, b: -3.0, c: -10.0 });
        assert!((root.unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn no_real_roots_returns_none() {
        let root = quadratic_smallest_positive_root(&Roots { a: 1.0, b: 0.0, c: 10.0 });
        assert!(root.is_none());
    }

    #[test]
    fn degenerate_linear_equation_is_handled() {
        // 2t - 4 = 0 -> t = 2
        let root = quadratic_smallest_positive_root(&Roots { a: 0.0, b: 2.0, c: -4.0 });
        assert!((root.unwrap() - 2.0).abs() < 1e-10);
    }
}
