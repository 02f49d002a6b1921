//! # Liouvillean (C5, §4.2)
//!
//! Encodes how particles move between events (`stream`) and how their state
//! changes at an event (impulse/update functions). No teacher analogue: the
//! teacher's particles move on a fixed Euler step, not an analytic
//! trajectory. Structure is distilled from
//! `examples/original_source/src/dynamics/liouvillean/` (SLLOD/Newtonian
//! split collapsed into one streaming enum per Design Notes §9) together with
//! the well-known EDMD collision-time algebra (Allen & Tildesley-style hard
//! sphere roots).

pub mod impulse;
pub mod roots;

use crate::particle::Particle;
use crate::vector::Vec3;
use roots::{quadratic_smallest_positive_root, Roots};

/// How free-flight trajectories are integrated between events (§4.2).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Liouvillean {
    /// Straight-line motion at constant velocity.
    Newtonian,
    /// Straight-line motion plus a constant acceleration field (gravity).
    NewtonianGravity { gravity: Vec3 },
    /// Newtonian streaming with a periodic Monte-Carlo velocity resample
    /// applied by a System event, not by streaming itself; the streaming
    /// kernel is identical to `Newtonian`.
    NewtonianMC,
    /// SLLOD: Newtonian streaming in a frame co-moving with an externally
    /// imposed shear-rate profile (used with Lees-Edwards boundaries).
    Sllod { shear_rate: f64 },
}

impl Liouvillean {
    /// Advances `p` in place by `dt`, in simulation units, following this
    /// trajectory kind. Also advances `p.peculiar_time`.
    pub fn stream(&self, p: &mut Particle, dt: f64) {
        if !p.is_dynamic() || p.is_sleeping() {
            p.peculiar_time += dt;
            return;
        }
        match self {
            Liouvillean::Newtonian | Liouvillean::NewtonianMC => {
                p.position = p.position + p.velocity * dt;
            }
            Liouvillean::NewtonianGravity { gravity } => {
                p.position = p.position + p.velocity * dt + *gravity * (0.5 * dt * dt);
                p.velocity = p.velocity + *gravity * dt;
            }
            Liouvillean::Sllod { shear_rate } => {
                let sheared_vx = p.velocity.x + shear_rate * p.position.y;
                p.position = Vec3::new(
                    p.position.x + sheared_vx * dt,
                    p.position.y + p.velocity.y * dt,
                    p.position.z + p.velocity.z * dt,
                );
            }
        }
        p.peculiar_time += dt;
        p.orientation = p.orientation + p.angular_velocity * dt;
    }
}

/// Relative kinematics of an unordered particle pair, used by every analytic
/// root finder below. Orientation/angular velocity are carried per-particle
/// (not combined into a single relative value) since the line-line geometry
/// needs each line's own frame, not just their difference.
pub struct RelativeState {
    pub separation: Vec3,
    pub relative_velocity: Vec3,
    pub orientation1: Vec3,
    pub angular_velocity1: Vec3,
    pub orientation2: Vec3,
    pub angular_velocity2: Vec3,
}

impl RelativeState {
    pub fn of(p1: &Particle, p2: &Particle) -> Self {
        RelativeState {
            separation: p1.position - p2.position,
            relative_velocity: p1.velocity - p2.velocity,
            orientation1: p1.orientation,
            angular_velocity1: p1.angular_velocity,
            orientation2: p2.orientation,
            angular_velocity2: p2.angular_velocity,
        }
    }
}

/// Soonest positive time at which two spheres of combined radius `diameter`
/// reach contact while approaching (the "in-root" of the hard-sphere
/// quadratic, Allen & Tildesley eq. 2.9-2.11).
pub fn sphere_sphere_in_root(state: &RelativeState, diameter: f64) -> Option<f64> {
    let r = state.separation;
    let v = state.relative_velocity;
    let b = r.dot(&v);
    if b >= 0.0 {
        // separating or tangential: no in-root ahead
        return None;
    }
    let v2 = v.dot(&v);
    let r2 = r.dot(&r);
    let disc = b * b - v2 * (r2 - diameter * diameter);
    if disc < 0.0 || v2 <= 0.0 {
        return None;
    }
    Some((-b - disc.sqrt()) / v2)
}

/// Soonest positive time at which two overlapping/bonded spheres separate
/// past `diameter` (the "out-root"), used by square-well release and bonded
/// potentials.
pub fn sphere_sphere_out_root(state: &RelativeState, diameter: f64) -> Option<f64> {
    let r = state.separation;
    let v = state.relative_velocity;
    let b = r.dot(&v);
    let v2 = v.dot(&v);
    if v2 <= 0.0 {
        return None;
    }
    let r2 = r.dot(&r);
    let disc = b * b - v2 * (r2 - diameter * diameter);
    if disc < 0.0 {
        return None;
    }
    let t = (-b + disc.sqrt()) / v2;
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Whether the pair is currently overlapping `diameter` by more than
/// `tolerance` (used by `check_overlaps`, §4.3/§8 invariant 3).
pub fn sphere_overlap(state: &RelativeState, diameter: f64, tolerance: f64) -> bool {
    state.separation.norm() < diameter - tolerance
}

/// Time for a particle moving at constant `velocity` inside an axis-aligned
/// cube of half-width `half_extent` centred at `cell_centre` to cross any
/// face, used by the cell-list global (§4.4) and by square/shouldered cells.
pub fn square_cell_collision_time(
    position: Vec3,
    velocity: Vec3,
    cell_centre: Vec3,
    half_extent: f64,
) -> Option<f64> {
    let rel = position - cell_centre;
    let mut best: Option<f64> = None;
    for (r, v) in [(rel.x, velocity.x), (rel.y, velocity.y), (rel.z, velocity.z)] {
        if v == 0.0 {
            continue;
        }
        let t = if v > 0.0 {
            (half_extent - r) / v
        } else {
            (-half_extent - r) / v
        };
        if t > 0.0 {
            best = Some(best.map_or(t, |b: f64| b.min(t)));
        }
    }
    best
}

/// As [`square_cell_collision_time`] but also reports which face (0=+x,1=-x,
/// 2=+y,3=-y,4=+z,5=-z) is crossed, needed to rebind the particle into the
/// correct neighbouring cell.
pub fn square_cell_collision_face(
    position: Vec3,
    velocity: Vec3,
    cell_centre: Vec3,
    half_extent: f64,
) -> Option<(f64, u8)> {
    let rel = position - cell_centre;
    let candidates = [
        (rel.x, velocity.x, 0u8, 1u8),
        (rel.y, velocity.y, 2u8, 3u8),
        (rel.z, velocity.z, 4u8, 5u8),
    ];
    let mut best: Option<(f64, u8)> = None;
    for (r, v, pos_face, neg_face) in candidates {
        if v == 0.0 {
            continue;
        }
        let (t, face) = if v > 0.0 {
            ((half_extent - r) / v, pos_face)
        } else {
            ((-half_extent - r) / v, neg_face)
        };
        if t > 0.0 {
            best = match best {
                Some((bt, _)) if bt <= t => best,
                _ => Some((t, face)),
            };
        }
    }
    best
}

/// Time at which a particle crosses an infinite plane wall with unit normal
/// `normal` passing through `point`.
pub fn wall_collision_time(position: Vec3, velocity: Vec3, point: Vec3, normal: Vec3) -> Option<f64> {
    let vn = velocity.dot(&normal);
    if vn >= 0.0 {
        return None;
    }
    let dn = (position - point).dot(&normal);
    let t = -dn / vn;
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

const LINE_EPS: f64 = 1e-12;

/// First-order advance of a (unit) orientation vector under constant angular
/// velocity `omega` over time `t`: `u(t) = normalize(u + omega * t)`. Falls
/// back to the original orientation if the advanced vector degenerates.
fn orient_at(u0: Vec3, omega: Vec3, t: f64) -> Vec3 {
    let u = u0 + omega * t;
    if u.norm_squared() > 1e-20 {
        u.normalize()
    } else {
        u0
    }
}

/// Closest-approach parameters `(s, t)` of two finite segments, each defined
/// by a centre and a (unit) direction spanning `±half_len`. Standard
/// closest-point-between-segments construction (Ericson, "Real-Time
/// Collision Detection" §5.1.9), adapted to centre/half-length rather than
/// start/end parameterisation.
fn closest_segment_points(c1: Vec3, d1: Vec3, l1: f64, c2: Vec3, d2: Vec3, l2: f64) -> (f64, f64) {
    let r = c1 - c2;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    if a <= LINE_EPS && e <= LINE_EPS {
        return (0.0, 0.0);
    }
    if a <= LINE_EPS {
        return (0.0, (f / e).clamp(-l2, l2));
    }
    let c = d1.dot(&r);
    if e <= LINE_EPS {
        return ((-c / a).clamp(-l1, l1), 0.0);
    }
    let b = d1.dot(&d2);
    let denom = a * e - b * b;
    let mut s = if denom.abs() > LINE_EPS {
        ((b * f - c * e) / denom).clamp(-l1, l1)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;
    if t < -l2 {
        t = -l2;
        s = ((b * t - c) / a).clamp(-l1, l1);
    } else if t > l2 {
        t = l2;
        s = ((b * t - c) / a).clamp(-l1, l1);
    }
    (s, t)
}

/// Squared distance between the closest points of two finite line segments.
fn segment_distance_squared(c1: Vec3, d1: Vec3, l1: f64, c2: Vec3, d2: Vec3, l2: f64) -> f64 {
    let (s, t) = closest_segment_points(c1, d1, l1, c2, d2, l2);
    let p1 = c1 + d1 * s;
    let p2 = c2 + d2 * t;
    (p1 - p2).dot(&(p1 - p2))
}

/// Contact normal between two oriented line segments: the common
/// perpendicular to both line directions (the direction an impulse "normal
/// to both orientation vectors at the contact point" acts along, §4.2).
/// Falls back to the separation direction when the lines are parallel.
pub fn line_contact_normal(orientation1: Vec3, orientation2: Vec3, separation: Vec3) -> Vec3 {
    let cross = orientation1.cross(&orientation2);
    if cross.norm_squared() > 1e-10 {
        cross.normalize()
    } else if separation.norm_squared() > 1e-12 {
        separation.normalize()
    } else {
        Vec3::x_hat()
    }
}

/// Smallest positive time at which two oriented line segments of length
/// `length` and thickness `diameter` first touch (§4.2). Orientation is
/// advanced by first-order rotation; the gap function `g(t)` is the squared
/// closest-segment distance minus `diameter^2`, evaluated in the frame
/// comoving with particle 2 so only `state`'s relative/per-particle
/// kinematics are needed. Roots are found by scanning ahead for a sign
/// change (bracketing), then polished by Newton's method with bisection
/// fallback whenever a step would leave the bracket — the numerical
/// procedure described in §4.2 rather than a closed-form quartic solve.
pub fn line_line_collision_time(state: &RelativeState, length: f64, diameter: f64) -> Option<f64> {
    let half_len = length / 2.0;
    let gap = |t: f64| -> f64 {
        let rel_pos = state.separation + state.relative_velocity * t;
        let u1 = orient_at(state.orientation1, state.angular_velocity1, t);
        let u2 = orient_at(state.orientation2, state.angular_velocity2, t);
        segment_distance_squared(rel_pos, u1, half_len, Vec3::zero(), u2, half_len) - diameter * diameter
    };

    const STEPS: usize = 64;
    const HORIZON: f64 = 64.0;
    let dt = HORIZON / STEPS as f64;

    let mut t_prev = 0.0;
    let mut g_prev = gap(0.0);
    if g_prev <= 0.0 {
        return None;
    }
    for step in 1..=STEPS {
        let t_cur = step as f64 * dt;
        let g_cur = gap(t_cur);
        if g_cur <= 0.0 {
            return Some(bisect_newton(&gap, t_prev, t_cur));
        }
        t_prev = t_cur;
        g_prev = g_cur;
        let _ = g_prev;
    }
    None
}

/// Polishes a root of `g` known to lie in `[lo, hi]` (`g(lo) > 0`, `g(hi) <=
/// 0`) via Newton's method, falling back to bisection whenever a step would
/// leave the bracket.
fn bisect_newton(g: &impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    let mut t = hi;
    for _ in 0..64 {
        let h = ((hi - lo).max(1e-9) * 1e-4).max(1e-12);
        let g_t = g(t);
        let deriv = (g(t + h) - g(t - h)) / (2.0 * h);
        let mut next = if deriv.abs() > 1e-14 { t - g_t / deriv } else { 0.5 * (lo + hi) };
        if !(lo..=hi).contains(&next) {
            next = 0.5 * (lo + hi);
        }
        let g_next = g(next);
        if g_next.abs() < 1e-12 {
            return next;
        }
        if g_next > 0.0 {
            lo = next;
        } else {
            hi = next;
        }
        t = next;
    }
    0.5 * (lo + hi)
}

/// Axis-aligned box/box contact: the soonest time at which the per-axis
/// separation gaps of two axis-aligned cubes (half-extent `half_extent` =
/// sum of both cubes' half-widths) all close simultaneously — the
/// axis-aligned analogue of the hard-sphere in-root (§4.3), found via the
/// standard slab (swept-AABB) test rather than a spherical envelope.
pub fn parallel_cube_in_root(state: &RelativeState, half_extent: f64) -> Option<f64> {
    let axes = [
        (state.separation.x, state.relative_velocity.x),
        (state.separation.y, state.relative_velocity.y),
        (state.separation.z, state.relative_velocity.z),
    ];
    let mut entry = f64::NEG_INFINITY;
    let mut exit = f64::INFINITY;
    for (sep0, v) in axes {
        if v == 0.0 {
            if sep0.abs() > half_extent {
                return None;
            }
            continue;
        }
        let t_a = (-half_extent - sep0) / v;
        let t_b = (half_extent - sep0) / v;
        let (t_lo, t_hi) = if t_a <= t_b { (t_a, t_b) } else { (t_b, t_a) };
        entry = entry.max(t_lo);
        exit = exit.min(t_hi);
    }
    if entry < exit && entry > 0.0 {
        Some(entry)
    } else {
        None
    }
}

/// Whether two oriented line segments of length `length` and thickness
/// `diameter` currently overlap by more than `tolerance` (§4.3 `check_overlaps`,
/// the line-geometry analogue of [`sphere_overlap`]).
pub fn line_overlap(state: &RelativeState, length: f64, diameter: f64, tolerance: f64) -> bool {
    let half_len = length / 2.0;
    let dist_sq = segment_distance_squared(
        state.separation,
        state.orientation1,
        half_len,
        Vec3::zero(),
        state.orientation2,
        half_len,
    );
    dist_sq < (diameter - tolerance).max(0.0).powi(2)
}

/// Which axis-aligned face of a box/box contact was struck, given the
/// current (post-stream) separation — the axis whose gap is closest to the
/// contact threshold `half_extent` is the one that closed. Returns a unit
/// normal along that axis.
pub fn cube_contact_normal(separation: Vec3, half_extent: f64) -> Vec3 {
    let gaps = [
        (separation.x.abs() - half_extent).abs(),
        (separation.y.abs() - half_extent).abs(),
        (separation.z.abs() - half_extent).abs(),
    ];
    let axis = gaps
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);
    match axis {
        0 => Vec3::new(separation.x.signum(), 0.0, 0.0),
        1 => Vec3::new(0.0, separation.y.signum(), 0.0),
        _ => Vec3::new(0.0, 0.0, separation.z.signum()),
    }
}
