//! Joint angle at a vertex from three 2D keypoints.

use repcount_traits::Keypoint;

/// Angle at `vertex` between `vertex→a` and `vertex→b`, in whole degrees.
///
/// cos θ = (v1 · v2) / (|v1| |v2|), clamped to [-1, 1] before `acos`.
/// A zero-length arm segment yields 0. The result is always in `0..=180`
/// and does not depend on the order of `a` and `b`.
pub fn joint_angle(a: &Keypoint, vertex: &Keypoint, b: &Keypoint) -> u16 {
    let v1 = (f64::from(a.x) - f64::from(vertex.x), f64::from(a.y) - f64::from(vertex.y));
    let v2 = (f64::from(b.x) - f64::from(vertex.x), f64::from(b.y) - f64::from(vertex.y));

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);

    if mag1 == 0.0 || mag2 == 0.0 || !(mag1.is_finite() && mag2.is_finite()) {
        return 0;
    }

    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    let deg = cos.acos().to_degrees().round();
    if deg.is_nan() {
        return 0;
    }
    deg.clamp(0.0, 180.0) as u16
}
