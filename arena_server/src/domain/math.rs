// Pure numeric helpers shared by the simulation systems.

use glam::Vec2;

/// Weight used when callers do not pick their own interpolation factor.
pub const DEFAULT_LERP_WEIGHT: f32 = 0.10;

/// Gap below which `lerp` snaps straight to the target.
const LERP_SNAP_EPSILON: f32 = 0.001;

/// Moves `from` a fraction `weight` of the way towards `to`.
///
/// Once the gap is smaller than 0.001 the target is returned as-is, so repeated
/// calls settle instead of approaching forever.
pub fn lerp(from: f32, to: f32, weight: f32) -> f32 {
    if (to - from).abs() < LERP_SNAP_EPSILON {
        return to;
    }
    from + (to - from) * weight
}

pub fn lerp_default(from: f32, to: f32) -> f32 {
    lerp(from, to, DEFAULT_LERP_WEIGHT)
}

/// Euclidean distance between two optional points.
///
/// Returns NaN when either point is missing or has a non-finite coordinate, so
/// comparisons against the result are false rather than misleading.
pub fn vector_distance(a: Option<Vec2>, b: Option<Vec2>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => {
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            (dx * dx + dy * dy).sqrt()
        }
        _ => f32::NAN,
    }
}
