// Joint angle computation from keypoints

use crate::models::exercise::JointTriple;
use crate::models::pose::{Keypoint, KeypointFrame};

/// Angle in degrees at vertex `b` between rays b→a and b→c.
///
/// Works on the (x, y) projection; z is ignored. Returns 0.0 when any point is
/// missing or either ray has zero length. Result is always within [0, 180].
pub fn angle_at(a: Option<&Keypoint>, b: Option<&Keypoint>, c: Option<&Keypoint>) -> f32 {
    let (a, b, c) = match (a, b, c) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => return 0.0,
    };

    let ab = (a.x - b.x, a.y - b.y);
    let cb = (c.x - b.x, c.y - b.y);

    let dot = ab.0 * cb.0 + ab.1 * cb.1;
    let mag_ab = (ab.0 * ab.0 + ab.1 * ab.1).sqrt();
    let mag_cb = (cb.0 * cb.0 + cb.1 * cb.1).sqrt();

    if mag_ab == 0.0 || mag_cb == 0.0 {
        return 0.0;
    }

    // acos of anything outside [-1, 1] is NaN
    let cos_theta = (dot / (mag_ab * mag_cb)).clamp(-1.0, 1.0);
    let angle = cos_theta.acos().to_degrees();

    if angle.is_finite() {
        angle
    } else {
        0.0
    }
}

/// Angle for a joint triple looked up in a frame
pub fn frame_angle(frame: &KeypointFrame, joints: JointTriple) -> f32 {
    angle_at(
        frame.get(joints.a),
        frame.get(joints.vertex),
        frame.get(joints.c),
    )
}
