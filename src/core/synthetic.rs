// Synthetic keypoint frames with chosen joint angles, for demos and tests

use crate::models::exercise::{ExerciseRecipe, JointTriple};
use crate::models::pose::{Keypoint, KeypointFrame};

const VERTEX: (f32, f32) = (0.5, 0.5);
const LIMB_LENGTH: f32 = 0.2;

/// Write the three landmarks of `joints` so the angle at the vertex is `degrees`
pub fn place_angle(frame: &mut KeypointFrame, joints: JointTriple, degrees: f32, visibility: f32) {
    let radians = degrees.to_radians();
    let a = (VERTEX.0 + LIMB_LENGTH, VERTEX.1);
    let c = (
        VERTEX.0 + LIMB_LENGTH * radians.cos(),
        VERTEX.1 + LIMB_LENGTH * radians.sin(),
    );

    frame.insert(Keypoint::new(joints.a.index(), a.0, a.1, 0.0, visibility, 1.0));
    frame.insert(Keypoint::new(joints.vertex.index(), VERTEX.0, VERTEX.1, 0.0, visibility, 1.0));
    frame.insert(Keypoint::new(joints.c.index(), c.0, c.1, 0.0, visibility, 1.0));
}

/// Frame where every angle of the recipe measures `degrees`
pub fn pose_frame(recipe: &ExerciseRecipe, degrees: f32) -> KeypointFrame {
    pose_frame_with(recipe, degrees, None, 0.9)
}

/// Frame with a separate secondary angle and a uniform visibility
pub fn pose_frame_with(
    recipe: &ExerciseRecipe,
    primary: f32,
    secondary: Option<f32>,
    visibility: f32,
) -> KeypointFrame {
    let mut frame = KeypointFrame::new();
    place_angle(&mut frame, recipe.primary_angle_joints, primary, visibility);
    if let Some(joints) = recipe.secondary_angle_joints {
        place_angle(&mut frame, joints, secondary.unwrap_or(primary), visibility);
    }
    frame
}
