// Exercise recipe table: joints, default thresholds and angle polarity per exercise

use crate::models::exercise::{ExerciseKind, ExerciseRecipe, JointTriple};
use crate::models::pose::BodyLandmark;

const PUSH_UP_KEY_JOINTS: [BodyLandmark; 3] = [
    BodyLandmark::RightShoulder,
    BodyLandmark::RightElbow,
    BodyLandmark::RightWrist,
];

const SQUAT_KEY_JOINTS: [BodyLandmark; 6] = [
    BodyLandmark::RightHip,
    BodyLandmark::RightKnee,
    BodyLandmark::RightAnkle,
    BodyLandmark::LeftHip,
    BodyLandmark::LeftKnee,
    BodyLandmark::LeftAnkle,
];

const SIT_UP_KEY_JOINTS: [BodyLandmark; 3] = [
    BodyLandmark::RightShoulder,
    BodyLandmark::RightHip,
    BodyLandmark::RightKnee,
];

static PUSH_UP: ExerciseRecipe = ExerciseRecipe {
    kind: ExerciseKind::PushUp,
    display_name: "Push-up",
    key_joints: &PUSH_UP_KEY_JOINTS,
    primary_angle_joints: JointTriple::new(
        BodyLandmark::RightShoulder,
        BodyLandmark::RightElbow,
        BodyLandmark::RightWrist,
    ),
    secondary_angle_joints: None,
    default_up_angle: 160.0,
    default_down_angle: 100.0,
    up_is_larger: true,
};

static SQUAT: ExerciseRecipe = ExerciseRecipe {
    kind: ExerciseKind::Squat,
    display_name: "Squat",
    key_joints: &SQUAT_KEY_JOINTS,
    primary_angle_joints: JointTriple::new(
        BodyLandmark::RightHip,
        BodyLandmark::RightKnee,
        BodyLandmark::RightAnkle,
    ),
    secondary_angle_joints: Some(JointTriple::new(
        BodyLandmark::LeftHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::LeftAnkle,
    )),
    default_up_angle: 160.0,
    default_down_angle: 110.0,
    up_is_larger: true,
};

// Sit-up "up" is the raised torso, i.e. the smaller shoulder-hip-knee angle
static SIT_UP: ExerciseRecipe = ExerciseRecipe {
    kind: ExerciseKind::SitUp,
    display_name: "Sit-up",
    key_joints: &SIT_UP_KEY_JOINTS,
    primary_angle_joints: JointTriple::new(
        BodyLandmark::RightShoulder,
        BodyLandmark::RightHip,
        BodyLandmark::RightKnee,
    ),
    secondary_angle_joints: None,
    default_up_angle: 80.0,
    default_down_angle: 160.0,
    up_is_larger: false,
};

/// Recipe lookup. Every `ExerciseKind` has exactly one recipe.
pub fn recipe(kind: ExerciseKind) -> &'static ExerciseRecipe {
    match kind {
        ExerciseKind::PushUp => &PUSH_UP,
        ExerciseKind::Squat => &SQUAT,
        ExerciseKind::SitUp => &SIT_UP,
    }
}

pub fn all_recipes() -> [&'static ExerciseRecipe; 3] {
    [&PUSH_UP, &SQUAT, &SIT_UP]
}
