// Built-in preset workout plans

use crate::models::exercise::ExerciseKind;
use crate::models::pose::{PoseError, PoseResult};
use crate::models::workout::{WorkoutPlan, WorkoutStep};

pub const BEGINNER_CORE_BLAST: &str = "preset-core-1";
pub const QUICK_SQUAT_BURNER: &str = "preset-legs-1";

/// All preset plans, in display order
pub fn preset_workouts() -> Vec<WorkoutPlan> {
    vec![
        WorkoutPlan {
            id: BEGINNER_CORE_BLAST.to_string(),
            name: "Beginner Core Blast".to_string(),
            steps: vec![
                WorkoutStep::new(ExerciseKind::SitUp, 10),
                WorkoutStep::new(ExerciseKind::SitUp, 10),
            ],
        },
        WorkoutPlan {
            id: QUICK_SQUAT_BURNER.to_string(),
            name: "Quick Squat Burner".to_string(),
            steps: vec![
                WorkoutStep::new(ExerciseKind::Squat, 15),
                WorkoutStep::new(ExerciseKind::Squat, 15),
            ],
        },
    ]
}

pub fn find_preset(id: &str) -> PoseResult<WorkoutPlan> {
    preset_workouts()
        .into_iter()
        .find(|plan| plan.id == id)
        .ok_or_else(|| PoseError::UnknownPlan(id.to_string()))
}
