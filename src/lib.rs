pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::calibration::{CalibrationEngine, CalibrationError, CalibrationOutcome, CalibrationPhase};
pub use crate::core::config::{CalibrationSettings, TrackerConfig};
pub use crate::core::geometry::angle_at;
pub use crate::core::pose_classifier::{classify, Classification, ClassifierSettings, PoseStateClassifier};
pub use crate::core::recipes::{all_recipes, recipe};
pub use crate::core::rep_counter::{RepCounter, RepEvent};
pub use crate::core::session_manager::WorkoutSession;
pub use crate::core::tracker_service::{TrackerHandle, TrackerService};
pub use crate::core::workout_presets::{find_preset, preset_workouts};
pub use crate::models::exercise::{AllThresholds, ExerciseKind, ExerciseRecipe, ThresholdSet};
pub use crate::models::pose::{BodyLandmark, ExerciseState, Keypoint, KeypointFrame, PoseError, PoseResult};
pub use crate::models::session::{SessionCommand, SessionEvent, SessionSnapshot};
pub use crate::models::workout::{WorkoutMode, WorkoutPlan, WorkoutStep};
