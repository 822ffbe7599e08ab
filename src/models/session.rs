// Data models exchanged between a workout session and the UI layer

use super::exercise::{ExerciseKind, ThresholdSet};
use super::pose::ExerciseState;
use super::workout::WorkoutMode;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Commands (UI -> session)
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    SelectExercise { exercise: Option<ExerciseKind> },
    StartCalibration,
    CancelCalibration,
    ResetCounter,
    AdvanceWorkoutStep,
    Shutdown,
}

// ==============================================================================
// Events (session -> UI)
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged {
        from: ExerciseState,
        to: ExerciseState,
        primary_angle: f32,
        secondary_angle: Option<f32>,
    },
    RepCompleted {
        exercise: ExerciseKind,
        rep_count: u32,
    },
    TargetMet {
        exercise: ExerciseKind,
        rep_count: u32,
        target_reps: u32,
    },
    ExerciseChanged {
        exercise: Option<ExerciseKind>,
    },
    StepAdvanced {
        step_index: usize,
        exercise: ExerciseKind,
    },
    WorkoutComplete {
        plan_id: String,
    },
    CalibrationStarted {
        exercise: ExerciseKind,
    },
    CalibrationCompleted {
        exercise: ExerciseKind,
        thresholds: ThresholdSet,
    },
    /// User-facing alert: `title` is the alert heading, `message` its body
    CalibrationFailed {
        exercise: ExerciseKind,
        title: String,
        message: String,
    },
    CalibrationCancelled {
        exercise: ExerciseKind,
    },
    CommandRejected {
        reason: String,
    },
}

// ==============================================================================
// Snapshot (per-update view for the UI)
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub timestamp: i64,
    pub mode: WorkoutMode,
    pub exercise: Option<ExerciseKind>,
    pub step_index: Option<usize>,
    pub target_reps: Option<u32>,
    pub rep_count: u32,
    pub state: ExerciseState,
    pub is_visible: bool,
    pub primary_angle: f32,
    pub secondary_angle: Option<f32>,
    pub is_calibrating: bool,
    pub calibration_message: Option<String>,
}
