// Data models for exercise recipes and rep thresholds

use super::pose::{BodyLandmark, PoseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Exercises the tracker can count. "No exercise selected" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    PushUp,
    Squat,
    SitUp,
}

impl ExerciseKind {
    pub fn all() -> Vec<ExerciseKind> {
        vec![ExerciseKind::PushUp, ExerciseKind::Squat, ExerciseKind::SitUp]
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "push-up",
            ExerciseKind::Squat => "squat",
            ExerciseKind::SitUp => "sit-up",
        }
    }

    /// Parse an exercise name as the UI sends it. `"none"` maps to `Ok(None)`.
    pub fn from_string(s: &str) -> Result<Option<Self>, PoseError> {
        match s.trim().to_lowercase().as_str() {
            "push-up" | "pushup" | "push_up" => Ok(Some(ExerciseKind::PushUp)),
            "squat" => Ok(Some(ExerciseKind::Squat)),
            "sit-up" | "situp" | "sit_up" => Ok(Some(ExerciseKind::SitUp)),
            "none" | "" => Ok(None),
            other => Err(PoseError::UnknownExercise(other.to_string())),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Three landmarks defining an angle; the middle one is the vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriple {
    pub a: BodyLandmark,
    pub vertex: BodyLandmark,
    pub c: BodyLandmark,
}

impl JointTriple {
    pub const fn new(a: BodyLandmark, vertex: BodyLandmark, c: BodyLandmark) -> Self {
        Self { a, vertex, c }
    }
}

/// Static per-exercise configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRecipe {
    pub kind: ExerciseKind,
    pub display_name: &'static str,
    /// Landmarks that must all be visible before any state change
    pub key_joints: &'static [BodyLandmark],
    pub primary_angle_joints: JointTriple,
    pub secondary_angle_joints: Option<JointTriple>,
    pub default_up_angle: f32,
    pub default_down_angle: f32,
    /// True when the "up" position has the numerically larger angle
    pub up_is_larger: bool,
}

impl ExerciseRecipe {
    pub fn default_thresholds(&self) -> ThresholdSet {
        ThresholdSet {
            up_angle: self.default_up_angle,
            down_angle: self.default_down_angle,
        }
    }

    /// Angle triples in evaluation order: primary first, then secondary if any
    pub fn angle_joints(&self) -> impl Iterator<Item = JointTriple> {
        std::iter::once(self.primary_angle_joints).chain(self.secondary_angle_joints)
    }
}

/// Up/down angle thresholds (degrees) for one exercise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub up_angle: f32,
    pub down_angle: f32,
}

impl ThresholdSet {
    pub fn new(up_angle: f32, down_angle: f32) -> Self {
        Self {
            up_angle,
            down_angle,
        }
    }
}

/// Calibrated thresholds keyed by exercise. Missing entries fall back to recipe defaults.
pub type AllThresholds = HashMap<ExerciseKind, ThresholdSet>;
