// Data models for structured workout plans

use super::exercise::ExerciseKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutMode {
    #[default]
    Freestyle,
    Preset,
    Custom,
}

impl WorkoutMode {
    pub fn to_string(&self) -> &'static str {
        match self {
            WorkoutMode::Freestyle => "freestyle",
            WorkoutMode::Preset => "preset",
            WorkoutMode::Custom => "custom",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "freestyle" => Ok(WorkoutMode::Freestyle),
            "preset" => Ok(WorkoutMode::Preset),
            "custom" => Ok(WorkoutMode::Custom),
            _ => Err(format!("Unknown workout mode: {}", s)),
        }
    }
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStep {
    pub exercise: ExerciseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
}

impl WorkoutStep {
    pub fn new(exercise: ExerciseKind, target_reps: u32) -> Self {
        Self {
            exercise,
            target_reps: Some(target_reps),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub steps: Vec<WorkoutStep>,
}

impl WorkoutPlan {
    pub fn step(&self, index: usize) -> Option<&WorkoutStep> {
        self.steps.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
