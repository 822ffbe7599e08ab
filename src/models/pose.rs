// Data models for body keypoints, keypoint frames and exercise states

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe BlazePose landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    pub const ALL: [BodyLandmark; Self::COUNT] = [
        BodyLandmark::Nose,
        BodyLandmark::LeftEyeInner,
        BodyLandmark::LeftEye,
        BodyLandmark::LeftEyeOuter,
        BodyLandmark::RightEyeInner,
        BodyLandmark::RightEye,
        BodyLandmark::RightEyeOuter,
        BodyLandmark::LeftEar,
        BodyLandmark::RightEar,
        BodyLandmark::MouthLeft,
        BodyLandmark::MouthRight,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftElbow,
        BodyLandmark::RightElbow,
        BodyLandmark::LeftWrist,
        BodyLandmark::RightWrist,
        BodyLandmark::LeftPinky,
        BodyLandmark::RightPinky,
        BodyLandmark::LeftIndex,
        BodyLandmark::RightIndex,
        BodyLandmark::LeftThumb,
        BodyLandmark::RightThumb,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
        BodyLandmark::LeftHeel,
        BodyLandmark::RightHeel,
        BodyLandmark::LeftFootIndex,
        BodyLandmark::RightFootIndex,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl TryFrom<u8> for BodyLandmark {
    type Error = PoseError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(PoseError::UnknownLandmark(index))
    }
}

// ==============================================================================
// Keypoints
// ==============================================================================

/// A single landmark reported by the pose detector for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    #[serde(rename = "keypoint", deserialize_with = "landmark_index")]
    pub id: u8,
    pub x: f32, // Normalized [0, 1] image coordinates
    pub y: f32,
    pub z: f32, // Depth, experimental; ignored by every angle we compute
    #[serde(default, deserialize_with = "score_or_zero")]
    pub visibility: f32,
    #[serde(default, deserialize_with = "score_or_zero")]
    pub presence: f32,
}

/// Indices outside 0..=255 saturate to 255, which no landmark uses, so the
/// keypoint is dropped instead of the whole event
fn landmark_index<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let index = i64::deserialize(deserializer)?;
    Ok(u8::try_from(index).unwrap_or(u8::MAX))
}

/// The detector reports a missing score as `null`; treat it as not visible
fn score_or_zero<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Keypoint {
    pub fn new(id: u8, x: f32, y: f32, z: f32, visibility: f32, presence: f32) -> Self {
        Self {
            id,
            x,
            y,
            z,
            visibility,
            presence,
        }
    }

    /// Strictly above the threshold counts as visible
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// All keypoints detected for one person in one camera frame.
///
/// May be empty (no body in view) or partially populated; ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeypointFrame {
    keypoints: HashMap<u8, Keypoint>,
}

impl KeypointFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from detector output. Later duplicates of an id replace earlier ones,
    /// ids outside the 33-point topology are dropped.
    pub fn from_keypoints<I>(keypoints: I) -> Self
    where
        I: IntoIterator<Item = Keypoint>,
    {
        let keypoints = keypoints
            .into_iter()
            .filter(|kp| (kp.id as usize) < BodyLandmark::COUNT)
            .map(|kp| (kp.id, kp))
            .collect();
        Self { keypoints }
    }

    pub fn insert(&mut self, keypoint: Keypoint) {
        if (keypoint.id as usize) < BodyLandmark::COUNT {
            self.keypoints.insert(keypoint.id, keypoint);
        }
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Keypoint> {
        self.keypoints.get(&landmark.index())
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// True only if every listed landmark is present and strictly above the threshold
    pub fn all_visible(&self, landmarks: &[BodyLandmark], threshold: f32) -> bool {
        landmarks
            .iter()
            .all(|lm| self.get(*lm).is_some_and(|kp| kp.is_visible(threshold)))
    }
}

// ==============================================================================
// Exercise State
// ==============================================================================

/// Discrete phase of a repetition as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseState {
    #[default]
    None,
    Up,
    Down,
    Transitioning,
}

impl ExerciseState {
    pub fn to_string(&self) -> &'static str {
        match self {
            ExerciseState::None => "none",
            ExerciseState::Up => "up",
            ExerciseState::Down => "down",
            ExerciseState::Transitioning => "transitioning",
        }
    }

    /// `up` and `down` are stable, everything else is transient
    pub fn is_stable(&self) -> bool {
        matches!(self, ExerciseState::Up | ExerciseState::Down)
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Malformed detector event: {0}")]
    MalformedEvent(String),

    #[error("Unknown landmark index: {0}")]
    UnknownLandmark(u8),

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Unknown workout plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tracker session is no longer running")]
    ChannelClosed,
}

pub type PoseResult<T> = Result<T, PoseError>;
