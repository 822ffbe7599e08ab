// Pose state classification - turns keypoint frames into up/down/transitioning states
//
// One classifier serves every exercise. The recipe decides which angles are measured
// and which direction counts as "up"; nothing in here branches on the exercise itself.

use crate::core::geometry::frame_angle;
use crate::models::exercise::{ExerciseRecipe, ThresholdSet};
use crate::models::pose::{ExerciseState, KeypointFrame};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minimum landmark visibility; a joint must be strictly above this
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// Degrees an angle must move past a threshold before a stable state is left
pub const HYSTERESIS_MARGIN: f32 = 5.0;

// ==============================================================================
// Settings & Results
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    pub visibility_threshold: f32,
    pub hysteresis_margin: f32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            visibility_threshold: VISIBILITY_THRESHOLD,
            hysteresis_margin: HYSTERESIS_MARGIN,
        }
    }
}

/// Result of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_visible: bool,
    pub state: ExerciseState,
    pub primary_angle: f32,
    pub secondary_angle: Option<f32>,
}

impl Classification {
    /// Nothing to classify: no exercise selected
    pub fn idle() -> Self {
        Self {
            is_visible: false,
            state: ExerciseState::None,
            primary_angle: 0.0,
            secondary_angle: None,
        }
    }

    fn held(state: ExerciseState) -> Self {
        Self {
            is_visible: false,
            state,
            primary_angle: 0.0,
            secondary_angle: None,
        }
    }
}

// ==============================================================================
// Threshold Comparisons
// ==============================================================================

/// Threshold comparisons with the recipe's polarity applied
#[derive(Debug, Clone, Copy)]
struct ThresholdChecks {
    up_is_larger: bool,
    up: f32,
    down: f32,
    margin: f32,
}

impl ThresholdChecks {
    fn new(up_is_larger: bool, thresholds: ThresholdSet, margin: f32) -> Self {
        Self {
            up_is_larger,
            up: thresholds.up_angle,
            down: thresholds.down_angle,
            margin,
        }
    }

    fn meets_up(&self, angle: f32) -> bool {
        if self.up_is_larger {
            angle >= self.up
        } else {
            angle <= self.up
        }
    }

    fn meets_down(&self, angle: f32) -> bool {
        if self.up_is_larger {
            angle <= self.down
        } else {
            angle >= self.down
        }
    }

    fn leaves_up(&self, angle: f32) -> bool {
        if self.up_is_larger {
            angle < self.up - self.margin
        } else {
            angle > self.up + self.margin
        }
    }

    fn leaves_down(&self, angle: f32) -> bool {
        if self.up_is_larger {
            angle > self.down + self.margin
        } else {
            angle < self.down - self.margin
        }
    }
}

// ==============================================================================
// Transition Function
// ==============================================================================

/// Hysteresis state machine.
///
/// Entering `up` or `down` needs every angle past the threshold; leaving needs only
/// one angle past the threshold plus the margin. A stable state can be entered
/// directly from the opposite one when every angle already meets it.
pub fn next_state(
    previous: ExerciseState,
    angles: &[f32],
    up_is_larger: bool,
    thresholds: ThresholdSet,
    margin: f32,
) -> ExerciseState {
    if angles.is_empty() {
        return previous;
    }

    let checks = ThresholdChecks::new(up_is_larger, thresholds, margin);
    let all = |check: fn(&ThresholdChecks, f32) -> bool| angles.iter().all(|a| check(&checks, *a));
    let any = |check: fn(&ThresholdChecks, f32) -> bool| angles.iter().any(|a| check(&checks, *a));

    if previous != ExerciseState::Up && all(ThresholdChecks::meets_up) {
        return ExerciseState::Up;
    }
    if previous != ExerciseState::Down && all(ThresholdChecks::meets_down) {
        return ExerciseState::Down;
    }

    match previous {
        ExerciseState::Up if any(ThresholdChecks::leaves_up) => ExerciseState::Transitioning,
        ExerciseState::Down if any(ThresholdChecks::leaves_down) => ExerciseState::Transitioning,
        ExerciseState::Up => ExerciseState::Up,
        ExerciseState::Down => ExerciseState::Down,
        ExerciseState::None | ExerciseState::Transitioning => ExerciseState::Transitioning,
    }
}

/// Classify one frame against a recipe without touching any state.
///
/// `thresholds` falls back to the recipe defaults when `None`. When a key joint is
/// not visible, or an angle cannot be determined, `previous` is returned unchanged.
pub fn classify(
    frame: &KeypointFrame,
    recipe: &ExerciseRecipe,
    thresholds: Option<ThresholdSet>,
    previous: ExerciseState,
    settings: ClassifierSettings,
) -> Classification {
    if !frame.all_visible(recipe.key_joints, settings.visibility_threshold) {
        return Classification::held(previous);
    }

    let primary_angle = frame_angle(frame, recipe.primary_angle_joints);
    let secondary_angle = recipe
        .secondary_angle_joints
        .map(|joints| frame_angle(frame, joints));

    let mut angles = vec![primary_angle];
    angles.extend(secondary_angle);

    // 0 is the geometry sentinel for a degenerate triple
    let state = if angles.iter().any(|a| *a <= 0.0) {
        previous
    } else {
        let thresholds = thresholds.unwrap_or_else(|| recipe.default_thresholds());
        next_state(
            previous,
            &angles,
            recipe.up_is_larger,
            thresholds,
            settings.hysteresis_margin,
        )
    };

    Classification {
        is_visible: true,
        state,
        primary_angle,
        secondary_angle,
    }
}

// ==============================================================================
// Stateful Classifier
// ==============================================================================

/// Holds the current state between frames for one session
#[derive(Debug, Clone)]
pub struct PoseStateClassifier {
    settings: ClassifierSettings,
    state: ExerciseState,
}

impl PoseStateClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            settings,
            state: ExerciseState::None,
        }
    }

    pub fn state(&self) -> ExerciseState {
        self.state
    }

    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    /// Back to `none`, used when the exercise changes
    pub fn reset(&mut self) {
        self.state = ExerciseState::None;
    }

    pub fn update(
        &mut self,
        frame: &KeypointFrame,
        recipe: &ExerciseRecipe,
        thresholds: Option<ThresholdSet>,
    ) -> Classification {
        let result = classify(frame, recipe, thresholds, self.state, self.settings);

        if !result.is_visible {
            debug!(exercise = %recipe.kind, state = self.state.to_string(), "key joints not visible, holding state");
        } else if result.state != self.state {
            info!(
                exercise = %recipe.kind,
                from = self.state.to_string(),
                to = result.state.to_string(),
                primary_angle = result.primary_angle,
                secondary_angle = ?result.secondary_angle,
                "pose state changed"
            );
        }

        self.state = result.state;
        result
    }

    /// Visibility and angles for `frame` with the current state held
    pub fn observe(
        &self,
        frame: &KeypointFrame,
        recipe: &ExerciseRecipe,
        thresholds: Option<ThresholdSet>,
    ) -> Classification {
        Classification {
            state: self.state,
            ..classify(frame, recipe, thresholds, self.state, self.settings)
        }
    }
}

impl Default for PoseStateClassifier {
    fn default() -> Self {
        Self::new(ClassifierSettings::default())
    }
}
