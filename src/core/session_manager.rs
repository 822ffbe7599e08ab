// Workout session orchestration
//
// A `WorkoutSession` is the single writer for one tracking session. Frames, commands and
// timer expiries are applied one at a time; each call returns the events it produced.

use crate::core::calibration::{CalibrationEngine, CalibrationOutcome};
use crate::core::config::TrackerConfig;
use crate::core::pose_classifier::{Classification, PoseStateClassifier};
use crate::core::recipes::recipe;
use crate::core::rep_counter::RepCounter;
use crate::models::exercise::{AllThresholds, ExerciseKind, ThresholdSet};
use crate::models::pose::{ExerciseState, KeypointFrame};
use crate::models::session::{SessionCommand, SessionEvent, SessionSnapshot};
use crate::models::workout::{WorkoutMode, WorkoutPlan};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct WorkoutSession {
    session_id: String,
    config: TrackerConfig,
    mode: WorkoutMode,
    plan: Option<WorkoutPlan>,
    step_index: Option<usize>,
    workout_complete: bool,
    exercise: Option<ExerciseKind>,
    thresholds: AllThresholds,
    classifier: PoseStateClassifier,
    counter: RepCounter,
    calibration: CalibrationEngine,
    latest_frame: KeypointFrame,
    last_classification: Classification,
}

impl WorkoutSession {
    /// Build a session. In freestyle mode `plan` is ignored and no exercise is selected;
    /// otherwise the session starts on the plan's first step.
    pub fn new(config: TrackerConfig, mode: WorkoutMode, plan: Option<WorkoutPlan>) -> Self {
        let plan = match mode {
            WorkoutMode::Freestyle => None,
            WorkoutMode::Preset | WorkoutMode::Custom => plan,
        };
        let first_step = plan.as_ref().and_then(|p| p.step(0)).cloned();

        let session = Self {
            session_id: Uuid::new_v4().to_string(),
            classifier: PoseStateClassifier::new(config.classifier_settings()),
            calibration: CalibrationEngine::new(config.calibration.clone(), config.visibility_threshold),
            counter: RepCounter::with_target(first_step.as_ref().and_then(|s| s.target_reps)),
            config,
            mode,
            step_index: first_step.as_ref().map(|_| 0),
            workout_complete: false,
            exercise: first_step.map(|s| s.exercise),
            plan,
            thresholds: AllThresholds::new(),
            latest_frame: KeypointFrame::new(),
            last_classification: Classification::idle(),
        };

        info!(
            session_id = %session.session_id,
            mode = session.mode.to_string(),
            plan = ?session.plan.as_ref().map(|p| p.id.as_str()),
            exercise = ?session.exercise,
            "workout session created"
        );
        session
    }

    pub fn freestyle(config: TrackerConfig) -> Self {
        Self::new(config, WorkoutMode::Freestyle, None)
    }

    /// Seed thresholds restored from an external store
    pub fn with_thresholds(mut self, thresholds: AllThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> WorkoutMode {
        self.mode
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.exercise
    }

    pub fn rep_count(&self) -> u32 {
        self.counter.rep_count()
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn is_workout_complete(&self) -> bool {
        self.workout_complete
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_calibrating()
    }

    pub fn thresholds(&self) -> &AllThresholds {
        &self.thresholds
    }

    /// Thresholds the classifier uses for `exercise` right now
    pub fn effective_thresholds(&self, exercise: ExerciseKind) -> ThresholdSet {
        self.thresholds
            .get(&exercise)
            .copied()
            .unwrap_or_else(|| recipe(exercise).default_thresholds())
    }

    /// When `on_timer` must next be called
    pub fn next_deadline(&self) -> Option<Instant> {
        self.calibration.next_deadline()
    }

    // ==========================================================================
    // Inputs
    // ==========================================================================

    pub fn handle_command(&mut self, command: SessionCommand, now: Instant) -> Vec<SessionEvent> {
        debug!(command = ?command, "session command");
        match command {
            SessionCommand::SelectExercise { exercise } => self.select_exercise(exercise, now),
            SessionCommand::StartCalibration => self.start_calibration(now),
            SessionCommand::CancelCalibration => self.cancel_calibration(now),
            SessionCommand::ResetCounter => self.reset_counter(),
            SessionCommand::AdvanceWorkoutStep => self.advance_workout_step(),
            SessionCommand::Shutdown => {
                self.shutdown();
                Vec::new()
            }
        }
    }

    /// Apply one detector frame
    pub fn on_frame(&mut self, frame: KeypointFrame, now: Instant) -> Vec<SessionEvent> {
        self.latest_frame = frame;

        // A capture step due now samples this frame
        let mut events = self.on_timer(now);

        let Some(exercise) = self.exercise else {
            self.last_classification = Classification::idle();
            return events;
        };
        let thresholds = self.thresholds.get(&exercise).copied();

        if self.calibration.is_calibrating() {
            self.last_classification = self
                .classifier
                .observe(&self.latest_frame, recipe(exercise), thresholds);
            return events;
        }

        let previous = self.classifier.state();
        let result = self
            .classifier
            .update(&self.latest_frame, recipe(exercise), thresholds);
        self.last_classification = result;

        if result.state != previous {
            events.push(SessionEvent::StateChanged {
                from: previous,
                to: result.state,
                primary_angle: result.primary_angle,
                secondary_angle: result.secondary_angle,
            });
        }

        if let Some(rep) = self.counter.update(result.state, result.is_visible) {
            events.push(SessionEvent::RepCompleted {
                exercise,
                rep_count: rep.rep_count,
            });

            if rep.target_met {
                if let Some(target_reps) = self.counter.target_reps() {
                    info!(exercise = %exercise, reps = rep.rep_count, target_reps, "target reps met");
                    events.push(SessionEvent::TargetMet {
                        exercise,
                        rep_count: rep.rep_count,
                        target_reps,
                    });
                }
                if self.plan.is_some() && !self.workout_complete {
                    events.extend(self.advance_step());
                }
            }
        }

        events
    }

    /// Run calibration steps that are due
    pub fn on_timer(&mut self, now: Instant) -> Vec<SessionEvent> {
        match self.calibration.poll(now, &self.latest_frame) {
            Some(CalibrationOutcome::Completed { exercise, thresholds }) => {
                self.thresholds.insert(exercise, thresholds);
                vec![SessionEvent::CalibrationCompleted { exercise, thresholds }]
            }
            Some(CalibrationOutcome::Failed { exercise, error }) => {
                vec![SessionEvent::CalibrationFailed {
                    exercise,
                    title: error.title().to_string(),
                    message: error.to_string(),
                }]
            }
            None => Vec::new(),
        }
    }

    // ==========================================================================
    // Commands
    // ==========================================================================

    pub fn select_exercise(&mut self, exercise: Option<ExerciseKind>, now: Instant) -> Vec<SessionEvent> {
        if self.mode != WorkoutMode::Freestyle {
            return rejected("Exercise selection is only available in freestyle mode");
        }
        if self.calibration.is_calibrating() {
            return rejected("Cannot change exercise while calibrating");
        }

        info!(exercise = ?exercise, "exercise selected");
        self.set_exercise(exercise);
        let mut events = vec![SessionEvent::ExerciseChanged { exercise }];

        if let Some(exercise) = exercise {
            if self.config.auto_calibrate_on_select && !self.thresholds.contains_key(&exercise) {
                debug!(exercise = %exercise, "no calibrated thresholds, starting calibration");
                events.extend(self.start_calibration(now));
            }
        }

        events
    }

    pub fn start_calibration(&mut self, now: Instant) -> Vec<SessionEvent> {
        match self.calibration.start(self.exercise, now) {
            Ok(exercise) => vec![SessionEvent::CalibrationStarted { exercise }],
            Err(e) => {
                debug!(error = %e, "calibration not started");
                rejected(&e.to_string())
            }
        }
    }

    pub fn cancel_calibration(&mut self, now: Instant) -> Vec<SessionEvent> {
        match self.calibration.cancel(now) {
            Some(exercise) => vec![SessionEvent::CalibrationCancelled { exercise }],
            None => Vec::new(),
        }
    }

    /// Zero the current exercise's reps. Plan position is kept.
    pub fn reset_counter(&mut self) -> Vec<SessionEvent> {
        if self.calibration.is_calibrating() {
            return rejected("Cannot reset while calibrating");
        }
        info!(exercise = ?self.exercise, reps = self.counter.rep_count(), "resetting reps");
        self.counter.reset(ExerciseState::Up);
        Vec::new()
    }

    pub fn advance_workout_step(&mut self) -> Vec<SessionEvent> {
        if self.calibration.is_calibrating() {
            return rejected("Cannot advance while calibrating");
        }
        if self.plan.is_none() {
            return rejected("No workout plan loaded");
        }
        self.advance_step()
    }

    /// Tear down: no timer may fire after this
    pub fn shutdown(&mut self) {
        info!(session_id = %self.session_id, reps = self.counter.rep_count(), "workout session ended");
        self.calibration.abort();
    }

    // ==========================================================================
    // Output
    // ==========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            mode: self.mode,
            exercise: self.exercise,
            step_index: self.step_index,
            target_reps: self.counter.target_reps(),
            rep_count: self.counter.rep_count(),
            state: self.classifier.state(),
            is_visible: self.last_classification.is_visible,
            primary_angle: self.last_classification.primary_angle,
            secondary_angle: self.last_classification.secondary_angle,
            is_calibrating: self.calibration.is_calibrating(),
            calibration_message: self.calibration.message().map(str::to_string),
        }
    }

    // ==========================================================================
    // Internals
    // ==========================================================================

    fn set_exercise(&mut self, exercise: Option<ExerciseKind>) {
        self.exercise = exercise;
        self.classifier.reset();
        self.counter.reset(ExerciseState::Up);
        self.last_classification = Classification::idle();
    }

    fn advance_step(&mut self) -> Vec<SessionEvent> {
        if self.workout_complete {
            return rejected("Workout already complete");
        }
        let Some(plan) = self.plan.as_ref() else {
            return Vec::new();
        };
        let plan_id = plan.id.clone();
        let next_index = self.step_index.map_or(0, |i| i + 1);

        let Some(step) = plan.step(next_index).cloned() else {
            info!(plan = %plan_id, "workout plan complete");
            self.workout_complete = true;
            return vec![SessionEvent::WorkoutComplete { plan_id }];
        };

        info!(plan = %plan_id, step = next_index + 1, exercise = %step.exercise, "advancing workout step");
        let previous_exercise = self.exercise;
        self.step_index = Some(next_index);
        self.set_exercise(Some(step.exercise));
        self.counter.set_target(step.target_reps);

        let mut events = vec![SessionEvent::StepAdvanced {
            step_index: next_index,
            exercise: step.exercise,
        }];
        if previous_exercise != Some(step.exercise) {
            events.push(SessionEvent::ExerciseChanged {
                exercise: Some(step.exercise),
            });
        }
        if !self.thresholds.contains_key(&step.exercise) {
            debug!(exercise = %step.exercise, "next step uses default thresholds");
        }
        events
    }
}

fn rejected(reason: &str) -> Vec<SessionEvent> {
    warn!(reason, "command rejected");
    vec![SessionEvent::CommandRejected {
        reason: reason.to_string(),
    }]
}
