// Calibration engine - captures personal up/down thresholds for one exercise
//
// Explicit state machine. Every wait is a single deadline; the owner polls the engine
// when that deadline passes and hands it the latest frame. Clearing the deadline is
// the only thing needed to cancel a pending step.

use crate::core::config::CalibrationSettings;
use crate::core::geometry::frame_angle;
use crate::core::recipes::recipe;
use crate::models::exercise::{ExerciseKind, ThresholdSet};
use crate::models::pose::KeypointFrame;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const COMPLETE_MESSAGE: &str = "Calibration Complete!";
pub const CANCELLED_MESSAGE: &str = "Calibration Cancelled";

// ==============================================================================
// Errors
// ==============================================================================

/// Which pose a capture step is sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePose {
    Up,
    Down,
}

impl CapturePose {
    pub fn label(&self) -> &'static str {
        match self {
            CapturePose::Up => "UP",
            CapturePose::Down => "DOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("No exercise selected")]
    NoExerciseSelected,

    #[error("Calibration already in progress")]
    AlreadyCalibrating,

    #[error("Could not detect pose clearly for {} position. Please try again.", .phase.label())]
    CaptureFailed { phase: CapturePose },

    #[error("{}", sanity_message(.up, .down, .up_is_larger))]
    SanityCheck { up: f32, down: f32, up_is_larger: bool },
}

impl CalibrationError {
    /// Heading of the user-facing alert
    pub fn title(&self) -> &'static str {
        match self {
            CalibrationError::CaptureFailed { .. } => "Calibration Failed",
            CalibrationError::SanityCheck { .. } => "Calibration Issue",
            CalibrationError::NoExerciseSelected | CalibrationError::AlreadyCalibrating => {
                "Calibration Unavailable"
            }
        }
    }
}

fn sanity_message(up: &f32, down: &f32, up_is_larger: &bool) -> String {
    if *up_is_larger {
        format!(
            "Up pose angle ({:.0}°) must be greater than Down pose angle ({:.0}°). Please try calibration again.",
            up, down
        )
    } else {
        format!(
            "Down pose angle ({:.0}°) must be greater than Up pose angle ({:.0}°) for sit-ups. Please try calibration again.",
            down, up
        )
    }
}

/// Polarity check on a captured pair. Equal angles never pass.
pub fn check_captured_angles(up: f32, down: f32, up_is_larger: bool) -> Result<ThresholdSet, CalibrationError> {
    let ordered = if up_is_larger { up > down } else { down > up };
    if ordered {
        Ok(ThresholdSet::new(up, down))
    } else {
        Err(CalibrationError::SanityCheck {
            up,
            down,
            up_is_larger,
        })
    }
}

// ==============================================================================
// State Machine
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CalibrationPhase {
    Idle,
    CountdownUp { remaining: u32 },
    SettleUp,
    PauseBeforeDown,
    CountdownDown { remaining: u32 },
    SettleDown,
    /// Thresholds are out; "Calibration Complete!" is on screen
    Committing,
    Failed,
    /// Not calibrating; "Calibration Cancelled" is on screen
    Cancelled,
}

impl CalibrationPhase {
    pub fn is_calibrating(&self) -> bool {
        matches!(
            self,
            CalibrationPhase::CountdownUp { .. }
                | CalibrationPhase::SettleUp
                | CalibrationPhase::PauseBeforeDown
                | CalibrationPhase::CountdownDown { .. }
                | CalibrationPhase::SettleDown
                | CalibrationPhase::Committing
        )
    }
}

/// Terminal result of one calibration attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    Completed {
        exercise: ExerciseKind,
        thresholds: ThresholdSet,
    },
    Failed {
        exercise: ExerciseKind,
        error: CalibrationError,
    },
}

#[derive(Debug, Clone, Copy)]
struct CalibrationSession {
    exercise: ExerciseKind,
    captured_up_angle: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    settings: CalibrationSettings,
    visibility_threshold: f32,
    phase: CalibrationPhase,
    session: Option<CalibrationSession>,
    message: Option<String>,
    deadline: Option<Instant>,
}

impl CalibrationEngine {
    pub fn new(settings: CalibrationSettings, visibility_threshold: f32) -> Self {
        Self {
            settings,
            visibility_threshold,
            phase: CalibrationPhase::Idle,
            session: None,
            message: None,
            deadline: None,
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_calibrating(&self) -> bool {
        self.phase.is_calibrating()
    }

    /// Text for the calibration overlay, `None` when nothing is shown
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// When the engine next needs a `poll`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.session.map(|s| s.exercise)
    }

    /// Begin the up-capture countdown
    pub fn start(&mut self, exercise: Option<ExerciseKind>, now: Instant) -> Result<ExerciseKind, CalibrationError> {
        if self.is_calibrating() {
            return Err(CalibrationError::AlreadyCalibrating);
        }
        let exercise = exercise.ok_or(CalibrationError::NoExerciseSelected)?;

        info!(exercise = %exercise, "calibration started");
        self.session = Some(CalibrationSession {
            exercise,
            captured_up_angle: None,
        });
        self.enter_countdown(CapturePose::Up, now);
        Ok(exercise)
    }

    /// Abort the running attempt. Returns the exercise if anything was running.
    pub fn cancel(&mut self, now: Instant) -> Option<ExerciseKind> {
        if !self.is_calibrating() {
            return None;
        }

        let exercise = self.session.take().map(|s| s.exercise);
        info!(exercise = ?exercise, phase = ?self.phase, "calibration cancelled");
        self.phase = CalibrationPhase::Cancelled;
        self.message = Some(CANCELLED_MESSAGE.to_string());
        self.deadline = Some(now + self.settings.cancel_display());
        exercise
    }

    /// Drop everything without any message, e.g. on session teardown
    pub fn abort(&mut self) {
        if self.is_calibrating() {
            debug!(phase = ?self.phase, "calibration aborted");
        }
        self.reset_to(CalibrationPhase::Idle);
    }

    /// Run every step whose deadline is at or before `now`.
    ///
    /// `frame` is the latest frame from the detector; it is sampled only by the
    /// settle steps.
    pub fn poll(&mut self, now: Instant, frame: &KeypointFrame) -> Option<CalibrationOutcome> {
        let mut outcome = None;
        while let Some(deadline) = self.deadline {
            if now < deadline {
                break;
            }
            if let Some(result) = self.advance(deadline, frame) {
                outcome = Some(result);
            }
        }
        outcome
    }

    fn advance(&mut self, at: Instant, frame: &KeypointFrame) -> Option<CalibrationOutcome> {
        match self.phase {
            CalibrationPhase::CountdownUp { remaining } => {
                self.tick_countdown(CapturePose::Up, remaining, at);
                None
            }
            CalibrationPhase::CountdownDown { remaining } => {
                self.tick_countdown(CapturePose::Down, remaining, at);
                None
            }
            CalibrationPhase::SettleUp => {
                let Some(session) = self.session else {
                    self.reset_to(CalibrationPhase::Idle);
                    return None;
                };
                let Some(up_angle) = self.capture(session.exercise, frame) else {
                    let error = CalibrationError::CaptureFailed { phase: CapturePose::Up };
                    return Some(self.fail(session.exercise, error));
                };
                info!(exercise = %session.exercise, angle = up_angle, "captured UP angle");
                self.session = Some(CalibrationSession {
                    captured_up_angle: Some(up_angle),
                    ..session
                });
                self.phase = CalibrationPhase::PauseBeforeDown;
                self.deadline = Some(at + self.settings.pause_between_phases());
                None
            }
            CalibrationPhase::PauseBeforeDown => {
                self.enter_countdown(CapturePose::Down, at);
                None
            }
            CalibrationPhase::SettleDown => {
                let Some(session) = self.session else {
                    self.reset_to(CalibrationPhase::Idle);
                    return None;
                };
                Some(self.finish_capture(session, at, frame))
            }
            CalibrationPhase::Committing => {
                debug!("calibration display finished");
                self.reset_to(CalibrationPhase::Idle);
                None
            }
            CalibrationPhase::Cancelled => {
                self.reset_to(CalibrationPhase::Idle);
                None
            }
            CalibrationPhase::Idle | CalibrationPhase::Failed => {
                self.deadline = None;
                None
            }
        }
    }

    fn finish_capture(
        &mut self,
        session: CalibrationSession,
        at: Instant,
        frame: &KeypointFrame,
    ) -> CalibrationOutcome {
        let exercise = session.exercise;
        let Some(down_angle) = self.capture(exercise, frame) else {
            let error = CalibrationError::CaptureFailed { phase: CapturePose::Down };
            return self.fail(exercise, error);
        };
        info!(exercise = %exercise, angle = down_angle, "captured DOWN angle");

        let Some(up_angle) = session.captured_up_angle else {
            let error = CalibrationError::CaptureFailed { phase: CapturePose::Up };
            return self.fail(exercise, error);
        };

        let up_is_larger = recipe(exercise).up_is_larger;
        match check_captured_angles(up_angle, down_angle, up_is_larger) {
            Ok(thresholds) => {
                info!(
                    exercise = %exercise,
                    up = thresholds.up_angle,
                    down = thresholds.down_angle,
                    "calibration complete"
                );
                self.phase = CalibrationPhase::Committing;
                self.message = Some(COMPLETE_MESSAGE.to_string());
                self.deadline = Some(at + self.settings.complete_display());
                CalibrationOutcome::Completed { exercise, thresholds }
            }
            Err(error) => self.fail(exercise, error),
        }
    }

    fn enter_countdown(&mut self, pose: CapturePose, at: Instant) {
        let remaining = self.settings.countdown_seconds;
        self.phase = match pose {
            CapturePose::Up => CalibrationPhase::CountdownUp { remaining },
            CapturePose::Down => CalibrationPhase::CountdownDown { remaining },
        };
        self.message = Some(countdown_message(pose, remaining));
        self.deadline = Some(at + self.settings.tick_interval());
    }

    fn tick_countdown(&mut self, pose: CapturePose, remaining: u32, at: Instant) {
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = match pose {
                CapturePose::Up => CalibrationPhase::CountdownUp { remaining },
                CapturePose::Down => CalibrationPhase::CountdownDown { remaining },
            };
            self.message = Some(countdown_message(pose, remaining));
            self.deadline = Some(at + self.settings.tick_interval());
        } else {
            debug!(pose = pose.label(), "countdown finished, settling");
            self.phase = match pose {
                CapturePose::Up => CalibrationPhase::SettleUp,
                CapturePose::Down => CalibrationPhase::SettleDown,
            };
            self.message = Some(format!("Capturing {} pose... HOLD!", pose.label()));
            self.deadline = Some(at + self.settings.settle_delay());
        }
    }

    /// Primary angle of the exercise, if every key joint is visible
    fn capture(&self, exercise: ExerciseKind, frame: &KeypointFrame) -> Option<f32> {
        let recipe = recipe(exercise);

        if !frame.all_visible(recipe.key_joints, self.visibility_threshold) {
            return None;
        }

        let angle = frame_angle(frame, recipe.primary_angle_joints);
        (angle > 0.0).then_some(angle)
    }

    fn fail(&mut self, exercise: ExerciseKind, error: CalibrationError) -> CalibrationOutcome {
        warn!(exercise = %exercise, error = %error, "calibration failed");
        self.reset_to(CalibrationPhase::Failed);
        CalibrationOutcome::Failed { exercise, error }
    }

    fn reset_to(&mut self, phase: CalibrationPhase) {
        self.phase = phase;
        self.session = None;
        self.message = None;
        self.deadline = None;
    }
}

fn countdown_message(pose: CapturePose, remaining: u32) -> String {
    format!("Get ready for {} pose... {}", pose.label(), remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synthetic::{pose_frame, pose_frame_with};
    use std::time::Duration;

    fn new_engine() -> CalibrationEngine {
        CalibrationEngine::new(CalibrationSettings::default(), 0.5)
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    /// Poll every deadline up to `until`, feeding the frame chosen by `frame_at`
    fn run_until<F>(engine: &mut CalibrationEngine, until: Instant, frame_at: F) -> Vec<CalibrationOutcome>
    where
        F: Fn(Instant) -> KeypointFrame,
    {
        let mut outcomes = Vec::new();
        while let Some(deadline) = engine.next_deadline() {
            if deadline > until {
                break;
            }
            outcomes.extend(engine.poll(deadline, &frame_at(deadline)));
        }
        outcomes
    }

    #[test]
    fn test_successful_push_up_calibration() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let mut engine = new_engine();

        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();
        assert!(engine.is_calibrating());
        assert_eq!(engine.message(), Some("Get ready for UP pose... 3"));

        let down_from = at(t0, 4000);
        let outcomes = run_until(&mut engine, at(t0, 7500), |now| {
            if now < down_from {
                pose_frame(push_up, 160.0)
            } else {
                pose_frame(push_up, 100.0)
            }
        });

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            CalibrationOutcome::Completed { exercise, thresholds } => {
                assert_eq!(*exercise, ExerciseKind::PushUp);
                assert!((thresholds.up_angle - 160.0).abs() < 0.05);
                assert!((thresholds.down_angle - 100.0).abs() < 0.05);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert_eq!(engine.phase(), CalibrationPhase::Committing);
        assert_eq!(engine.message(), Some(COMPLETE_MESSAGE));
        assert!(engine.is_calibrating());
        assert_eq!(engine.next_deadline(), Some(at(t0, 9500)));

        engine.poll(at(t0, 9500), &KeypointFrame::new());
        assert_eq!(engine.phase(), CalibrationPhase::Idle);
        assert!(!engine.is_calibrating());
        assert_eq!(engine.message(), None);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_countdown_messages_follow_schedule() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let frame = pose_frame(push_up, 165.0);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();

        let expected = [
            (999, "Get ready for UP pose... 3"),
            (1000, "Get ready for UP pose... 2"),
            (2000, "Get ready for UP pose... 1"),
            (3000, "Capturing UP pose... HOLD!"),
            (3500, "Capturing UP pose... HOLD!"),
            (4000, "Get ready for DOWN pose... 3"),
            (5000, "Get ready for DOWN pose... 2"),
            (6000, "Get ready for DOWN pose... 1"),
            (7000, "Capturing DOWN pose... HOLD!"),
        ];
        for (ms, message) in expected {
            assert_eq!(engine.poll(at(t0, ms), &frame), None);
            assert_eq!(engine.message(), Some(message), "at {}ms", ms);
        }
        assert_eq!(engine.phase(), CalibrationPhase::SettleDown);
    }

    #[test]
    fn test_inverted_angles_fail_sanity_check() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();

        let outcomes = run_until(&mut engine, at(t0, 10_000), |now| {
            if now < at(t0, 4000) {
                pose_frame(push_up, 90.0)
            } else {
                pose_frame(push_up, 120.0)
            }
        });

        assert_eq!(outcomes.len(), 1);
        let CalibrationOutcome::Failed { exercise, error } = &outcomes[0] else {
            panic!("expected failure, got {:?}", outcomes[0]);
        };
        assert_eq!(*exercise, ExerciseKind::PushUp);
        assert!(matches!(error, CalibrationError::SanityCheck { up_is_larger: true, .. }));
        assert_eq!(error.title(), "Calibration Issue");
        assert_eq!(
            error.to_string(),
            "Up pose angle (90°) must be greater than Down pose angle (120°). Please try calibration again."
        );

        assert_eq!(engine.phase(), CalibrationPhase::Failed);
        assert!(!engine.is_calibrating());
        assert_eq!(engine.message(), None);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_invisible_up_pose_fails_capture() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();

        let outcomes = run_until(&mut engine, at(t0, 10_000), |_| pose_frame_with(push_up, 160.0, None, 0.2));

        assert_eq!(
            outcomes,
            vec![CalibrationOutcome::Failed {
                exercise: ExerciseKind::PushUp,
                error: CalibrationError::CaptureFailed { phase: CapturePose::Up },
            }]
        );
        let CalibrationOutcome::Failed { error, .. } = &outcomes[0] else {
            unreachable!()
        };
        assert_eq!(error.title(), "Calibration Failed");
        assert_eq!(
            error.to_string(),
            "Could not detect pose clearly for UP position. Please try again."
        );
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_lost_body_during_down_capture_fails() {
        let t0 = Instant::now();
        let squat = recipe(ExerciseKind::Squat);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::Squat), t0).unwrap();

        let outcomes = run_until(&mut engine, at(t0, 10_000), |now| {
            if now < at(t0, 4000) {
                pose_frame(squat, 170.0)
            } else {
                KeypointFrame::new()
            }
        });

        assert_eq!(
            outcomes,
            vec![CalibrationOutcome::Failed {
                exercise: ExerciseKind::Squat,
                error: CalibrationError::CaptureFailed { phase: CapturePose::Down },
            }]
        );
        assert!(!engine.is_calibrating());
    }

    #[test]
    fn test_squat_capture_needs_both_legs_visible() {
        let t0 = Instant::now();
        let squat = recipe(ExerciseKind::Squat);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::Squat), t0).unwrap();

        // Right leg fine, left leg occluded
        let mut frame = KeypointFrame::new();
        crate::core::synthetic::place_angle(&mut frame, squat.primary_angle_joints, 170.0, 0.9);

        let outcomes = run_until(&mut engine, at(t0, 4000), |_| frame.clone());
        assert!(matches!(
            outcomes.as_slice(),
            [CalibrationOutcome::Failed {
                error: CalibrationError::CaptureFailed { phase: CapturePose::Up },
                ..
            }]
        ));
    }

    #[test]
    fn test_sit_up_polarity() {
        let t0 = Instant::now();
        let sit_up = recipe(ExerciseKind::SitUp);

        // Raised torso (small angle) first, then lying flat
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::SitUp), t0).unwrap();
        let outcomes = run_until(&mut engine, at(t0, 7500), |now| {
            if now < at(t0, 4000) {
                pose_frame(sit_up, 70.0)
            } else {
                pose_frame(sit_up, 165.0)
            }
        });
        assert!(matches!(outcomes.as_slice(), [CalibrationOutcome::Completed { .. }]));

        // Same angles in the wrong order
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::SitUp), t0).unwrap();
        let outcomes = run_until(&mut engine, at(t0, 7500), |now| {
            if now < at(t0, 4000) {
                pose_frame(sit_up, 165.0)
            } else {
                pose_frame(sit_up, 70.0)
            }
        });
        let [CalibrationOutcome::Failed { error, .. }] = outcomes.as_slice() else {
            panic!("expected failure, got {:?}", outcomes);
        };
        assert_eq!(
            error.to_string(),
            "Down pose angle (70°) must be greater than Up pose angle (165°) for sit-ups. Please try calibration again."
        );
    }

    #[test]
    fn test_check_captured_angles() {
        assert_eq!(
            check_captured_angles(160.0, 100.0, true),
            Ok(ThresholdSet::new(160.0, 100.0))
        );
        assert!(check_captured_angles(90.0, 120.0, true).is_err());
        assert!(check_captured_angles(120.0, 120.0, true).is_err());
        assert!(check_captured_angles(80.0, 160.0, false).is_ok());
        assert!(check_captured_angles(120.0, 120.0, false).is_err());
    }

    #[test]
    fn test_start_rejections() {
        let t0 = Instant::now();
        let mut engine = new_engine();

        assert_eq!(engine.start(None, t0), Err(CalibrationError::NoExerciseSelected));
        assert!(!engine.is_calibrating());

        engine.start(Some(ExerciseKind::Squat), t0).unwrap();
        let deadline = engine.next_deadline();
        assert_eq!(
            engine.start(Some(ExerciseKind::PushUp), at(t0, 500)),
            Err(CalibrationError::AlreadyCalibrating)
        );
        assert_eq!(engine.exercise(), Some(ExerciseKind::Squat));
        assert_eq!(engine.next_deadline(), deadline);
    }

    #[test]
    fn test_cancel_discards_partial_capture() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let frame = pose_frame(push_up, 160.0);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();

        // Up angle captured, now in the down countdown
        engine.poll(at(t0, 5000), &frame);
        assert!(matches!(engine.phase(), CalibrationPhase::CountdownDown { .. }));

        assert_eq!(engine.cancel(at(t0, 5200)), Some(ExerciseKind::PushUp));
        assert!(!engine.is_calibrating());
        assert_eq!(engine.message(), Some(CANCELLED_MESSAGE));
        assert_eq!(engine.next_deadline(), Some(at(t0, 6700)));

        // Idempotent
        assert_eq!(engine.cancel(at(t0, 5300)), None);
        assert_eq!(engine.next_deadline(), Some(at(t0, 6700)));

        // Nothing fires from the old schedule
        assert_eq!(engine.poll(at(t0, 20_000), &frame), None);
        assert_eq!(engine.phase(), CalibrationPhase::Idle);
        assert_eq!(engine.message(), None);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_restart_after_cancel() {
        let t0 = Instant::now();
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();
        engine.cancel(at(t0, 100));

        engine.start(Some(ExerciseKind::SitUp), at(t0, 200)).unwrap();
        assert!(engine.is_calibrating());
        assert_eq!(engine.exercise(), Some(ExerciseKind::SitUp));
        assert_eq!(engine.message(), Some("Get ready for UP pose... 3"));
        assert_eq!(engine.next_deadline(), Some(at(t0, 1200)));
    }

    #[test]
    fn test_abort_clears_everything() {
        let t0 = Instant::now();
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::Squat), t0).unwrap();
        engine.abort();
        assert_eq!(engine.phase(), CalibrationPhase::Idle);
        assert_eq!(engine.message(), None);
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.exercise(), None);
    }

    #[test]
    fn test_late_poll_catches_up() {
        let t0 = Instant::now();
        let push_up = recipe(ExerciseKind::PushUp);
        let mut engine = new_engine();
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();

        // One very late poll runs the whole up phase with this frame
        engine.poll(at(t0, 3600), &pose_frame(push_up, 170.0));
        assert_eq!(engine.phase(), CalibrationPhase::PauseBeforeDown);
        assert_eq!(engine.next_deadline(), Some(at(t0, 4000)));
    }

    #[test]
    fn test_shorter_countdown_setting() {
        let t0 = Instant::now();
        let settings = CalibrationSettings {
            countdown_seconds: 1,
            ..CalibrationSettings::default()
        };
        let mut engine = CalibrationEngine::new(settings, 0.5);
        engine.start(Some(ExerciseKind::PushUp), t0).unwrap();
        assert_eq!(engine.message(), Some("Get ready for UP pose... 1"));

        engine.poll(at(t0, 1000), &KeypointFrame::new());
        assert_eq!(engine.phase(), CalibrationPhase::SettleUp);
    }
}
