// Scripted squat session: calibrates on synthetic poses, then counts a few reps
//
// Run with: cargo run --example scripted_squats

use rep_tracker::core::synthetic::pose_frame;
use rep_tracker::platform::pose::{pump, ScriptedSource};
use rep_tracker::{recipe, ExerciseKind, SessionCommand, SessionEvent, TrackerConfig, TrackerService, WorkoutMode};
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("🏋️  Scripted squat session\n");

    let squat = recipe(ExerciseKind::Squat);
    let (handle, mut events) = TrackerService::spawn(TrackerConfig::default(), WorkoutMode::Freestyle, None);

    // Selecting an uncalibrated exercise starts calibration automatically
    handle
        .send_command(SessionCommand::SelectExercise {
            exercise: Some(ExerciseKind::Squat),
        })
        .await?;

    // Hold standing through the UP capture, crouch through the DOWN capture
    let mut frames = Vec::new();
    frames.extend((0..40).map(|_| pose_frame(squat, 168.0)));
    frames.extend((0..40).map(|_| pose_frame(squat, 95.0)));
    frames.extend((0..25).map(|_| pose_frame(squat, 168.0)));

    // Three reps against the calibrated thresholds
    for _ in 0..3 {
        frames.extend((0..5).map(|_| pose_frame(squat, 92.0)));
        frames.extend((0..5).map(|_| pose_frame(squat, 170.0)));
    }

    let mut source = ScriptedSource::from_frames(frames);
    let stats = pump(&mut source, &handle, Some(FRAME_INTERVAL)).await?;
    let snapshot = handle.shutdown().await?;

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::CalibrationStarted { exercise } => println!("📐 Calibrating {}", exercise),
            SessionEvent::CalibrationCompleted { thresholds, .. } => println!(
                "✅ Calibrated: up {:.1}°, down {:.1}°",
                thresholds.up_angle, thresholds.down_angle
            ),
            SessionEvent::CalibrationFailed { title, message, .. } => println!("❌ {}: {}", title, message),
            SessionEvent::RepCompleted { rep_count, .. } => println!("   Rep {}", rep_count),
            _ => {}
        }
    }

    println!("\n📊 Summary:");
    println!("   Frames: {}", stats.frames);
    println!("   Reps: {}", snapshot.rep_count);

    Ok(())
}
