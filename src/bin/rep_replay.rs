//! Replays recorded pose detector events through a tracker session.
//!
//! Input is newline-delimited JSON, one native detector event per line:
//! ```text
//! {"event":"onPoseLandmarksDetected","body":{"landmarks":[[{"keypoint":0,"x":0.5,...}]]}}
//! ```
//!
//! Usage:
//! ```bash
//! # Count squats in a recording
//! rep-replay session.jsonl --exercise squat
//!
//! # Run a preset plan from stdin, paced at 30 fps so calibration timers behave
//! cat session.jsonl | rep-replay --mode preset --plan preset-legs-1 --fps 30
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use rep_tracker::platform::pose::{pump, JsonLinesSource, PumpStats};
use rep_tracker::{
    find_preset, ExerciseKind, SessionCommand, SessionEvent, SessionSnapshot, TrackerConfig, TrackerService,
    WorkoutMode, WorkoutPlan,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "rep-replay",
    about = "Replay recorded pose detector events and count reps",
    long_about = "Feed newline-delimited detector events from a file or stdin into a workout session and print rep and calibration updates"
)]
struct ReplayArgs {
    /// Recording to replay; stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Workout mode: freestyle, preset or custom
    #[arg(long, default_value = "freestyle")]
    mode: String,

    /// Exercise to select in freestyle mode (push-up, squat, sit-up)
    #[arg(long, short = 'e')]
    exercise: Option<String>,

    /// Preset plan id for preset mode
    #[arg(long)]
    plan: Option<String>,

    /// JSON workout plan for custom mode
    #[arg(long)]
    plan_file: Option<PathBuf>,

    /// Tracker configuration file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start calibration before the first frame
    #[arg(long)]
    calibrate: bool,

    /// Pace frames at this rate instead of replaying as fast as possible
    #[arg(long)]
    fps: Option<f32>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ReplayArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => TrackerConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    let mode = WorkoutMode::from_string(&args.mode).map_err(anyhow::Error::msg)?;
    let plan = load_plan(&args, mode)?;
    let frame_interval = pacing_interval(args.fps)?;

    let (handle, mut events) = TrackerService::spawn(config, mode, plan);

    if let Some(name) = &args.exercise {
        let exercise = ExerciseKind::from_string(name)?;
        handle
            .send_command(SessionCommand::SelectExercise { exercise })
            .await?;
    }
    if args.calibrate {
        handle.send_command(SessionCommand::StartCalibration).await?;
    }

    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event, json);
        }
    });

    let stats = match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => replay_file(path, &handle, frame_interval).await?,
        _ => {
            let mut source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()), "stdin");
            pump(&mut source, &handle, frame_interval).await?
        }
    };

    let snapshot = handle.shutdown().await?;
    printer.await?;

    print_summary(&snapshot, &stats);
    Ok(())
}

async fn replay_file(
    path: &Path,
    handle: &rep_tracker::TrackerHandle,
    frame_interval: Option<Duration>,
) -> Result<PumpStats> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut source = JsonLinesSource::new(BufReader::new(file), path.display().to_string());
    Ok(pump(&mut source, handle, frame_interval).await?)
}

/// Pacing between frames for `--fps`
fn pacing_interval(fps: Option<f32>) -> Result<Option<Duration>> {
    let Some(fps) = fps else {
        return Ok(None);
    };
    if fps <= 0.0 || !fps.is_finite() {
        bail!("--fps must be a positive number");
    }
    match Duration::try_from_secs_f32(1.0 / fps) {
        Ok(interval) => Ok(Some(interval)),
        Err(_) => bail!("--fps {} is too small to pace frames", fps),
    }
}

fn load_plan(args: &ReplayArgs, mode: WorkoutMode) -> Result<Option<WorkoutPlan>> {
    match mode {
        WorkoutMode::Freestyle => {
            if args.plan.is_some() || args.plan_file.is_some() {
                bail!("Plans are only used in preset or custom mode");
            }
            Ok(None)
        }
        WorkoutMode::Preset => {
            let Some(id) = &args.plan else {
                bail!("--plan is required in preset mode");
            };
            Ok(Some(find_preset(id)?))
        }
        WorkoutMode::Custom => {
            let Some(path) = &args.plan_file else {
                bail!("--plan-file is required in custom mode");
            };
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read plan {}", path.display()))?;
            let plan: WorkoutPlan = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid workout plan in {}", path.display()))?;
            info!(plan = %plan.id, steps = plan.steps.len(), "loaded custom plan");
            Ok(Some(plan))
        }
    }
}

fn print_event(event: &SessionEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Failed to encode event: {}", e),
        }
        return;
    }

    match event {
        SessionEvent::StateChanged { from, to, primary_angle, .. } => {
            println!("  state {} -> {} ({:.0}°)", from.to_string(), to.to_string(), primary_angle)
        }
        SessionEvent::RepCompleted { exercise, rep_count } => println!("Rep {} ({})", rep_count, exercise),
        SessionEvent::TargetMet {
            exercise,
            rep_count,
            target_reps,
        } => println!("Target met: {} {}/{}", exercise, rep_count, target_reps),
        SessionEvent::ExerciseChanged { exercise } => match exercise {
            Some(exercise) => println!("Exercise: {}", exercise),
            None => println!("Exercise: none"),
        },
        SessionEvent::StepAdvanced { step_index, exercise } => {
            println!("Step {}: {}", step_index + 1, exercise)
        }
        SessionEvent::WorkoutComplete { plan_id } => println!("Workout complete! ({})", plan_id),
        SessionEvent::CalibrationStarted { exercise } => println!("Calibrating {}...", exercise),
        SessionEvent::CalibrationCompleted { exercise, thresholds } => println!(
            "Calibrated {}: up {:.1}°, down {:.1}°",
            exercise, thresholds.up_angle, thresholds.down_angle
        ),
        SessionEvent::CalibrationFailed { title, message, .. } => println!("{}: {}", title, message),
        SessionEvent::CalibrationCancelled { exercise } => println!("Calibration cancelled ({})", exercise),
        SessionEvent::CommandRejected { reason } => eprintln!("Rejected: {}", reason),
    }
}

fn print_summary(snapshot: &SessionSnapshot, stats: &PumpStats) {
    println!();
    println!("Session {}", snapshot.session_id);
    println!("  mode:      {}", snapshot.mode.to_string());
    match snapshot.exercise {
        Some(exercise) => println!("  exercise:  {}", exercise),
        None => println!("  exercise:  none"),
    }
    if let (Some(step), Some(target)) = (snapshot.step_index, snapshot.target_reps) {
        println!("  step:      {} (target {})", step + 1, target);
    }
    println!("  reps:      {}", snapshot.rep_count);
    println!(
        "  frames:    {} ({} malformed, {} detector errors)",
        stats.frames, stats.malformed, stats.detector_errors
    );
}
