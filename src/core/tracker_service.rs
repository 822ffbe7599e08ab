// Async driver for a workout session
//
// One spawned task owns the `WorkoutSession`. Frames and commands come in over channels,
// the calibration deadline is the only timer, and every update is published as a
// snapshot plus discrete events.

use crate::core::config::TrackerConfig;
use crate::core::session_manager::WorkoutSession;
use crate::models::pose::{KeypointFrame, PoseError, PoseResult};
use crate::models::session::{SessionCommand, SessionEvent, SessionSnapshot};
use crate::models::workout::{WorkoutMode, WorkoutPlan};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

const FRAME_QUEUE_CAPACITY: usize = 100;
const COMMAND_QUEUE_CAPACITY: usize = 32;

// ==============================================================================
// Handle
// ==============================================================================

/// Caller side of a running session. Dropping it ends the session.
pub struct TrackerHandle {
    frame_tx: mpsc::Sender<KeypointFrame>,
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    /// Queue a frame, waiting if the session is behind
    pub async fn submit_frame(&self, frame: KeypointFrame) -> PoseResult<()> {
        self.frame_tx
            .send(frame)
            .await
            .map_err(|_| PoseError::ChannelClosed)
    }

    /// Queue a frame without waiting. Returns `Ok(false)` if the frame was dropped
    /// because the queue is full.
    pub fn try_submit_frame(&self, frame: KeypointFrame) -> PoseResult<bool> {
        match self.frame_tx.try_send(frame) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("frame queue full, dropping frame");
                Ok(false)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PoseError::ChannelClosed),
        }
    }

    pub async fn send_command(&self, command: SessionCommand) -> PoseResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| PoseError::ChannelClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified on every snapshot update
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Resolves once the session task has stopped
    pub async fn closed(&self) {
        self.frame_tx.closed().await;
    }

    /// Stop accepting input, let queued frames drain, and wait for the task.
    /// Returns the final snapshot.
    pub async fn shutdown(self) -> PoseResult<SessionSnapshot> {
        let TrackerHandle {
            frame_tx,
            command_tx,
            snapshot_rx,
            task,
        } = self;
        drop(frame_tx);
        drop(command_tx);

        task.await.map_err(|_| PoseError::ChannelClosed)?;
        let snapshot = snapshot_rx.borrow().clone();
        Ok(snapshot)
    }
}

// ==============================================================================
// Service
// ==============================================================================

pub struct TrackerService;

impl TrackerService {
    /// Start a session for `mode` and `plan` on the current tokio runtime
    pub fn spawn(
        config: TrackerConfig,
        mode: WorkoutMode,
        plan: Option<WorkoutPlan>,
    ) -> (TrackerHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        Self::spawn_session(WorkoutSession::new(config, mode, plan))
    }

    /// Start an already configured session
    pub fn spawn_session(session: WorkoutSession) -> (TrackerHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (frame_tx, frame_rx) = mpsc::channel::<KeypointFrame>(FRAME_QUEUE_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(COMMAND_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        info!(session_id = session.session_id(), "starting tracker session");

        let task = tokio::spawn(async move {
            Self::run_session(session, frame_rx, command_rx, snapshot_tx, event_tx).await;
        });

        let handle = TrackerHandle {
            frame_tx,
            command_tx,
            snapshot_rx,
            task,
        };
        (handle, event_rx)
    }

    /// Session loop: one input at a time, until the frame channel closes or a
    /// `Shutdown` command arrives
    async fn run_session(
        mut session: WorkoutSession,
        mut frame_rx: mpsc::Receiver<KeypointFrame>,
        mut command_rx: mpsc::Receiver<SessionCommand>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) {
        let mut commands_open = true;

        loop {
            let deadline = session.next_deadline();

            let events = tokio::select! {
                biased;

                command = command_rx.recv(), if commands_open => match command {
                    Some(SessionCommand::Shutdown) => break,
                    Some(command) => session.handle_command(command, Instant::now()),
                    None => {
                        commands_open = false;
                        continue;
                    }
                },
                _ = sleep_until_deadline(deadline) => session.on_timer(Instant::now()),
                frame = frame_rx.recv() => match frame {
                    Some(frame) => session.on_frame(frame, Instant::now()),
                    None => break,
                },
            };

            for event in events {
                // Nobody listening is fine; the snapshot still goes out
                let _ = event_tx.send(event);
            }
            snapshot_tx.send_replace(session.snapshot());
        }

        session.shutdown();
        snapshot_tx.send_replace(session.snapshot());
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
