// Pose detector bridge
// Decodes the events emitted by the native pose-landmarker plugin and feeds them into a
// running tracker session

use crate::core::tracker_service::TrackerHandle;
use crate::models::pose::{BodyLandmark, Keypoint, KeypointFrame, PoseError, PoseResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

// ==============================================================================
// Event Payloads
// ==============================================================================

/// Landmarks of one detected person. The plugin sends a list; older builds sent a
/// map keyed by landmark index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonLandmarks {
    List(Vec<Keypoint>),
    Map(HashMap<String, Keypoint>),
}

impl PersonLandmarks {
    fn into_keypoints(self) -> Vec<Keypoint> {
        match self {
            PersonLandmarks::List(keypoints) => keypoints,
            PersonLandmarks::Map(keypoints) => keypoints.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarksPayload {
    /// One entry per detected person
    #[serde(default)]
    pub landmarks: Vec<PersonLandmarks>,
}

/// One event as emitted by the native module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "body")]
pub enum DetectorEvent {
    #[serde(rename = "onPoseLandmarksDetected")]
    LandmarksDetected(LandmarksPayload),

    #[serde(rename = "onPoseLandmarksStatus")]
    Status { status: String },

    #[serde(rename = "onPoseLandmarksError")]
    Error { error: String },
}

impl DetectorEvent {
    /// Frame for a detection event. Only the first person is tracked; no person
    /// gives an empty frame. Other events carry no frame.
    pub fn into_frame(self) -> Option<KeypointFrame> {
        let DetectorEvent::LandmarksDetected(payload) = self else {
            return None;
        };

        let Some(person) = payload.landmarks.into_iter().next() else {
            return Some(KeypointFrame::new());
        };

        let keypoints = person.into_keypoints().into_iter().filter(|kp| {
            match BodyLandmark::try_from(kp.id) {
                Ok(_) => true,
                Err(e) => {
                    debug!(error = %e, "dropping keypoint");
                    false
                }
            }
        });
        Some(KeypointFrame::from_keypoints(keypoints))
    }
}

/// Parse one JSON-encoded detector event
pub fn decode_event(json: &str) -> PoseResult<DetectorEvent> {
    serde_json::from_str(json).map_err(|e| PoseError::MalformedEvent(e.to_string()))
}

// ==============================================================================
// Event Sources
// ==============================================================================

/// Anything that yields detector events: a live plugin, a recording, a script
#[async_trait]
pub trait PoseEventSource: Send {
    /// Next event, or `Ok(None)` once the source is exhausted.
    /// A `MalformedEvent` error skips one event; other errors end the stream.
    async fn next_event(&mut self) -> PoseResult<Option<DetectorEvent>>;

    fn describe(&self) -> String;
}

/// Newline-delimited JSON events, e.g. a recorded session
pub struct JsonLinesSource<R> {
    reader: R,
    name: String,
    line_number: usize,
    buffer: Vec<u8>,
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            line_number: 0,
            buffer: Vec::new(),
        }
    }
}

#[async_trait]
impl<R> PoseEventSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_event(&mut self) -> PoseResult<Option<DetectorEvent>> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_until(b'\n', &mut self.buffer).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(line) => line.trim(),
                Err(e) => {
                    return Err(PoseError::MalformedEvent(format!(
                        "{} line {}: {}",
                        self.name, self.line_number, e
                    )))
                }
            };
            if line.is_empty() {
                continue;
            }

            return decode_event(line)
                .map(Some)
                .map_err(|e| PoseError::MalformedEvent(format!("{} line {}: {}", self.name, self.line_number, e)));
        }
    }

    fn describe(&self) -> String {
        format!("JSON lines from {}", self.name)
    }
}

/// Fixed list of events, for demos and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: VecDeque<DetectorEvent>,
}

impl ScriptedSource {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = DetectorEvent>,
    {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Wrap frames as detection events
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = KeypointFrame>,
    {
        Self::new(frames.into_iter().map(frame_event))
    }
}

#[async_trait]
impl PoseEventSource for ScriptedSource {
    async fn next_event(&mut self) -> PoseResult<Option<DetectorEvent>> {
        Ok(self.events.pop_front())
    }

    fn describe(&self) -> String {
        format!("scripted source ({} events left)", self.events.len())
    }
}

/// Detection event for a single person
pub fn frame_event(frame: KeypointFrame) -> DetectorEvent {
    let mut keypoints: Vec<Keypoint> = BodyLandmark::ALL
        .iter()
        .filter_map(|landmark| frame.get(*landmark).copied())
        .collect();
    keypoints.sort_by_key(|kp| kp.id);

    let landmarks = if keypoints.is_empty() {
        Vec::new()
    } else {
        vec![PersonLandmarks::List(keypoints)]
    };
    DetectorEvent::LandmarksDetected(LandmarksPayload { landmarks })
}

// ==============================================================================
// Pump
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpStats {
    pub frames: u64,
    pub status_events: u64,
    pub detector_errors: u64,
    pub malformed: u64,
}

/// Forward every frame from `source` into the session until the source ends.
///
/// With `frame_interval` set, frames are paced at that interval so timer-driven
/// steps (calibration) see a realistic timeline.
pub async fn pump<S>(source: &mut S, handle: &TrackerHandle, frame_interval: Option<Duration>) -> PoseResult<PumpStats>
where
    S: PoseEventSource + ?Sized,
{
    info!(source = %source.describe(), "pumping detector events");
    let mut stats = PumpStats::default();

    loop {
        let event = match source.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(PoseError::MalformedEvent(reason)) => {
                warn!(reason = %reason, "skipping malformed detector event");
                stats.malformed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match event {
            DetectorEvent::Status { status } => {
                info!(status = %status, "detector status");
                stats.status_events += 1;
            }
            DetectorEvent::Error { error } => {
                warn!(error = %error, "detector error");
                stats.detector_errors += 1;
            }
            detected @ DetectorEvent::LandmarksDetected(_) => {
                if let Some(frame) = detected.into_frame() {
                    handle.submit_frame(frame).await?;
                    stats.frames += 1;
                    if let Some(interval) = frame_interval {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }
    }

    debug!(?stats, "detector source exhausted");
    Ok(stats)
}
