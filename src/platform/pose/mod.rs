// Pose estimation platform integration
// Decodes native detector events and pumps them into tracker sessions

pub mod detector_bridge;

pub use detector_bridge::{
    decode_event, frame_event, pump, DetectorEvent, JsonLinesSource, PoseEventSource, PumpStats, ScriptedSource,
};
