extern crate crossbeam;
extern crate euclid;
#[macro_use]
extern crate log;
extern crate rust_hmdbridge_api;
#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

macro_rules! identity_matrix {
    () => ([[1.0, 0.0, 0.0, 0.0],  [0.0, 1.0, 0.0, 0.0],  [0.0, 0.0, 1.0, 0.0],  [0.0, 0.0, 0.0, 1.0]]);
}

pub mod api;
pub mod bridge;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod frame_sync;
pub mod gaze;
pub mod pose_cache;
pub mod projection;
pub mod stereo;
#[cfg(test)]
mod test_log;

pub use rust_hmdbridge_api::*;

pub use bridge::{HmdBridge, TrackingOrigin};
pub use config::{ClientCapabilities, HmdConfig, TrackingMode};
pub use coordinate::{HostPoint2D, HostPose, HostRotation, HostSpace, HostVector};
pub use error::HmdError;
pub use frame_sync::{FrameState, FrameSyncBridge};
pub use gaze::{Convergence, GazeGeometry, GazeRay, ReferenceFrame, GAZE_SCREEN_FAR, GAZE_SCREEN_NEAR};
pub use pose_cache::{PoseCache, TrackedPose};
pub use projection::{ProjectionBuilder, ProjectionMatrix};
pub use stereo::{EyeRenderParams, MonitorInfo, StereoStateMachine, StereoViewport};
