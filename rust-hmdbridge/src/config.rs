use std::time::Duration;

// Compositor cadence is at most one frame behind at 60Hz and above
const DEFAULT_POSE_WAIT_TIMEOUT: Duration = Duration::from_millis(16);

/// Which parts of the head pose drive the rendered cameras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum TrackingMode {
    /// Cameras move and rotate with the user's head.
    PositionAndOrientation,
    /// Cameras only rotate with the user's head; the position tracking camera is not used.
    OrientationOnly,
    /// Rendered content is fixed to the HMD screen and does not follow the head.
    FixedToHmdScreen,
}

impl Default for TrackingMode {
    fn default() -> TrackingMode {
        TrackingMode::PositionAndOrientation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct ClientCapabilities {
    pub gaze: bool,
    pub orientation: bool,
    pub position: bool,
}

impl TrackingMode {
    /// Device capabilities the headset should be initialised with for this mode.
    pub fn capabilities(&self) -> ClientCapabilities {
        ClientCapabilities {
            gaze: true,
            orientation: *self != TrackingMode::FixedToHmdScreen,
            position: *self == TrackingMode::PositionAndOrientation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct HmdConfig {
    /// Number of world units in one meter.
    pub world_to_meters_scale: f32,

    /// Distance to the near clip plane, in world units.
    pub near_clip: f32,

    /// Distance to the far clip plane, in world units. Equal to `near_clip` means no far clip.
    pub far_clip: f32,

    pub tracking_mode: TrackingMode,

    /// Longest time the render thread blocks waiting for the compositor.
    pub pose_wait_timeout: Duration,

    /// Interpupillary distance used when the device cannot report one, in meters.
    pub default_ipd: f32,
}

impl Default for HmdConfig {
    fn default() -> HmdConfig {
        HmdConfig {
            world_to_meters_scale: 1.0,
            near_clip: 10.0,
            far_clip: 10.0,
            tracking_mode: TrackingMode::default(),
            pose_wait_timeout: DEFAULT_POSE_WAIT_TIMEOUT,
            default_ipd: 0.064,
        }
    }
}

impl HmdConfig {
    pub fn with_world_to_meters_scale(mut self, scale: f32) -> HmdConfig {
        self.world_to_meters_scale = scale;
        self
    }

    pub fn with_clipping_planes(mut self, near: f32, far: f32) -> HmdConfig {
        self.near_clip = near;
        self.far_clip = far;
        self
    }

    pub fn with_tracking_mode(mut self, mode: TrackingMode) -> HmdConfig {
        self.tracking_mode = mode;
        self
    }

    pub fn with_pose_wait_timeout(mut self, timeout: Duration) -> HmdConfig {
        self.pose_wait_timeout = timeout;
        self
    }
}
