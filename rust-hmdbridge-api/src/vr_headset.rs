use crate::{VREyes, VRGazeConvergence, VRGazeVector, VRPose, VRProjectionFrustum, VRResult};
use std::sync::Arc;

pub type VRHeadsetPtr = Arc<dyn VRHeadset>;

/// The VRHeadset trait exposes the tracking and eye tracking capabilities of the device.
/// All data is returned in the device convention. Calls may come from any thread.
pub trait VRHeadset: Send + Sync {
    /// Whether the headset is plugged in.
    fn is_hardware_connected(&self) -> VRResult<bool>;

    /// Whether all the tracking hardware has been started.
    fn is_hardware_ready(&self) -> VRResult<bool>;

    /// Returns the most recent head pose.
    fn hmd_pose(&self) -> VRResult<VRPose>;

    /// Returns the gaze directions of the left and right eyes, relative to the headset.
    fn gaze_vectors(&self) -> VRResult<(VRGazeVector, VRGazeVector)>;

    /// Returns the estimated point where both eye rays meet.
    fn gaze_convergence(&self) -> VRResult<VRGazeConvergence>;

    /// Returns the left and right eye frustums for the given clip distances.
    fn projection_frustums(&self, near: f32, far: f32) -> VRResult<(VRProjectionFrustum, VRProjectionFrustum)>;

    /// Whether position tracking has been started.
    fn is_position_ready(&self) -> VRResult<bool>;

    /// Makes the current orientation the forward orientation.
    fn tare_orientation(&self) -> VRResult<()>;

    /// Makes the current position the tracking origin.
    fn tare_position(&self) -> VRResult<()>;

    /// Distance between the centers of the eyes, in meters.
    fn interpupillary_distance(&self) -> VRResult<f32>;

    fn check_eyes_tracked(&self) -> VRResult<VREyes>;

    fn check_eyes_closed(&self) -> VRResult<VREyes>;

    /// Starts eye tracking calibration if the current user has none.
    fn ensure_eye_calibration(&self) -> VRResult<()>;

    fn is_eye_tracking_calibrating(&self) -> VRResult<bool>;

    /// Tells the eye tracker the user is looking at the given point (device convention, meters).
    fn manual_drift_correction(&self, location: [f32; 3]) -> VRResult<()>;
}
