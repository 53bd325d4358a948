use crate::{VREyes, VRErrorCode, VRGazeConvergence, VRGazeVector, VRPose, VRProjectionFrustum};
use std::time::Duration;

/// Device calls a mock backend can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockVRQuery {
    HardwareConnected,
    HardwareReady,
    Pose,
    GazeVectors,
    GazeConvergence,
    Projection,
    PositionReady,
    Tare,
    InterpupillaryDistance,
    EyesTracked,
    EyesClosed,
    Calibration,
    CompositorReady,
    CreateLayer,
    Submit,
    RenderPose,
}

pub enum MockVRControlMsg {
    SetPose(VRPose),
    SetGazeVectors(VRGazeVector, VRGazeVector),
    SetGazeConvergence(VRGazeConvergence),
    SetProjectionFrustums(VRProjectionFrustum, VRProjectionFrustum),
    SetInterpupillaryDistance(f32),
    SetEyesTracked(VREyes),
    SetEyesClosed(VREyes),
    SetConnected(bool),
    SetIdealResolution(u32, u32),
    // Makes every wait for a render pose take this long
    SetFrameDelay(Duration),
    Fail(MockVRQuery, VRErrorCode),
    Recover(MockVRQuery),
}
