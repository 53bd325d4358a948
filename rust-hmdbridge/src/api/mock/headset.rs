use super::{lock_state, MockVRState};
use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
use rust_hmdbridge_api::{utils, VREyes, VRGazeConvergence, VRGazeVector, VRHeadset, VRPose, VRProjectionFrustum,
                         VRResult};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct MockHeadset {
    state: Arc<Mutex<MockVRState>>,
}

impl MockHeadset {
    pub fn new() -> MockHeadset {
        MockHeadset::new_with_state(Default::default())
    }

    pub(super) fn new_with_state(state: Arc<Mutex<MockVRState>>) -> MockHeadset {
        MockHeadset { state }
    }

    pub fn state_handle(&self) -> Arc<Mutex<MockVRState>> {
        self.state.clone()
    }

    pub fn handle_msg(&self, msg: MockVRControlMsg) {
        self.state().handle_msg(msg);
    }

    pub fn tare_count(&self) -> u32 {
        self.state().tare_count
    }

    pub fn drift_corrections(&self) -> Vec<[f32; 3]> {
        self.state().drift_corrections.clone()
    }

    fn state(&self) -> MutexGuard<MockVRState> {
        lock_state(&self.state)
    }
}

impl VRHeadset for MockHeadset {
    fn is_hardware_connected(&self) -> VRResult<bool> {
        let state = self.state();
        state.check(MockVRQuery::HardwareConnected)?;
        Ok(state.connected)
    }

    fn is_hardware_ready(&self) -> VRResult<bool> {
        let state = self.state();
        state.check(MockVRQuery::HardwareReady)?;
        Ok(state.connected)
    }

    fn hmd_pose(&self) -> VRResult<VRPose> {
        let state = self.state();
        state.check_connected(MockVRQuery::Pose)?;
        Ok(VRPose {
            timestamp: utils::timestamp(),
            ..state.pose
        })
    }

    fn gaze_vectors(&self) -> VRResult<(VRGazeVector, VRGazeVector)> {
        let state = self.state();
        state.check_connected(MockVRQuery::GazeVectors)?;
        Ok(state.gaze)
    }

    fn gaze_convergence(&self) -> VRResult<VRGazeConvergence> {
        let state = self.state();
        state.check_connected(MockVRQuery::GazeConvergence)?;
        Ok(state.convergence)
    }

    fn projection_frustums(&self, _near: f32, _far: f32) -> VRResult<(VRProjectionFrustum, VRProjectionFrustum)> {
        let state = self.state();
        state.check_connected(MockVRQuery::Projection)?;
        Ok(state.frustums)
    }

    fn is_position_ready(&self) -> VRResult<bool> {
        let state = self.state();
        state.check(MockVRQuery::PositionReady)?;
        Ok(state.connected)
    }

    fn tare_orientation(&self) -> VRResult<()> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::Tare)?;
        state.tare_count += 1;
        state.pose.orientation = [0.0, 0.0, 0.0, 1.0];
        Ok(())
    }

    fn tare_position(&self) -> VRResult<()> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::Tare)?;
        state.tare_count += 1;
        state.pose.position = [0.0, 0.0, 0.0];
        Ok(())
    }

    fn interpupillary_distance(&self) -> VRResult<f32> {
        let state = self.state();
        state.check_connected(MockVRQuery::InterpupillaryDistance)?;
        Ok(state.ipd)
    }

    fn check_eyes_tracked(&self) -> VRResult<VREyes> {
        let state = self.state();
        state.check_connected(MockVRQuery::EyesTracked)?;
        Ok(state.eyes_tracked)
    }

    fn check_eyes_closed(&self) -> VRResult<VREyes> {
        let state = self.state();
        state.check_connected(MockVRQuery::EyesClosed)?;
        Ok(state.eyes_closed)
    }

    fn ensure_eye_calibration(&self) -> VRResult<()> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::Calibration)?;
        state.calibrating = true;
        Ok(())
    }

    fn is_eye_tracking_calibrating(&self) -> VRResult<bool> {
        let state = self.state();
        state.check_connected(MockVRQuery::Calibration)?;
        Ok(state.calibrating)
    }

    fn manual_drift_correction(&self, location: [f32; 3]) -> VRResult<()> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::GazeVectors)?;
        state.drift_corrections.push(location);
        Ok(())
    }
}
