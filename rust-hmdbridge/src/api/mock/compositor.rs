use super::{lock_state, MockVRState};
use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
use rust_hmdbridge_api::{utils, VRCompositor, VRCompositorLayer, VRLayerInit, VRLayerSubmit, VRPose, VRResult};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

pub struct MockCompositor {
    state: Arc<Mutex<MockVRState>>,
}

impl MockCompositor {
    pub fn new() -> MockCompositor {
        MockCompositor::new_with_state(Default::default())
    }

    pub(super) fn new_with_state(state: Arc<Mutex<MockVRState>>) -> MockCompositor {
        MockCompositor { state }
    }

    pub fn handle_msg(&self, msg: MockVRControlMsg) {
        self.state().handle_msg(msg);
    }

    /// Layers requested so far, in creation order.
    pub fn layers(&self) -> Vec<VRLayerInit> {
        self.state().layers.clone()
    }

    /// Frames submitted so far, in submission order.
    pub fn submissions(&self) -> Vec<VRLayerSubmit> {
        self.state().submissions.clone()
    }

    pub fn render_pose_requests(&self) -> u32 {
        self.state().render_pose_requests
    }

    fn state(&self) -> MutexGuard<MockVRState> {
        lock_state(&self.state)
    }
}

impl VRCompositor for MockCompositor {
    fn is_ready(&self) -> VRResult<bool> {
        let state = self.state();
        state.check(MockVRQuery::CompositorReady)?;
        Ok(state.connected)
    }

    fn create_layer(&self, init: &VRLayerInit) -> VRResult<VRCompositorLayer> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::CreateLayer)?;
        state.layers.push(*init);
        Ok(VRCompositorLayer {
            layer_id: utils::new_id(),
            ideal_resolution_per_eye: state.ideal_resolution,
        })
    }

    fn submit(&self, submit: &VRLayerSubmit) -> VRResult<()> {
        let mut state = self.state();
        state.check_connected(MockVRQuery::Submit)?;
        state.submissions.push(*submit);
        Ok(())
    }

    fn wait_for_render_pose(&self) -> VRResult<VRPose> {
        let delay = {
            let mut state = self.state();
            state.render_pose_requests += 1;
            state.frame_delay
        };

        // Simulate Vsync
        thread::sleep(Duration::from_millis(1) + delay);

        let state = self.state();
        state.check_connected(MockVRQuery::RenderPose)?;
        Ok(VRPose {
            timestamp: utils::timestamp(),
            ..state.pose
        })
    }
}
