mod compositor;
mod headset;
mod surface;

pub use self::compositor::MockCompositor;
pub use self::headset::MockHeadset;
pub use self::surface::{MockDeviceContext, MockSurface};

use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
use rust_hmdbridge_api::{VREyes, VRErrorCode, VRGazeConvergence, VRGazeRay, VRGazeVector, VRLayerInit,
                         VRLayerSubmit, VRPose, VRProjectionFrustum, VRResult};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Creates a connected mock headset and its compositor, sharing one simulated device.
pub fn new_mock_device() -> (Arc<MockHeadset>, Arc<MockCompositor>) {
    let state = Arc::new(Mutex::new(MockVRState::default()));
    (Arc::new(MockHeadset::new_with_state(state.clone())),
     Arc::new(MockCompositor::new_with_state(state)))
}

/// Same as `new_mock_device`, but the device can also be driven from another thread
/// through the returned sender.
pub fn new_mock_device_with_remote() -> (Arc<MockHeadset>, Arc<MockCompositor>, Sender<MockVRControlMsg>) {
    let (send, rcv) = channel();
    let (headset, compositor) = new_mock_device();
    let state = headset.state_handle();
    thread::spawn(move || {
        while let Ok(msg) = rcv.recv() {
            lock_state(&state).handle_msg(msg);
        }
    });
    (headset, compositor, send)
}

fn lock_state(state: &Mutex<MockVRState>) -> MutexGuard<MockVRState> {
    // A test panicking while holding the lock must not take the device down with it
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// Simulates a virtual headset with HTC Vive like optics
pub struct MockVRState {
    connected: bool,
    pose: VRPose,
    gaze: (VRGazeVector, VRGazeVector),
    convergence: VRGazeConvergence,
    frustums: (VRProjectionFrustum, VRProjectionFrustum),
    ipd: f32,
    eyes_tracked: VREyes,
    eyes_closed: VREyes,
    calibrating: bool,
    ideal_resolution: (u32, u32),
    frame_delay: Duration,
    failures: HashMap<MockVRQuery, VRErrorCode>,
    tare_count: u32,
    drift_corrections: Vec<[f32; 3]>,
    layers: Vec<VRLayerInit>,
    submissions: Vec<VRLayerSubmit>,
    render_pose_requests: u32,
}

impl Default for MockVRState {
    fn default() -> MockVRState {
        MockVRState {
            connected: true,
            pose: VRPose::default(),
            gaze: (VRGazeVector::default(), VRGazeVector::default()),
            convergence: VRGazeConvergence {
                ray: VRGazeRay::default(),
                distance: 1.0,
                accuracy: 1.0,
            },
            frustums: (VRProjectionFrustum::from_degrees(55.82093, 51.269485, 55.7078, 54.422634),
                       VRProjectionFrustum::from_degrees(55.89805, 54.374104, 55.614716, 51.3049)),
            ipd: 0.064,
            eyes_tracked: VREyes::Both,
            eyes_closed: VREyes::Neither,
            calibrating: false,
            ideal_resolution: (1512, 1680),
            frame_delay: Duration::from_millis(0),
            failures: HashMap::new(),
            tare_count: 0,
            drift_corrections: Vec::new(),
            layers: Vec::new(),
            submissions: Vec::new(),
            render_pose_requests: 0,
        }
    }
}

impl MockVRState {
    pub fn handle_msg(&mut self, msg: MockVRControlMsg) {
        match msg {
            MockVRControlMsg::SetPose(pose) => self.pose = pose,
            MockVRControlMsg::SetGazeVectors(left, right) => self.gaze = (left, right),
            MockVRControlMsg::SetGazeConvergence(convergence) => self.convergence = convergence,
            MockVRControlMsg::SetProjectionFrustums(left, right) => self.frustums = (left, right),
            MockVRControlMsg::SetInterpupillaryDistance(ipd) => self.ipd = ipd,
            MockVRControlMsg::SetEyesTracked(eyes) => self.eyes_tracked = eyes,
            MockVRControlMsg::SetEyesClosed(eyes) => self.eyes_closed = eyes,
            MockVRControlMsg::SetConnected(connected) => self.connected = connected,
            MockVRControlMsg::SetIdealResolution(width, height) => self.ideal_resolution = (width, height),
            MockVRControlMsg::SetFrameDelay(delay) => self.frame_delay = delay,
            MockVRControlMsg::Fail(query, code) => {
                self.failures.insert(query, code);
            }
            MockVRControlMsg::Recover(query) => {
                self.failures.remove(&query);
            }
        }
    }

    fn check(&self, query: MockVRQuery) -> VRResult<()> {
        match self.failures.get(&query) {
            Some(code) => Err(*code),
            None => Ok(()),
        }
    }

    // Queries that need a live device
    fn check_connected(&self, query: MockVRQuery) -> VRResult<()> {
        self.check(query)?;
        if self.connected {
            Ok(())
        } else {
            Err(VRErrorCode::ConnectNotConnected)
        }
    }
}
