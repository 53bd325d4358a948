use crate::coordinate::HostRotation;
use crate::error::{DeviceErrorLog, HmdError};
use crate::pose_cache::{PoseCache, TrackedPose};
use rust_hmdbridge_api::{VRCompositorLayer, VRCompositorPtr, VRDeviceContext, VRLayerSubmit, VRPose,
                         VRRasterizerState, VRRenderSurface, VRResult};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    AwaitingPose,
    HasPose,
    Presented,
}

/// Render thread side of the compositor.
///
/// Each frame the render thread calls `await_render_pose` right before drawing, which blocks
/// until the compositor wants a new frame, and `present` once both eye images are in the
/// surface. The blocking compositor call runs on a dedicated waiter thread so the render
/// thread can give up after `timeout` and draw with the previous pose. An answer arriving
/// after that is used by the next frame, unless it has been waiting for longer than `timeout`.
pub struct FrameSyncBridge {
    compositor: VRCompositorPtr,
    poses: Arc<PoseCache>,
    layer: VRCompositorLayer,
    surface: Option<Arc<dyn VRRenderSurface>>,
    timeout: Duration,
    requests: Sender<()>,
    replies: Receiver<(Instant, VRResult<VRPose>)>,
    in_flight: bool,
    timed_out: bool,
    state: FrameState,
    frame_count: u64,
    errors: DeviceErrorLog,
}

impl FrameSyncBridge {
    pub fn new(compositor: VRCompositorPtr,
               poses: Arc<PoseCache>,
               layer: VRCompositorLayer,
               timeout: Duration)
               -> Result<FrameSyncBridge, HmdError> {
        let (requests, waiter_requests) = channel();
        let (waiter_replies, replies) = channel();
        let waiter_compositor = compositor.clone();
        thread::Builder::new()
            .name("hmd-pose-waiter".into())
            .spawn(move || FrameSyncBridge::wait_loop(waiter_compositor, waiter_requests, waiter_replies))
            .map_err(|err| {
                error!("Failed to spawn the pose waiter thread: {}", err);
                HmdError::DeviceUnavailable("pose waiter thread")
            })?;

        Ok(FrameSyncBridge {
            compositor,
            poses,
            layer,
            surface: None,
            timeout,
            requests,
            replies,
            in_flight: false,
            timed_out: false,
            state: FrameState::Idle,
            frame_count: 0,
            errors: DeviceErrorLog::new(),
        })
    }

    // Exits once the bridge is dropped
    fn wait_loop(compositor: VRCompositorPtr,
                 requests: Receiver<()>,
                 replies: Sender<(Instant, VRResult<VRPose>)>) {
        while let Ok(()) = requests.recv() {
            let result = compositor.wait_for_render_pose();
            if replies.send((Instant::now(), result)).is_err() {
                break;
            }
        }
        debug!("Pose waiter thread finished");
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Number of frames handed to the compositor so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn layer(&self) -> &VRCompositorLayer {
        &self.layer
    }

    /// Sets the surface the next frames are rendered into. `None` releases the current one.
    pub fn set_surface(&mut self, surface: Option<Arc<dyn VRRenderSurface>>) {
        self.surface = surface;
        if self.state == FrameState::Presented {
            self.state = FrameState::Idle;
        }
    }

    /// Blocks until the compositor hands out the pose for the next frame, or the timeout expires.
    /// Failures are logged and leave the previous render pose in place.
    pub fn await_render_pose(&mut self) -> TrackedPose {
        self.state = FrameState::AwaitingPose;
        let deadline = Instant::now() + self.timeout;

        loop {
            // An unanswered request from an earlier frame is still pending, its answer is this frame's pose
            if !self.in_flight {
                if self.requests.send(()).is_err() {
                    error!("Pose waiter thread is gone");
                    return self.keep_render_pose();
                }
                self.in_flight = true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok((answered, result)) => {
                    self.in_flight = false;
                    let age = answered.elapsed();
                    if age > self.timeout {
                        debug!("Dropping a render pose answered {:?} ago", age);
                        continue;
                    }

                    self.timed_out = false;
                    return match self.errors.check("VRCompositor::wait_for_render_pose", result) {
                        Ok(pose) => {
                            self.state = FrameState::HasPose;
                            self.poses.publish_render_pose(&pose)
                        }
                        Err(_) => self.keep_render_pose(),
                    };
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.timed_out {
                        warn!("No render pose from the compositor after {:?}", self.timeout);
                        self.timed_out = true;
                    }
                    return self.keep_render_pose();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!("Pose waiter thread is gone");
                    self.in_flight = false;
                    return self.keep_render_pose();
                }
            }
        }
    }

    fn keep_render_pose(&mut self) -> TrackedPose {
        self.state = FrameState::HasPose;
        self.poses.render_pose()
    }

    /// Hands the rendered stereo pair to the compositor, along with the pose it was drawn with.
    /// The host swap interval is ignored since the compositor paces frames.
    pub fn present(&mut self, sync_interval: u32) -> bool {
        let surface = match self.surface {
            Some(ref surface) => surface.clone(),
            None => {
                warn!("Present without render surface");
                return false;
            }
        };

        if self.state != FrameState::HasPose {
            warn!("Present called in state {:?}, expected a render pose for this frame", self.state);
            return false;
        }

        let pose = self.poses.render_pose();
        let submit = VRLayerSubmit::side_by_side(self.layer.layer_id, pose.device, surface.native_handle());
        trace!("Submitting frame {} with pose #{} (sync interval {})", self.frame_count, pose.sequence, sync_interval);

        let result = {
            let _rasterizer = RasterizerStateGuard::clear(surface.device_context());
            self.compositor.submit(&submit)
        };

        self.state = FrameState::Presented;
        self.frame_count += 1;
        self.errors.check("VRCompositor::submit", result).is_ok()
    }

    /// Rotation to apply to a view set up on the simulation thread with `base_orientation`,
    /// so that it matches the render pose latched for this frame. Compose it before the view rotation.
    pub fn render_view_correction(&self, base_orientation: &HostRotation) -> HostRotation {
        self.poses.render_pose().orientation.then(&base_orientation.inverse())
    }
}

// Host pipeline state can interfere with the compositor reading the surface
struct RasterizerStateGuard {
    context: Option<Arc<dyn VRDeviceContext>>,
    saved: Option<VRRasterizerState>,
}

impl RasterizerStateGuard {
    fn clear(context: Option<Arc<dyn VRDeviceContext>>) -> RasterizerStateGuard {
        let saved = context.as_ref().and_then(|context| {
            let saved = context.rasterizer_state();
            context.set_rasterizer_state(None);
            saved
        });
        RasterizerStateGuard { context, saved }
    }
}

impl Drop for RasterizerStateGuard {
    fn drop(&mut self) {
        if let Some(ref context) = self.context {
            context.set_rasterizer_state(self.saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{new_mock_device, MockCompositor, MockDeviceContext, MockSurface};
    use crate::coordinate::HostVector;
    use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
    use rust_hmdbridge_api::{VRCompositor, VRErrorCode, VRLayerInit, VRSurfaceHandle, VRTextureBounds};

    fn frame_sync(timeout: Duration) -> (Arc<MockCompositor>, Arc<PoseCache>, FrameSyncBridge) {
        let (_, compositor) = new_mock_device();
        let poses = Arc::new(PoseCache::new(1.0));
        let layer = compositor.create_layer(&VRLayerInit::default()).unwrap();
        let bridge = FrameSyncBridge::new(compositor.clone(), poses.clone(), layer, timeout).unwrap();
        (compositor, poses, bridge)
    }

    fn surface(context: Option<Arc<MockDeviceContext>>) -> Option<Arc<dyn VRRenderSurface>> {
        Some(Arc::new(MockSurface::new(7, (2560, 1440), context)))
    }

    #[test]
    fn frame_cycle_submits_side_by_side() {
        let (compositor, poses, mut bridge) = frame_sync(Duration::from_millis(500));
        compositor.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0])));
        assert_eq!(bridge.state(), FrameState::Idle);

        bridge.set_surface(surface(None));
        let pose = bridge.await_render_pose();
        assert_eq!(bridge.state(), FrameState::HasPose);
        assert_eq!(pose.sequence, 1);
        assert_eq!(pose.position, HostVector::new(0.0, 0.0, 1.0));
        assert_eq!(poses.render_pose(), pose);

        assert!(bridge.present(1));
        assert_eq!(bridge.state(), FrameState::Presented);
        assert_eq!(bridge.frame_count(), 1);

        let submissions = compositor.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].surface, VRSurfaceHandle(7));
        assert_eq!(submissions[0].layer_id, bridge.layer().layer_id);
        assert_eq!(submissions[0].pose.position, [0.0, 1.0, 0.0]);
        assert_eq!(submissions[0].left_bounds, VRTextureBounds::left_half());
        assert_eq!(submissions[0].right_bounds, VRTextureBounds::right_half());

        bridge.set_surface(surface(None));
        assert_eq!(bridge.state(), FrameState::Idle);
    }

    #[test]
    fn present_requires_surface_and_pose() {
        let (compositor, _, mut bridge) = frame_sync(Duration::from_millis(500));
        bridge.await_render_pose();
        assert!(!bridge.present(1));

        bridge.set_surface(surface(None));
        assert!(bridge.present(1));
        // Second present in the same cycle
        assert!(!bridge.present(1));
        assert_eq!(compositor.submissions().len(), 1);
    }

    #[test]
    fn failed_wait_keeps_previous_pose() {
        let (compositor, _, mut bridge) = frame_sync(Duration::from_millis(500));
        let first = bridge.await_render_pose();

        compositor.handle_msg(MockVRControlMsg::Fail(MockVRQuery::RenderPose, VRErrorCode::CompositorNotReady));
        compositor.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, 0.0, 0.0, 1.0], [5.0, 0.0, 0.0])));
        assert_eq!(bridge.await_render_pose(), first);
        assert_eq!(bridge.state(), FrameState::HasPose);
    }

    #[test]
    fn timed_out_wait_is_reused_next_frame() {
        let (compositor, poses, mut bridge) = frame_sync(Duration::from_millis(50));
        compositor.handle_msg(MockVRControlMsg::SetFrameDelay(Duration::from_millis(80)));

        let previous = bridge.await_render_pose();
        assert_eq!(previous.sequence, 0);
        assert!(!poses.has_render_pose());

        // The answer comes in while the next frame waits
        let fresh = bridge.await_render_pose();
        assert_eq!(fresh.sequence, 1);
        // The pending request was answered, no second one was made
        assert_eq!(compositor.render_pose_requests(), 1);
    }

    #[test]
    fn over_age_answer_is_dropped() {
        let (compositor, _, mut bridge) = frame_sync(Duration::from_millis(20));
        compositor.handle_msg(MockVRControlMsg::SetFrameDelay(Duration::from_millis(40)));
        compositor.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0])));
        assert_eq!(bridge.await_render_pose().sequence, 0);

        // Answered long before the next frame asks for it
        thread::sleep(Duration::from_millis(150));
        compositor.handle_msg(MockVRControlMsg::SetFrameDelay(Duration::from_millis(0)));
        compositor.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, 0.0, 0.0, 1.0], [2.0, 0.0, 0.0])));

        let fresh = bridge.await_render_pose();
        assert_eq!(fresh.sequence, 1);
        assert_eq!(fresh.device.position, [2.0, 0.0, 0.0]);
        assert_eq!(compositor.render_pose_requests(), 2);
    }

    #[test]
    fn rasterizer_state_restored_after_submit() {
        let (_, _, mut bridge) = frame_sync(Duration::from_millis(500));
        let context = Arc::new(MockDeviceContext::new(Some(VRRasterizerState(3))));
        bridge.set_surface(surface(Some(context.clone())));
        bridge.await_render_pose();
        assert!(bridge.present(0));

        assert_eq!(context.history(), vec![None, Some(VRRasterizerState(3))]);
        assert_eq!(context.rasterizer_state(), Some(VRRasterizerState(3)));
    }

    #[test]
    fn rejected_submit_reports_failure() {
        let (compositor, _, mut bridge) = frame_sync(Duration::from_millis(500));
        compositor.handle_msg(MockVRControlMsg::Fail(MockVRQuery::Submit, VRErrorCode::CompositorInvalidTexture));
        bridge.set_surface(surface(None));
        bridge.await_render_pose();
        assert!(!bridge.present(1));
        assert_eq!(bridge.state(), FrameState::Presented);
    }

    #[test]
    fn view_correction_matches_render_pose() {
        let (compositor, _, mut bridge) = frame_sync(Duration::from_millis(500));
        let half = std::f32::consts::FRAC_PI_4;
        compositor.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, half.sin(), 0.0, half.cos()], [0.0; 3])));
        let pose = bridge.await_render_pose();

        let same = bridge.render_view_correction(&pose.orientation);
        assert!((same.r.abs() - 1.0).abs() < 1e-5);

        let from_identity = bridge.render_view_correction(&HostRotation::identity());
        let forward = from_identity.transform_vector3d(HostVector::new(1.0, 0.0, 0.0));
        assert!((forward - HostVector::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }
}
