use crate::config::{ClientCapabilities, HmdConfig, TrackingMode};
use crate::coordinate::{HostPose, HostRotation, HostVector};
use crate::error::{log_device_error, DeviceErrorLog, HmdError};
use crate::frame_sync::FrameSyncBridge;
use crate::gaze::GazeGeometry;
use crate::pose_cache::PoseCache;
use crate::projection::{ProjectionBuilder, ProjectionMatrix};
use crate::stereo::StereoStateMachine;
use euclid::Angle;
use rust_hmdbridge_api::{VRCompositorLayer, VRCompositorPtr, VREye, VRHeadsetPtr, VRLayerInit};
use std::f32::consts::PI;
use std::sync::Arc;

/// Where the zero position of the tracking space lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum TrackingOrigin {
    /// At the user's eyes, for seated experiences.
    Eye,
    /// On the floor below the user.
    Floor,
}

/// Ties one headset and its compositor to the host renderer.
///
/// Lives on the simulation thread. The render thread side is obtained once
/// through `take_frame_sync`.
pub struct HmdBridge {
    headset: VRHeadsetPtr,
    compositor: VRCompositorPtr,
    config: HmdConfig,
    layer: VRCompositorLayer,
    poses: Arc<PoseCache>,
    gaze: GazeGeometry,
    projection: ProjectionBuilder,
    stereo: StereoStateMachine,
    frame_sync: Option<FrameSyncBridge>,
    base_orientation: HostRotation,
    // Yaw accumulated from the player's controller, in radians
    control_yaw: f32,
    // Head yaw the last view rotation was built with
    applied_hmd_yaw: f32,
    errors: DeviceErrorLog,
}

impl HmdBridge {
    pub fn new(headset: VRHeadsetPtr, compositor: VRCompositorPtr, config: HmdConfig) -> Result<HmdBridge, HmdError> {
        // Content fixed to the screen must not be reprojected to the latest head pose
        let init = VRLayerInit {
            disable_time_warp: config.tracking_mode == TrackingMode::FixedToHmdScreen,
        };
        let layer = compositor
            .create_layer(&init)
            .map_err(|code| HmdError::query_failed("VRCompositor::create_layer", code))?;

        let poses = Arc::new(PoseCache::new(config.world_to_meters_scale));
        let frame_sync = FrameSyncBridge::new(compositor.clone(), poses.clone(), layer, config.pose_wait_timeout)?;
        let gaze = GazeGeometry::new(headset.clone(), poses.clone(), config.default_ipd);

        info!("HMD bridge created with layer {}, {}x{} per eye",
              layer.layer_id,
              layer.ideal_resolution_per_eye.0,
              layer.ideal_resolution_per_eye.1);

        Ok(HmdBridge {
            headset,
            compositor,
            layer,
            poses,
            gaze,
            projection: ProjectionBuilder::new(config.near_clip, config.far_clip),
            stereo: StereoStateMachine::new(layer.ideal_resolution_per_eye),
            frame_sync: Some(frame_sync),
            base_orientation: HostRotation::identity(),
            control_yaw: 0.0,
            applied_hmd_yaw: 0.0,
            errors: DeviceErrorLog::new(),
            config,
        })
    }

    pub fn config(&self) -> &HmdConfig {
        &self.config
    }

    pub fn layer(&self) -> &VRCompositorLayer {
        &self.layer
    }

    pub fn poses(&self) -> &Arc<PoseCache> {
        &self.poses
    }

    pub fn gaze(&self) -> &GazeGeometry {
        &self.gaze
    }

    pub fn stereo(&self) -> &StereoStateMachine {
        &self.stereo
    }

    pub fn stereo_mut(&mut self) -> &mut StereoStateMachine {
        &mut self.stereo
    }

    pub fn projection_mut(&mut self) -> &mut ProjectionBuilder {
        &mut self.projection
    }

    /// Hands the render thread side over. Only the first call gets it.
    pub fn take_frame_sync(&mut self) -> Option<FrameSyncBridge> {
        self.frame_sync.take()
    }

    pub fn required_capabilities(&self) -> ClientCapabilities {
        self.config.tracking_mode.capabilities()
    }

    pub fn is_hmd_connected(&self) -> bool {
        let compositor_ready = self
            .errors
            .check("VRCompositor::is_ready", self.compositor.is_ready())
            .unwrap_or(false);
        // Both are queried so that every failure gets logged
        self.is_hardware_connected() && compositor_ready
    }

    pub fn is_hardware_connected(&self) -> bool {
        self.errors
            .check("VRHeadset::is_hardware_connected", self.headset.is_hardware_connected())
            .unwrap_or(false)
    }

    pub fn is_hardware_ready(&self) -> bool {
        self.errors
            .check("VRHeadset::is_hardware_ready", self.headset.is_hardware_ready())
            .unwrap_or(false)
    }

    pub fn is_position_ready(&self) -> bool {
        self.errors
            .check("VRHeadset::is_position_ready", self.headset.is_position_ready())
            .unwrap_or(false)
    }

    pub fn interpupillary_distance(&self) -> f32 {
        self.gaze.interpupillary_distance()
    }

    pub fn reset_orientation_and_position(&self) {
        self.reset_orientation();
        self.reset_position();
    }

    pub fn reset_orientation(&self) {
        if let Err(code) = self.headset.tare_orientation() {
            log_device_error("VRHeadset::tare_orientation", code);
        }
    }

    pub fn reset_position(&self) {
        if let Err(code) = self.headset.tare_position() {
            log_device_error("VRHeadset::tare_position", code);
        }
    }

    pub fn base_orientation(&self) -> HostRotation {
        self.base_orientation
    }

    pub fn set_base_orientation(&mut self, orientation: HostRotation) {
        self.base_orientation = orientation;
    }

    // Only seated experiences are supported
    pub fn tracking_origin(&self) -> TrackingOrigin {
        TrackingOrigin::Eye
    }

    pub fn set_tracking_origin(&mut self, origin: TrackingOrigin) {
        if origin != TrackingOrigin::Eye {
            warn!("Tracking origin {:?} is not supported, staying at {:?}", origin, TrackingOrigin::Eye);
        }
    }

    pub fn set_clipping_planes(&mut self, near: f32, far: f32) {
        self.config.near_clip = near;
        self.config.far_clip = far;
        self.projection.set_clipping_planes(near, far);
    }

    pub fn stereo_projection_matrix(&mut self, eye: VREye) -> ProjectionMatrix {
        self.projection.stereo_projection(&*self.headset, eye)
    }

    pub fn world_to_meters_scale(&self) -> f32 {
        self.poses.world_to_meters_scale()
    }

    pub fn set_world_to_meters_scale(&mut self, scale: f32) {
        self.config.world_to_meters_scale = scale;
        self.poses.set_world_to_meters_scale(scale);
    }

    /// Head pose to set the cameras up with. Once frames are being rendered this is the
    /// pose latched for rendering, before that the device is polled.
    pub fn current_pose(&self) -> HostPose {
        let pose = if self.poses.has_render_pose() {
            self.poses.render_pose()
        } else {
            self.poses
                .sample(&*self.headset)
                .unwrap_or_else(|_| self.poses.sampled_pose())
        };

        match self.config.tracking_mode {
            TrackingMode::PositionAndOrientation => pose.host_pose(),
            TrackingMode::OrientationOnly => HostPose {
                orientation: pose.orientation,
                position: HostVector::zero(),
            },
            TrackingMode::FixedToHmdScreen => HostPose::default(),
        }
    }

    /// Head orientation relative to the base orientation.
    pub fn camera_orientation(&self) -> HostRotation {
        self.current_pose().orientation.then(&self.base_orientation.inverse())
    }

    /// View rotation for a player whose controller turned by `control_yaw_delta` radians since
    /// the last call. Only yaw is taken from the controller, pitch and roll always come from the
    /// headset.
    pub fn apply_hmd_rotation(&mut self, control_yaw_delta: f32) -> HostRotation {
        let head = self.camera_orientation();
        self.control_yaw = wrap_angle(self.control_yaw + control_yaw_delta);
        self.applied_hmd_yaw = yaw_of(&head);
        head.then(&HostRotation::around_z(Angle::radians(self.control_yaw)))
    }

    /// Pose for the player camera. The position is taken back out of the head yaw the last
    /// view rotation was built with, since that view already turns with the head.
    pub fn update_player_camera(&self) -> HostPose {
        let pose = self.current_pose();
        let unapplied = HostRotation::around_z(Angle::radians(-self.applied_hmd_yaw));
        HostPose {
            orientation: pose.orientation.then(&self.base_orientation.inverse()),
            position: unapplied.transform_vector3d(pose.position),
        }
    }

    /// Offset of `eye` from the center of the head, for a view rotated by `view_rotation`.
    pub fn stereo_view_offset(&self, eye: VREye, view_rotation: &HostRotation) -> HostVector {
        let half_ipd = self.interpupillary_distance() * self.world_to_meters_scale() / 2.0;
        let offset = match eye {
            VREye::Left => -half_ipd,
            VREye::Right => half_ipd,
        };
        view_rotation.transform_vector3d(HostVector::new(0.0, offset, 0.0))
    }

    pub fn on_begin_play(&mut self) {
        self.stereo.set_stereo_enabled(true);
    }

    pub fn on_end_play(&mut self) {
        self.stereo.set_stereo_enabled(false);
    }
}

impl Drop for HmdBridge {
    fn drop(&mut self) {
        info!("HMD bridge for layer {} dropped", self.layer.layer_id);
    }
}

// Heading of `rotation` around the up axis, in radians
fn yaw_of(rotation: &HostRotation) -> f32 {
    let (i, j, k, r) = (rotation.i, rotation.j, rotation.k, rotation.r);
    (2.0 * (r * k + i * j)).atan2(1.0 - 2.0 * (j * j + k * k))
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{new_mock_device, MockCompositor, MockHeadset};
    use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
    use rust_hmdbridge_api::{VRErrorCode, VRPose};
    use std::f32::consts::FRAC_PI_2;
    use std::time::Duration;

    fn new_bridge(config: HmdConfig) -> (Arc<MockHeadset>, Arc<MockCompositor>, HmdBridge) {
        crate::test_log::init();
        let (headset, compositor) = new_mock_device();
        let bridge = HmdBridge::new(headset.clone(), compositor.clone(), config).unwrap();
        (headset, compositor, bridge)
    }

    #[test]
    fn fixed_to_screen_disables_time_warp() {
        let (_, compositor, bridge) = new_bridge(HmdConfig::default().with_tracking_mode(TrackingMode::FixedToHmdScreen));
        assert!(compositor.layers()[0].disable_time_warp);
        assert!(!bridge.required_capabilities().orientation);

        let (_, compositor, _) = bridge_default();
        assert!(!compositor.layers()[0].disable_time_warp);
    }

    fn bridge_default() -> (Arc<MockHeadset>, Arc<MockCompositor>, HmdBridge) {
        new_bridge(HmdConfig::default())
    }

    #[test]
    fn connection_needs_headset_and_compositor() {
        let (headset, compositor, bridge) = bridge_default();
        assert!(bridge.is_hmd_connected());

        compositor.handle_msg(MockVRControlMsg::Fail(MockVRQuery::CompositorReady, VRErrorCode::ConnectTimeout));
        assert!(!bridge.is_hmd_connected());
        assert!(bridge.is_hardware_connected());

        headset.handle_msg(MockVRControlMsg::SetConnected(false));
        assert!(!bridge.is_hardware_connected());
        assert!(!bridge.is_position_ready());
    }

    #[test]
    fn layer_creation_failure_is_reported() {
        let (headset, compositor) = new_mock_device();
        compositor.handle_msg(MockVRControlMsg::Fail(MockVRQuery::CreateLayer, VRErrorCode::CompositorNotReady));
        match HmdBridge::new(headset, compositor, HmdConfig::default()) {
            Err(HmdError::QueryFailed { code, .. }) => assert_eq!(code, VRErrorCode::CompositorNotReady),
            _ => panic!("bridge created without a layer"),
        }
    }

    #[test]
    fn frame_sync_is_handed_out_once() {
        let (_, _, mut bridge) = bridge_default();
        assert!(bridge.take_frame_sync().is_some());
        assert!(bridge.take_frame_sync().is_none());
    }

    #[test]
    fn current_pose_follows_tracking_mode() {
        let half = std::f32::consts::FRAC_PI_4;
        let pose = VRPose::new([0.0, half.sin(), 0.0, half.cos()], [1.0, 2.0, 3.0]);

        let (headset, _, bridge) = new_bridge(HmdConfig::default().with_world_to_meters_scale(100.0));
        headset.handle_msg(MockVRControlMsg::SetPose(pose));
        let full = bridge.current_pose();
        assert_eq!(full.position, HostVector::new(300.0, 100.0, 200.0));

        let (headset, _, bridge) = new_bridge(HmdConfig::default().with_tracking_mode(TrackingMode::OrientationOnly));
        headset.handle_msg(MockVRControlMsg::SetPose(pose));
        let rotation_only = bridge.current_pose();
        assert_eq!(rotation_only.position, HostVector::zero());
        assert!((rotation_only.orientation.k - half.sin()).abs() < 1e-5);

        let (headset, _, bridge) = new_bridge(HmdConfig::default().with_tracking_mode(TrackingMode::FixedToHmdScreen));
        headset.handle_msg(MockVRControlMsg::SetPose(pose));
        assert_eq!(bridge.current_pose(), HostPose::default());
    }

    #[test]
    fn current_pose_prefers_render_pose() {
        let config = HmdConfig::default().with_pose_wait_timeout(Duration::from_secs(1));
        let (headset, _, mut bridge) = new_bridge(config);
        let mut frame_sync = bridge.take_frame_sync().unwrap();
        let rendered = frame_sync.await_render_pose();

        headset.handle_msg(MockVRControlMsg::SetPose(VRPose::new([0.0, 0.0, 0.0, 1.0], [9.0, 9.0, 9.0])));
        assert_eq!(bridge.current_pose(), rendered.host_pose());
    }

    #[test]
    fn eyes_are_offset_by_half_ipd() {
        let (headset, _, bridge) = new_bridge(HmdConfig::default().with_world_to_meters_scale(100.0));
        headset.handle_msg(MockVRControlMsg::SetInterpupillaryDistance(0.07));
        let identity = HostRotation::identity();
        let left = bridge.stereo_view_offset(VREye::Left, &identity);
        let right = bridge.stereo_view_offset(VREye::Right, &identity);
        assert!((left.y + 3.5).abs() < 1e-4);
        assert!((right.y - 3.5).abs() < 1e-4);

        headset.handle_msg(MockVRControlMsg::Fail(MockVRQuery::InterpupillaryDistance, VRErrorCode::Unknown(2)));
        assert_eq!(bridge.interpupillary_distance(), 0.064);
    }

    #[test]
    fn reset_tares_both_sensors() {
        let (headset, _, bridge) = bridge_default();
        bridge.reset_orientation_and_position();
        assert_eq!(headset.tare_count(), 2);
    }

    #[test]
    fn only_eye_tracking_origin() {
        let (_, _, mut bridge) = bridge_default();
        bridge.set_tracking_origin(TrackingOrigin::Floor);
        assert_eq!(bridge.tracking_origin(), TrackingOrigin::Eye);
    }

    #[test]
    fn play_toggles_stereo() {
        let (_, _, mut bridge) = bridge_default();
        bridge.on_begin_play();
        assert!(bridge.stereo().is_stereo_enabled());
        assert_eq!(bridge.stereo().monitor_info().resolution, (3024, 1680));
        bridge.on_end_play();
        assert!(!bridge.stereo().is_stereo_enabled());
    }

    #[test]
    fn clipping_planes_reach_projection() {
        let (_, _, mut bridge) = bridge_default();
        let flat = bridge.stereo_projection_matrix(VREye::Left);
        assert_eq!(flat.m[2][2], 0.0);
        assert_eq!(flat.m[3][2], 10.0);

        bridge.set_clipping_planes(1.0, 100.0);
        let finite = bridge.stereo_projection_matrix(VREye::Left);
        assert!((finite.m[2][2] - 1.0 / (1.0 - 100.0)).abs() < 1e-6);
    }

    fn assert_vec(actual: HostVector, expected: HostVector) {
        assert!((actual - expected).length() < 1e-4, "{:?} != {:?}", actual, expected);
    }

    fn yaw_pose(yaw: f32, position: [f32; 3]) -> VRPose {
        // Device Y is the host up axis
        VRPose::new([0.0, (yaw / 2.0).sin(), 0.0, (yaw / 2.0).cos()], position)
    }

    #[test]
    fn controller_adds_yaw_to_head_rotation() {
        let (headset, _, mut bridge) = bridge_default();
        headset.handle_msg(MockVRControlMsg::SetPose(yaw_pose(FRAC_PI_2, [0.0; 3])));
        let forward = HostVector::new(1.0, 0.0, 0.0);

        let view = bridge.apply_hmd_rotation(FRAC_PI_2);
        assert_vec(view.transform_vector3d(forward), HostVector::new(-1.0, 0.0, 0.0));

        // The controller yaw is kept between calls
        let view = bridge.apply_hmd_rotation(0.0);
        assert_vec(view.transform_vector3d(forward), HostVector::new(-1.0, 0.0, 0.0));

        // and wraps around
        bridge.apply_hmd_rotation(2.0 * PI);
        assert!((bridge.control_yaw - FRAC_PI_2).abs() < 1e-4);
        bridge.apply_hmd_rotation(PI);
        assert!((bridge.control_yaw + FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn base_orientation_recenters_camera() {
        let (headset, _, mut bridge) = bridge_default();
        headset.handle_msg(MockVRControlMsg::SetPose(yaw_pose(FRAC_PI_2, [0.0; 3])));
        bridge.set_base_orientation(HostRotation::around_z(Angle::radians(FRAC_PI_2)));

        let view = bridge.apply_hmd_rotation(0.0);
        assert_vec(view.transform_vector3d(HostVector::new(1.0, 0.0, 0.0)), HostVector::new(1.0, 0.0, 0.0));
        assert!((bridge.camera_orientation().r.abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn camera_position_follows_applied_yaw() {
        let (headset, _, mut bridge) = bridge_default();
        // One meter forward, with the head turned a quarter to the left
        headset.handle_msg(MockVRControlMsg::SetPose(yaw_pose(FRAC_PI_2, [0.0, 0.0, 1.0])));
        assert_vec(bridge.update_player_camera().position, HostVector::new(1.0, 0.0, 0.0));

        bridge.apply_hmd_rotation(0.0);
        let camera = bridge.update_player_camera();
        assert_vec(camera.position, HostVector::new(0.0, -1.0, 0.0));
        assert_eq!(camera.orientation, bridge.current_pose().orientation);
    }

    #[test]
    fn disconnected_device_is_logged_once_per_query() {
        let (headset, _, mut bridge) = bridge_default();
        headset.handle_msg(MockVRControlMsg::SetConnected(false));

        let before = crate::test_log::warnings();
        for _ in 0..100 {
            assert!(bridge.stereo_projection_matrix(VREye::Left).is_finite());
            assert_eq!(bridge.interpupillary_distance(), 0.064);
        }
        assert_eq!(crate::test_log::warnings() - before, 2);

        // Reconnecting resets the log, a new outage is reported again
        headset.handle_msg(MockVRControlMsg::SetConnected(true));
        bridge.interpupillary_distance();
        headset.handle_msg(MockVRControlMsg::SetConnected(false));
        bridge.interpupillary_distance();
        assert_eq!(crate::test_log::warnings() - before, 3);
    }
}
