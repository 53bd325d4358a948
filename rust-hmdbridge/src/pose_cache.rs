use crate::coordinate::{to_host_pose, HostPose, HostRotation, HostVector};
use crate::error::{DeviceErrorLog, HmdError};
use crossbeam::atomic::AtomicCell;
use rust_hmdbridge_api::{VRHeadset, VRPose};

/// A head pose as published to one of the cache slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPose {
    /// The pose as the device reported it. Submissions hand this back to the compositor.
    pub device: VRPose,
    pub orientation: HostRotation,

    /// Position in world units.
    pub position: HostVector,

    /// Increases by one every time the slot is written. Zero means never written.
    pub sequence: u64,
}

impl Default for TrackedPose {
    fn default() -> TrackedPose {
        let host = HostPose::default();
        TrackedPose {
            device: VRPose::default(),
            orientation: host.orientation,
            position: host.position,
            sequence: 0,
        }
    }
}

impl TrackedPose {
    fn new(device: &VRPose, scale: f32, sequence: u64) -> TrackedPose {
        let device = device.normalized();
        let host = to_host_pose(&device, scale);
        TrackedPose {
            device,
            orientation: host.orientation,
            position: host.position,
            sequence,
        }
    }

    pub fn host_pose(&self) -> HostPose {
        HostPose {
            orientation: self.orientation,
            position: self.position,
        }
    }
}

/// Latest head poses shared between the simulation and render threads.
///
/// The sampled slot is written by the simulation thread each time the device is polled.
/// The render slot is written by the render thread once per frame, when the compositor
/// hands out the pose the frame will be drawn with. Readers always get a whole snapshot.
pub struct PoseCache {
    sampled: AtomicCell<TrackedPose>,
    render: AtomicCell<TrackedPose>,
    world_to_meters: AtomicCell<f32>,
    errors: DeviceErrorLog,
}

impl PoseCache {
    pub fn new(world_to_meters: f32) -> PoseCache {
        PoseCache {
            sampled: AtomicCell::new(TrackedPose::default()),
            render: AtomicCell::new(TrackedPose::default()),
            world_to_meters: AtomicCell::new(world_to_meters),
            errors: DeviceErrorLog::new(),
        }
    }

    pub fn world_to_meters_scale(&self) -> f32 {
        self.world_to_meters.load()
    }

    // Applies to poses published from now on
    pub fn set_world_to_meters_scale(&self, scale: f32) {
        self.world_to_meters.store(scale);
    }

    /// Polls the device for a fresh pose and publishes it to the sampled slot.
    /// On failure the slot keeps its previous content.
    pub fn sample(&self, headset: &dyn VRHeadset) -> Result<TrackedPose, HmdError> {
        let pose = self.errors.check("VRHeadset::hmd_pose", headset.hmd_pose())?;
        let tracked = TrackedPose::new(&pose, self.world_to_meters_scale(), self.sampled.load().sequence + 1);
        self.sampled.store(tracked);
        Ok(tracked)
    }

    pub fn sampled_pose(&self) -> TrackedPose {
        self.sampled.load()
    }

    pub(crate) fn publish_render_pose(&self, pose: &VRPose) -> TrackedPose {
        let tracked = TrackedPose::new(pose, self.world_to_meters_scale(), self.render.load().sequence + 1);
        self.render.store(tracked);
        trace!("Published render pose #{}", tracked.sequence);
        tracked
    }

    pub fn render_pose(&self) -> TrackedPose {
        self.render.load()
    }

    pub fn has_render_pose(&self) -> bool {
        self.render.load().sequence > 0
    }
}
