use crate::coordinate::{to_device_vector, to_host_vector, HostPoint2D, HostRotation, HostVector};
use crate::error::{DeviceErrorLog, HmdError};
use crate::pose_cache::PoseCache;
use crate::projection::ProjectionBuilder;
use rust_hmdbridge_api::{VREye, VREyes, VRErrorCode, VRGazeVector, VRHeadsetPtr, VRProjectionFrustum};
use std::sync::Arc;

/// Clip range used to project gaze directions onto the screen.
/// Independent of the clip planes the scene is rendered with.
pub const GAZE_SCREEN_NEAR: f32 = 0.01;
pub const GAZE_SCREEN_FAR: f32 = 1000.0;

/// Space gaze results are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// Relative to the headset.
    Head,
    /// Rotated by the current head orientation.
    World,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeRay {
    /// In world units.
    pub origin: HostVector,
    /// Unit length.
    pub direction: HostVector,
}

impl GazeRay {
    pub fn point_at(&self, distance: f32) -> HostVector {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub ray: GazeRay,

    /// Distance along the ray to the point both eyes look at, in world units.
    pub distance: f32,

    /// Confidence in `distance`, from 0 to 1.
    pub accuracy: f32,
}

impl Convergence {
    /// A zero accuracy (eg. while blinking) leaves the ray usable but not the distance.
    pub fn is_distance_reliable(&self) -> bool {
        self.accuracy > 0.0
    }

    pub fn point(&self) -> HostVector {
        self.ray.point_at(self.distance)
    }
}

/// Derives eye rays and screen positions from the eye tracker.
/// Meant to be used from the simulation thread.
pub struct GazeGeometry {
    headset: VRHeadsetPtr,
    poses: Arc<PoseCache>,
    default_ipd: f32,
    errors: DeviceErrorLog,
}

impl GazeGeometry {
    pub fn new(headset: VRHeadsetPtr, poses: Arc<PoseCache>, default_ipd: f32) -> GazeGeometry {
        GazeGeometry {
            headset,
            poses,
            default_ipd,
            errors: DeviceErrorLog::new(),
        }
    }

    /// Distance between the eyes in meters, or the configured default when the device cannot tell.
    pub fn interpupillary_distance(&self) -> f32 {
        self.errors
            .check("VRHeadset::interpupillary_distance", self.headset.interpupillary_distance())
            .unwrap_or(self.default_ipd)
    }

    pub fn gaze_ray(&self, eye: VREye, frame: ReferenceFrame) -> Result<GazeRay, HmdError> {
        let (left, right) = self.gaze_rays(frame)?;
        Ok(match eye {
            VREye::Left => left,
            VREye::Right => right,
        })
    }

    /// Rays of both eyes, from a single eye tracker report.
    pub fn gaze_rays(&self, frame: ReferenceFrame) -> Result<(GazeRay, GazeRay), HmdError> {
        let orientation = self.frame_orientation(frame)?;
        let (left, right) = self.gaze_vectors()?;

        let eye_offset = self.interpupillary_distance() * self.poses.world_to_meters_scale() / 2.0;
        let ray = |gaze: &VRGazeVector, offset: f32| GazeRay {
            origin: orientation.transform_vector3d(HostVector::new(0.0, offset, 0.0)),
            direction: orientation.transform_vector3d(unit_direction(gaze.vector)),
        };
        Ok((ray(&left, -eye_offset), ray(&right, eye_offset)))
    }

    pub fn convergence(&self, frame: ReferenceFrame) -> Result<Convergence, HmdError> {
        let orientation = self.frame_orientation(frame)?;
        let convergence = self.headset.gaze_convergence().and_then(|convergence| {
            if has_direction(convergence.ray.direction) {
                Ok(convergence)
            } else {
                Err(VRErrorCode::DataUnreliable)
            }
        });
        let convergence = self.errors.check("VRHeadset::gaze_convergence", convergence)?;

        let scale = self.poses.world_to_meters_scale();
        let accuracy = if convergence.accuracy.is_nan() {
            0.0
        } else {
            convergence.accuracy.max(0.0).min(1.0)
        };
        Ok(Convergence {
            ray: GazeRay {
                origin: orientation.transform_vector3d(to_host_vector(convergence.ray.origin, scale)),
                direction: orientation.transform_vector3d(unit_direction(convergence.ray.direction)),
            },
            distance: convergence.distance * scale,
            accuracy,
        })
    }

    /// Where `eye` looks on its half of the screen, (0, 0) being the bottom left corner
    /// and (1, 1) the top right one.
    pub fn gaze_screen_position(&self, eye: VREye) -> Result<HostPoint2D, HmdError> {
        let (frustums, gaze) = self.screen_inputs()?;
        match eye {
            VREye::Left => screen_position(VREye::Left, &frustums.0, &gaze.0),
            VREye::Right => screen_position(VREye::Right, &frustums.1, &gaze.1),
        }
    }

    /// Screen positions of both eyes. Fails as a whole if either eye cannot be projected.
    pub fn gaze_screen_positions(&self) -> Result<(HostPoint2D, HostPoint2D), HmdError> {
        let (frustums, gaze) = self.screen_inputs()?;
        Ok((screen_position(VREye::Left, &frustums.0, &gaze.0)?,
            screen_position(VREye::Right, &frustums.1, &gaze.1)?))
    }

    pub fn eyes_tracked(&self) -> Result<VREyes, HmdError> {
        self.errors.check("VRHeadset::check_eyes_tracked", self.headset.check_eyes_tracked())
    }

    pub fn eyes_closed(&self) -> Result<VREyes, HmdError> {
        self.errors.check("VRHeadset::check_eyes_closed", self.headset.check_eyes_closed())
    }

    /// Tells the eye tracker the user is currently looking at `location`, given in host space.
    pub fn manual_drift_correction(&self, location: HostVector) -> Result<(), HmdError> {
        let device = to_device_vector(location, 1.0 / self.poses.world_to_meters_scale());
        self.headset
            .manual_drift_correction(device)
            .map_err(|code| HmdError::query_failed("VRHeadset::manual_drift_correction", code))
    }

    pub fn ensure_eye_calibration(&self) -> Result<(), HmdError> {
        self.headset
            .ensure_eye_calibration()
            .map_err(|code| HmdError::query_failed("VRHeadset::ensure_eye_calibration", code))
    }

    pub fn is_calibrating(&self) -> bool {
        self.errors
            .check("VRHeadset::is_eye_tracking_calibrating", self.headset.is_eye_tracking_calibrating())
            .unwrap_or(false)
    }

    // Gaze data is the newest the device has, so the pose is sampled now rather than
    // taken from the render slot.
    fn frame_orientation(&self, frame: ReferenceFrame) -> Result<HostRotation, HmdError> {
        match frame {
            ReferenceFrame::Head => Ok(HostRotation::identity()),
            ReferenceFrame::World => Ok(self.poses.sample(&*self.headset)?.orientation),
        }
    }

    // A report where either eye has no usable direction is rejected as a whole
    fn gaze_vectors(&self) -> Result<(VRGazeVector, VRGazeVector), HmdError> {
        let gaze = self.headset.gaze_vectors().and_then(|(left, right)| {
            if has_direction(left.vector) && has_direction(right.vector) {
                Ok((left, right))
            } else {
                Err(VRErrorCode::DataUnreliable)
            }
        });
        self.errors.check("VRHeadset::gaze_vectors", gaze)
    }

    fn screen_inputs(&self)
                     -> Result<((VRProjectionFrustum, VRProjectionFrustum), (VRGazeVector, VRGazeVector)), HmdError> {
        let frustums = self.errors.check("VRHeadset::projection_frustums",
                                         self.headset.projection_frustums(GAZE_SCREEN_NEAR, GAZE_SCREEN_FAR))?;
        Ok((frustums, self.gaze_vectors()?))
    }
}

fn has_direction(device: [f32; 3]) -> bool {
    let length = to_host_vector(device, 1.0).length();
    length > 0.0 && length.is_finite()
}

// Only for vectors that passed `has_direction`
fn unit_direction(device: [f32; 3]) -> HostVector {
    let direction = to_host_vector(device, 1.0);
    direction / direction.length()
}

// Gaze vectors are projected in the device's view space, which has the same
// right/up/forward layout the projection matrix expects.
fn screen_position(eye: VREye, frustum: &VRProjectionFrustum, gaze: &VRGazeVector) -> Result<HostPoint2D, HmdError> {
    let projection = ProjectionBuilder::build(frustum, GAZE_SCREEN_NEAR, GAZE_SCREEN_FAR);
    let clip = projection.project(gaze.vector);
    let w = clip[3];
    if !(w > 0.0) || !w.is_finite() {
        warn!("{:?} eye gaze {:?} points away from the screen", eye, gaze.vector);
        return Err(HmdError::Unprojectable(eye));
    }

    let to_screen = |ndc: f32| ((ndc + 1.0) / 2.0).max(0.0).min(1.0);
    Ok(HostPoint2D::new(to_screen(clip[0] / w), to_screen(clip[1] / w)))
}
