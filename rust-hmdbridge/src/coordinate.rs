// Conversions between the device convention (X right, Y up, Z forward, meters, column vectors)
// and the host convention (X forward, Y right, Z up, world units, row vectors).

use euclid::{Point2D, Rotation3D, Vector3D};
use rust_hmdbridge_api::VRPose;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostSpace;

pub type HostVector = Vector3D<f32, HostSpace>;
pub type HostRotation = Rotation3D<f32, HostSpace, HostSpace>;
pub type HostPoint2D = Point2D<f32, HostSpace>;

/// A head or eye pose expressed in host space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostPose {
    pub orientation: HostRotation,

    /// Position in world units.
    pub position: HostVector,
}

impl Default for HostPose {
    fn default() -> HostPose {
        HostPose {
            orientation: HostRotation::identity(),
            position: HostVector::zero(),
        }
    }
}

pub fn to_host_vector(device: [f32; 3], scale: f32) -> HostVector {
    HostVector::new(device[2] * scale, device[0] * scale, device[1] * scale)
}

/// Inverse axis mapping of `to_host_vector`. Pass the reciprocal of the
/// world-to-meters scale to get back to meters.
pub fn to_device_vector(host: HostVector, scale: f32) -> [f32; 3] {
    [host.y * scale, host.z * scale, host.x * scale]
}

// The axis permutation is cyclic, so quaternion components follow the same mapping
// and rotations keep their handedness.
pub fn to_host_quaternion(device: [f32; 4]) -> HostRotation {
    HostRotation::quaternion(device[2], device[0], device[1], device[3])
}

pub fn to_host_matrix(device: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut host = [[0.0; 4]; 4];
    for (row, values) in host.iter_mut().enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value = device[col][row];
        }
    }
    host
}

pub fn to_host_pose(pose: &VRPose, scale: f32) -> HostPose {
    let pose = pose.normalized();
    HostPose {
        orientation: to_host_quaternion(pose.orientation),
        position: to_host_vector(pose.position, scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn vector_round_trip_with_reciprocal_scale(device in prop::array::uniform3(-100.0f32..100.0),
                                                   scale in 0.01f32..1000.0) {
            let back = to_device_vector(to_host_vector(device, scale), 1.0 / scale);
            for (actual, expected) in back.iter().zip(&device) {
                prop_assert!((actual - expected).abs() <= 1e-5 * expected.abs().max(1.0),
                             "{:?} != {:?} at scale {}", back, device, scale);
            }
        }

        #[test]
        fn rotation_commutes_with_axis_mapping(components in prop::array::uniform4(-1.0f32..1.0),
                                               device in prop::array::uniform3(-10.0f32..10.0)) {
            let norm = components.iter().map(|c| c * c).sum::<f32>().sqrt();
            prop_assume!(norm > 0.1);
            let q = [components[0] / norm, components[1] / norm, components[2] / norm, components[3] / norm];

            // Same rotation applied in device axes
            let device_rotation: Rotation3D<f32, HostSpace, HostSpace> = Rotation3D::quaternion(q[0], q[1], q[2], q[3]);
            let rotated = device_rotation.transform_vector3d(Vector3D::new(device[0], device[1], device[2]));

            let host = to_host_quaternion(q).transform_vector3d(to_host_vector(device, 1.0));
            let back = to_device_vector(host, 1.0);
            for (actual, expected) in back.iter().zip(&[rotated.x, rotated.y, rotated.z]) {
                prop_assert!((actual - expected).abs() < 1e-4, "{:?} != {:?}", back, rotated);
            }
        }
    }

    #[test]
    fn device_forward_is_host_forward() {
        let forward = to_host_vector([0.0, 0.0, 1.0], 100.0);
        assert_eq!(forward, HostVector::new(100.0, 0.0, 0.0));
        let up = to_host_vector([0.0, 1.0, 0.0], 1.0);
        assert_eq!(up, HostVector::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn matrix_is_transposed() {
        let mut device = [[0.0; 4]; 4];
        device[0][3] = 7.0;
        device[2][1] = -2.0;
        let host = to_host_matrix(&device);
        assert_eq!(host[3][0], 7.0);
        assert_eq!(host[1][2], -2.0);
        assert_eq!(to_host_matrix(&host), device);
    }

    #[test]
    fn pose_orientation_is_normalized() {
        let pose = VRPose::new([0.0, 0.0, 0.0, 2.0], [1.0, 2.0, 3.0]);
        let host = to_host_pose(&pose, 10.0);
        assert!((host.orientation.r - 1.0).abs() < 1e-6);
        assert_eq!(host.position, HostVector::new(30.0, 10.0, 20.0));
    }

    #[test]
    fn nan_propagates() {
        let host = to_host_vector([std::f32::NAN, 0.0, 1.0], 1.0);
        assert!(host.y.is_nan());
    }
}
