// The VRPose struct represents the head pose reported by the device at a given timestamp,
// in the device's native convention: X right, Y up, Z forward, meters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRPose {
    // Orientation of the headset as a quaternion [x, y, z, w].
    pub orientation: [f32; 4],

    // Position of the headset relative to the tracking origin, in meters.
    pub position: [f32; 3],

    // Time the pose was sampled, in milliseconds.
    pub timestamp: f64,
}

impl Default for VRPose {
    fn default() -> VRPose {
        VRPose {
            orientation: [0.0, 0.0, 0.0, 1.0],
            position: [0.0, 0.0, 0.0],
            timestamp: 0.0,
        }
    }
}

impl VRPose {
    pub fn new(orientation: [f32; 4], position: [f32; 3]) -> VRPose {
        VRPose {
            orientation,
            position,
            timestamp: 0.0,
        }
    }

    /// Returns a copy whose orientation is a unit quaternion.
    /// A zero or non-finite quaternion carries no rotation and becomes the identity.
    pub fn normalized(&self) -> VRPose {
        let [x, y, z, w] = self.orientation;
        let norm = (x * x + y * y + z * z + w * w).sqrt();
        let orientation = if norm > 0.0 && norm.is_finite() {
            [x / norm, y / norm, z / norm, w / norm]
        } else {
            [0.0, 0.0, 0.0, 1.0]
        };
        VRPose {
            orientation,
            ..*self
        }
    }

    pub fn is_normalized(&self) -> bool {
        let [x, y, z, w] = self.orientation;
        ((x * x + y * y + z * z + w * w) - 1.0).abs() < 1e-4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_orientation_becomes_identity() {
        let zero = VRPose::new([0.0; 4], [1.0, 2.0, 3.0]).normalized();
        assert_eq!(zero.orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(zero.position, [1.0, 2.0, 3.0]);

        let nan = VRPose::new([std::f32::NAN, 0.0, 0.0, 1.0], [0.0; 3]).normalized();
        assert_eq!(nan.orientation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn normalized_has_unit_length() {
        let pose = VRPose::new([1.0, 2.0, 2.0, 4.0], [0.0; 3]);
        assert!(!pose.is_normalized());
        assert!(pose.normalized().is_normalized());
    }
}
