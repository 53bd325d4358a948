// The VRProjectionFrustum struct describes the asymmetric view frustum of one eye,
// as the tangents of the four half-angles measured from the eye's forward axis.
// All four values are positive for a frustum that contains the forward axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRProjectionFrustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for VRProjectionFrustum {
    fn default() -> VRProjectionFrustum {
        VRProjectionFrustum::symmetric(1.0)
    }
}

impl VRProjectionFrustum {
    pub fn symmetric(tangent: f32) -> VRProjectionFrustum {
        VRProjectionFrustum {
            left: tangent,
            right: tangent,
            top: tangent,
            bottom: tangent,
        }
    }

    // Devices sometimes report the field of view in degrees,
    // the frustum is expressed in raw tangent units
    pub fn from_degrees(up: f32, right: f32, down: f32, left: f32) -> VRProjectionFrustum {
        VRProjectionFrustum {
            left: left.to_radians().tan(),
            right: right.to_radians().tan(),
            top: up.to_radians().tan(),
            bottom: down.to_radians().tan(),
        }
    }

    pub fn horizontal_fov_degrees(&self) -> f32 {
        (self.left.atan() + self.right.atan()).to_degrees()
    }

    pub fn vertical_fov_degrees(&self) -> f32 {
        (self.top.atan() + self.bottom.atan()).to_degrees()
    }
}
