// Eye tracking data as reported by the device, in the device convention
// (X right, Y up, Z forward) and relative to the headset.

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRGazeVector {
    // Unit direction the eye is looking at.
    pub vector: [f32; 3],
}

impl Default for VRGazeVector {
    fn default() -> VRGazeVector {
        VRGazeVector {
            vector: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRGazeRay {
    // Origin of the ray, in meters.
    pub origin: [f32; 3],
    pub direction: [f32; 3],
}

impl Default for VRGazeRay {
    fn default() -> VRGazeRay {
        VRGazeRay {
            origin: [0.0, 0.0, 0.0],
            direction: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRGazeConvergence {
    // One of the two eye rays.
    pub ray: VRGazeRay,

    // Distance along the ray to the point where it meets the other eye ray, in meters.
    pub distance: f32,

    // Estimated accuracy of the distance, from 0 (unusable, eg. during a blink) to 1.
    pub accuracy: f32,
}
