use crate::{VRPose, VRSurfaceHandle};

// Options used when asking the compositor for a new layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRLayerInit {
    // Content is fixed to the HMD screen and must not be reprojected.
    pub disable_time_warp: bool,
}

// A layer created by the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRCompositorLayer {
    pub layer_id: u32,

    // Resolution the compositor would like to receive for each eye, in pixels.
    pub ideal_resolution_per_eye: (u32, u32),
}

impl Default for VRCompositorLayer {
    fn default() -> VRCompositorLayer {
        VRCompositorLayer {
            layer_id: 0,
            ideal_resolution_per_eye: (0, 0),
        }
    }
}

// Texture bounds in UV space. Top is 0 and bottom is 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRTextureBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl VRTextureBounds {
    // Left eye image occupies [0, 0.5) of the texture width
    pub fn left_half() -> VRTextureBounds {
        VRTextureBounds {
            left: 0.0,
            top: 0.0,
            right: 0.5,
            bottom: 1.0,
        }
    }

    // Right eye image occupies [0.5, 1.0) of the texture width
    pub fn right_half() -> VRTextureBounds {
        VRTextureBounds {
            left: 0.5,
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
        }
    }
}

// Data provided to the compositor for one presented frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRLayerSubmit {
    pub layer_id: u32,

    // The render pose the frame was drawn with, as handed out by the compositor.
    pub pose: VRPose,

    // Source texture holding both eye images side by side.
    pub surface: VRSurfaceHandle,

    pub left_bounds: VRTextureBounds,
    pub right_bounds: VRTextureBounds,
}

impl VRLayerSubmit {
    pub fn side_by_side(layer_id: u32, pose: VRPose, surface: VRSurfaceHandle) -> VRLayerSubmit {
        VRLayerSubmit {
            layer_id,
            pose,
            surface,
            left_bounds: VRTextureBounds::left_half(),
            right_bounds: VRTextureBounds::right_half(),
        }
    }
}
