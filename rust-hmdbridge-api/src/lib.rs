#[cfg(feature = "utils")]
extern crate time;

#[cfg(feature = "utils")]
pub mod utils;

#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

pub mod mock;
pub mod vr_compositor;
pub mod vr_error;
pub mod vr_eye;
pub mod vr_field_view;
pub mod vr_gaze;
pub mod vr_headset;
pub mod vr_layer;
pub mod vr_pose;
pub mod vr_surface;

pub use vr_compositor::{VRCompositor, VRCompositorPtr};
pub use vr_error::{VRErrorCode, VRResult};
pub use vr_eye::{VREye, VREyes};
pub use vr_field_view::VRProjectionFrustum;
pub use vr_gaze::{VRGazeConvergence, VRGazeRay, VRGazeVector};
pub use vr_headset::{VRHeadset, VRHeadsetPtr};
pub use vr_layer::{VRCompositorLayer, VRLayerInit, VRLayerSubmit, VRTextureBounds};
pub use vr_pose::VRPose;
pub use vr_surface::{VRDeviceContext, VRRasterizerState, VRRenderSurface, VRSurfaceHandle, VRViewport};
