use std::sync::Arc;

/// Opaque native handle of the GPU texture a frame was rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRSurfaceHandle(pub u64);

/// Opaque native handle of a rasterizer state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRRasterizerState(pub u64);

/// The immediate context of the GPU device owning a render surface.
/// Only the pieces of pipeline state that interfere with compositor submission are exposed.
pub trait VRDeviceContext: Send + Sync {
    /// Currently bound rasterizer state, `None` meaning the device default.
    fn rasterizer_state(&self) -> Option<VRRasterizerState>;

    /// Binds a rasterizer state, `None` restoring the device default.
    fn set_rasterizer_state(&self, state: Option<VRRasterizerState>);
}

/// The texture the host renderer draws the stereo pair into.
/// Owned by the host renderer; the bridge only keeps a reference until the next frame.
pub trait VRRenderSurface: Send + Sync {
    fn native_handle(&self) -> VRSurfaceHandle;

    /// Size of the texture in pixels.
    fn size(&self) -> (u32, u32);

    /// Context of the device the texture lives on, if it can be reached.
    fn device_context(&self) -> Option<Arc<dyn VRDeviceContext>>;
}

/// The 2D rectangle used to project the 3D scene for one eye. Measured in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRViewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl VRViewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
