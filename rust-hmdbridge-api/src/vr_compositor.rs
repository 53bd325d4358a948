use crate::{VRCompositorLayer, VRLayerInit, VRLayerSubmit, VRPose, VRResult};
use std::sync::Arc;

pub type VRCompositorPtr = Arc<dyn VRCompositor>;

/// The VRCompositor trait paces frame production and receives the rendered images.
pub trait VRCompositor: Send + Sync {
    /// Whether the compositor service is running and accepting clients.
    fn is_ready(&self) -> VRResult<bool>;

    /// Creates a layer frames can be submitted to.
    fn create_layer(&self, init: &VRLayerInit) -> VRResult<VRCompositorLayer>;

    /// Submits frame to the display
    /// Must be called in the render thread
    fn submit(&self, submit: &VRLayerSubmit) -> VRResult<()>;

    /// Synchronization point to keep in step with the HMD.
    /// Blocks until the compositor wants a new frame and returns the pose to render it with.
    fn wait_for_render_pose(&self) -> VRResult<VRPose>;
}
