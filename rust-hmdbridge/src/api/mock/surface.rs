use rust_hmdbridge_api::{VRDeviceContext, VRRasterizerState, VRRenderSurface, VRSurfaceHandle};
use std::sync::{Arc, Mutex};

/// Records every rasterizer state bound on it.
pub struct MockDeviceContext {
    state: Mutex<Option<VRRasterizerState>>,
    history: Mutex<Vec<Option<VRRasterizerState>>>,
}

impl MockDeviceContext {
    pub fn new(initial: Option<VRRasterizerState>) -> MockDeviceContext {
        MockDeviceContext {
            state: Mutex::new(initial),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<Option<VRRasterizerState>> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl VRDeviceContext for MockDeviceContext {
    fn rasterizer_state(&self) -> Option<VRRasterizerState> {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_rasterizer_state(&self, state: Option<VRRasterizerState>) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(state);
        }
    }
}

pub struct MockSurface {
    handle: VRSurfaceHandle,
    size: (u32, u32),
    context: Option<Arc<MockDeviceContext>>,
}

impl MockSurface {
    pub fn new(handle: u64, size: (u32, u32), context: Option<Arc<MockDeviceContext>>) -> MockSurface {
        MockSurface {
            handle: VRSurfaceHandle(handle),
            size,
            context,
        }
    }
}

impl VRRenderSurface for MockSurface {
    fn native_handle(&self) -> VRSurfaceHandle {
        self.handle
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn device_context(&self) -> Option<Arc<dyn VRDeviceContext>> {
        self.context.clone().map(|context| context as Arc<dyn VRDeviceContext>)
    }
}
