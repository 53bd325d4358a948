use rust_hmdbridge_api::{VREye, VRViewport};

// Distance of the HUD from the outer edge of each eye image, in pixels
const HUD_OFFSET: f32 = 50.0;

/// Hooks into the host's scene viewport and window.
pub trait StereoViewport {
    fn set_viewport_size(&mut self, width: u32, height: u32);

    /// Native size of the window hosting the viewport, if there is one.
    fn window_size(&self) -> Option<(u32, u32)>;

    fn set_viewport_size_driven_by_window(&mut self, driven: bool);

    /// The host must not smooth or cap its frame rate while the compositor paces rendering.
    fn set_frame_rate_smoothing_disabled(&mut self, disabled: bool);
}

/// Describes the stereo pair as if it was a single monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct MonitorInfo {
    pub desktop_position: (i32, i32),
    pub resolution: (u32, u32),
    pub window_size: (u32, u32),
}

/// Where an eye image lies in the shared render target, in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct EyeRenderParams {
    pub uv_scale: [f32; 2],
    pub uv_offset: [f32; 2],
}

/// Tracks whether the device and stereo rendering are enabled.
/// Stereo can only be on while the device is.
pub struct StereoStateMachine {
    device_enabled: bool,
    stereo_enabled: bool,
    frame_rate_smoothing_disabled: bool,
    ideal_resolution_per_eye: (u32, u32),
    viewport: Option<Box<dyn StereoViewport + Send>>,
}

impl StereoStateMachine {
    pub fn new(ideal_resolution_per_eye: (u32, u32)) -> StereoStateMachine {
        StereoStateMachine {
            device_enabled: true,
            stereo_enabled: false,
            frame_rate_smoothing_disabled: false,
            ideal_resolution_per_eye,
            viewport: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Option<Box<dyn StereoViewport + Send>>) {
        self.viewport = viewport;
    }

    pub fn is_device_enabled(&self) -> bool {
        self.device_enabled
    }

    pub fn is_stereo_enabled(&self) -> bool {
        debug_assert!(!self.stereo_enabled || self.device_enabled);
        self.stereo_enabled
    }

    pub fn is_frame_rate_smoothing_disabled(&self) -> bool {
        self.frame_rate_smoothing_disabled
    }

    /// Enabling the device only allows stereo to be switched on; it does not switch it on.
    pub fn set_device_enabled(&mut self, enable: bool) {
        if self.device_enabled == enable {
            return;
        }

        // Has to happen while the device is still enabled, stereo transitions are refused otherwise
        if !enable {
            self.set_stereo_enabled(false);
        }
        self.device_enabled = enable;
        debug!("HMD {}", if enable { "enabled" } else { "disabled" });
    }

    /// Returns whether stereo is enabled after the call.
    pub fn set_stereo_enabled(&mut self, enable: bool) -> bool {
        if self.stereo_enabled == enable {
            return enable;
        }

        if !self.device_enabled {
            warn!("Stereo rendering cannot be enabled while the HMD is disabled");
            return false;
        }

        let monitor = self.monitor_info();
        if let Some(ref mut viewport) = self.viewport {
            let window = viewport.window_size();
            if enable {
                viewport.set_viewport_size(monitor.resolution.0, monitor.resolution.1);
            } else if let Some((width, height)) = window {
                viewport.set_viewport_size(width, height);
            }
            if window.is_some() {
                viewport.set_viewport_size_driven_by_window(!enable);
            }
            viewport.set_frame_rate_smoothing_disabled(enable);
        }

        self.frame_rate_smoothing_disabled = enable;
        self.stereo_enabled = enable;
        info!("Stereo rendering {}", if enable { "enabled" } else { "disabled" });
        self.stereo_enabled
    }

    pub fn set_ideal_resolution_per_eye(&mut self, resolution: (u32, u32)) {
        self.ideal_resolution_per_eye = resolution;
    }

    // Both eyes are rendered side by side
    pub fn monitor_info(&self) -> MonitorInfo {
        let (width, height) = self.ideal_resolution_per_eye;
        MonitorInfo {
            desktop_position: (0, 0),
            resolution: (width * 2, height),
            window_size: (width * 2, height),
        }
    }

    pub fn adjust_view_rect(&self, eye: VREye, viewport: VRViewport) -> VRViewport {
        let width = viewport.width / 2;
        let x = match eye {
            VREye::Left => viewport.x,
            VREye::Right => viewport.x + width as i32,
        };
        VRViewport::new(x, viewport.y, width, viewport.height)
    }

    pub fn eye_render_params(&self, eye: VREye) -> EyeRenderParams {
        EyeRenderParams {
            uv_scale: [0.5, 1.0],
            uv_offset: match eye {
                VREye::Left => [0.0, 0.0],
                VREye::Right => [0.5, 0.0],
            },
        }
    }

    /// Translations placing the HUD in each eye image, row-vector layout.
    pub fn ortho_projection(&self, render_target_width: u32) -> [[[f32; 4]; 4]; 2] {
        let translation = |x: f32| {
            let mut m: [[f32; 4]; 4] = identity_matrix!();
            m[3][0] = x;
            m
        };
        [translation(HUD_OFFSET), translation(-HUD_OFFSET + render_target_width as f32 * 0.5)]
    }
}
