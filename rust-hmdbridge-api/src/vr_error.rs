use thiserror::Error;

pub type VRResult<T> = Result<T, VRErrorCode>;

/// Return codes reported by the headset and compositor services.
/// Anything other than success is surfaced as one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VRErrorCode {
    #[error("not connected to the device service")]
    ConnectNotConnected,
    #[error("device service runtime is too old")]
    ConnectRuntimeVersionTooOld,
    #[error("device service did not answer in time")]
    ConnectTimeout,
    #[error("no new data since the last query")]
    DataNoUpdate,
    #[error("data is currently unreliable")]
    DataUnreliable,
    #[error("the requested capability was not enabled")]
    DataRequiresCapability,
    #[error("compositor layer is invalid")]
    CompositorInvalidLayer,
    #[error("compositor could not read the submitted texture")]
    CompositorInvalidTexture,
    #[error("compositor is not ready for a new frame")]
    CompositorNotReady,
    #[error("position tracking is not running")]
    PositionNotTracking,
    #[error("eye tracking is not running")]
    EyeTrackingNotTracking,
    #[error("unknown device error ({0})")]
    Unknown(i32),
}

impl VRErrorCode {
    /// True for codes meaning the service itself is unreachable,
    /// as opposed to a single query having no usable data.
    pub fn is_connection_error(&self) -> bool {
        match *self {
            VRErrorCode::ConnectNotConnected |
            VRErrorCode::ConnectRuntimeVersionTooOld |
            VRErrorCode::ConnectTimeout => true,
            _ => false,
        }
    }
}
