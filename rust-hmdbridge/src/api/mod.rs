#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "mock")]
pub use self::mock::{new_mock_device, new_mock_device_with_remote, MockCompositor, MockHeadset};
